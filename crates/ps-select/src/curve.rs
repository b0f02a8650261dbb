//! Curve Extraction: performance curve points for charting and comparison.

use ps_catalog::{CurveRecord, value_f64};
use ps_core::{DisplayUnits, parse_lenient};
use serde::Serialize;

/// One chart point in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub flow: f64,
    pub head: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveSeries {
    pub model_id: String,
    pub points: Vec<CurvePoint>,
}

/// The "maximum head" summary column; a separate measurement, never a sample.
pub fn is_max_head_label(label: &str) -> bool {
    let compact: String = label
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("maxhead")
}

/// Head in meters encoded by a sample label such as `10M` or `12.5 M`.
pub fn head_label_m(label: &str) -> Option<f64> {
    if is_max_head_label(label) {
        return None;
    }
    let label = label.trim();
    let number = label
        .strip_suffix("(M)")
        .or_else(|| label.strip_suffix('M'))
        .or_else(|| label.strip_suffix('m'))?;
    parse_lenient(number).filter(|h| *h >= 0.0)
}

/// Sample points of one curve, ascending by flow.
pub fn extract_curve(record: &CurveRecord, units: DisplayUnits) -> Vec<CurvePoint> {
    let mut points: Vec<CurvePoint> = record
        .fields
        .iter()
        .filter_map(|(label, value)| {
            let head_m = head_label_m(label)?;
            let flow_lpm = value_f64(value).filter(|f| *f > 0.0)?;
            Some(CurvePoint {
                flow: units.flow.from_lpm(flow_lpm),
                head: units.head.from_m(head_m),
            })
        })
        .collect();

    points.sort_by(|a, b| a.flow.total_cmp(&b.flow).then(a.head.total_cmp(&b.head)));
    points
}

/// Curve for `model_id`; empty when the dataset has no such model.
pub fn curve_for(model_id: &str, curves: &[CurveRecord], units: DisplayUnits) -> Vec<CurvePoint> {
    curves
        .iter()
        .find(|c| c.model_id == model_id)
        .map(|c| extract_curve(c, units))
        .unwrap_or_default()
}

/// The requirement as a single chart point, only when both values are positive.
pub fn operating_point(flow_lpm: f64, head_m: f64, units: DisplayUnits) -> Option<CurvePoint> {
    (flow_lpm > 0.0 && head_m > 0.0).then(|| CurvePoint {
        flow: units.flow.from_lpm(flow_lpm),
        head: units.head.from_m(head_m),
    })
}

/// One series per selected model, in selection order.
pub fn comparison<S: AsRef<str>>(
    model_ids: &[S],
    curves: &[CurveRecord],
    units: DisplayUnits,
) -> Vec<CurveSeries> {
    model_ids
        .iter()
        .map(|id| CurveSeries {
            model_id: id.as_ref().to_string(),
            points: curve_for(id.as_ref(), curves, units),
        })
        .collect()
}
