//! Typed catalog records.
//!
//! Store rows are flat maps from column name to string/number/null. Decoding
//! happens once here with a fixed policy per field:
//!
//! - rated and max flow/head: number or numeric text, kept only when positive
//! - max head: `Max Head(M)` first, then `Max Head (M)`
//! - category: a text cell is one name, arrays from the relational merge carry several
//! - horsepower: kept as the raw catalog token, parsed on demand
//! - outlet: either unit may be missing, the other converts at 25.4 mm/inch
//! - anything unparseable is `None`, never an error

use ps_core::{HorsepowerRating, OutletUnit, inch_to_mm, mm_to_inch, parse_horsepower, positive};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::columns::{self, Frequency, Phase};

pub type RawRow = Map<String, Value>;

/// Number or numeric text as a finite float.
pub fn value_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => ps_core::parse_lenient(s),
        _ => None,
    }
}

/// Non-empty text form of a string or number.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn field_f64(row: &RawRow, column: &str) -> Option<f64> {
    row.get(column).and_then(value_f64)
}

fn field_positive(row: &RawRow, column: &str) -> Option<f64> {
    field_f64(row, column).and_then(positive)
}

fn field_text(row: &RawRow, column: &str) -> Option<String> {
    row.get(column).and_then(value_text)
}

fn category_list(value: Option<&Value>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|c| c == name) {
            out.push(name.to_string());
        }
    };
    match value {
        Some(Value::String(s)) => push(s.as_str()),
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(text) = value_text(item) {
                    push(text.as_str());
                }
            }
        }
        Some(other) => {
            if let Some(text) = value_text(other) {
                push(text.as_str());
            }
        }
        None => {}
    }
    out
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PumpRecord {
    pub db_id: Option<String>,
    pub model_id: String,
    pub rated_flow_lpm: Option<f64>,
    pub rated_head_m: Option<f64>,
    pub max_flow_lpm: Option<f64>,
    pub max_head_m: Option<f64>,
    pub categories: Vec<String>,
    pub frequency: Option<Frequency>,
    pub phase: Option<Phase>,
    /// Raw catalog token ("1 1/4", "0.75", ...)
    pub horsepower: Option<String>,
    pub outlet_mm: Option<f64>,
    pub outlet_inch: Option<f64>,
    pub product_link: Option<String>,
    /// Display-only columns (weight, efficiency, current, ...)
    pub extra: RawRow,
}

impl PumpRecord {
    /// Decode a store row. Rows without a model number are not records.
    pub fn from_row(row: &RawRow) -> Option<Self> {
        let model_id = field_text(row, columns::MODEL_NO)?;

        let max_head_m = columns::MAX_HEAD_M
            .iter()
            .find_map(|col| field_positive(row, col));

        let extra = row
            .iter()
            .filter(|(k, _)| !columns::TYPED.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            db_id: field_text(row, columns::DB_ID),
            model_id,
            rated_flow_lpm: field_positive(row, columns::RATED_FLOW_LPM),
            rated_head_m: field_positive(row, columns::RATED_HEAD_M),
            max_flow_lpm: field_positive(row, columns::MAX_FLOW_LPM),
            max_head_m,
            categories: category_list(row.get(columns::CATEGORY)),
            frequency: field_f64(row, columns::FREQUENCY_HZ).and_then(Frequency::from_hz),
            phase: field_f64(row, columns::PHASE).and_then(Phase::from_count),
            horsepower: field_text(row, columns::HP),
            outlet_mm: field_positive(row, columns::OUTLET_MM),
            outlet_inch: field_positive(row, columns::OUTLET_INCH),
            product_link: field_text(row, columns::PRODUCT_LINK),
            extra,
        })
    }

    /// Horsepower as a number; NaN when absent or unparseable.
    pub fn horsepower_value(&self) -> f64 {
        self.horsepower
            .as_deref()
            .map_or(f64::NAN, parse_horsepower)
    }

    pub fn horsepower_rating(&self) -> Option<HorsepowerRating> {
        HorsepowerRating::from_hp(self.horsepower_value())
    }

    /// Rated duty point, present only when both values are positive.
    pub fn rated_point(&self) -> Option<(f64, f64)> {
        Some((self.rated_flow_lpm?, self.rated_head_m?))
    }

    /// Outlet size in `unit`, converting from the other stored unit if needed.
    pub fn outlet_in(&self, unit: OutletUnit) -> Option<f64> {
        match unit {
            OutletUnit::Mm => self.outlet_mm.or(self.outlet_inch.map(inch_to_mm)),
            OutletUnit::Inch => self.outlet_inch.or(self.outlet_mm.map(mm_to_inch)),
        }
    }

    pub fn category_label(&self) -> String {
        self.categories.join(", ")
    }
}

/// One model's sampled performance curve, as stored.
///
/// Fields other than the model number are left uninterpreted; which labels
/// are head samples is decided by curve extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveRecord {
    pub model_id: String,
    pub fields: RawRow,
}

impl CurveRecord {
    pub fn from_row(row: &RawRow) -> Option<Self> {
        let model_id = field_text(row, columns::MODEL_NO)?;
        let fields = row
            .iter()
            .filter(|(k, _)| k.as_str() != columns::MODEL_NO)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Some(Self { model_id, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> RawRow {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn scalar_category_is_one_name() {
        let r = row(json!({ "Model No.": "A", "Category": "Sewage, Grey Water" }));
        let rec = PumpRecord::from_row(&r).unwrap();
        assert_eq!(rec.categories, vec!["Sewage, Grey Water"]);
    }

    #[test]
    fn decodes_typed_fields() {
        let r = row(json!({
            "DB ID": 7,
            "Model No.": "BPS-200",
            "Q Rated/LPM": 120,
            "Head Rated/M": "18.5",
            "Max Flow (LPM)": "200",
            "Max Head (M)": 30,
            "Category": ["Booster", "Clean Water", "Booster"],
            "Frequency_Hz": 60,
            "Phase": "1",
            "HP": "1 1/4",
            "Outlet (inch)": 1.5,
            "Product Link": "https://example.com/bps-200",
            "Weight_kg": 12.4
        }));
        let rec = PumpRecord::from_row(&r).unwrap();
        assert_eq!(rec.db_id.as_deref(), Some("7"));
        assert_eq!(rec.rated_point(), Some((120.0, 18.5)));
        assert_eq!(rec.max_flow_lpm, Some(200.0));
        assert_eq!(rec.max_head_m, Some(30.0));
        assert_eq!(rec.categories, vec!["Booster", "Clean Water"]);
        assert_eq!(rec.frequency, Some(Frequency::Hz60));
        assert_eq!(rec.phase, Some(Phase::Single));
        assert_eq!(rec.horsepower_value(), 1.25);
        assert!((rec.outlet_in(OutletUnit::Mm).unwrap() - 38.1).abs() < 1e-9);
        assert_eq!(rec.extra.get("Weight_kg"), Some(&json!(12.4)));
        assert!(!rec.extra.contains_key("HP"));
    }

    #[test]
    fn malformed_numbers_are_unknown() {
        let r = row(json!({
            "Model No.": "X1",
            "Q Rated/LPM": "n/a",
            "Head Rated/M": 0,
            "Max Head(M)": null,
            "HP": "?"
        }));
        let rec = PumpRecord::from_row(&r).unwrap();
        assert_eq!(rec.rated_flow_lpm, None);
        assert_eq!(rec.rated_head_m, None);
        assert_eq!(rec.max_head_m, None);
        assert!(rec.rated_point().is_none());
        assert!(rec.horsepower_value().is_nan());
        assert!(rec.horsepower_rating().is_none());
    }

    #[test]
    fn row_without_model_is_skipped() {
        let r = row(json!({ "Q Rated/LPM": 100 }));
        assert!(PumpRecord::from_row(&r).is_none());
        assert!(CurveRecord::from_row(&r).is_none());
    }

    #[test]
    fn category_array_dedups_in_order() {
        let r = row(json!({ "Model No.": "A", "Category": ["Grinder", "BLDC", "Grinder"] }));
        let rec = PumpRecord::from_row(&r).unwrap();
        assert_eq!(rec.categories, vec!["Grinder", "BLDC"]);
        assert_eq!(rec.category_label(), "Grinder, BLDC");
    }
}
