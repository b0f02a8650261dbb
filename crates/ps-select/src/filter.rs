//! Filter & Tolerance Engine.
//!
//! Fine filters run after the coarse catalog query, in a fixed order. Each
//! active stage is an AND: a record must pass all of them. A record missing
//! the attribute an active stage inspects is dropped; the only fallbacks are
//! the outlet mm/inch conversion and the two max-head spellings, both settled
//! when the record is decoded.

use ps_catalog::PumpRecord;
use ps_core::{Band, OutletUnit};
use tracing::debug;

use crate::criteria::SearchCriteria;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    Horsepower(String),
    /// Lowercased prefix
    ModelPrefix(String),
    Outlet { band: Band, unit: OutletUnit },
    RatedFlow(Band),
    RatedHead(Band),
    MaxFlow(Band),
    MaxHead(Band),
}

impl FilterStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Horsepower(_) => "horsepower",
            Self::ModelPrefix(_) => "model_prefix",
            Self::Outlet { .. } => "outlet",
            Self::RatedFlow(_) => "rated_flow",
            Self::RatedHead(_) => "rated_head",
            Self::MaxFlow(_) => "max_flow",
            Self::MaxHead(_) => "max_head",
        }
    }

    /// Stages switched on by `criteria`, in application order.
    pub fn active(criteria: &SearchCriteria) -> Vec<FilterStage> {
        let mut stages = Vec::new();

        if let Some(hp) = non_empty(criteria.horsepower.as_deref()) {
            stages.push(Self::Horsepower(hp.to_string()));
        }
        if let Some(prefix) = non_empty(criteria.model_prefix.as_deref()) {
            stages.push(Self::ModelPrefix(prefix.to_lowercase()));
        }
        if let Some(outlet) = criteria.outlet.as_ref().filter(|o| o.size > 0.0) {
            stages.push(Self::Outlet {
                band: Band::around(outlet.size, outlet.tolerance_pct),
                unit: outlet.unit,
            });
        }
        if criteria.required_flow_lpm > 0.0 {
            stages.push(Self::RatedFlow(Band::around(
                criteria.required_flow_lpm,
                criteria.flow_tolerance_pct,
            )));
        }
        if criteria.required_head_m > 0.0 {
            stages.push(Self::RatedHead(Band::around(
                criteria.required_head_m,
                criteria.head_tolerance_pct,
            )));
        }
        if let Some(c) = criteria.max_flow_lpm.filter(|c| c.value > 0.0) {
            stages.push(Self::MaxFlow(Band::around(c.value, c.tolerance_pct)));
        }
        if let Some(c) = criteria.max_head_m.filter(|c| c.value > 0.0) {
            stages.push(Self::MaxHead(Band::around(c.value, c.tolerance_pct)));
        }

        stages
    }

    pub fn matches(&self, record: &PumpRecord) -> bool {
        let within = |band: &Band, v: Option<f64>| v.is_some_and(|v| band.contains(v));
        match self {
            Self::Horsepower(hp) => record.horsepower.as_deref().map(str::trim) == Some(hp.as_str()),
            Self::ModelPrefix(prefix) => record.model_id.to_lowercase().starts_with(prefix),
            Self::Outlet { band, unit } => within(band, record.outlet_in(*unit)),
            Self::RatedFlow(band) => within(band, record.rated_flow_lpm),
            Self::RatedHead(band) => within(band, record.rated_head_m),
            Self::MaxFlow(band) => within(band, record.max_flow_lpm),
            Self::MaxHead(band) => within(band, record.max_head_m),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Run every active stage over `records`, preserving input order.
pub fn apply_filters(mut records: Vec<PumpRecord>, criteria: &SearchCriteria) -> Vec<PumpRecord> {
    for stage in FilterStage::active(criteria) {
        let before = records.len();
        records.retain(|r| stage.matches(r));
        debug!(
            stage = stage.name(),
            before,
            after = records.len(),
            "filter stage applied"
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Ceiling, OutletFilter};
    use ps_catalog::RawRow;
    use serde_json::{Value, json};

    fn rec(v: Value) -> PumpRecord {
        let row: RawRow = v.as_object().cloned().unwrap();
        PumpRecord::from_row(&row).unwrap()
    }

    fn models(records: &[PumpRecord]) -> Vec<&str> {
        records.iter().map(|r| r.model_id.as_str()).collect()
    }

    #[test]
    fn flow_band_is_inclusive() {
        let records = vec![
            rec(json!({ "Model No.": "in", "Q Rated/LPM": 119 })),
            rec(json!({ "Model No.": "edge", "Q Rated/LPM": 120 })),
            rec(json!({ "Model No.": "out", "Q Rated/LPM": 121 })),
            rec(json!({ "Model No.": "low", "Q Rated/LPM": 80 })),
        ];
        let criteria = SearchCriteria {
            required_flow_lpm: 100.0,
            flow_tolerance_pct: 20.0,
            ..SearchCriteria::default()
        };
        assert_eq!(models(&apply_filters(records, &criteria)), ["in", "edge", "low"]);
    }

    #[test]
    fn inactive_when_requirement_not_positive() {
        let criteria = SearchCriteria::default();
        assert!(FilterStage::active(&criteria).is_empty());

        let records = vec![rec(json!({ "Model No.": "no-data" }))];
        assert_eq!(apply_filters(records, &criteria).len(), 1);
    }

    #[test]
    fn missing_attribute_fails_active_stage() {
        let records = vec![
            rec(json!({ "Model No.": "a", "Head Rated/M": 10 })),
            rec(json!({ "Model No.": "b" })),
        ];
        let criteria = SearchCriteria {
            required_head_m: 10.0,
            ..SearchCriteria::default()
        };
        assert_eq!(models(&apply_filters(records, &criteria)), ["a"]);
    }

    #[test]
    fn horsepower_and_prefix() {
        let records = vec![
            rec(json!({ "Model No.": "BPS-100", "HP": "1 1/4" })),
            rec(json!({ "Model No.": "bps-200", "HP": "1 1/4" })),
            rec(json!({ "Model No.": "XBPS-1", "HP": "1 1/4" })),
            rec(json!({ "Model No.": "BPS-300", "HP": "1.25" })),
        ];
        let criteria = SearchCriteria {
            horsepower: Some("1 1/4".to_string()),
            model_prefix: Some("Bps".to_string()),
            ..SearchCriteria::default()
        };
        assert_eq!(models(&apply_filters(records, &criteria)), ["BPS-100", "bps-200"]);
    }

    #[test]
    fn outlet_falls_back_to_other_unit() {
        let records = vec![
            rec(json!({ "Model No.": "mm-only", "Outlet (mm)": 50 })),
            rec(json!({ "Model No.": "inch-only", "Outlet (inch)": 2 })),
            rec(json!({ "Model No.": "none" })),
            rec(json!({ "Model No.": "small", "Outlet (mm)": 25 })),
        ];
        let criteria = SearchCriteria {
            outlet: Some(OutletFilter {
                size: 2.0,
                unit: OutletUnit::Inch,
                tolerance_pct: 10.0,
            }),
            ..SearchCriteria::default()
        };
        assert_eq!(
            models(&apply_filters(records, &criteria)),
            ["mm-only", "inch-only"]
        );
    }

    #[test]
    fn max_head_accepts_either_spelling() {
        let records = vec![
            rec(json!({ "Model No.": "a", "Max Head(M)": 30 })),
            rec(json!({ "Model No.": "b", "Max Head (M)": "31" })),
            rec(json!({ "Model No.": "c" })),
            rec(json!({ "Model No.": "d", "Max Head(M)": 50 })),
        ];
        let criteria = SearchCriteria {
            max_head_m: Some(Ceiling {
                value: 30.0,
                tolerance_pct: 10.0,
            }),
            ..SearchCriteria::default()
        };
        assert_eq!(models(&apply_filters(records, &criteria)), ["a", "b"]);
    }

    #[test]
    fn max_flow_tolerates_text() {
        let records = vec![
            rec(json!({ "Model No.": "a", "Max Flow (LPM)": "300" })),
            rec(json!({ "Model No.": "b", "Max Flow (LPM)": "lots" })),
        ];
        let criteria = SearchCriteria {
            max_flow_lpm: Some(Ceiling {
                value: 310.0,
                tolerance_pct: 5.0,
            }),
            ..SearchCriteria::default()
        };
        assert_eq!(models(&apply_filters(records, &criteria)), ["a"]);
    }

    #[test]
    fn stage_order_is_fixed() {
        let criteria = SearchCriteria {
            horsepower: Some("1".to_string()),
            model_prefix: Some("A".to_string()),
            outlet: Some(OutletFilter {
                size: 50.0,
                unit: OutletUnit::Mm,
                tolerance_pct: 10.0,
            }),
            required_flow_lpm: 10.0,
            required_head_m: 10.0,
            max_flow_lpm: Some(Ceiling {
                value: 10.0,
                tolerance_pct: 10.0,
            }),
            max_head_m: Some(Ceiling {
                value: 10.0,
                tolerance_pct: 10.0,
            }),
            ..SearchCriteria::default()
        };
        let names: Vec<&str> = FilterStage::active(&criteria)
            .iter()
            .map(FilterStage::name)
            .collect();
        assert_eq!(
            names,
            [
                "horsepower",
                "model_prefix",
                "outlet",
                "rated_flow",
                "rated_head",
                "max_flow",
                "max_head"
            ]
        );
    }
}
