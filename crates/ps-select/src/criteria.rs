//! The immutable per-search value object.

use ps_catalog::{CatalogQuery, Frequency, Phase};
use ps_core::OutletUnit;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{SelectError, SelectResult};
use crate::scenario::{Requirement, RequirementSource, ScenarioKind};

pub const DEFAULT_OUTLET_TOLERANCE_PCT: f64 = 10.0;
pub const DEFAULT_TOLERANCE_PCT: f64 = 10.0;
pub const MIN_RESULT_PERCENT: u8 = 5;
pub const MAX_RESULT_PERCENT: u8 = 100;

fn default_outlet_tolerance() -> f64 {
    DEFAULT_OUTLET_TOLERANCE_PCT
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_PCT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletFilter {
    pub size: f64,
    #[serde(default)]
    pub unit: OutletUnit,
    #[serde(default = "default_outlet_tolerance")]
    pub tolerance_pct: f64,
}

/// A performance ceiling (max flow or max head) with its own window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ceiling {
    /// Canonical units (LPM or m)
    pub value: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    #[serde(deserialize_with = "phase_or_none")]
    pub phase: Option<Phase>,
    pub horsepower: Option<String>,
    pub model_prefix: Option<String>,
    pub outlet: Option<OutletFilter>,
    pub required_flow_lpm: f64,
    pub required_head_m: f64,
    pub flow_tolerance_pct: f64,
    pub head_tolerance_pct: f64,
    pub max_flow_lpm: Option<Ceiling>,
    pub max_head_m: Option<Ceiling>,
    pub result_percent: u8,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            category: None,
            frequency: None,
            phase: None,
            horsepower: None,
            model_prefix: None,
            outlet: None,
            required_flow_lpm: 0.0,
            required_head_m: 0.0,
            flow_tolerance_pct: DEFAULT_TOLERANCE_PCT,
            head_tolerance_pct: DEFAULT_TOLERANCE_PCT,
            max_flow_lpm: None,
            max_head_m: None,
            result_percent: MAX_RESULT_PERCENT,
        }
    }
}

impl SearchCriteria {
    /// Apply a resolved requirement. Unset fields keep their current value.
    pub fn with_requirement(mut self, requirement: &Requirement) -> Self {
        if requirement.flow_source != RequirementSource::Unset {
            self.required_flow_lpm = requirement.flow_lpm;
        }
        if requirement.head_source != RequirementSource::Unset {
            self.required_head_m = requirement.head_m;
        }
        self
    }

    pub fn scenario_kind(&self) -> ScenarioKind {
        ScenarioKind::for_category(self.category.as_deref())
    }

    pub fn catalog_query(&self) -> CatalogQuery {
        CatalogQuery {
            category: self.category.clone(),
            frequency: self.frequency,
            phase: self.phase,
        }
    }

    pub fn validate(&self) -> SelectResult<()> {
        if !(MIN_RESULT_PERCENT..=MAX_RESULT_PERCENT).contains(&self.result_percent) {
            return Err(SelectError::invalid(
                "result_percent",
                format!(
                    "{} is outside {MIN_RESULT_PERCENT}..={MAX_RESULT_PERCENT}",
                    self.result_percent
                ),
            ));
        }

        check_finite("required_flow_lpm", self.required_flow_lpm)?;
        check_finite("required_head_m", self.required_head_m)?;
        check_tolerance("flow_tolerance_pct", self.flow_tolerance_pct)?;
        check_tolerance("head_tolerance_pct", self.head_tolerance_pct)?;

        if let Some(outlet) = &self.outlet {
            check_finite("outlet.size", outlet.size)?;
            check_tolerance("outlet.tolerance_pct", outlet.tolerance_pct)?;
        }
        if let Some(c) = &self.max_flow_lpm {
            check_finite("max_flow_lpm.value", c.value)?;
            check_tolerance("max_flow_lpm.tolerance_pct", c.tolerance_pct)?;
        }
        if let Some(c) = &self.max_head_m {
            check_finite("max_head_m.value", c.value)?;
            check_tolerance("max_head_m.tolerance_pct", c.tolerance_pct)?;
        }
        Ok(())
    }
}

fn check_finite(field: &'static str, v: f64) -> SelectResult<()> {
    ps_core::ensure_finite(v, field)
        .map(|_| ())
        .map_err(|e| SelectError::invalid(field, e.to_string()))
}

/// Phase filter for a phase count; counts other than 1 or 3 drop the filter.
pub fn known_phase(count: u32) -> Option<Phase> {
    let phase = Phase::from_count(f64::from(count));
    if phase.is_none() {
        warn!(count, "unsupported phase dropped from search");
    }
    phase
}

fn phase_or_none<'de, D>(deserializer: D) -> Result<Option<Phase>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.and_then(known_phase))
}

fn check_tolerance(field: &'static str, pct: f64) -> SelectResult<()> {
    check_finite(field, pct)?;
    if pct < 0.0 {
        return Err(SelectError::invalid(field, "tolerance cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_shows_everything() {
        let c = SearchCriteria::default();
        c.validate().unwrap();
        assert_eq!(c.result_percent, 100);
    }

    #[test]
    fn result_percent_bounds() {
        for pct in [0u8, 4, 101] {
            let c = SearchCriteria {
                result_percent: pct,
                ..SearchCriteria::default()
            };
            assert!(c.validate().is_err(), "{pct}");
        }
        for pct in [5u8, 50, 100] {
            let c = SearchCriteria {
                result_percent: pct,
                ..SearchCriteria::default()
            };
            c.validate().unwrap();
        }
    }

    #[test]
    fn negative_or_nan_tolerance_rejected() {
        let c = SearchCriteria {
            flow_tolerance_pct: -1.0,
            ..SearchCriteria::default()
        };
        assert!(c.validate().is_err());

        let c = SearchCriteria {
            max_head_m: Some(Ceiling {
                value: 10.0,
                tolerance_pct: f64::NAN,
            }),
            ..SearchCriteria::default()
        };
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("max_head_m.tolerance_pct"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let yaml = "
category: Booster
frequency: 60
phase: 1
outlet: { size: 2, unit: inch }
max_flow_lpm: { value: 300 }
result_percent: 25
";
        let c: SearchCriteria = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(c.frequency, Some(Frequency::Hz60));
        assert_eq!(c.phase, Some(Phase::Single));
        assert_eq!(c.outlet.as_ref().unwrap().tolerance_pct, 10.0);
        assert_eq!(c.max_flow_lpm.unwrap().tolerance_pct, 10.0);
        assert_eq!(c.flow_tolerance_pct, 10.0);
        assert_eq!(c.scenario_kind(), ScenarioKind::Booster);
        c.validate().unwrap();
    }

    #[test]
    fn unsupported_phase_is_dropped() {
        let c: SearchCriteria = serde_yaml::from_str("phase: 2\nfrequency: 50\n").unwrap();
        assert_eq!(c.phase, None);
        assert_eq!(c.frequency, Some(Frequency::Hz50));
        assert_eq!(c.catalog_query().filters(&Default::default()).len(), 1);

        let c: SearchCriteria = serde_yaml::from_str("phase: 3\n").unwrap();
        assert_eq!(c.phase, Some(Phase::Three));
        assert_eq!(known_phase(0), None);
    }

    #[test]
    fn requirement_keeps_values_it_does_not_set() {
        let c: SearchCriteria =
            serde_yaml::from_str("required_flow_lpm: 50\nrequired_head_m: 20\n").unwrap();
        let flow_only = Requirement {
            flow_lpm: 100.0,
            head_m: 0.0,
            flow_source: RequirementSource::Manual,
            head_source: RequirementSource::Unset,
        };
        let c = c.with_requirement(&flow_only);
        assert_eq!(c.required_flow_lpm, 100.0);
        assert_eq!(c.required_head_m, 20.0);
    }

    #[test]
    fn catalog_query_carries_coarse_filters() {
        let c = SearchCriteria {
            category: Some("Grinder".to_string()),
            phase: Some(Phase::Three),
            ..SearchCriteria::default()
        };
        let q = c.catalog_query();
        assert_eq!(q.category.as_deref(), Some("Grinder"));
        assert_eq!(q.phase, Some(Phase::Three));
        assert_eq!(q.frequency, None);
    }
}
