//! Scenario Derivation: an implied flow/head requirement from application
//! parameters, and its resolution against manual input.

use ps_catalog::is_booster_category;
use ps_core::{FlowUnit, HeadUnit};
use serde::{Deserialize, Serialize};

/// Fixture demand per faucet, LPM.
pub const LPM_PER_FAUCET: f64 = 15.0;
/// Static head per building floor, m.
pub const M_PER_FLOOR: f64 = 3.5;
pub const LITERS_PER_M3: f64 = 1000.0;

/// Which calculator applies, chosen by the selected category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Building riser / booster sizing
    Booster,
    /// Pond drainage and every other category
    #[default]
    Drainage,
}

impl ScenarioKind {
    pub fn for_category(category: Option<&str>) -> Self {
        match category {
            Some(name) if is_booster_category(name) => Self::Booster,
            _ => Self::Drainage,
        }
    }
}

/// Application parameters the requirement can be derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInputs {
    pub floors: u32,
    pub faucets: u32,
    pub pond_length_m: f64,
    pub pond_width_m: f64,
    pub pond_height_m: f64,
    pub drain_time_h: f64,
    pub underground_depth_m: f64,
    /// Carried for display; not used in derivation.
    pub particle_size_mm: f64,
}

impl Default for ScenarioInputs {
    fn default() -> Self {
        Self {
            floors: 0,
            faucets: 0,
            pond_length_m: 0.0,
            pond_width_m: 0.0,
            pond_height_m: 0.0,
            drain_time_h: 0.01,
            underground_depth_m: 0.0,
            particle_size_mm: 0.0,
        }
    }
}

/// A derived requirement in canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Derived {
    pub flow_lpm: f64,
    pub head_m: f64,
}

impl ScenarioInputs {
    pub fn pond_volume_liters(&self) -> f64 {
        self.pond_length_m * self.pond_width_m * self.pond_height_m * LITERS_PER_M3
    }

    /// Flow needed to drain the pond in the given time; 0 when time ≤ 0.
    pub fn pond_flow_lpm(&self) -> f64 {
        let minutes = self.drain_time_h * 60.0;
        if minutes.is_nan() || minutes <= 0.0 {
            return 0.0;
        }
        let flow = self.pond_volume_liters() / minutes;
        if flow.is_finite() { flow } else { 0.0 }
    }

    pub fn derive(&self, kind: ScenarioKind) -> Derived {
        let pond_flow = self.pond_flow_lpm();
        match kind {
            ScenarioKind::Booster => Derived {
                flow_lpm: (f64::from(self.faucets) * LPM_PER_FAUCET).max(pond_flow),
                head_m: (f64::from(self.floors) * M_PER_FLOOR).max(self.pond_height_m),
            },
            ScenarioKind::Drainage => Derived {
                flow_lpm: pond_flow,
                head_m: if self.underground_depth_m > 0.0 {
                    self.underground_depth_m
                } else {
                    self.pond_height_m
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualFlow {
    pub value: f64,
    #[serde(default)]
    pub unit: FlowUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualHead {
    pub value: f64,
    #[serde(default)]
    pub unit: HeadUnit,
}

/// Per-field requirement input.
///
/// A manual value is one the user has edited; it always wins. Fields left
/// unset fall back to the scenario-derived value when that is positive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementInput {
    pub flow: Option<ManualFlow>,
    pub head: Option<ManualHead>,
    pub scenario: Option<ScenarioInputs>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementSource {
    Manual,
    Derived,
    Unset,
}

/// Resolved requirement in canonical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Requirement {
    pub flow_lpm: f64,
    pub head_m: f64,
    pub flow_source: RequirementSource,
    pub head_source: RequirementSource,
}

impl RequirementInput {
    pub fn resolve(&self, kind: ScenarioKind) -> Requirement {
        let derived = self
            .scenario
            .as_ref()
            .map(|s| s.derive(kind))
            .unwrap_or_default();

        let (flow_lpm, flow_source) = match self.flow {
            Some(manual) => (manual.unit.to_lpm(manual.value), RequirementSource::Manual),
            None if derived.flow_lpm > 0.0 => (derived.flow_lpm, RequirementSource::Derived),
            None => (0.0, RequirementSource::Unset),
        };
        let (head_m, head_source) = match self.head {
            Some(manual) => (manual.unit.to_m(manual.value), RequirementSource::Manual),
            None if derived.head_m > 0.0 => (derived.head_m, RequirementSource::Derived),
            None => (0.0, RequirementSource::Unset),
        };

        Requirement {
            flow_lpm,
            head_m,
            flow_source,
            head_source,
        }
    }
}
