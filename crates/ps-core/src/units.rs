// ps-core/src/units.rs
//
// Canonical units: flow in liters/minute, head in meters, outlet in millimeters.
// Every display unit is described by a single factor to the canonical unit so
// the forward and inverse conversions are exact algebraic inverses.

use core::fmt;
use core::str::FromStr;

use crate::CoreError;

pub const LPM_PER_LPS: f64 = 60.0;
pub const LPM_PER_M3H: f64 = 1000.0 / 60.0;
pub const LPM_PER_M3MIN: f64 = 1000.0;
pub const LPM_PER_US_GPM: f64 = 3.785;
pub const FT_PER_M: f64 = 3.28084;
pub const MM_PER_INCH: f64 = 25.4;

/// Flow display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowUnit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "L/min"))]
    LitersPerMinute,
    #[cfg_attr(feature = "serde", serde(rename = "L/sec"))]
    LitersPerSecond,
    #[cfg_attr(feature = "serde", serde(rename = "m³/hr", alias = "m3/hr"))]
    CubicMetersPerHour,
    #[cfg_attr(feature = "serde", serde(rename = "m³/min", alias = "m3/min"))]
    CubicMetersPerMinute,
    #[cfg_attr(feature = "serde", serde(rename = "US gpm", alias = "gpm"))]
    UsGpm,
}

impl FlowUnit {
    pub const ALL: [FlowUnit; 5] = [
        FlowUnit::LitersPerMinute,
        FlowUnit::LitersPerSecond,
        FlowUnit::CubicMetersPerHour,
        FlowUnit::CubicMetersPerMinute,
        FlowUnit::UsGpm,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::LitersPerMinute => "L/min",
            Self::LitersPerSecond => "L/sec",
            Self::CubicMetersPerHour => "m³/hr",
            Self::CubicMetersPerMinute => "m³/min",
            Self::UsGpm => "US gpm",
        }
    }

    /// Liters/minute in one of this unit.
    pub fn lpm_per_unit(self) -> f64 {
        match self {
            Self::LitersPerMinute => 1.0,
            Self::LitersPerSecond => LPM_PER_LPS,
            Self::CubicMetersPerHour => LPM_PER_M3H,
            Self::CubicMetersPerMinute => LPM_PER_M3MIN,
            Self::UsGpm => LPM_PER_US_GPM,
        }
    }

    pub fn to_lpm(self, value: f64) -> f64 {
        value * self.lpm_per_unit()
    }

    pub fn from_lpm(self, lpm: f64) -> f64 {
        lpm / self.lpm_per_unit()
    }
}

impl fmt::Display for FlowUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for FlowUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L/min" | "lpm" | "LPM" => Ok(Self::LitersPerMinute),
            "L/sec" | "L/s" | "lps" => Ok(Self::LitersPerSecond),
            "m³/hr" | "m3/hr" | "m3/h" => Ok(Self::CubicMetersPerHour),
            "m³/min" | "m3/min" => Ok(Self::CubicMetersPerMinute),
            "US gpm" | "gpm" => Ok(Self::UsGpm),
            other => Err(CoreError::UnknownUnit {
                token: other.to_string(),
                quantity: "flow",
            }),
        }
    }
}

/// Head display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeadUnit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "m"))]
    Meters,
    #[cfg_attr(feature = "serde", serde(rename = "ft"))]
    Feet,
}

impl HeadUnit {
    pub const ALL: [HeadUnit; 2] = [HeadUnit::Meters, HeadUnit::Feet];

    pub fn token(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Feet => "ft",
        }
    }

    /// Units of this kind in one meter.
    pub fn per_meter(self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Feet => FT_PER_M,
        }
    }

    pub fn to_m(self, value: f64) -> f64 {
        value / self.per_meter()
    }

    pub fn from_m(self, m: f64) -> f64 {
        m * self.per_meter()
    }
}

impl fmt::Display for HeadUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for HeadUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" | "M" | "meter" | "meters" => Ok(Self::Meters),
            "ft" | "feet" => Ok(Self::Feet),
            other => Err(CoreError::UnknownUnit {
                token: other.to_string(),
                quantity: "head",
            }),
        }
    }
}

/// Outlet size units. Catalog rows may carry either or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutletUnit {
    #[default]
    Mm,
    Inch,
}

impl OutletUnit {
    pub fn token(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Inch => "inch",
        }
    }
}

impl fmt::Display for OutletUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for OutletUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mm" => Ok(Self::Mm),
            "inch" | "in" | "\"" => Ok(Self::Inch),
            other => Err(CoreError::UnknownUnit {
                token: other.to_string(),
                quantity: "outlet",
            }),
        }
    }
}

#[inline]
pub fn mm_to_inch(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

#[inline]
pub fn inch_to_mm(inch: f64) -> f64 {
    inch * MM_PER_INCH
}

/// Convert canonical LPM to the unit named by `token`.
///
/// Unrecognised tokens pass the value through unchanged.
pub fn flow_from_lpm(lpm: f64, token: &str) -> f64 {
    token
        .parse::<FlowUnit>()
        .map_or(lpm, |unit| unit.from_lpm(lpm))
}

/// Convert a value in the unit named by `token` to canonical LPM.
///
/// Unrecognised tokens pass the value through unchanged.
pub fn flow_to_lpm(value: f64, token: &str) -> f64 {
    token
        .parse::<FlowUnit>()
        .map_or(value, |unit| unit.to_lpm(value))
}

/// Convert canonical meters to the unit named by `token` (identity when unknown).
pub fn head_from_m(m: f64, token: &str) -> f64 {
    token.parse::<HeadUnit>().map_or(m, |unit| unit.from_m(m))
}

/// Convert a value in the unit named by `token` to meters (identity when unknown).
pub fn head_to_m(value: f64, token: &str) -> f64 {
    token
        .parse::<HeadUnit>()
        .map_or(value, |unit| unit.to_m(value))
}

/// The pair of display units a presentation layer renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayUnits {
    #[cfg_attr(feature = "serde", serde(default))]
    pub flow: FlowUnit,
    #[cfg_attr(feature = "serde", serde(default))]
    pub head: HeadUnit,
}

impl DisplayUnits {
    pub fn new(flow: FlowUnit, head: HeadUnit) -> Self {
        Self { flow, head }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_factors_match_catalog_conventions() {
        assert_eq!(FlowUnit::LitersPerMinute.from_lpm(120.0), 120.0);
        assert!((FlowUnit::LitersPerSecond.from_lpm(120.0) - 2.0).abs() < 1e-12);
        assert!((FlowUnit::CubicMetersPerHour.from_lpm(1000.0) - 60.0).abs() < 1e-9);
        assert!((FlowUnit::CubicMetersPerMinute.from_lpm(1000.0) - 1.0).abs() < 1e-12);
        assert!((FlowUnit::UsGpm.from_lpm(3.785) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn head_feet_factor() {
        assert!((HeadUnit::Feet.from_m(1.0) - 3.28084).abs() < 1e-12);
        assert!((HeadUnit::Feet.to_m(3.28084) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_tokens_pass_through() {
        assert_eq!(flow_from_lpm(42.0, "furlongs/fortnight"), 42.0);
        assert_eq!(flow_to_lpm(42.0, ""), 42.0);
        assert_eq!(head_from_m(7.5, "cubits"), 7.5);
        assert_eq!(head_to_m(7.5, "?"), 7.5);
    }

    #[test]
    fn tokens_parse_back() {
        for unit in FlowUnit::ALL {
            assert_eq!(unit.token().parse::<FlowUnit>().unwrap(), unit);
        }
        for unit in HeadUnit::ALL {
            assert_eq!(unit.token().parse::<HeadUnit>().unwrap(), unit);
        }
        assert!("bogus".parse::<OutletUnit>().is_err());
    }

    #[test]
    fn outlet_inch_mm() {
        assert!((inch_to_mm(2.0) - 50.8).abs() < 1e-12);
        assert!((mm_to_inch(50.8) - 2.0).abs() < 1e-12);
    }
}
