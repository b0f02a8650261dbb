//! Catalog column names and the fixed filter vocabularies.

use core::fmt;

use serde::{Deserialize, Serialize};

pub const MODEL_NO: &str = "Model No.";
pub const RATED_FLOW_LPM: &str = "Q Rated/LPM";
pub const RATED_HEAD_M: &str = "Head Rated/M";
pub const MAX_FLOW_LPM: &str = "Max Flow (LPM)";
/// Both spellings occur in catalog exports.
pub const MAX_HEAD_M: [&str; 2] = ["Max Head(M)", "Max Head (M)"];
pub const CATEGORY: &str = "Category";
pub const FREQUENCY_HZ: &str = "Frequency_Hz";
pub const PHASE: &str = "Phase";
pub const HP: &str = "HP";
pub const OUTLET_MM: &str = "Outlet (mm)";
pub const OUTLET_INCH: &str = "Outlet (inch)";
pub const PRODUCT_LINK: &str = "Product Link";
pub const DB_ID: &str = "DB ID";

/// Columns decoded into typed [`crate::PumpRecord`] fields.
pub(crate) const TYPED: [&str; 14] = [
    MODEL_NO,
    RATED_FLOW_LPM,
    RATED_HEAD_M,
    MAX_FLOW_LPM,
    MAX_HEAD_M[0],
    MAX_HEAD_M[1],
    CATEGORY,
    FREQUENCY_HZ,
    PHASE,
    HP,
    OUTLET_MM,
    OUTLET_INCH,
    PRODUCT_LINK,
    DB_ID,
];

pub const KNOWN_CATEGORIES: [&str; 9] = [
    "BLDC",
    "Booster",
    "Clean Water",
    "Construction",
    "Dirty Water",
    "Grinder",
    "High Pressure",
    "Sewage and Wastewater",
    "Speciality Pump",
];

pub fn is_booster_category(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("Booster")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Frequency {
    Hz50,
    Hz60,
}

impl Frequency {
    pub fn hz(self) -> u32 {
        match self {
            Self::Hz50 => 50,
            Self::Hz60 => 60,
        }
    }

    pub fn from_hz(hz: f64) -> Option<Self> {
        if hz == 50.0 {
            Some(Self::Hz50)
        } else if hz == 60.0 {
            Some(Self::Hz60)
        } else {
            None
        }
    }
}

impl TryFrom<u32> for Frequency {
    type Error = String;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        Self::from_hz(f64::from(hz)).ok_or_else(|| format!("unsupported frequency {hz} Hz"))
    }
}

impl From<Frequency> for u32 {
    fn from(f: Frequency) -> Self {
        f.hz()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Phase {
    Single,
    Three,
}

impl Phase {
    pub fn count(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Three => 3,
        }
    }

    pub fn from_count(n: f64) -> Option<Self> {
        if n == 1.0 {
            Some(Self::Single)
        } else if n == 3.0 {
            Some(Self::Three)
        } else {
            None
        }
    }
}

impl TryFrom<u32> for Phase {
    type Error = String;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::from_count(f64::from(n)).ok_or_else(|| format!("unsupported phase count {n}"))
    }
}

impl From<Phase> for u32 {
    fn from(p: Phase) -> Self {
        p.count()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}
