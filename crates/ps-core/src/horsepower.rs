//! Catalog horsepower tokens.
//!
//! Catalogs write motor ratings as integers ("3"), decimals ("0.75"), simple
//! fractions ("1/2") or mixed numbers ("1 1/4"). Anything else is unknown and
//! parses to NaN, which callers must treat as "absent".

use uom::si::f64::Power;
use uom::si::power::{kilowatt, watt};

/// Kilowatts per mechanical horsepower.
pub const KW_PER_HP: f64 = 0.745_699_872;

/// Parse a horsepower token, returning NaN for anything unparseable.
pub fn parse_horsepower(token: &str) -> f64 {
    let token = token.trim();
    if token.is_empty() {
        return f64::NAN;
    }

    let mut parts = token.split_whitespace();
    let value = match (parts.next(), parts.next(), parts.next()) {
        (Some(single), None, None) => parse_simple(single),
        (Some(whole), Some(frac), None) if frac.contains('/') => {
            match (whole.parse::<f64>().ok(), parse_fraction(frac)) {
                (Some(w), Some(f)) if !whole.contains('/') => Some(w + f),
                _ => None,
            }
        }
        _ => None,
    };

    value.filter(|v| v.is_finite()).unwrap_or(f64::NAN)
}

fn parse_simple(text: &str) -> Option<f64> {
    if text.contains('/') {
        parse_fraction(text)
    } else {
        text.parse::<f64>().ok()
    }
}

fn parse_fraction(text: &str) -> Option<f64> {
    let (num, den) = text.split_once('/')?;
    let num = num.parse::<f64>().ok()?;
    let den = den.parse::<f64>().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// A known horsepower rating together with its shaft power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorsepowerRating {
    pub hp: f64,
    pub power: Power,
}

impl HorsepowerRating {
    /// `None` when the horsepower is unknown (NaN or infinite).
    pub fn from_hp(hp: f64) -> Option<Self> {
        if !hp.is_finite() {
            return None;
        }
        Some(Self {
            hp,
            power: Power::new::<kilowatt>(hp * KW_PER_HP),
        })
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::from_hp(parse_horsepower(token))
    }

    pub fn kilowatts(&self) -> f64 {
        self.power.get::<kilowatt>()
    }

    /// Whole watts, rounded half away from zero.
    pub fn watts(&self) -> i64 {
        self.power.get::<watt>().round() as i64
    }
}
