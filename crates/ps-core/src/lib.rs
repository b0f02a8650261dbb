//! ps-core: stable foundation for pump selection.
//!
//! Contains:
//! - units (flow/head/outlet display units and their canonical conversions)
//! - horsepower (catalog horsepower tokens, shaft power)
//! - numeric (Real + tolerances + lenient coercion)
//! - error (shared error types)

pub mod error;
pub mod horsepower;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use horsepower::{HorsepowerRating, KW_PER_HP, parse_horsepower};
pub use numeric::*;
pub use units::*;
