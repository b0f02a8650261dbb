//! ps-select: the pump selection pipeline.
//!
//! requirement (manual or scenario-derived) → coarse catalog query →
//! tolerance filters → closeness ranking → result set. Curve extraction is
//! independent and keyed by model number.

pub mod criteria;
pub mod curve;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod rank;
pub mod scenario;
pub mod session;

pub use criteria::{
    Ceiling, DEFAULT_OUTLET_TOLERANCE_PCT, OutletFilter, SearchCriteria, known_phase,
};
pub use curve::{CurvePoint, CurveSeries, comparison, curve_for, extract_curve, operating_point};
pub use error::{SelectError, SelectResult};
pub use filter::{FilterStage, apply_filters};
pub use pipeline::{ResultSet, Selector, refine};
pub use rank::{rank_and_truncate, score, truncated_len};
pub use scenario::{
    Derived, ManualFlow, ManualHead, Requirement, RequirementInput, RequirementSource,
    ScenarioInputs, ScenarioKind,
};
pub use session::{Commit, SearchSession, SearchTicket, SessionSnapshot};
