//! ps-catalog: typed access to the pump catalog store.
//!
//! The store itself is an external collaborator reached through
//! [`CatalogStore`]. This crate owns the typed record model decoded from its
//! flat rows and the batched query that returns complete matching sets.

pub mod columns;
pub mod error;
pub mod layout;
pub mod query;
pub mod record;
pub mod store;

pub use columns::{Frequency, KNOWN_CATEGORIES, Phase, is_booster_category};
pub use error::{CatalogError, CatalogResult, StoreError, StoreResult};
pub use layout::{CategoryMode, CatalogLayout, DEFAULT_BATCH_SIZE};
pub use query::{CatalogQuery, fetch_all_rows, fetch_curves, fetch_pumps, merge_category_rows};
pub use record::{CurveRecord, PumpRecord, RawRow, value_f64, value_text};
pub use store::{CatalogStore, EqFilter, MemoryStore, PageRange, load_rows_json};
