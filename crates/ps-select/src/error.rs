//! Error types for the selection pipeline.

use ps_catalog::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("Catalog fetch failed: {0}")]
    Fetch(#[from] CatalogError),

    #[error("Invalid search criteria: {field} ({reason})")]
    InvalidCriteria { field: &'static str, reason: String },
}

pub type SelectResult<T> = Result<T, SelectError>;

impl SelectError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidCriteria {
            field,
            reason: reason.into(),
        }
    }
}
