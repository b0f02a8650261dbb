use std::path::PathBuf;

use ps_catalog::CatalogError;
use ps_select::SelectError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("Failed to read criteria {path}: {source}")]
    CriteriaRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid criteria file {path}: {source}")]
    CriteriaParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Unsupported {what}: {value}")]
    Unsupported { what: &'static str, value: String },
}

pub type CliResult<T> = Result<T, CliError>;
