use std::path::PathBuf;

/// Error reported by a store for a single page request.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Request rejected: {message}")]
    Rejected { message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Fetch from {relation} failed at offset {offset}: {source}")]
    Fetch {
        relation: String,
        offset: usize,
        #[source]
        source: StoreError,
    },

    #[error("Invalid catalog layout: {what}")]
    InvalidLayout { what: &'static str },

    #[error("Failed to read {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_names_relation_and_offset() {
        let err = CatalogError::Fetch {
            relation: "pump_selection_data".to_string(),
            offset: 2000,
            source: StoreError::Unavailable {
                message: "timeout".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("pump_selection_data"));
        assert!(msg.contains("2000"));
        assert!(msg.contains("timeout"));
    }
}
