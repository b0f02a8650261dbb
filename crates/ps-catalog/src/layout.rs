//! Where the catalog lives inside the store.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::columns;
use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// How category membership is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CategoryMode {
    /// A denormalized category column on the selection relation.
    Flat {
        #[serde(default = "default_category_column")]
        column: String,
    },
    /// A many-to-many join, exposed as a relation with one row per
    /// (pump, category) pair.
    Relational {
        relation: String,
        #[serde(default = "default_category_id_column")]
        id_column: String,
        #[serde(default = "default_category_name_column")]
        name_column: String,
    },
}

impl Default for CategoryMode {
    fn default() -> Self {
        Self::Flat {
            column: default_category_column(),
        }
    }
}

fn default_category_column() -> String {
    columns::CATEGORY.to_string()
}

fn default_category_id_column() -> String {
    "category_id".to_string()
}

fn default_category_name_column() -> String {
    "category_name".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogLayout {
    pub pump_relation: String,
    pub curve_relation: String,
    pub identity_column: String,
    pub batch_size: usize,
    pub category: CategoryMode,
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            pump_relation: "pump_selection_data".to_string(),
            curve_relation: "pump_curve_data".to_string(),
            identity_column: columns::DB_ID.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            category: CategoryMode::default(),
        }
    }
}

impl CatalogLayout {
    pub fn validate(&self) -> CatalogResult<()> {
        if self.batch_size == 0 {
            return Err(CatalogError::InvalidLayout {
                what: "batch_size must be positive",
            });
        }
        if self.pump_relation.trim().is_empty() || self.curve_relation.trim().is_empty() {
            return Err(CatalogError::InvalidLayout {
                what: "relation names must not be empty",
            });
        }
        if let CategoryMode::Relational { relation, .. } = &self.category
            && relation.trim().is_empty()
        {
            return Err(CatalogError::InvalidLayout {
                what: "category relation name must not be empty",
            });
        }
        Ok(())
    }

    /// Relation that search queries read from.
    pub fn search_relation(&self) -> &str {
        match &self.category {
            CategoryMode::Flat { .. } => &self.pump_relation,
            CategoryMode::Relational { relation, .. } => relation,
        }
    }
}

pub fn load_yaml(path: &Path) -> CatalogResult<CatalogLayout> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let layout: CatalogLayout = serde_yaml::from_str(&content)?;
    layout.validate()?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hosted_tables() {
        let layout = CatalogLayout::default();
        assert_eq!(layout.pump_relation, "pump_selection_data");
        assert_eq!(layout.curve_relation, "pump_curve_data");
        assert_eq!(layout.batch_size, 1000);
        assert_eq!(layout.search_relation(), "pump_selection_data");
        layout.validate().unwrap();
    }

    #[test]
    fn relational_yaml() {
        let yaml = "
batch_size: 250
category:
  mode: relational
  relation: pump_with_categories
";
        let layout: CatalogLayout = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(layout.batch_size, 250);
        assert_eq!(layout.search_relation(), "pump_with_categories");
        match &layout.category {
            CategoryMode::Relational {
                id_column,
                name_column,
                ..
            } => {
                assert_eq!(id_column, "category_id");
                assert_eq!(name_column, "category_name");
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn zero_batch_rejected() {
        let layout = CatalogLayout {
            batch_size: 0,
            ..CatalogLayout::default()
        };
        assert!(layout.validate().is_err());
    }
}
