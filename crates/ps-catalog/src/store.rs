//! The catalog store contract and an in-process implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult, StoreError, StoreResult};
use crate::record::{RawRow, value_f64, value_text};

/// Exact-match filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct EqFilter {
    pub column: String,
    pub value: Value,
}

impl EqFilter {
    /// `None` for null or empty-text values; those are omitted, not sent.
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Option<Self> {
        let value = value.into();
        let empty = match &value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        };
        (!empty).then(|| Self {
            column: column.into(),
            value,
        })
    }

    /// Loose equality: numbers and numeric text compare by value.
    pub fn matches(&self, row: &RawRow) -> bool {
        row.get(&self.column)
            .is_some_and(|cell| values_match(cell, &self.value))
    }
}

fn values_match(cell: &Value, wanted: &Value) -> bool {
    if cell == wanted {
        return true;
    }
    if let (Some(a), Some(b)) = (value_f64(cell), value_f64(wanted)) {
        return a == b;
    }
    matches!((value_text(cell), value_text(wanted)), (Some(a), Some(b)) if a == b)
}

/// Inclusive row range, `from..=to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub from: usize,
    pub to: usize,
}

impl PageRange {
    pub fn first(batch_size: usize) -> Self {
        Self {
            from: 0,
            to: batch_size.saturating_sub(1),
        }
    }

    pub fn next(self) -> Self {
        let len = self.len();
        Self {
            from: self.from + len,
            to: self.to + len,
        }
    }

    pub fn len(&self) -> usize {
        self.to + 1 - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.to < self.from
    }
}

/// Equality-filtered, range-paginated row fetch over named relations.
///
/// Errors are returned, never thrown across this boundary; a failed page
/// carries no rows.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn fetch_page(
        &self,
        relation: &str,
        filters: &[EqFilter],
        range: PageRange,
    ) -> StoreResult<Vec<RawRow>>;
}

/// In-memory relations, used by the CLI (rows loaded from JSON) and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    relations: HashMap<String, Vec<RawRow>>,
    fail_at_call: Option<usize>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(mut self, name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        self.relations.insert(name.into(), rows);
        self
    }

    /// Make the `n`th page request (0-based, across all relations) fail.
    pub fn failing_at_call(mut self, n: usize) -> Self {
        self.fail_at_call = Some(n);
        self
    }

    /// Number of page requests served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn fetch_page(
        &self,
        relation: &str,
        filters: &[EqFilter],
        range: PageRange,
    ) -> StoreResult<Vec<RawRow>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at_call == Some(call) {
            return Err(StoreError::Unavailable {
                message: format!("injected failure on request {call}"),
            });
        }

        let rows = self
            .relations
            .get(relation)
            .ok_or_else(|| StoreError::UnknownRelation(relation.to_string()))?;

        if range.is_empty() {
            return Ok(Vec::new());
        }

        Ok(rows
            .iter()
            .filter(|row| filters.iter().all(|f| f.matches(row)))
            .skip(range.from)
            .take(range.len())
            .cloned()
            .collect())
    }
}

/// Read a JSON array of row objects. Non-object entries are skipped.
pub fn load_rows_json(path: &Path) -> CatalogResult<Vec<RawRow>> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let values: Vec<Value> = serde_json::from_str(&content)?;
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_values_are_omitted() {
        assert!(EqFilter::new("Category", "").is_none());
        assert!(EqFilter::new("Category", "  ").is_none());
        assert!(EqFilter::new("Phase", Value::Null).is_none());
        assert!(EqFilter::new("Frequency_Hz", 60).is_some());
    }

    #[test]
    fn loose_matching() {
        let row = json!({ "Frequency_Hz": "60", "Phase": 3, "Category": "Booster" });
        let row = row.as_object().unwrap();
        assert!(EqFilter::new("Frequency_Hz", 60).unwrap().matches(row));
        assert!(EqFilter::new("Phase", "3").unwrap().matches(row));
        assert!(EqFilter::new("Category", "Booster").unwrap().matches(row));
        assert!(!EqFilter::new("Category", "Grinder").unwrap().matches(row));
        assert!(!EqFilter::new("Missing", "x").unwrap().matches(row));
    }

    #[test]
    fn page_ranges_advance_by_batch() {
        let r = PageRange::first(1000);
        assert_eq!((r.from, r.to), (0, 999));
        let r = r.next();
        assert_eq!((r.from, r.to), (1000, 1999));
        assert_eq!(r.len(), 1000);
    }
}
