//! Catalog Query: coarse exact-match filters and complete-set retrieval.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::columns::{self, Frequency, Phase};
use crate::error::{CatalogError, CatalogResult};
use crate::layout::{CatalogLayout, CategoryMode};
use crate::record::{CurveRecord, PumpRecord, RawRow, value_text};
use crate::store::{CatalogStore, EqFilter, PageRange};

/// Server-side filters for one search. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Category name (flat layout) or category id (relational layout).
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    pub phase: Option<Phase>,
}

impl CatalogQuery {
    pub fn filters(&self, layout: &CatalogLayout) -> Vec<EqFilter> {
        let category_column = match &layout.category {
            CategoryMode::Flat { column } => column.as_str(),
            CategoryMode::Relational { id_column, .. } => id_column.as_str(),
        };

        [
            self.category
                .as_deref()
                .and_then(|c| EqFilter::new(category_column, c)),
            self.frequency
                .and_then(|f| EqFilter::new(columns::FREQUENCY_HZ, f.hz())),
            self.phase
                .and_then(|p| EqFilter::new(columns::PHASE, p.count().to_string())),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Fetch every row of `relation` matching `filters`, one batch at a time.
///
/// Stops on the first short page. Any failed batch aborts the whole fetch and
/// discards what was already read.
pub async fn fetch_all_rows<S>(
    store: &S,
    relation: &str,
    filters: &[EqFilter],
    batch_size: usize,
) -> CatalogResult<Vec<RawRow>>
where
    S: CatalogStore + ?Sized,
{
    if batch_size == 0 {
        return Err(CatalogError::InvalidLayout {
            what: "batch_size must be positive",
        });
    }

    let mut rows = Vec::new();
    let mut range = PageRange::first(batch_size);
    loop {
        let page = store
            .fetch_page(relation, filters, range)
            .await
            .map_err(|source| {
                warn!(relation, offset = range.from, error = %source, "catalog batch failed");
                CatalogError::Fetch {
                    relation: relation.to_string(),
                    offset: range.from,
                    source,
                }
            })?;

        let short = page.len() < batch_size;
        rows.extend(page);
        if short {
            break;
        }
        range = range.next();
    }

    debug!(relation, rows = rows.len(), "catalog fetch complete");
    Ok(rows)
}

/// Collapse one-row-per-category join results to one row per record.
///
/// Records are identified by `identity_column` (rows without one are kept as
/// they are). Matched category names are merged into the `Category` column in
/// first-seen order.
pub fn merge_category_rows(
    rows: Vec<RawRow>,
    identity_column: &str,
    name_column: &str,
) -> Vec<RawRow> {
    let mut merged: Vec<(RawRow, Vec<String>)> = Vec::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();

    for mut row in rows {
        let identity = row.get(identity_column).and_then(value_text);
        let name = row.remove(name_column).as_ref().and_then(value_text);

        let existing = identity.as_ref().and_then(|id| first_seen.get(id).copied());
        match existing {
            Some(idx) => {
                let names = &mut merged[idx].1;
                if let Some(name) = name
                    && !names.contains(&name)
                {
                    names.push(name);
                }
            }
            None => {
                if let Some(id) = identity {
                    first_seen.insert(id, merged.len());
                }
                merged.push((row, name.into_iter().collect()));
            }
        }
    }

    merged
        .into_iter()
        .map(|(mut row, names)| {
            if !names.is_empty() {
                let list = names.into_iter().map(Value::String).collect();
                row.insert(columns::CATEGORY.to_string(), Value::Array(list));
            }
            row
        })
        .collect()
}

/// Coarse-filtered pump records, in store order.
pub async fn fetch_pumps<S>(
    store: &S,
    layout: &CatalogLayout,
    query: &CatalogQuery,
) -> CatalogResult<Vec<PumpRecord>>
where
    S: CatalogStore + ?Sized,
{
    layout.validate()?;
    let filters = query.filters(layout);
    let mut rows = fetch_all_rows(
        store,
        layout.search_relation(),
        &filters,
        layout.batch_size,
    )
    .await?;

    if let CategoryMode::Relational { name_column, .. } = &layout.category {
        rows = merge_category_rows(rows, &layout.identity_column, name_column);
    }

    let total = rows.len();
    let records: Vec<PumpRecord> = rows.iter().filter_map(PumpRecord::from_row).collect();
    if records.len() < total {
        debug!(
            skipped = total - records.len(),
            "rows without a model number skipped"
        );
    }
    Ok(records)
}

/// The whole curve relation.
pub async fn fetch_curves<S>(store: &S, layout: &CatalogLayout) -> CatalogResult<Vec<CurveRecord>>
where
    S: CatalogStore + ?Sized,
{
    layout.validate()?;
    let rows = fetch_all_rows(store, &layout.curve_relation, &[], layout.batch_size).await?;
    Ok(rows.iter().filter_map(CurveRecord::from_row).collect())
}
