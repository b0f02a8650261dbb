//! The two pipeline entry points: `search` and `curve_for`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ps_catalog::{CatalogLayout, CatalogStore, CurveRecord, PumpRecord, fetch_curves, fetch_pumps};
use ps_core::DisplayUnits;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::criteria::SearchCriteria;
use crate::curve::{self, CurvePoint, CurveSeries};
use crate::error::SelectResult;
use crate::filter::apply_filters;
use crate::rank::rank_and_truncate;

/// Ordered outcome of one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub records: Vec<PumpRecord>,
    pub retrieved_at: DateTime<Utc>,
}

impl ResultSet {
    pub fn new(records: Vec<PumpRecord>) -> Self {
        Self {
            records,
            retrieved_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.model_id.as_str())
    }
}

/// Synchronous stages over an already-fetched candidate set.
pub fn refine(records: Vec<PumpRecord>, criteria: &SearchCriteria) -> Vec<PumpRecord> {
    let filtered = apply_filters(records, criteria);
    rank_and_truncate(
        filtered,
        criteria.required_flow_lpm,
        criteria.required_head_m,
        criteria.result_percent,
    )
}

/// Drives the pipeline against a catalog store.
///
/// Holds no per-search state. The curve dataset is loaded on first use and
/// kept for the life of the selector.
pub struct Selector<S> {
    store: S,
    layout: CatalogLayout,
    curves: OnceCell<Arc<Vec<CurveRecord>>>,
}

impl<S: CatalogStore> Selector<S> {
    pub fn new(store: S, layout: CatalogLayout) -> Self {
        Self {
            store,
            layout,
            curves: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &CatalogLayout {
        &self.layout
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> SelectResult<ResultSet> {
        criteria.validate()?;

        let candidates = fetch_pumps(&self.store, &self.layout, &criteria.catalog_query())
            .await
            .inspect_err(|e| warn!(error = %e, "search aborted"))?;
        let fetched = candidates.len();

        let records = refine(candidates, criteria);
        info!(
            fetched,
            returned = records.len(),
            percent = criteria.result_percent,
            "search complete"
        );
        Ok(ResultSet::new(records))
    }

    /// The curve dataset, fetched once. A failed load is retried next call.
    pub async fn curves(&self) -> SelectResult<Arc<Vec<CurveRecord>>> {
        let curves = self
            .curves
            .get_or_try_init(|| async {
                let curves = fetch_curves(&self.store, &self.layout).await?;
                debug!(models = curves.len(), "curve dataset loaded");
                SelectResult::Ok(Arc::new(curves))
            })
            .await?;
        Ok(Arc::clone(curves))
    }

    pub async fn curve_for(
        &self,
        model_id: &str,
        units: DisplayUnits,
    ) -> SelectResult<Vec<CurvePoint>> {
        let curves = self.curves().await?;
        Ok(curve::curve_for(model_id, &curves, units))
    }

    pub async fn comparison<M: AsRef<str>>(
        &self,
        model_ids: &[M],
        units: DisplayUnits,
    ) -> SelectResult<Vec<CurveSeries>> {
        let curves = self.curves().await?;
        Ok(curve::comparison(model_ids, &curves, units))
    }
}
