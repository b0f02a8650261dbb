//! Ranking & Truncation: a "best N%" view of the filtered set.

use std::cmp::Ordering;

use ps_catalog::PumpRecord;
use rayon::prelude::*;
use tracing::debug;

/// Normalized distance of a record's duty point from the requirement.
///
/// Lower is closer. `None` when the record has no rated flow or head.
pub fn score(record: &PumpRecord, required_flow_lpm: f64, required_head_m: f64) -> Option<f64> {
    let (flow, head) = record.rated_point()?;
    let s = (flow - required_flow_lpm).abs() / required_flow_lpm.max(1.0)
        + (head - required_head_m).abs() / required_head_m.max(1.0);
    s.is_finite().then_some(s)
}

/// `ceil(count * percent / 100)`
pub fn truncated_len(count: usize, percent: u8) -> usize {
    (count * usize::from(percent)).div_ceil(100)
}

fn by_score(a: &Option<f64>, b: &Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order by closeness and keep the best `percent`.
///
/// At 100% the input is returned untouched. Ties keep their input order;
/// unscorable records sort after every scored one.
pub fn rank_and_truncate(
    records: Vec<PumpRecord>,
    required_flow_lpm: f64,
    required_head_m: f64,
    percent: u8,
) -> Vec<PumpRecord> {
    if percent >= 100 || records.is_empty() {
        return records;
    }

    let scores: Vec<Option<f64>> = records
        .par_iter()
        .map(|r| score(r, required_flow_lpm, required_head_m))
        .collect();

    let mut ranked: Vec<(Option<f64>, PumpRecord)> = scores.into_iter().zip(records).collect();
    ranked.sort_by(|a, b| by_score(&a.0, &b.0));

    let keep = truncated_len(ranked.len(), percent);
    debug!(total = ranked.len(), keep, percent, "ranked and truncated");
    ranked.truncate(keep);
    ranked.into_iter().map(|(_, r)| r).collect()
}
