//! A result slot that only accepts the newest search.
//!
//! Searches may overlap. Each one takes a ticket before it starts; when it
//! finishes, its outcome is stored only if no newer ticket has been issued.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::error::SelectResult;
use crate::pipeline::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Accepted,
    Stale,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub generation: u64,
    /// `None` before the first search and after a failed one.
    pub result: Option<ResultSet>,
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn len(&self) -> usize {
        self.result.as_ref().map_or(0, ResultSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct SearchSession {
    issued: AtomicU64,
    slot: Mutex<SessionSnapshot>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> SearchTicket {
        SearchTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: SearchTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Store `outcome` if `ticket` is still the newest search.
    ///
    /// A failure replaces the previous result with an empty one plus the error.
    pub fn commit(&self, ticket: SearchTicket, outcome: SelectResult<ResultSet>) -> Commit {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.is_latest(ticket) || slot.generation > ticket.0 {
            debug!(generation = ticket.0, "stale search result discarded");
            return Commit::Stale;
        }

        *slot = match outcome {
            Ok(result) => SessionSnapshot {
                generation: ticket.0,
                result: Some(result),
                error: None,
            },
            Err(err) => SessionSnapshot {
                generation: ticket.0,
                result: None,
                error: Some(err.to_string()),
            },
        };
        Commit::Accepted
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
