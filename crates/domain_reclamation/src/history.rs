//! Append-only transition history
//!
//! Every lifecycle operation on a reclamation produces exactly one
//! [`ReclamationHistory`] entry. [`HistoryLog`] stores entries per
//! reclamation in insertion order and offers no way to edit or remove them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{HistoryEntryId, ReclamationId};
use crate::reclamation::{Priority, ReclamationStatus};

/// One recorded transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclamationHistory {
    pub id: HistoryEntryId,
    pub reclamation_id: ReclamationId,
    pub old_status: ReclamationStatus,
    pub new_status: ReclamationStatus,
    pub old_priority: Priority,
    pub new_priority: Priority,
    /// Identity supplied by the caller; never verified here
    pub actor: String,
    pub comment: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl ReclamationHistory {
    pub fn status_changed(&self) -> bool {
        self.old_status != self.new_status
    }

    pub fn priority_changed(&self) -> bool {
        self.old_priority != self.new_priority
    }
}

/// Timestamp to store for a new entry, given the latest stored one
///
/// Entries of one reclamation are strictly ordered in time: a clock reading
/// that does not move past the previous entry is bumped one microsecond
/// after it (the precision PostgreSQL keeps).
pub fn next_timestamp(
    previous: Option<DateTime<Utc>>,
    candidate: DateTime<Utc>,
) -> DateTime<Utc> {
    match previous {
        Some(prev) if candidate <= prev => prev + Duration::microseconds(1),
        _ => candidate,
    }
}

/// Insertion-only history store keyed by reclamation
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: BTreeMap<ReclamationId, Vec<ReclamationHistory>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns it as stored
    pub fn append(&mut self, mut entry: ReclamationHistory) -> &ReclamationHistory {
        let log = self.entries.entry(entry.reclamation_id).or_default();
        entry.changed_at = next_timestamp(log.last().map(|e| e.changed_at), entry.changed_at);
        log.push(entry);
        &log[log.len() - 1]
    }

    /// Entries for one reclamation, oldest first
    pub fn entries(&self, reclamation_id: ReclamationId) -> &[ReclamationHistory] {
        self.entries
            .get(&reclamation_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self, reclamation_id: ReclamationId) -> usize {
        self.entries(reclamation_id).len()
    }

    pub fn latest(&self, reclamation_id: ReclamationId) -> Option<&ReclamationHistory> {
        self.entries(reclamation_id).last()
    }

    /// Total number of entries across all reclamations
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReclamationHistory> {
        self.entries.values().flatten()
    }
}
