//! Pure lifecycle operations
//!
//! Each operation takes the current reclamation and returns the updated
//! reclamation together with the single history entry describing the change.
//! Nothing here touches storage; see [`crate::service`] for orchestration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::HistoryEntryId;
use crate::error::{LifecycleError, TransitionRejection};
use crate::history::ReclamationHistory;
use crate::reclamation::{Priority, Reclamation, ReclamationStatus};
use crate::sla::compute_sla_deadline;

/// Requested change to status and/or priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub new_status: Option<ReclamationStatus>,
    pub new_priority: Option<Priority>,
    pub comment: Option<String>,
}

impl TransitionRequest {
    pub fn status(status: ReclamationStatus) -> Self {
        Self {
            new_status: Some(status),
            ..Default::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            new_priority: Some(priority),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Refuses any mutation of a deleted or terminal reclamation
pub fn ensure_mutable(reclamation: &Reclamation) -> Result<(), LifecycleError> {
    if reclamation.is_deleted {
        return Err(LifecycleError::invalid_transition(
            reclamation.id,
            TransitionRejection::Deleted,
        ));
    }
    if reclamation.status.is_terminal() {
        return Err(LifecycleError::invalid_transition(
            reclamation.id,
            TransitionRejection::Terminal(reclamation.status),
        ));
    }
    Ok(())
}

/// Changes status and/or priority
///
/// A priority change leaves `sla_deadline` untouched: the deadline already
/// communicated to the client stays valid until [`recompute_sla_deadline`]
/// is called explicitly.
pub fn transition(
    reclamation: &Reclamation,
    request: &TransitionRequest,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<(Reclamation, ReclamationHistory), LifecycleError> {
    ensure_mutable(reclamation)?;

    let comment = normalize_comment(request.comment.as_deref());
    let new_status = request.new_status.unwrap_or(reclamation.status);
    let new_priority = request.new_priority.unwrap_or(reclamation.priority);

    let status_changes = new_status != reclamation.status;
    let priority_changes = new_priority != reclamation.priority;

    if !status_changes && !priority_changes && comment.is_none() {
        return Err(LifecycleError::validation(
            "transition changes nothing and carries no comment",
        ));
    }

    if status_changes && !reclamation.status.can_transition_to(new_status) {
        return Err(LifecycleError::invalid_transition(
            reclamation.id,
            TransitionRejection::NotAllowed {
                from: reclamation.status,
                to: new_status,
            },
        ));
    }

    let mut updated = reclamation.clone();
    updated.status = new_status;
    updated.priority = new_priority;

    if status_changes {
        match new_status {
            ReclamationStatus::Resolved => updated.resolved_at = Some(now),
            ReclamationStatus::Closed => {
                updated.closed_at = Some(now);
                updated.resolved_at.get_or_insert(now);
            }
            // Reopened after a failed fix
            ReclamationStatus::InProgress if reclamation.status == ReclamationStatus::Resolved => {
                updated.resolved_at = None;
            }
            _ => {}
        }
    }

    Ok(stamp(reclamation, updated, actor, comment, now))
}

/// Re-derives the SLA deadline from `created_at` and the current priority
pub fn recompute_sla_deadline(
    reclamation: &Reclamation,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<(Reclamation, ReclamationHistory), LifecycleError> {
    ensure_mutable(reclamation)?;

    let deadline = compute_sla_deadline(reclamation.created_at, reclamation.priority);
    let mut updated = reclamation.clone();
    updated.sla_deadline = Some(deadline);

    let comment = format!(
        "SLA deadline recomputed for {} priority: {}",
        reclamation.priority,
        deadline.to_rfc3339()
    );
    Ok(stamp(reclamation, updated, actor, Some(comment), now))
}

/// Marks the reclamation as deleted; it stays in storage
pub fn soft_delete(
    reclamation: &Reclamation,
    actor: &str,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(Reclamation, ReclamationHistory), LifecycleError> {
    ensure_mutable(reclamation)?;

    let mut updated = reclamation.clone();
    updated.is_deleted = true;

    let comment = match normalize_comment(reason) {
        Some(reason) => format!("Deleted: {}", reason),
        None => "Deleted".to_string(),
    };
    Ok(stamp(reclamation, updated, actor, Some(comment), now))
}

fn stamp(
    before: &Reclamation,
    mut after: Reclamation,
    actor: &str,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> (Reclamation, ReclamationHistory) {
    after.updated_at = now;
    after.version = before.version + 1;

    let entry = ReclamationHistory {
        id: HistoryEntryId::new_v7(),
        reclamation_id: before.id,
        old_status: before.status,
        new_status: after.status,
        old_priority: before.priority,
        new_priority: after.priority,
        actor: actor.to_string(),
        comment,
        changed_at: now,
    };

    (after, entry)
}

fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
