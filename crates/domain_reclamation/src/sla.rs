//! SLA policy
//!
//! The deadline of a reclamation is a fixed offset from its creation time,
//! chosen by priority:
//!
//! | priority | offset |
//! |----------|--------|
//! | Urgent   | 4h     |
//! | High     | 24h    |
//! | Medium   | 72h    |
//! | Low      | 168h   |

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::reclamation::{Priority, Reclamation, ReclamationStatus};

pub const URGENT_SLA_HOURS: i64 = 4;
pub const HIGH_SLA_HOURS: i64 = 24;
pub const MEDIUM_SLA_HOURS: i64 = 72;
pub const LOW_SLA_HOURS: i64 = 168;

/// Applied when a stored priority code is not recognised
pub const DEFAULT_SLA_HOURS: i64 = MEDIUM_SLA_HOURS;

/// Remaining time at or below which a ticket is flagged as near its deadline
pub const NEAR_DEADLINE_HOURS: i64 = 24;

/// SLA standing of a reclamation at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    OnTime,
    NearDeadline,
    Overdue,
}

/// Offset between creation and deadline for a priority
pub fn sla_offset(priority: Priority) -> Duration {
    let hours = match priority {
        Priority::Urgent => URGENT_SLA_HOURS,
        Priority::High => HIGH_SLA_HOURS,
        Priority::Medium => MEDIUM_SLA_HOURS,
        Priority::Low => LOW_SLA_HOURS,
    };
    Duration::hours(hours)
}

/// Offset for a raw priority code, falling back to 72h for unknown codes
///
/// For codes arriving from outside the typed `Priority` (imports, legacy
/// rows). Stored rows are constrained to 0..=3, so the Postgres adapter
/// reports an unknown code there as corruption instead.
pub fn sla_offset_for_code(code: i16) -> Duration {
    Priority::from_code(code)
        .map(sla_offset)
        .unwrap_or_else(|| Duration::hours(DEFAULT_SLA_HOURS))
}

/// Deadline for a reclamation created at `created_at` with `priority`
///
/// Saturates at `DateTime::<Utc>::MAX_UTC`.
pub fn compute_sla_deadline(created_at: DateTime<Utc>, priority: Priority) -> DateTime<Utc> {
    created_at
        .checked_add_signed(sla_offset(priority))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// SLA standing at `now`
///
/// Terminal tickets and tickets without a deadline are always on time.
/// Exactly 24h remaining counts as near the deadline.
pub fn sla_status(
    now: DateTime<Utc>,
    deadline: Option<DateTime<Utc>>,
    status: ReclamationStatus,
) -> SlaStatus {
    let deadline = match deadline {
        Some(deadline) if !status.is_terminal() => deadline,
        _ => return SlaStatus::OnTime,
    };

    if now > deadline {
        SlaStatus::Overdue
    } else if deadline - now <= Duration::hours(NEAR_DEADLINE_HOURS) {
        SlaStatus::NearDeadline
    } else {
        SlaStatus::OnTime
    }
}

/// SLA view of one reclamation, as served to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaReport {
    pub status: SlaStatus,
    pub deadline: Option<DateTime<Utc>>,
    /// Seconds until the deadline; negative once overdue
    pub remaining_seconds: Option<i64>,
    pub evaluated_at: DateTime<Utc>,
}

impl SlaReport {
    pub fn for_reclamation(reclamation: &Reclamation, now: DateTime<Utc>) -> Self {
        Self {
            status: sla_status(now, reclamation.sla_deadline, reclamation.status),
            deadline: reclamation.sla_deadline,
            remaining_seconds: reclamation.sla_deadline.map(|d| (d - now).num_seconds()),
            evaluated_at: now,
        }
    }
}
