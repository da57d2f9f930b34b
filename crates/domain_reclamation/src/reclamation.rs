//! Reclamation aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ArticleId, ClientId, ReclamationId};
use crate::error::LifecycleError;
use crate::sla::compute_sla_deadline;

/// Maximum length of a reclamation title
pub const MAX_TITLE_LEN: usize = 200;

/// Ticket priority, driving the SLA deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Stable numeric code used by the persistence layer
    pub fn code(self) -> i16 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Priority::Low),
            1 => Some(Priority::Medium),
            2 => Some(Priority::High),
            3 => Some(Priority::Urgent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LifecycleError::validation(format!("unknown priority '{}'", s)))
    }
}

/// Reclamation status
///
/// ```text
/// New ──► InProgress ◄──► PendingParts
///  │          │  ▲
///  │          ▼  │ (reopen)
///  │       Resolved ──► Closed
///  └──────────┴──────────► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclamationStatus {
    /// Filed by the client, not yet picked up
    #[default]
    New,
    /// A technician is working on it
    InProgress,
    /// Blocked until spare parts arrive
    PendingParts,
    /// Fix delivered, awaiting confirmation
    Resolved,
    /// Confirmed and archived
    Closed,
    /// Abandoned
    Cancelled,
}

impl ReclamationStatus {
    pub const ALL: [ReclamationStatus; 6] = [
        ReclamationStatus::New,
        ReclamationStatus::InProgress,
        ReclamationStatus::PendingParts,
        ReclamationStatus::Resolved,
        ReclamationStatus::Closed,
        ReclamationStatus::Cancelled,
    ];

    /// Closed and Cancelled absorb: nothing leaves them
    pub fn is_terminal(self) -> bool {
        matches!(self, ReclamationStatus::Closed | ReclamationStatus::Cancelled)
    }

    /// The allowed-transition table
    pub fn allowed_transitions(self) -> &'static [ReclamationStatus] {
        use ReclamationStatus::*;
        match self {
            New => &[InProgress, Cancelled],
            InProgress => &[PendingParts, Resolved, Cancelled],
            PendingParts => &[InProgress, Cancelled],
            Resolved => &[InProgress, Closed],
            Closed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, target: ReclamationStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReclamationStatus::New => "new",
            ReclamationStatus::InProgress => "in_progress",
            ReclamationStatus::PendingParts => "pending_parts",
            ReclamationStatus::Resolved => "resolved",
            ReclamationStatus::Closed => "closed",
            ReclamationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReclamationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReclamationStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReclamationStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LifecycleError::validation(format!("unknown status '{}'", s)))
    }
}

/// Data needed to open a reclamation
#[derive(Debug, Clone)]
pub struct NewReclamation {
    pub client_id: ClientId,
    pub article_id: Option<ArticleId>,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to Medium
    pub priority: Option<Priority>,
}

/// A customer-filed service ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reclamation {
    /// Unique identifier
    pub id: ReclamationId,
    /// Human-readable number, e.g. REC-202401-004217
    pub number: String,
    /// Owning client
    pub client_id: ClientId,
    /// Equipment concerned, when known
    pub article_id: Option<ArticleId>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: ReclamationStatus,
    /// Derived from `created_at` and `priority`; never set directly
    pub sla_deadline: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token, bumped on every mutation
    pub version: i64,
}

impl Reclamation {
    /// Opens a reclamation in status New with its SLA deadline set
    pub fn open(request: NewReclamation, now: DateTime<Utc>) -> Result<Self, LifecycleError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(LifecycleError::validation("title must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(LifecycleError::validation(format!(
                "title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }

        let id = ReclamationId::new_v7();
        let priority = request.priority.unwrap_or_default();

        Ok(Self {
            id,
            number: reclamation_number(id, now),
            client_id: request.client_id,
            article_id: request.article_id,
            title,
            description: request.description,
            priority,
            status: ReclamationStatus::New,
            sla_deadline: Some(compute_sla_deadline(now, priority)),
            is_deleted: false,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            closed_at: None,
            version: 1,
        })
    }

    /// True while the ticket still counts against the workload
    pub fn is_open(&self) -> bool {
        !self.is_deleted && !self.status.is_terminal()
    }

    /// Time from creation to resolution, if resolved
    pub fn resolution_time(&self) -> Option<chrono::Duration> {
        self.resolved_at.map(|at| at - self.created_at)
    }

    /// True if resolved no later than the SLA deadline. A reclamation
    /// without a deadline cannot breach it.
    pub fn resolved_within_sla(&self) -> bool {
        match (self.resolved_at.or(self.closed_at), self.sla_deadline) {
            (Some(resolved), Some(deadline)) => resolved <= deadline,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

fn reclamation_number(id: ReclamationId, now: DateTime<Utc>) -> String {
    // The low bits of a v7 UUID are random
    let suffix = id.as_uuid().as_u128() % 1_000_000;
    format!("REC-{}-{:06}", now.format("%Y%m"), suffix)
}
