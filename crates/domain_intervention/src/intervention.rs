//! Intervention entity and its lifecycle

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{InterventionId, Money, ReclamationId, TechnicianId};
use crate::error::InterventionError;
use crate::parts::PartUsage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl InterventionStatus {
    pub const ALL: [InterventionStatus; 4] = [
        InterventionStatus::Planned,
        InterventionStatus::InProgress,
        InterventionStatus::Completed,
        InterventionStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, InterventionStatus::Completed | InterventionStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: InterventionStatus) -> bool {
        use InterventionStatus::*;
        matches!(
            (self, next),
            (Planned, InProgress)
                | (Planned, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionStatus::Planned => "planned",
            InterventionStatus::InProgress => "in_progress",
            InterventionStatus::Completed => "completed",
            InterventionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InterventionStatus {
    type Err = InterventionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                InterventionError::validation(format!("Unknown intervention status: {s}"))
            })
    }
}

/// Booking request for a technician visit
#[derive(Debug, Clone)]
pub struct ScheduleIntervention {
    pub reclamation_id: ReclamationId,
    pub technician_id: TechnicianId,
    pub scheduled_at: DateTime<Utc>,
    pub hourly_rate: Money,
    pub under_warranty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: InterventionId,
    pub reclamation_id: ReclamationId,
    pub technician_id: TechnicianId,
    pub status: InterventionStatus,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub report: Option<String>,
    pub labour_hours: Decimal,
    pub hourly_rate: Money,
    pub parts_used: Vec<PartUsage>,
    /// Covered interventions are not billed
    pub under_warranty: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intervention {
    pub fn schedule(
        request: ScheduleIntervention,
        now: DateTime<Utc>,
    ) -> Result<Self, InterventionError> {
        if request.hourly_rate.is_negative() {
            return Err(InterventionError::validation("Hourly rate cannot be negative"));
        }

        Ok(Self {
            id: InterventionId::new_v7(),
            reclamation_id: request.reclamation_id,
            technician_id: request.technician_id,
            status: InterventionStatus::Planned,
            scheduled_at: request.scheduled_at,
            started_at: None,
            completed_at: None,
            report: None,
            labour_hours: Decimal::ZERO,
            hourly_rate: request.hourly_rate,
            parts_used: Vec::new(),
            under_warranty: request.under_warranty,
            created_at: now,
            updated_at: now,
        })
    }

    fn move_to(
        &mut self,
        next: InterventionStatus,
        now: DateTime<Utc>,
    ) -> Result<(), InterventionError> {
        if !self.status.can_transition_to(next) {
            return Err(InterventionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        debug!(
            intervention_id = %self.id,
            from = %self.status,
            to = %next,
            "Intervention status change"
        );
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Technician arrives on site
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), InterventionError> {
        self.move_to(InterventionStatus::InProgress, now)?;
        self.started_at = Some(now);
        Ok(())
    }

    pub fn complete(
        &mut self,
        report: impl Into<String>,
        labour_hours: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), InterventionError> {
        if labour_hours.is_sign_negative() && !labour_hours.is_zero() {
            return Err(InterventionError::validation("Labour hours cannot be negative"));
        }
        let report = report.into();
        if report.trim().is_empty() {
            return Err(InterventionError::validation("A completion report is required"));
        }

        self.move_to(InterventionStatus::Completed, now)?;
        self.report = Some(report);
        self.labour_hours = labour_hours;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn cancel(
        &mut self,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), InterventionError> {
        self.move_to(InterventionStatus::Cancelled, now)?;
        if let Some(reason) = reason {
            self.report = Some(format!("Cancelled: {reason}"));
        }
        Ok(())
    }

    /// Records parts consumed; only while the intervention is open
    pub fn add_part(
        &mut self,
        usage: PartUsage,
        now: DateTime<Utc>,
    ) -> Result<(), InterventionError> {
        if self.status.is_terminal() {
            return Err(InterventionError::Closed(self.status));
        }
        if usage.quantity == 0 {
            return Err(InterventionError::validation("Part quantity must be positive"));
        }
        if usage.unit_price.currency() != self.hourly_rate.currency() {
            return Err(core_kernel::MoneyError::CurrencyMismatch(
                usage.unit_price.currency().to_string(),
                self.hourly_rate.currency().to_string(),
            )
            .into());
        }
        self.parts_used.push(usage);
        self.updated_at = now;
        Ok(())
    }

    pub fn labour_cost(&self) -> Money {
        self.hourly_rate.multiply(self.labour_hours)
    }

    pub fn parts_cost(&self) -> Result<Money, InterventionError> {
        let lines: Vec<Money> = self.parts_used.iter().map(PartUsage::line_total).collect();
        Ok(Money::sum(self.hourly_rate.currency(), &lines)?)
    }

    /// Labour plus parts, zero under warranty
    pub fn total_cost(&self) -> Result<Money, InterventionError> {
        if self.under_warranty {
            return Ok(Money::zero(self.hourly_rate.currency()));
        }
        Ok(self.labour_cost().checked_add(&self.parts_cost()?)?)
    }

    /// Time on site, once completed
    pub fn duration(&self) -> Option<Duration> {
        Some(self.completed_at? - self.started_at?)
    }
}
