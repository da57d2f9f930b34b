//! Stock movements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InterventionId, PartId, StockMovementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received
    In,
    /// Consumed or shipped
    Out,
    /// Inventory count correction
    Adjustment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: StockMovementId,
    pub part_id: PartId,
    pub kind: MovementKind,
    /// Signed change applied to the stock
    pub delta: i64,
    pub stock_after: u32,
    pub intervention_id: Option<InterventionId>,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl StockMovement {
    pub(crate) fn record(
        part_id: PartId,
        kind: MovementKind,
        delta: i64,
        stock_after: u32,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: StockMovementId::new_v7(),
            part_id,
            kind,
            delta,
            stock_after,
            intervention_id: None,
            reason: None,
            occurred_at,
        }
    }

    pub fn for_intervention(mut self, intervention_id: InterventionId) -> Self {
        self.intervention_id = Some(intervention_id);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
