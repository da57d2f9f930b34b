//! Dashboard figures as served to callers

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::{Money, PartId, TechnicianId};
use domain_intervention::InterventionStatus;
use domain_reclamation::{Priority, ReclamationStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub generated_at: DateTime<Utc>,
    pub timezone: String,
    pub reclamations: ReclamationStats,
    pub interventions: InterventionStats,
    pub revenue: RevenueStats,
    pub inventory: InventoryStats,
    pub clients: ClientStats,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReclamationStats {
    /// Excludes soft-deleted reclamations
    pub total: u64,
    pub open: u64,
    pub by_status: BTreeMap<ReclamationStatus, u64>,
    pub by_priority: BTreeMap<Priority, u64>,
    pub overdue: u64,
    pub near_deadline: u64,
    /// closed / total
    pub resolution_rate: Decimal,
    /// closed within deadline / closed
    pub sla_compliance_rate: Decimal,
    pub average_resolution_hours: Option<Decimal>,
    pub created_this_month: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicianLoad {
    pub technician_id: TechnicianId,
    /// Planned or in progress
    pub active: u64,
    pub completed_this_month: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InterventionStats {
    pub total: u64,
    pub by_status: BTreeMap<InterventionStatus, u64>,
    pub scheduled_today: u64,
    pub completed_this_month: u64,
    /// Busiest technician first
    pub workload: Vec<TechnicianLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueStats {
    pub current_month: Money,
    pub previous_month: Money,
    /// (current - previous) / previous, 0 when previous is 0
    pub growth_rate: Decimal,
    pub outstanding: Money,
    pub overdue_invoices: u64,
    /// Paid invoices in another currency, left out of the sums
    pub skipped_foreign_currency: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockPart {
    pub part_id: PartId,
    pub reference: String,
    pub name: String,
    pub stock_quantity: u32,
    pub min_stock_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total_parts: u64,
    pub low_stock: Vec<LowStockPart>,
    pub stock_value: Money,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClientStats {
    pub total: u64,
    pub active: u64,
    pub new_this_month: u64,
}
