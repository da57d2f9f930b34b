//! Operational Dashboard
//!
//! Read-only figures computed on demand from a [`DashboardSnapshot`]:
//! reclamation counts and SLA standing, intervention workload, monthly
//! revenue, low stock and client growth. Nothing is cached and nothing is
//! written back.

pub mod snapshot;
pub mod stats;
pub mod aggregate;
pub mod ports;
pub mod service;
pub mod error;

pub use snapshot::DashboardSnapshot;
pub use stats::{
    ClientStats, DashboardStats, InterventionStats, InventoryStats, LowStockPart,
    ReclamationStats, RevenueStats, TechnicianLoad,
};
pub use aggregate::{aggregate, ratio, AggregationContext};
pub use ports::DashboardSource;
pub use ports::memory::InMemoryDashboardSource;
pub use service::DashboardService;
pub use error::DashboardError;
