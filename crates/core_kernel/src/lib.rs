//! Core Kernel - Foundational types and utilities for the after-sales service system
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Strongly-typed identifiers for reclamations, clients, parts, invoices
//! - Money types with precise decimal arithmetic
//! - Clock abstraction and business-calendar helpers
//! - The port error taxonomy used by all persistence adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Clock, SystemClock, FixedClock, Timezone, MonthWindow, TemporalError};
pub use identifiers::{
    ReclamationId, HistoryEntryId, ClientId, ArticleId, InterventionId,
    TechnicianId, PartId, StockMovementId, InvoiceId,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
