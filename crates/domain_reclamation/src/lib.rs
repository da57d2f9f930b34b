//! Reclamation Management Domain
//!
//! This crate implements the lifecycle of a customer reclamation (service
//! ticket): status and priority transitions, the SLA deadline policy, and
//! the append-only history that audits every change.
//!
//! # Reclamation Lifecycle
//!
//! ```text
//! New -> In Progress <-> Pending Parts
//!            |
//!            v
//!        Resolved -> Closed
//!
//! (any non-terminal) -> Cancelled
//! ```
//!
//! Closed and Cancelled are terminal. A soft-deleted reclamation is frozen.

pub mod reclamation;
pub mod sla;
pub mod history;
pub mod lifecycle;
pub mod ports;
pub mod service;
pub mod error;

pub use reclamation::{NewReclamation, Priority, Reclamation, ReclamationStatus};
pub use sla::{compute_sla_deadline, sla_status, SlaReport, SlaStatus};
pub use history::{HistoryLog, ReclamationHistory};
pub use lifecycle::{transition, TransitionRequest};
pub use ports::{ReclamationPort, ReclamationQuery};
pub use ports::memory::InMemoryReclamationPort;
pub use service::{ReclamationService, TransitionOutcome};
pub use error::{LifecycleError, TransitionRejection};
