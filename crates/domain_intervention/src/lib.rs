//! Intervention Domain
//!
//! An intervention is a technician visit booked against a reclamation.
//!
//! ```text
//! Planned -> In Progress -> Completed
//!    |            |
//!    +------------+--> Cancelled
//! ```
//!
//! Cost is labour (hours x hourly rate) plus parts, and nothing at all when
//! the article is still under warranty.

pub mod intervention;
pub mod parts;
pub mod error;

pub use intervention::{Intervention, InterventionStatus, ScheduleIntervention};
pub use parts::PartUsage;
pub use error::InterventionError;
