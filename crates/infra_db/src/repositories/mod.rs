//! Repository implementations of the domain ports

pub mod reclamation;
pub mod dashboard;

pub use reclamation::PostgresReclamationRepository;
pub use dashboard::PostgresDashboardSource;
