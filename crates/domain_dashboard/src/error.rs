//! Dashboard errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError, TemporalError};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Snapshot source error: {0}")]
    Source(#[from] PortError),

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    Money(#[from] MoneyError),
}
