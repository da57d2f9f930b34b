//! Intervention domain errors

use thiserror::Error;

use core_kernel::MoneyError;
use crate::intervention::InterventionStatus;

#[derive(Debug, Error)]
pub enum InterventionError {
    #[error("Intervention not found: {0}")]
    NotFound(String),

    #[error("Invalid intervention transition from {from} to {to}")]
    InvalidTransition {
        from: InterventionStatus,
        to: InterventionStatus,
    },

    #[error("Parts cannot be added to a {0} intervention")]
    Closed(InterventionStatus),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl InterventionError {
    pub fn validation(message: impl Into<String>) -> Self {
        InterventionError::Validation(message.into())
    }
}
