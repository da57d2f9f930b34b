//! Reclamation domain errors

use thiserror::Error;

use core_kernel::PortError;
use crate::reclamation::ReclamationStatus;

/// Why a lifecycle operation was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionRejection {
    #[error("reclamation is deleted")]
    Deleted,

    #[error("reclamation is {0}, a terminal status")]
    Terminal(ReclamationStatus),

    #[error("{from} cannot move to {to}")]
    NotAllowed {
        from: ReclamationStatus,
        to: ReclamationStatus,
    },
}

/// Errors that can occur in the reclamation domain
///
/// None of these are retried inside the domain. `ConcurrentModification`
/// tells the caller to reload and try again.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid transition for reclamation {reclamation_id}: {rejection}")]
    InvalidTransition {
        reclamation_id: String,
        rejection: TransitionRejection,
    },

    #[error(
        "Reclamation {reclamation_id} was modified concurrently (expected version {expected_version})"
    )]
    ConcurrentModification {
        reclamation_id: String,
        expected_version: i64,
    },

    #[error("Reclamation not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Port(PortError),
}

impl LifecycleError {
    pub fn validation(message: impl Into<String>) -> Self {
        LifecycleError::Validation(message.into())
    }

    pub fn invalid_transition(
        reclamation_id: impl ToString,
        rejection: TransitionRejection,
    ) -> Self {
        LifecycleError::InvalidTransition {
            reclamation_id: reclamation_id.to_string(),
            rejection,
        }
    }

    /// True when reloading and retrying may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LifecycleError::ConcurrentModification { .. })
    }
}

impl From<PortError> for LifecycleError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { id, .. } => LifecycleError::NotFound(id),
            PortError::ConcurrentModification { id, expected_version, .. } => {
                LifecycleError::ConcurrentModification {
                    reclamation_id: id,
                    expected_version,
                }
            }
            PortError::Validation { message, .. } => LifecycleError::Validation(message),
            other => LifecycleError::Port(other),
        }
    }
}
