//! Billing domain errors

use thiserror::Error;

use core_kernel::MoneyError;
use domain_intervention::InterventionStatus;
use crate::invoice::InvoiceStatus;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    #[error("Cannot {action} an invoice in status {status}")]
    InvalidStatus {
        action: &'static str,
        status: InvoiceStatus,
    },

    /// Only completed interventions outside warranty are billed
    #[error("Intervention is not billable: {0}")]
    NotBillable(String),

    #[error("Intervention must be completed before billing (status {0})")]
    InterventionNotCompleted(InterventionStatus),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Money(#[from] MoneyError),
}
