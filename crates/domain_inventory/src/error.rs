//! Inventory errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InventoryError {
    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Insufficient stock for {reference}: requested {requested}, available {available}")]
    InsufficientStock {
        reference: String,
        requested: u32,
        available: u32,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}
