//! Billing Domain
//!
//! Invoices for billable interventions.
//!
//! ```text
//! Draft -> Issued -> Paid
//!   |        |
//!   +--------+--> Cancelled
//! ```
//!
//! Lines can only be added to a draft. Issuing fixes the due date at
//! [`invoice::PAYMENT_TERM_DAYS`] days after the issue date. VAT defaults to
//! 20 % and is rounded to the currency's minor unit.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{Invoice, PaymentMethod};
//!
//! let mut invoice = Invoice::from_intervention(&intervention, client_id, now)?;
//! invoice.issue(now)?;
//! invoice.mark_paid(PaymentMethod::BankTransfer, later)?;
//! ```

pub mod invoice;
pub mod payment;
pub mod error;

pub use invoice::{Invoice, InvoiceLine, InvoiceLineKind, InvoiceStatus, DEFAULT_VAT_PERCENT};
pub use payment::PaymentMethod;
pub use error::BillingError;
