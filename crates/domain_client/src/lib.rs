//! Client Registry Domain
//!
//! Customers of the after-sales service and the articles (appliances,
//! machines) they own. Articles carry the purchase date and warranty length
//! used to decide whether an intervention is billable.

pub mod client;
pub mod address;
pub mod article;
pub mod validation;
pub mod error;

pub use client::{Client, NewClient};
pub use address::Address;
pub use article::{Article, NewArticle};
pub use validation::{ClientValidator, ValidationResult};
pub use error::ClientError;
