//! Registry consistency checks
//!
//! Field formats are enforced at registration through `validator`. The
//! checks here look at a record as a whole:
//!
//! - a client should be reachable (e-mail or phone), otherwise a warning
//! - an article's purchase date may not be in the future
//! - an article must belong to the client it is filed under
//! - articles of an inactive client are reported as warnings

use chrono::NaiveDate;

use crate::article::Article;
use crate::client::Client;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Non-fatal findings
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

pub struct ClientValidator;

impl ClientValidator {
    pub fn validate_client(client: &Client) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if client.name.trim().is_empty() {
            result.add_error("Client name is required");
        }
        if client.email.is_none() && client.phone.is_none() {
            result.add_warning(format!("Client {} has no contact details", client.id));
        }
        if client.updated_at < client.created_at {
            result.add_error("updated_at precedes created_at");
        }

        result
    }

    /// Validates the articles filed under `client` as of `today`
    pub fn validate_articles(
        client: &Client,
        articles: &[Article],
        today: NaiveDate,
    ) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for article in articles {
            if article.client_id != client.id {
                result.add_error(format!(
                    "Article {} belongs to {}, not {}",
                    article.id, article.client_id, client.id
                ));
            }
            if let Some(purchased) = article.purchase_date {
                if purchased > today {
                    result.add_error(format!(
                        "Article {} purchase date is in the future",
                        article.id
                    ));
                }
            }
            if !client.is_active {
                result.add_warning(format!(
                    "Article {} is owned by an inactive client",
                    article.id
                ));
            }
        }

        result
    }

    pub fn validate(client: &Client, articles: &[Article], today: NaiveDate) -> ValidationResult {
        let mut result = Self::validate_client(client);
        result.merge(Self::validate_articles(client, articles, today));
        result
    }
}
