//! Client entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ClientId;
use crate::address::Address;
use crate::error::ClientError;

/// Registration request for a new client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewClient {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 4, max = 30))]
    pub phone: Option<String>,
    pub address: Option<Address>,
}

/// A customer of the after-sales service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    /// Inactive clients stay in the registry for reporting
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Registers a client after field validation
    pub fn register(request: NewClient, now: DateTime<Utc>) -> Result<Self, ClientError> {
        let request = NewClient {
            name: request.name.trim().to_string(),
            email: request.email.map(|e| e.trim().to_lowercase()),
            ..request
        };
        request
            .validate()
            .map_err(|e| ClientError::ValidationFailed(e.to_string()))?;

        Ok(Self {
            id: ClientId::new_v7(),
            name: request.name,
            email: request.email,
            phone: request.phone,
            address: request.address,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_contact(
        &mut self,
        email: Option<String>,
        phone: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ClientError> {
        if !self.is_active {
            return Err(ClientError::InactiveClient);
        }
        let candidate = NewClient {
            name: self.name.clone(),
            email: email.map(|e| e.trim().to_lowercase()),
            phone,
            address: None,
        };
        candidate
            .validate()
            .map_err(|e| ClientError::ValidationFailed(e.to_string()))?;

        self.email = candidate.email;
        self.phone = candidate.phone;
        self.updated_at = now;
        Ok(())
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    /// True if the client registered inside `[from, to)`
    pub fn registered_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.created_at >= from && self.created_at < to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewClient {
        NewClient {
            name: "  Marie Curie ".to_string(),
            email: Some("Marie.Curie@Example.fr".to_string()),
            phone: Some("+33 1 23 45 67 89".to_string()),
            address: None,
        }
    }

    #[test]
    fn test_register_normalizes_fields() {
        let client = Client::register(request(), Utc::now()).unwrap();
        assert_eq!(client.name, "Marie Curie");
        assert_eq!(client.email.as_deref(), Some("marie.curie@example.fr"));
        assert!(client.is_active);
        assert!(client.id.to_string().starts_with("CLI-"));
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let mut req = request();
        req.email = Some("not-an-email".to_string());
        assert!(matches!(
            Client::register(req, Utc::now()),
            Err(ClientError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_register_rejects_blank_name() {
        let mut req = request();
        req.name = "   ".to_string();
        assert!(Client::register(req, Utc::now()).is_err());
    }

    #[test]
    fn test_inactive_client_is_frozen() {
        let mut client = Client::register(request(), Utc::now()).unwrap();
        client.deactivate(Utc::now());
        let result = client.update_contact(None, None, Utc::now());
        assert!(matches!(result, Err(ClientError::InactiveClient)));
    }
}
