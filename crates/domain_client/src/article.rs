//! Articles: equipment owned by a client
//!
//! The warranty runs from the purchase date for `warranty_months` calendar
//! months; the end date itself is no longer covered.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ArticleId, ClientId};
use crate::error::ClientError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewArticle {
    pub client_id: ClientId,
    #[validate(length(min = 1, max = 50))]
    pub reference: String,
    #[validate(length(min = 1, max = 200))]
    pub designation: String,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    #[validate(range(max = 120))]
    pub warranty_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub client_id: ClientId,
    pub reference: String,
    pub designation: String,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_months: u32,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn register(request: NewArticle, now: DateTime<Utc>) -> Result<Self, ClientError> {
        request
            .validate()
            .map_err(|e| ClientError::ValidationFailed(e.to_string()))?;

        Ok(Self {
            id: ArticleId::new_v7(),
            client_id: request.client_id,
            reference: request.reference,
            designation: request.designation,
            serial_number: request.serial_number,
            purchase_date: request.purchase_date,
            warranty_months: request.warranty_months,
            created_at: now,
        })
    }

    /// Last day still covered, if the purchase date is known
    pub fn warranty_end(&self) -> Option<NaiveDate> {
        let purchased = self.purchase_date?;
        purchased.checked_add_months(Months::new(self.warranty_months))
    }

    /// Whether a failure on `date` is covered by the warranty
    pub fn is_under_warranty(&self, date: NaiveDate) -> bool {
        match (self.purchase_date, self.warranty_end()) {
            (Some(start), Some(end)) => date >= start && date < end,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(purchase: Option<NaiveDate>, months: u32) -> Article {
        Article::register(
            NewArticle {
                client_id: ClientId::new_v7(),
                reference: "LV-800".to_string(),
                designation: "Lave-vaisselle 60 cm".to_string(),
                serial_number: Some("SN-0042".to_string()),
                purchase_date: purchase,
                warranty_months: months,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_warranty_window() {
        let a = article(Some(date(2024, 1, 31)), 24);
        assert_eq!(a.warranty_end(), Some(date(2026, 1, 31)));
        assert!(a.is_under_warranty(date(2024, 1, 31)));
        assert!(a.is_under_warranty(date(2026, 1, 30)));
        assert!(!a.is_under_warranty(date(2026, 1, 31)));
        assert!(!a.is_under_warranty(date(2023, 12, 31)));
    }

    #[test]
    fn test_unknown_purchase_date_is_not_covered() {
        let a = article(None, 24);
        assert!(!a.is_under_warranty(date(2024, 6, 1)));
    }

    #[test]
    fn test_zero_month_warranty() {
        let a = article(Some(date(2024, 3, 1)), 0);
        assert!(!a.is_under_warranty(date(2024, 3, 1)));
    }
}
