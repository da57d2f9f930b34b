//! Invoices

use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{ClientId, Currency, InterventionId, InvoiceId, Money, Rate};
use domain_intervention::{Intervention, InterventionStatus};
use crate::error::BillingError;
use crate::payment::PaymentMethod;

pub const DEFAULT_VAT_PERCENT: Decimal = dec!(20);

/// Days between issue and due date
pub const PAYMENT_TERM_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [InvoiceStatus::Draft, InvoiceStatus::Issued, InvoiceStatus::Paid, InvoiceStatus::Cancelled]
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| BillingError::InvalidOperation(format!("Unknown invoice status: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceLineKind {
    Labour,
    Part,
    Travel,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub kind: InvoiceLineKind,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Money,
}

impl InvoiceLine {
    pub fn new(
        kind: InvoiceLineKind,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Money,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    pub fn total(&self) -> Money {
        self.unit_price.multiply(self.quantity).round_to_currency()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// `FAC-YYYYMM-XXXXXX`
    pub number: String,
    pub client_id: ClientId,
    pub intervention_id: Option<InterventionId>,
    pub currency: Currency,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub vat_rate: Rate,
    pub tax: Money,
    pub total: Money,
    pub status: InvoiceStatus,
    pub issued_at: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Empty draft at the default VAT rate
    pub fn draft(client_id: ClientId, currency: Currency, now: DateTime<Utc>) -> Self {
        let id = InvoiceId::new_v7();
        Self {
            id,
            number: format!(
                "FAC-{:04}{:02}-{:06}",
                now.year(),
                now.month(),
                id.as_uuid().as_u128() % 1_000_000
            ),
            client_id,
            intervention_id: None,
            currency,
            lines: Vec::new(),
            subtotal: Money::zero(currency),
            vat_rate: Rate::from_percentage(DEFAULT_VAT_PERCENT),
            tax: Money::zero(currency),
            total: Money::zero(currency),
            status: InvoiceStatus::Draft,
            issued_at: None,
            due_date: None,
            paid_at: None,
            payment_method: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Draft billing a completed intervention: one labour line, one line per part
    pub fn from_intervention(
        intervention: &Intervention,
        client_id: ClientId,
        now: DateTime<Utc>,
    ) -> Result<Self, BillingError> {
        if intervention.status != InterventionStatus::Completed {
            return Err(BillingError::InterventionNotCompleted(intervention.status));
        }
        if intervention.under_warranty {
            return Err(BillingError::NotBillable(format!(
                "{} is covered by warranty",
                intervention.id
            )));
        }

        let mut invoice = Self::draft(client_id, intervention.hourly_rate.currency(), now);
        invoice.intervention_id = Some(intervention.id);

        if !intervention.labour_hours.is_zero() {
            invoice.add_line(
                InvoiceLine::new(
                    InvoiceLineKind::Labour,
                    "Main d'oeuvre",
                    intervention.labour_hours,
                    intervention.hourly_rate,
                ),
                now,
            )?;
        }
        for usage in &intervention.parts_used {
            invoice.add_line(
                InvoiceLine::new(
                    InvoiceLineKind::Part,
                    format!("Pièce {}", usage.part_id),
                    Decimal::from(usage.quantity),
                    usage.unit_price,
                ),
                now,
            )?;
        }
        Ok(invoice)
    }

    pub fn with_vat_rate(mut self, rate: Rate) -> Result<Self, BillingError> {
        self.vat_rate = rate;
        self.recalculate_totals()?;
        Ok(self)
    }

    pub fn add_line(&mut self, line: InvoiceLine, now: DateTime<Utc>) -> Result<(), BillingError> {
        if self.status != InvoiceStatus::Draft {
            return Err(BillingError::InvalidStatus {
                action: "add a line to",
                status: self.status,
            });
        }
        if line.unit_price.currency() != self.currency {
            return Err(core_kernel::MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                line.unit_price.currency().to_string(),
            )
            .into());
        }
        self.lines.push(line);
        self.updated_at = now;
        self.recalculate_totals()
    }

    pub fn issue(&mut self, now: DateTime<Utc>) -> Result<(), BillingError> {
        if self.status != InvoiceStatus::Draft {
            return Err(BillingError::InvalidStatus {
                action: "issue",
                status: self.status,
            });
        }
        if self.lines.is_empty() {
            return Err(BillingError::InvalidOperation("Invoice has no lines".into()));
        }

        self.status = InvoiceStatus::Issued;
        self.issued_at = Some(now);
        self.due_date = now.date_naive().checked_add_days(Days::new(PAYMENT_TERM_DAYS));
        self.updated_at = now;
        info!(invoice = %self.number, total = %self.total, "Invoice issued");
        Ok(())
    }

    pub fn mark_paid(
        &mut self,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<(), BillingError> {
        if self.status != InvoiceStatus::Issued {
            return Err(BillingError::InvalidStatus {
                action: "mark as paid",
                status: self.status,
            });
        }
        self.status = InvoiceStatus::Paid;
        self.paid_at = Some(now);
        self.payment_method = Some(method);
        self.updated_at = now;
        info!(invoice = %self.number, %method, "Invoice paid");
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), BillingError> {
        if matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
            return Err(BillingError::InvalidStatus {
                action: "cancel",
                status: self.status,
            });
        }
        self.status = InvoiceStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Issued, unpaid and past its due date on `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Issued && self.due_date.is_some_and(|due| today > due)
    }

    /// Paid amount counted as revenue, with the payment instant
    pub fn revenue(&self) -> Option<(DateTime<Utc>, Money)> {
        match (self.status, self.paid_at) {
            (InvoiceStatus::Paid, Some(paid_at)) => Some((paid_at, self.total)),
            _ => None,
        }
    }

    fn recalculate_totals(&mut self) -> Result<(), BillingError> {
        let line_totals: Vec<Money> = self.lines.iter().map(InvoiceLine::total).collect();
        self.subtotal = Money::sum(self.currency, &line_totals)?;
        self.tax = self.vat_rate.apply(&self.subtotal).round_to_currency();
        self.total = self.subtotal.checked_add(&self.tax)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap()
    }

    fn invoice_with_line(amount: Decimal) -> Invoice {
        let mut invoice = Invoice::draft(ClientId::new_v7(), Currency::EUR, now());
        let price = Money::new(amount, Currency::EUR);
        let line = InvoiceLine::new(InvoiceLineKind::Other, "Diagnostic", Decimal::ONE, price);
        invoice.add_line(line, now()).unwrap();
        invoice
    }

    #[test]
    fn test_number_format() {
        let invoice = Invoice::draft(ClientId::new_v7(), Currency::EUR, now());
        assert!(invoice.number.starts_with("FAC-202405-"));
        assert_eq!(invoice.number.len(), "FAC-202405-000000".len());
    }

    #[test]
    fn test_totals_with_default_vat() {
        let invoice = invoice_with_line(dec!(49.99));
        assert_eq!(invoice.subtotal.amount(), dec!(49.99));
        assert_eq!(invoice.tax.amount(), dec!(10.00));
        assert_eq!(invoice.total.amount(), dec!(59.99));
    }

    #[test]
    fn test_issue_sets_due_date() {
        let mut invoice = invoice_with_line(dec!(100));
        invoice.issue(now()).unwrap();
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 6, 13));
        assert!(!invoice.is_overdue(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()));
        assert!(invoice.is_overdue(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()));
    }

    #[test]
    fn test_empty_invoice_cannot_be_issued() {
        let mut invoice = Invoice::draft(ClientId::new_v7(), Currency::EUR, now());
        assert!(matches!(invoice.issue(now()), Err(BillingError::InvalidOperation(_))));
    }

    #[test]
    fn test_issued_invoice_is_frozen() {
        let mut invoice = invoice_with_line(dec!(10));
        invoice.issue(now()).unwrap();
        let price = Money::new(dec!(30), Currency::EUR);
        let line = InvoiceLine::new(InvoiceLineKind::Travel, "Déplacement", Decimal::ONE, price);
        assert!(matches!(
            invoice.add_line(line, now()),
            Err(BillingError::InvalidStatus { status: InvoiceStatus::Issued, .. })
        ));
    }
}
