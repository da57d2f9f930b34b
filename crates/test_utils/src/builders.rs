//! Test Data Builders
//!
//! Builders construct domain values with sensible defaults so that tests
//! only spell out the fields they care about. They set fields directly,
//! which lets a test place an entity in any state without replaying its
//! whole lifecycle.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClientId, Currency, InterventionId, Money, PartId, ReclamationId, TechnicianId};
use domain_billing::{Invoice, InvoiceLine, InvoiceLineKind, InvoiceStatus, PaymentMethod};
use domain_client::{Client, NewClient};
use domain_intervention::{Intervention, InterventionStatus, ScheduleIntervention};
use domain_inventory::{NewPart, Part};
use domain_reclamation::sla::compute_sla_deadline;
use domain_reclamation::{NewReclamation, Priority, Reclamation, ReclamationStatus};

use crate::fixtures::{FakeData, MoneyFixtures, TemporalFixtures};

/// Builder for reclamations in any state
pub struct ReclamationBuilder {
    client_id: ClientId,
    title: String,
    priority: Priority,
    status: ReclamationStatus,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    sla_deadline: Option<Option<DateTime<Utc>>>,
    deleted: bool,
}

impl Default for ReclamationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReclamationBuilder {
    pub fn new() -> Self {
        Self {
            client_id: ClientId::new_v7(),
            title: FakeData::title(),
            priority: Priority::Medium,
            status: ReclamationStatus::New,
            created_at: TemporalFixtures::reference_now(),
            resolved_at: None,
            sla_deadline: None,
            deleted: false,
        }
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn status(mut self, status: ReclamationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Marks the ticket resolved after `hours`; Closed tickets close at the same instant
    pub fn resolved_after_hours(mut self, hours: i64) -> Self {
        self.resolved_at = Some(self.created_at + Duration::hours(hours));
        self
    }

    /// Overrides the deadline derived from priority; `None` clears it
    pub fn sla_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.sla_deadline = Some(deadline);
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn build(self) -> Reclamation {
        let mut reclamation = Reclamation::open(
            NewReclamation {
                client_id: self.client_id,
                article_id: None,
                title: self.title,
                description: None,
                priority: Some(self.priority),
            },
            self.created_at,
        )
        .expect("builder title is valid");

        reclamation.status = self.status;
        reclamation.is_deleted = self.deleted;
        reclamation.sla_deadline = self
            .sla_deadline
            .unwrap_or_else(|| Some(compute_sla_deadline(self.created_at, self.priority)));

        match self.status {
            ReclamationStatus::Resolved => {
                reclamation.resolved_at = self.resolved_at.or(Some(self.created_at));
            }
            ReclamationStatus::Closed => {
                let resolved = self.resolved_at.unwrap_or(self.created_at);
                reclamation.resolved_at = Some(resolved);
                reclamation.closed_at = Some(resolved);
            }
            _ => {}
        }
        reclamation
    }
}

/// Builder for technician interventions
pub struct InterventionBuilder {
    reclamation_id: ReclamationId,
    technician_id: TechnicianId,
    status: InterventionStatus,
    scheduled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    labour_hours: Decimal,
    hourly_rate: Money,
    under_warranty: bool,
}

impl Default for InterventionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterventionBuilder {
    pub fn new() -> Self {
        Self {
            reclamation_id: ReclamationId::new_v7(),
            technician_id: TechnicianId::new_v7(),
            status: InterventionStatus::Planned,
            scheduled_at: TemporalFixtures::reference_now(),
            completed_at: None,
            labour_hours: Decimal::ZERO,
            hourly_rate: MoneyFixtures::hourly_rate(),
            under_warranty: false,
        }
    }

    pub fn reclamation(mut self, id: ReclamationId) -> Self {
        self.reclamation_id = id;
        self
    }

    pub fn technician(mut self, id: TechnicianId) -> Self {
        self.technician_id = id;
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = at;
        self
    }

    pub fn status(mut self, status: InterventionStatus) -> Self {
        self.status = status;
        self
    }

    /// Completed at `at` after `hours` of labour
    pub fn completed(mut self, at: DateTime<Utc>, hours: Decimal) -> Self {
        self.status = InterventionStatus::Completed;
        self.completed_at = Some(at);
        self.labour_hours = hours;
        self
    }

    pub fn under_warranty(mut self) -> Self {
        self.under_warranty = true;
        self
    }

    pub fn build(self) -> Intervention {
        let mut intervention = Intervention::schedule(
            ScheduleIntervention {
                reclamation_id: self.reclamation_id,
                technician_id: self.technician_id,
                scheduled_at: self.scheduled_at,
                hourly_rate: self.hourly_rate,
                under_warranty: self.under_warranty,
            },
            self.scheduled_at,
        )
        .expect("builder hourly rate is non-negative");

        intervention.status = self.status;
        intervention.labour_hours = self.labour_hours;
        if self.status != InterventionStatus::Planned {
            intervention.started_at = Some(self.scheduled_at);
        }
        if self.status == InterventionStatus::Completed {
            intervention.completed_at = self.completed_at.or(Some(self.scheduled_at));
            intervention.report = Some("Réparation effectuée".to_string());
        }
        intervention
    }
}

/// Builder for spare parts
pub struct PartBuilder {
    reference: String,
    name: String,
    unit_price: Money,
    stock: u32,
    min_stock_level: u32,
}

impl PartBuilder {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            name: "Pièce détachée".to_string(),
            unit_price: MoneyFixtures::eur(dec!(10.00)),
            stock: 10,
            min_stock_level: 2,
        }
    }

    pub fn unit_price(mut self, price: Money) -> Self {
        self.unit_price = price;
        self
    }

    pub fn stock(mut self, stock: u32, min_level: u32) -> Self {
        self.stock = stock;
        self.min_stock_level = min_level;
        self
    }

    pub fn build(self) -> Part {
        Part::create(
            NewPart {
                reference: self.reference,
                name: self.name,
                unit_price: self.unit_price,
                initial_stock: self.stock,
                min_stock_level: self.min_stock_level,
            },
            TemporalFixtures::reference_now(),
        )
        .expect("builder part is valid")
    }

    /// Same as `build`, with a fixed id
    pub fn build_with_id(self, id: PartId) -> Part {
        let mut part = self.build();
        part.id = id;
        part
    }
}

/// Builder for clients with fake contact details
pub struct ClientBuilder {
    name: String,
    registered_at: DateTime<Utc>,
    active: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            name: FakeData::name(),
            registered_at: TemporalFixtures::reference_now(),
            active: true,
        }
    }

    pub fn registered_at(mut self, at: DateTime<Utc>) -> Self {
        self.registered_at = at;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Client {
        let mut client = Client::register(
            NewClient {
                name: self.name,
                email: Some(FakeData::email()),
                phone: Some(FakeData::phone()),
                address: Some(FakeData::address()),
            },
            self.registered_at,
        )
        .expect("fake client data is valid");

        if !self.active {
            client.deactivate(self.registered_at);
        }
        client
    }
}

/// Builder for invoices in any status
pub struct InvoiceBuilder {
    client_id: ClientId,
    intervention_id: Option<InterventionId>,
    currency: Currency,
    amount: Decimal,
    created_at: DateTime<Utc>,
    status: InvoiceStatus,
    due_date: Option<NaiveDate>,
    paid_at: Option<DateTime<Utc>>,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        Self {
            client_id: ClientId::new_v7(),
            intervention_id: None,
            currency: Currency::EUR,
            amount: dec!(100.00),
            created_at: TemporalFixtures::reference_now(),
            status: InvoiceStatus::Draft,
            due_date: None,
            paid_at: None,
        }
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn intervention(mut self, id: InterventionId) -> Self {
        self.intervention_id = Some(id);
        self
    }

    /// Net amount of the single labour line
    pub fn amount(mut self, amount: Decimal, currency: Currency) -> Self {
        self.amount = amount;
        self.currency = currency;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Issued on `created_at`, with an explicit due date when given
    pub fn issued(mut self, due_date: Option<NaiveDate>) -> Self {
        self.status = InvoiceStatus::Issued;
        self.due_date = due_date;
        self
    }

    pub fn paid_at(mut self, at: DateTime<Utc>) -> Self {
        self.status = InvoiceStatus::Paid;
        self.paid_at = Some(at);
        self
    }

    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::draft(self.client_id, self.currency, self.created_at);
        invoice.intervention_id = self.intervention_id;
        invoice
            .add_line(
                InvoiceLine::new(
                    InvoiceLineKind::Labour,
                    "Main d'oeuvre",
                    Decimal::ONE,
                    Money::new(self.amount, self.currency),
                ),
                self.created_at,
            )
            .expect("draft accepts lines in its own currency");

        if self.status == InvoiceStatus::Draft {
            return invoice;
        }

        invoice.issue(self.created_at).expect("invoice has a line");
        if let Some(due) = self.due_date {
            invoice.due_date = Some(due);
        }
        if let Some(paid_at) = self.paid_at {
            invoice
                .mark_paid(PaymentMethod::BankTransfer, paid_at)
                .expect("issued invoice can be paid");
        }
        invoice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_reclamation_has_resolution_stamps() {
        let rec = ReclamationBuilder::new()
            .priority(Priority::High)
            .status(ReclamationStatus::Closed)
            .resolved_after_hours(10)
            .build();

        assert_eq!(rec.resolution_time(), Some(Duration::hours(10)));
        assert!(rec.resolved_within_sla());
        assert!(!rec.is_open());
    }

    #[test]
    fn test_completed_intervention_costs() {
        let intervention = InterventionBuilder::new()
            .completed(TemporalFixtures::reference_now(), dec!(2))
            .build();
        assert_eq!(intervention.total_cost().unwrap().amount(), dec!(90.00));
    }

    #[test]
    fn test_paid_invoice_carries_revenue() {
        let paid_at = TemporalFixtures::hours_from_now(2);
        let invoice = InvoiceBuilder::new().paid_at(paid_at).build();

        let (at, total) = invoice.revenue().unwrap();
        assert_eq!(at, paid_at);
        assert_eq!(total.amount(), dec!(120.00));
    }

    #[test]
    fn test_low_stock_part() {
        let part = PartBuilder::new("b-200").stock(1, 2).build();
        assert_eq!(part.reference, "B-200");
        assert!(part.is_low_stock());
    }

    #[test]
    fn test_inactive_client() {
        assert!(!ClientBuilder::new().inactive().build().is_active);
    }
}
