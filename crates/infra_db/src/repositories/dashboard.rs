//! PostgreSQL snapshot source for the dashboard

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, ClientId, Currency, DomainPort, HealthCheckResult, HealthCheckable,
    InterventionId, InvoiceId, Money, PartId, PortError, Rate, ReclamationId, TechnicianId,
};
use domain_billing::{Invoice, InvoiceLine};
use domain_client::{Address, Client};
use domain_dashboard::{DashboardSnapshot, DashboardSource};
use domain_intervention::{Intervention, PartUsage};
use domain_inventory::Part;
use domain_reclamation::Reclamation;

use super::reclamation::ReclamationRow;
use crate::error::DatabaseError;

#[derive(Debug, sqlx::FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Json<Address>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct InterventionRow {
    pub id: Uuid,
    pub reclamation_id: Uuid,
    pub technician_id: Uuid,
    pub status: String,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub report: Option<String>,
    pub labour_hours: Decimal,
    pub hourly_rate: Decimal,
    pub currency: String,
    pub parts_used: Json<Vec<PartUsage>>,
    pub under_warranty: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct PartRow {
    pub id: Uuid,
    pub reference: String,
    pub name: String,
    pub unit_price: Decimal,
    pub currency: String,
    pub stock_quantity: i32,
    pub min_stock_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub intervention_id: Option<Uuid>,
    pub currency: String,
    pub lines: Json<Vec<InvoiceLine>>,
    pub subtotal: Decimal,
    pub vat_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn currency(code: &str) -> Result<Currency, DatabaseError> {
    code.trim().parse().map_err(|_| DatabaseError::corrupt("currency", code))
}

fn quantity(column: &str, value: i32) -> Result<u32, DatabaseError> {
    u32::try_from(value).map_err(|_| DatabaseError::corrupt(column, value))
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: ClientId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address.map(|Json(address)| address),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<InterventionRow> for Intervention {
    type Error = DatabaseError;

    fn try_from(row: InterventionRow) -> Result<Self, Self::Error> {
        Ok(Intervention {
            id: InterventionId::from_uuid(row.id),
            reclamation_id: ReclamationId::from_uuid(row.reclamation_id),
            technician_id: TechnicianId::from_uuid(row.technician_id),
            status: row
                .status
                .parse()
                .map_err(|_| DatabaseError::corrupt("intervention status", &row.status))?,
            scheduled_at: row.scheduled_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            report: row.report,
            labour_hours: row.labour_hours,
            hourly_rate: Money::new(row.hourly_rate, currency(&row.currency)?),
            parts_used: row.parts_used.0,
            under_warranty: row.under_warranty,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<PartRow> for Part {
    type Error = DatabaseError;

    fn try_from(row: PartRow) -> Result<Self, Self::Error> {
        Ok(Part {
            id: PartId::from_uuid(row.id),
            reference: row.reference,
            name: row.name,
            unit_price: Money::new(row.unit_price, currency(&row.currency)?),
            stock_quantity: quantity("stock_quantity", row.stock_quantity)?,
            min_stock_level: quantity("min_stock_level", row.min_stock_level)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DatabaseError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let currency = currency(&row.currency)?;
        let payment_method = row
            .payment_method
            .as_deref()
            .map(|m| m.parse().map_err(|_| DatabaseError::corrupt("payment_method", m)))
            .transpose()?;

        Ok(Invoice {
            id: InvoiceId::from_uuid(row.id),
            number: row.number,
            client_id: ClientId::from_uuid(row.client_id),
            intervention_id: row.intervention_id.map(InterventionId::from_uuid),
            currency,
            lines: row.lines.0,
            subtotal: Money::new(row.subtotal, currency),
            vat_rate: Rate::new(row.vat_rate),
            tax: Money::new(row.tax, currency),
            total: Money::new(row.total, currency),
            status: row
                .status
                .parse()
                .map_err(|_| DatabaseError::corrupt("invoice status", &row.status))?,
            issued_at: row.issued_at,
            due_date: row.due_date,
            paid_at: row.paid_at,
            payment_method,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, PortError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(PortError::from))
        .collect()
}

/// Reads the five dashboard tables in one repeatable-read transaction
#[derive(Debug, Clone)]
pub struct PostgresDashboardSource {
    pool: PgPool,
}

impl PostgresDashboardSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresDashboardSource {}

#[async_trait]
impl HealthCheckable for PostgresDashboardSource {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => HealthCheckResult::healthy(
                "postgres-dashboard",
                start.elapsed().as_millis() as u64,
            ),
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-dashboard".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms: start.elapsed().as_millis() as u64,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl DashboardSource for PostgresDashboardSource {
    async fn load_snapshot(&self) -> Result<DashboardSnapshot, PortError> {
        let db = |e: sqlx::Error| PortError::from(DatabaseError::from(e));
        let mut tx = self.pool.begin().await.map_err(db)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(db)?;

        let reclamations: Vec<ReclamationRow> = sqlx::query_as(
            "SELECT id, number, client_id, article_id, title, description, priority, status, \
             sla_deadline, is_deleted, created_at, updated_at, resolved_at, closed_at, version \
             FROM reclamations",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(db)?;

        let interventions: Vec<InterventionRow> = sqlx::query_as("SELECT * FROM interventions")
            .fetch_all(&mut *tx)
            .await
            .map_err(db)?;

        let parts: Vec<PartRow> = sqlx::query_as("SELECT * FROM parts ORDER BY reference")
            .fetch_all(&mut *tx)
            .await
            .map_err(db)?;

        let clients: Vec<ClientRow> = sqlx::query_as("SELECT * FROM clients")
            .fetch_all(&mut *tx)
            .await
            .map_err(db)?;

        let invoices: Vec<InvoiceRow> =
            sqlx::query_as("SELECT * FROM invoices WHERE status <> 'draft'")
                .fetch_all(&mut *tx)
                .await
                .map_err(db)?;

        tx.commit().await.map_err(db)?;

        debug!(
            reclamations = reclamations.len(),
            interventions = interventions.len(),
            parts = parts.len(),
            clients = clients.len(),
            invoices = invoices.len(),
            "Dashboard snapshot read"
        );

        Ok(DashboardSnapshot {
            reclamations: decode_all::<_, Reclamation>(reclamations)?,
            interventions: decode_all(interventions)?,
            parts: decode_all(parts)?,
            clients: clients.into_iter().map(Client::from).collect(),
            invoices: decode_all(invoices)?,
        })
    }
}
