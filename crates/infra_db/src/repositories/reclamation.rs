//! PostgreSQL reclamation repository
//!
//! Implements `ReclamationPort`. A lifecycle commit runs in one transaction:
//!
//! 1. `UPDATE reclamations ... WHERE id = $1 AND version = $2`
//! 2. zero rows: `NotFound` if the row is gone, `ConcurrentModification`
//!    otherwise, and the transaction is rolled back
//! 3. stamp the history entry after the latest stored one and insert it
//!
//! The row lock taken by the update serializes concurrent commits on the
//! same reclamation, so the history timestamp read in step 3 is stable.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, ArticleId, ClientId, DomainPort, HealthCheckResult, HealthCheckable,
    HistoryEntryId, PortError, ReclamationId,
};
use domain_reclamation::history::next_timestamp;
use domain_reclamation::{
    Priority, Reclamation, ReclamationHistory, ReclamationPort, ReclamationQuery,
    ReclamationStatus,
};

use crate::error::DatabaseError;

const RECLAMATION_COLUMNS: &str = "id, number, client_id, article_id, title, description, \
    priority, status, sla_deadline, is_deleted, created_at, updated_at, resolved_at, \
    closed_at, version";

const HISTORY_COLUMNS: &str = "id, reclamation_id, old_status, new_status, old_priority, \
    new_priority, actor, comment, changed_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReclamationRow {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub article_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: i16,
    pub status: String,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub version: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRow {
    pub id: Uuid,
    pub reclamation_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub old_priority: i16,
    pub new_priority: i16,
    pub actor: String,
    pub comment: Option<String>,
    pub changed_at: DateTime<Utc>,
}

pub(crate) fn decode_priority(code: i16) -> Result<Priority, DatabaseError> {
    Priority::from_code(code).ok_or_else(|| DatabaseError::corrupt("priority", code))
}

pub(crate) fn decode_status(value: &str) -> Result<ReclamationStatus, DatabaseError> {
    value
        .parse()
        .map_err(|_| DatabaseError::corrupt("status", value))
}

impl TryFrom<ReclamationRow> for Reclamation {
    type Error = DatabaseError;

    fn try_from(row: ReclamationRow) -> Result<Self, Self::Error> {
        Ok(Reclamation {
            id: ReclamationId::from_uuid(row.id),
            number: row.number,
            client_id: ClientId::from_uuid(row.client_id),
            article_id: row.article_id.map(ArticleId::from_uuid),
            title: row.title,
            description: row.description,
            priority: decode_priority(row.priority)?,
            status: decode_status(&row.status)?,
            sla_deadline: row.sla_deadline,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
            resolved_at: row.resolved_at,
            closed_at: row.closed_at,
            version: row.version,
        })
    }
}

impl TryFrom<HistoryRow> for ReclamationHistory {
    type Error = DatabaseError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(ReclamationHistory {
            id: HistoryEntryId::from_uuid(row.id),
            reclamation_id: ReclamationId::from_uuid(row.reclamation_id),
            old_status: decode_status(&row.old_status)?,
            new_status: decode_status(&row.new_status)?,
            old_priority: decode_priority(row.old_priority)?,
            new_priority: decode_priority(row.new_priority)?,
            actor: row.actor,
            comment: row.comment,
            changed_at: row.changed_at,
        })
    }
}

fn db(error: sqlx::Error) -> PortError {
    DatabaseError::from(error).into()
}

#[derive(Debug, Clone)]
pub struct PostgresReclamationRepository {
    pool: PgPool,
}

impl PostgresReclamationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn update_row(
        conn: &mut PgConnection,
        reclamation: &Reclamation,
        expected_version: i64,
    ) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE reclamations SET
                title = $3,
                description = $4,
                priority = $5,
                status = $6,
                sla_deadline = $7,
                is_deleted = $8,
                updated_at = $9,
                resolved_at = $10,
                closed_at = $11,
                version = $12
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(*reclamation.id.as_uuid())
        .bind(expected_version)
        .bind(&reclamation.title)
        .bind(&reclamation.description)
        .bind(reclamation.priority.code())
        .bind(reclamation.status.as_str())
        .bind(reclamation.sla_deadline)
        .bind(reclamation.is_deleted)
        .bind(reclamation.updated_at)
        .bind(reclamation.resolved_at)
        .bind(reclamation.closed_at)
        .bind(reclamation.version)
        .execute(&mut *conn)
        .await
        .map_err(db)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM reclamations WHERE id = $1)")
                .bind(*reclamation.id.as_uuid())
                .fetch_one(&mut *conn)
                .await
                .map_err(db)?;

        if exists {
            warn!(reclamation_id = %reclamation.id, expected_version, "Version check failed");
            Err(PortError::concurrent_modification(
                "Reclamation",
                reclamation.id,
                expected_version,
            ))
        } else {
            Err(PortError::not_found("Reclamation", reclamation.id))
        }
    }

    async fn insert_history(
        conn: &mut PgConnection,
        mut entry: ReclamationHistory,
    ) -> Result<ReclamationHistory, PortError> {
        let latest: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT max(changed_at) FROM reclamation_history WHERE reclamation_id = $1",
        )
        .bind(*entry.reclamation_id.as_uuid())
        .fetch_one(&mut *conn)
        .await
        .map_err(db)?;

        // Stored precision is microseconds
        entry.changed_at = next_timestamp(latest, entry.changed_at.trunc_subsecs(6));

        sqlx::query(&format!(
            "INSERT INTO reclamation_history ({HISTORY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(*entry.id.as_uuid())
        .bind(*entry.reclamation_id.as_uuid())
        .bind(entry.old_status.as_str())
        .bind(entry.new_status.as_str())
        .bind(entry.old_priority.code())
        .bind(entry.new_priority.code())
        .bind(&entry.actor)
        .bind(&entry.comment)
        .bind(entry.changed_at)
        .execute(&mut *conn)
        .await
        .map_err(db)?;

        Ok(entry)
    }
}

impl DomainPort for PostgresReclamationRepository {}

#[async_trait]
impl HealthCheckable for PostgresReclamationRepository {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        HealthCheckResult {
            adapter_id: "postgres-reclamations".to_string(),
            status: if result.is_ok() {
                AdapterHealth::Healthy
            } else {
                AdapterHealth::Unhealthy
            },
            latency_ms,
            message: result.err().map(|e| format!("Database error: {}", e)),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ReclamationPort for PostgresReclamationRepository {
    async fn load_reclamation(&self, id: ReclamationId) -> Result<Reclamation, PortError> {
        debug!(reclamation_id = %id, "SELECT reclamation");
        let row = sqlx::query_as::<_, ReclamationRow>(&format!(
            "SELECT {RECLAMATION_COLUMNS} FROM reclamations WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?
        .ok_or_else(|| PortError::not_found("Reclamation", id))?;

        Ok(Reclamation::try_from(row)?)
    }

    async fn insert_reclamation(&self, reclamation: &Reclamation) -> Result<(), PortError> {
        sqlx::query(&format!(
            "INSERT INTO reclamations ({RECLAMATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(*reclamation.id.as_uuid())
        .bind(&reclamation.number)
        .bind(*reclamation.client_id.as_uuid())
        .bind(reclamation.article_id.map(|a| *a.as_uuid()))
        .bind(&reclamation.title)
        .bind(&reclamation.description)
        .bind(reclamation.priority.code())
        .bind(reclamation.status.as_str())
        .bind(reclamation.sla_deadline)
        .bind(reclamation.is_deleted)
        .bind(reclamation.created_at)
        .bind(reclamation.updated_at)
        .bind(reclamation.resolved_at)
        .bind(reclamation.closed_at)
        .bind(reclamation.version)
        .execute(&self.pool)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn save_reclamation(
        &self,
        reclamation: &Reclamation,
        expected_version: i64,
    ) -> Result<(), PortError> {
        let mut conn = self.pool.acquire().await.map_err(db)?;
        Self::update_row(&mut conn, reclamation, expected_version).await
    }

    async fn append_history(
        &self,
        entry: ReclamationHistory,
    ) -> Result<ReclamationHistory, PortError> {
        let mut tx = self.pool.begin().await.map_err(db)?;
        // Serialize with commits on the same reclamation
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM reclamations WHERE id = $1 FOR UPDATE")
                .bind(*entry.reclamation_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db)?;
        if locked.is_none() {
            return Err(PortError::not_found("Reclamation", entry.reclamation_id));
        }
        let entry = Self::insert_history(&mut tx, entry).await?;
        tx.commit().await.map_err(db)?;
        Ok(entry)
    }

    async fn history(&self, id: ReclamationId) -> Result<Vec<ReclamationHistory>, PortError> {
        let rows = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {HISTORY_COLUMNS} FROM reclamation_history \
             WHERE reclamation_id = $1 ORDER BY changed_at ASC"
        ))
        .bind(*id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        rows.into_iter()
            .map(|row| ReclamationHistory::try_from(row).map_err(PortError::from))
            .collect()
    }

    async fn list_reclamations(
        &self,
        query: &ReclamationQuery,
    ) -> Result<Vec<Reclamation>, PortError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {RECLAMATION_COLUMNS} FROM reclamations WHERE TRUE"
        ));
        if !query.include_deleted {
            builder.push(" AND NOT is_deleted");
        }
        if let Some(client_id) = query.client_id {
            builder.push(" AND client_id = ").push_bind(*client_id.as_uuid());
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(priority) = query.priority {
            builder.push(" AND priority = ").push_bind(priority.code());
        }
        builder.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }
        if let Some(offset) = query.offset {
            builder.push(" OFFSET ").push_bind(i64::from(offset));
        }

        let rows = builder
            .build_query_as::<ReclamationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        rows.into_iter()
            .map(|row| Reclamation::try_from(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, reclamation, entry), fields(reclamation_id = %reclamation.id))]
    async fn commit_transition(
        &self,
        reclamation: &Reclamation,
        expected_version: i64,
        entry: ReclamationHistory,
    ) -> Result<ReclamationHistory, PortError> {
        let mut tx = self.pool.begin().await.map_err(db)?;
        Self::update_row(&mut tx, reclamation, expected_version).await?;
        let entry = Self::insert_history(&mut tx, entry).await?;
        tx.commit().await.map_err(db)?;

        debug!(version = reclamation.version, "Transition committed");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ReclamationRow {
        let now = Utc::now();
        ReclamationRow {
            id: Uuid::now_v7(),
            number: "REC-202401-000042".to_string(),
            client_id: Uuid::now_v7(),
            article_id: None,
            title: "Sèche-linge ne chauffe plus".to_string(),
            description: None,
            priority: 3,
            status: "pending_parts".to_string(),
            sla_deadline: Some(now),
            is_deleted: false,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            closed_at: None,
            version: 3,
        }
    }

    #[test]
    fn test_row_decodes() {
        let rec = Reclamation::try_from(row()).unwrap();
        assert_eq!(rec.priority, Priority::Urgent);
        assert_eq!(rec.status, ReclamationStatus::PendingParts);
        assert_eq!(rec.version, 3);
    }

    #[test]
    fn test_unknown_priority_is_corrupt() {
        let mut bad = row();
        bad.priority = 9;
        assert!(matches!(
            Reclamation::try_from(bad),
            Err(DatabaseError::CorruptRow(_))
        ));
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let mut bad = row();
        bad.status = "assigned".to_string();
        assert!(Reclamation::try_from(bad).is_err());
    }

    #[test]
    fn test_status_codes_match_schema() {
        let allowed = ["new", "in_progress", "pending_parts", "resolved", "closed", "cancelled"];
        for status in ReclamationStatus::ALL {
            assert!(allowed.contains(&status.as_str()));
        }
    }
}
