//! Reclamation Domain Ports
//!
//! `ReclamationPort` is what the lifecycle service needs from storage.
//! Adapters:
//!
//! - **PostgreSQL**: `infra_db::repositories::PostgresReclamationRepository`
//! - **In-memory**: [`memory::InMemoryReclamationPort`], for tests and local runs
//!
//! Writes use compare-and-swap on [`Reclamation::version`]: a save whose
//! expected version no longer matches the stored one fails with
//! `PortError::ConcurrentModification` and changes nothing.

use async_trait::async_trait;

use core_kernel::{ClientId, DomainPort, HealthCheckable, PortError, ReclamationId};

use crate::history::ReclamationHistory;
use crate::reclamation::{Priority, Reclamation, ReclamationStatus};

/// Query parameters for listing reclamations
#[derive(Debug, Clone, Default)]
pub struct ReclamationQuery {
    pub client_id: Option<ClientId>,
    pub status: Option<ReclamationStatus>,
    pub priority: Option<Priority>,
    /// Soft-deleted rows are hidden unless requested
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ReclamationQuery {
    pub fn by_client(client_id: ClientId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Default::default()
        }
    }

    pub fn by_status(status: ReclamationStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// True if `reclamation` passes the filters (pagination aside)
    pub fn matches(&self, reclamation: &Reclamation) -> bool {
        (self.include_deleted || !reclamation.is_deleted)
            && self.client_id.map_or(true, |c| c == reclamation.client_id)
            && self.status.map_or(true, |s| s == reclamation.status)
            && self.priority.map_or(true, |p| p == reclamation.priority)
    }
}

/// Storage for reclamations and their history
#[async_trait]
pub trait ReclamationPort: DomainPort + HealthCheckable {
    /// Loads a reclamation, deleted or not
    async fn load_reclamation(&self, id: ReclamationId) -> Result<Reclamation, PortError>;

    /// Stores a newly opened reclamation
    async fn insert_reclamation(&self, reclamation: &Reclamation) -> Result<(), PortError>;

    /// Replaces the stored reclamation if its version equals `expected_version`
    async fn save_reclamation(
        &self,
        reclamation: &Reclamation,
        expected_version: i64,
    ) -> Result<(), PortError>;

    /// Appends a history entry and returns it as stored
    async fn append_history(
        &self,
        entry: ReclamationHistory,
    ) -> Result<ReclamationHistory, PortError>;

    /// History of one reclamation, oldest first
    async fn history(&self, id: ReclamationId) -> Result<Vec<ReclamationHistory>, PortError>;

    /// Lists reclamations matching the query, newest first
    async fn list_reclamations(
        &self,
        query: &ReclamationQuery,
    ) -> Result<Vec<Reclamation>, PortError>;

    /// Saves the reclamation and appends its history entry
    ///
    /// Adapters with transactions should override this so that both writes
    /// land together or not at all.
    async fn commit_transition(
        &self,
        reclamation: &Reclamation,
        expected_version: i64,
        entry: ReclamationHistory,
    ) -> Result<ReclamationHistory, PortError> {
        self.save_reclamation(reclamation, expected_version).await?;
        self.append_history(entry).await
    }
}

/// In-memory implementation of ReclamationPort
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use chrono::Utc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;
    use crate::history::HistoryLog;

    #[derive(Debug, Default)]
    struct State {
        reclamations: HashMap<ReclamationId, Reclamation>,
        history: HistoryLog,
    }

    impl State {
        fn compare_and_swap(
            &mut self,
            reclamation: &Reclamation,
            expected_version: i64,
        ) -> Result<(), PortError> {
            let stored = self
                .reclamations
                .get_mut(&reclamation.id)
                .ok_or_else(|| PortError::not_found("Reclamation", reclamation.id))?;

            if stored.version != expected_version {
                return Err(PortError::concurrent_modification(
                    "Reclamation",
                    reclamation.id,
                    expected_version,
                ));
            }
            *stored = reclamation.clone();
            Ok(())
        }

        fn append(&mut self, entry: ReclamationHistory) -> Result<ReclamationHistory, PortError> {
            if !self.reclamations.contains_key(&entry.reclamation_id) {
                return Err(PortError::not_found("Reclamation", entry.reclamation_id));
            }
            Ok(self.history.append(entry).clone())
        }
    }

    /// Reclamations and history held in process memory
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryReclamationPort {
        state: Arc<RwLock<State>>,
    }

    impl InMemoryReclamationPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of history entries stored for `id`
        pub async fn history_count(&self, id: ReclamationId) -> usize {
            self.state.read().await.history.count(id)
        }
    }

    impl DomainPort for InMemoryReclamationPort {}

    #[async_trait]
    impl HealthCheckable for InMemoryReclamationPort {
        async fn health_check(&self) -> HealthCheckResult {
            let mut result = HealthCheckResult::healthy("reclamations-memory", 0);
            result.message = Some("In-memory adapter always healthy".to_string());
            result.checked_at = Utc::now();
            result
        }
    }

    #[async_trait]
    impl ReclamationPort for InMemoryReclamationPort {
        async fn load_reclamation(&self, id: ReclamationId) -> Result<Reclamation, PortError> {
            self.state
                .read()
                .await
                .reclamations
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Reclamation", id))
        }

        async fn insert_reclamation(&self, reclamation: &Reclamation) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.reclamations.contains_key(&reclamation.id) {
                return Err(PortError::Conflict {
                    message: format!("Reclamation {} already exists", reclamation.id),
                });
            }
            state.reclamations.insert(reclamation.id, reclamation.clone());
            Ok(())
        }

        async fn save_reclamation(
            &self,
            reclamation: &Reclamation,
            expected_version: i64,
        ) -> Result<(), PortError> {
            self.state
                .write()
                .await
                .compare_and_swap(reclamation, expected_version)
        }

        async fn append_history(
            &self,
            entry: ReclamationHistory,
        ) -> Result<ReclamationHistory, PortError> {
            self.state.write().await.append(entry)
        }

        async fn history(&self, id: ReclamationId) -> Result<Vec<ReclamationHistory>, PortError> {
            Ok(self.state.read().await.history.entries(id).to_vec())
        }

        async fn list_reclamations(
            &self,
            query: &ReclamationQuery,
        ) -> Result<Vec<Reclamation>, PortError> {
            let state = self.state.read().await;
            let mut found: Vec<Reclamation> = state
                .reclamations
                .values()
                .filter(|r| query.matches(r))
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

            let offset = query.offset.unwrap_or(0) as usize;
            let limit = query.limit.map_or(usize::MAX, |l| l as usize);
            Ok(found.into_iter().skip(offset).take(limit).collect())
        }

        async fn commit_transition(
            &self,
            reclamation: &Reclamation,
            expected_version: i64,
            entry: ReclamationHistory,
        ) -> Result<ReclamationHistory, PortError> {
            // Single write lock: both writes or neither
            let mut state = self.state.write().await;
            state.compare_and_swap(reclamation, expected_version)?;
            state.append(entry)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryReclamationPort;
    use super::*;
    use crate::lifecycle::{transition, TransitionRequest};
    use crate::reclamation::NewReclamation;
    use chrono::Utc;

    fn open() -> Reclamation {
        Reclamation::open(
            NewReclamation {
                client_id: ClientId::new_v7(),
                article_id: None,
                title: "Four en panne".to_string(),
                description: None,
                priority: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let port = InMemoryReclamationPort::new();
        let rec = open();
        port.insert_reclamation(&rec).await.unwrap();

        let loaded = port.load_reclamation(rec.id).await.unwrap();
        assert_eq!(loaded, rec);
    }

    #[tokio::test]
    async fn test_load_unknown_is_not_found() {
        let port = InMemoryReclamationPort::new();
        let err = port.load_reclamation(ReclamationId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let port = InMemoryReclamationPort::new();
        let rec = open();
        port.insert_reclamation(&rec).await.unwrap();

        let request = TransitionRequest::status(ReclamationStatus::InProgress);
        let (first, entry) = transition(&rec, &request, "a", Utc::now()).unwrap();
        port.commit_transition(&first, rec.version, entry).await.unwrap();

        // Second writer still holds the original version
        let cancel = TransitionRequest::status(ReclamationStatus::Cancelled);
        let (second, entry) = transition(&rec, &cancel, "b", Utc::now()).unwrap();
        let err = port.commit_transition(&second, rec.version, entry).await.unwrap_err();

        assert!(err.is_concurrent_modification());
        assert_eq!(port.history_count(rec.id).await, 1);
        assert_eq!(
            port.load_reclamation(rec.id).await.unwrap().status,
            ReclamationStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_list_hides_deleted_by_default() {
        let port = InMemoryReclamationPort::new();
        let visible = open();
        let mut deleted = open();
        deleted.is_deleted = true;
        port.insert_reclamation(&visible).await.unwrap();
        port.insert_reclamation(&deleted).await.unwrap();

        let listed = port.list_reclamations(&ReclamationQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, visible.id);

        let all = port
            .list_reclamations(&ReclamationQuery { include_deleted: true, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_health_check() {
        let port = InMemoryReclamationPort::new();
        assert!(port.health_check().await.is_healthy());
    }
}
