//! Reclamation lifecycle service
//!
//! Loads a reclamation through the port, applies a pure lifecycle operation
//! and commits the result with the loaded version as the expected version.
//! Failures go back to the caller untouched; nothing is retried here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use core_kernel::{Clock, ReclamationId};

use crate::error::LifecycleError;
use crate::history::ReclamationHistory;
use crate::lifecycle::{self, TransitionRequest};
use crate::ports::{ReclamationPort, ReclamationQuery};
use crate::reclamation::{NewReclamation, Reclamation};
use crate::sla::SlaReport;

/// Outcome of a successful lifecycle operation
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub reclamation: Reclamation,
    pub entry: ReclamationHistory,
}

#[derive(Clone)]
pub struct ReclamationService {
    port: Arc<dyn ReclamationPort>,
    clock: Arc<dyn Clock>,
}

impl ReclamationService {
    pub fn new(port: Arc<dyn ReclamationPort>, clock: Arc<dyn Clock>) -> Self {
        Self { port, clock }
    }

    pub fn port(&self) -> &Arc<dyn ReclamationPort> {
        &self.port
    }

    /// Opens a new reclamation
    pub async fn open(
        &self,
        request: NewReclamation,
        actor: &str,
    ) -> Result<Reclamation, LifecycleError> {
        let reclamation = Reclamation::open(request, self.clock.now())?;
        self.port.insert_reclamation(&reclamation).await?;

        info!(
            reclamation_id = %reclamation.id,
            number = %reclamation.number,
            priority = %reclamation.priority,
            actor,
            "Reclamation opened"
        );
        Ok(reclamation)
    }

    pub async fn get(&self, id: ReclamationId) -> Result<Reclamation, LifecycleError> {
        debug!(reclamation_id = %id, "Loading reclamation");
        Ok(self.port.load_reclamation(id).await?)
    }

    pub async fn list(&self, query: &ReclamationQuery) -> Result<Vec<Reclamation>, LifecycleError> {
        Ok(self.port.list_reclamations(query).await?)
    }

    /// SLA standing of a reclamation right now
    pub async fn sla(&self, id: ReclamationId) -> Result<SlaReport, LifecycleError> {
        let reclamation = self.get(id).await?;
        Ok(SlaReport::for_reclamation(&reclamation, self.clock.now()))
    }

    /// History of a reclamation, oldest first
    pub async fn history(
        &self,
        id: ReclamationId,
    ) -> Result<Vec<ReclamationHistory>, LifecycleError> {
        // Surface NotFound for unknown ids instead of an empty list
        self.port.load_reclamation(id).await?;
        Ok(self.port.history(id).await?)
    }

    /// Changes status and/or priority
    pub async fn transition(
        &self,
        id: ReclamationId,
        request: TransitionRequest,
        actor: &str,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(id, actor, "transition", |current, now| {
            lifecycle::transition(current, &request, actor, now)
        })
        .await
    }

    /// Re-derives the SLA deadline from the current priority
    pub async fn recompute_sla_deadline(
        &self,
        id: ReclamationId,
        actor: &str,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(id, actor, "recompute_sla_deadline", |current, now| {
            lifecycle::recompute_sla_deadline(current, actor, now)
        })
        .await
    }

    /// Soft-deletes a reclamation
    pub async fn soft_delete(
        &self,
        id: ReclamationId,
        actor: &str,
        reason: Option<&str>,
    ) -> Result<TransitionOutcome, LifecycleError> {
        self.apply(id, actor, "soft_delete", |current, now| {
            lifecycle::soft_delete(current, actor, reason, now)
        })
        .await
    }

    async fn apply<F>(
        &self,
        id: ReclamationId,
        actor: &str,
        operation: &'static str,
        op: F,
    ) -> Result<TransitionOutcome, LifecycleError>
    where
        F: FnOnce(
            &Reclamation,
            chrono::DateTime<chrono::Utc>,
        ) -> Result<(Reclamation, ReclamationHistory), LifecycleError>,
    {
        let current = self.port.load_reclamation(id).await?;

        let (updated, entry) = match op(&current, self.clock.now()) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    reclamation_id = %id,
                    operation,
                    actor,
                    error = %e,
                    "Lifecycle operation rejected"
                );
                return Err(e);
            }
        };

        let entry = match self
            .port
            .commit_transition(&updated, current.version, entry)
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                let e = LifecycleError::from(e);
                if e.is_retryable() {
                    warn!(
                        reclamation_id = %id,
                        operation,
                        expected_version = current.version,
                        "Concurrent modification detected"
                    );
                }
                return Err(e);
            }
        };

        info!(
            reclamation_id = %id,
            operation,
            actor,
            old_status = %entry.old_status,
            new_status = %entry.new_status,
            old_priority = %entry.old_priority,
            new_priority = %entry.new_priority,
            version = updated.version,
            "Reclamation updated"
        );

        Ok(TransitionOutcome {
            reclamation: updated,
            entry,
        })
    }
}
