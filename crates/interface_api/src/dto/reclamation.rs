//! Reclamation DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ArticleId, ClientId};
use domain_reclamation::{
    NewReclamation, Priority, Reclamation, ReclamationHistory, ReclamationQuery, ReclamationStatus,
    SlaReport, TransitionRequest,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReclamationRequest {
    pub client_id: Uuid,
    pub article_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

impl From<CreateReclamationRequest> for NewReclamation {
    fn from(request: CreateReclamationRequest) -> Self {
        NewReclamation {
            client_id: ClientId::from_uuid(request.client_id),
            article_id: request.article_id.map(ArticleId::from_uuid),
            title: request.title,
            description: request.description,
            priority: request.priority,
        }
    }
}

/// Body of `PUT /reclamations/:id/transition`
#[derive(Debug, Deserialize, Validate)]
pub struct TransitionReclamationRequest {
    pub status: Option<ReclamationStatus>,
    pub priority: Option<Priority>,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl From<TransitionReclamationRequest> for TransitionRequest {
    fn from(request: TransitionReclamationRequest) -> Self {
        TransitionRequest {
            new_status: request.status,
            new_priority: request.priority,
            comment: request.comment,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DeleteReclamationParams {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListReclamationsParams {
    pub client_id: Option<Uuid>,
    pub status: Option<ReclamationStatus>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub include_deleted: bool,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<ListReclamationsParams> for ReclamationQuery {
    fn from(params: ListReclamationsParams) -> Self {
        ReclamationQuery {
            client_id: params.client_id.map(ClientId::from_uuid),
            status: params.status,
            priority: params.priority,
            include_deleted: params.include_deleted,
            limit: Some(params.limit.unwrap_or(100)),
            offset: params.offset,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReclamationResponse {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub article_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: ReclamationStatus,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl From<Reclamation> for ReclamationResponse {
    fn from(r: Reclamation) -> Self {
        Self {
            id: *r.id.as_uuid(),
            number: r.number,
            client_id: *r.client_id.as_uuid(),
            article_id: r.article_id.map(|a| *a.as_uuid()),
            title: r.title,
            description: r.description,
            priority: r.priority,
            status: r.status,
            sla_deadline: r.sla_deadline,
            is_deleted: r.is_deleted,
            created_at: r.created_at,
            updated_at: r.updated_at,
            resolved_at: r.resolved_at,
            closed_at: r.closed_at,
            version: r.version,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    pub old_status: ReclamationStatus,
    pub new_status: ReclamationStatus,
    pub old_priority: Priority,
    pub new_priority: Priority,
    pub actor: String,
    pub comment: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl From<ReclamationHistory> for HistoryEntryResponse {
    fn from(h: ReclamationHistory) -> Self {
        Self {
            id: *h.id.as_uuid(),
            old_status: h.old_status,
            new_status: h.new_status,
            old_priority: h.old_priority,
            new_priority: h.new_priority,
            actor: h.actor,
            comment: h.comment,
            changed_at: h.changed_at,
        }
    }
}

/// Result of a lifecycle change: the new state and the entry it produced
#[derive(Debug, Serialize, Deserialize)]
pub struct TransitionResponse {
    pub reclamation: ReclamationResponse,
    pub history_entry: HistoryEntryResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlaResponse {
    pub reclamation_id: Uuid,
    #[serde(flatten)]
    pub report: SlaReport,
}
