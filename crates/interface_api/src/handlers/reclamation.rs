//! Reclamation handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::ReclamationId;

use crate::auth::{permissions, Claims};
use crate::dto::reclamation::*;
use crate::{error::ApiError, AppState};

/// Opens a new reclamation
pub async fn create_reclamation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateReclamationRequest>,
) -> Result<(StatusCode, Json<ReclamationResponse>), ApiError> {
    claims.require(permissions::RECLAMATION_WRITE)?;
    request.validate()?;

    let reclamation = state
        .reclamations
        .open(request.into(), claims.actor())
        .await?;

    Ok((StatusCode::CREATED, Json(reclamation.into())))
}

/// Lists reclamations, newest first
pub async fn list_reclamations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListReclamationsParams>,
) -> Result<Json<Vec<ReclamationResponse>>, ApiError> {
    claims.require(permissions::RECLAMATION_READ)?;
    params.validate()?;

    let found = state.reclamations.list(&params.into()).await?;
    Ok(Json(found.into_iter().map(Into::into).collect()))
}

/// Gets a reclamation by ID
pub async fn get_reclamation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReclamationResponse>, ApiError> {
    claims.require(permissions::RECLAMATION_READ)?;

    let reclamation = state.reclamations.get(ReclamationId::from_uuid(id)).await?;
    Ok(Json(reclamation.into()))
}

/// Changes status and/or priority
pub async fn transition_reclamation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionReclamationRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    claims.require(permissions::RECLAMATION_WRITE)?;
    request.validate()?;

    let outcome = state
        .reclamations
        .transition(ReclamationId::from_uuid(id), request.into(), claims.actor())
        .await?;

    Ok(Json(TransitionResponse {
        reclamation: outcome.reclamation.into(),
        history_entry: outcome.entry.into(),
    }))
}

/// Re-derives the SLA deadline from the current priority
pub async fn recompute_sla(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, ApiError> {
    claims.require(permissions::RECLAMATION_WRITE)?;

    let outcome = state
        .reclamations
        .recompute_sla_deadline(ReclamationId::from_uuid(id), claims.actor())
        .await?;

    Ok(Json(TransitionResponse {
        reclamation: outcome.reclamation.into(),
        history_entry: outcome.entry.into(),
    }))
}

/// Soft-deletes a reclamation
pub async fn delete_reclamation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteReclamationParams>,
) -> Result<Json<TransitionResponse>, ApiError> {
    claims.require(permissions::RECLAMATION_DELETE)?;
    params.validate()?;

    let outcome = state
        .reclamations
        .soft_delete(ReclamationId::from_uuid(id), claims.actor(), params.reason.as_deref())
        .await?;

    Ok(Json(TransitionResponse {
        reclamation: outcome.reclamation.into(),
        history_entry: outcome.entry.into(),
    }))
}

/// History of a reclamation, oldest first
pub async fn get_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoryEntryResponse>>, ApiError> {
    claims.require(permissions::RECLAMATION_READ)?;

    let entries = state.reclamations.history(ReclamationId::from_uuid(id)).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Current SLA standing
pub async fn get_sla(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<SlaResponse>, ApiError> {
    claims.require(permissions::RECLAMATION_READ)?;

    let report = state.reclamations.sla(ReclamationId::from_uuid(id)).await?;
    Ok(Json(SlaResponse {
        reclamation_id: id,
        report,
    }))
}
