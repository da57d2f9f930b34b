//! Dashboard handler

use axum::{extract::State, Extension, Json};

use domain_dashboard::DashboardStats;

use crate::auth::{permissions, Claims};
use crate::{error::ApiError, AppState};

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DashboardStats>, ApiError> {
    claims.require(permissions::DASHBOARD_READ)?;
    Ok(Json(state.dashboard.stats().await?))
}
