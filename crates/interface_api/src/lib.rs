//! HTTP API Layer
//!
//! This crate provides the REST API for the after-sales service back end
//! using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for reclamations, the dashboard and health
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(reclamations, dashboard, config);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_dashboard::DashboardService;
use domain_reclamation::ReclamationService;

use crate::config::ApiConfig;
use crate::handlers::{dashboard, health, reclamation};
use crate::middleware::{audit_middleware, auth_middleware};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub reclamations: ReclamationService,
    pub dashboard: DashboardService,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        reclamations: ReclamationService,
        dashboard: DashboardService,
        config: ApiConfig,
    ) -> Self {
        Self {
            reclamations,
            dashboard,
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let reclamation_routes = Router::new()
        .route(
            "/",
            post(reclamation::create_reclamation).get(reclamation::list_reclamations),
        )
        .route(
            "/:id",
            get(reclamation::get_reclamation).delete(reclamation::delete_reclamation),
        )
        .route("/:id/transition", put(reclamation::transition_reclamation))
        .route("/:id/history", get(reclamation::get_history))
        .route("/:id/sla", get(reclamation::get_sla))
        .route("/:id/sla/recompute", post(reclamation::recompute_sla));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/reclamations", reclamation_routes)
        .route("/dashboard", get(dashboard::get_dashboard))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
