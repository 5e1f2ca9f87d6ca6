//! HTTP API Layer
//!
//! This crate provides the REST API for pharmacy claim submission and
//! reversal using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for claims and health checks
//! - **Middleware**: Request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//! - **Audit**: File-backed audit sink used by the server binary
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service));
//! axum::serve(listener, app).await?;
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use domain_claims::ClaimsService;

use crate::handlers::{claims, health};
use crate::middleware::request_logging;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClaimsService>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: Arc<ClaimsService>) -> Self {
        Self {
            service,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared service and request settings
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let timeout = state.request_timeout;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/claim", post(claims::submit_claim))
        .route("/claim/:id", get(claims::get_claim))
        .route("/reversal", post(claims::reverse_claim))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
                .layer(axum_middleware::from_fn(request_logging)),
        )
        .with_state(state)
}
