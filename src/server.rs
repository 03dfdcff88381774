// Axum server for the upload-and-check page
//
// Stateless apart from the immutable validator: each upload runs the whole
// pipeline on its own table and renders the outcome directly.

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, ValidatorConfig};
use crate::error::ValidationError;
use crate::pipeline::DropoffValidator;
use crate::web::handlers::pages::{self, HomeTemplate};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<DropoffValidator>,
}

impl AppState {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            validator: Arc::new(DropoffValidator::new(config)),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState, server_config: &ServerConfig) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Pages
        .route("/", get(pages::home_page))
        .route("/validate", post(pages::validate_page))

        // Middleware (applied in reverse order)
        .layer(DefaultBodyLimit::max(server_config.max_upload_bytes))
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    /// Operator-facing failure; the upload page is shown again with the message
    Validation { message: String, threshold_km: f64 },
    BadRequest(String),
    Internal(String),
}

impl AppError {
    pub fn from_validation(err: ValidationError, threshold_km: f64) -> Self {
        if err.is_user_error() {
            AppError::Validation {
                message: err.to_string(),
                threshold_km,
            }
        } else {
            tracing::error!("Validation pipeline failed: {}", err);
            AppError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Validation { message, threshold_km } => {
                let page = HomeTemplate::with_error(threshold_km, message);
                return (StatusCode::UNPROCESSABLE_ENTITY, Html(pages::render(&page)))
                    .into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
