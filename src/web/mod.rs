//! Web API module for the sign recognition service.
//!
//! This module exposes the classification pipeline over HTTP so a browser
//! widget can post hand landmarks and get a letter back.
//!
//! # Endpoints
//!
//! - `GET /` - Service descriptor
//! - `GET /health` - Health check (reports whether the model is loaded)
//! - `POST /classify-sign` - Classify 21 hand landmarks
//! - `OPTIONS /classify-sign` - CORS preflight (answered by the CORS layer)
//! - `GET /app` - Camera + recognition page

pub mod static_files;

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::classifier::{Classification, ClassifierState};
use crate::config::ModelConfig;
use crate::constants::SERVICE_NAME;
use crate::error::SignError;
use crate::landmarks::parse_landmarks;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Classifier (immutable after load)
    classifier: ClassifierState,
}

impl AppState {
    /// Creates application state around an already loaded classifier.
    #[must_use]
    pub fn new(classifier: ClassifierState) -> Self {
        Self { classifier }
    }

    /// Loads model and labels; a failed load yields an unavailable state.
    #[must_use]
    pub fn load(config: &ModelConfig) -> Self {
        Self::new(ClassifierState::load(config))
    }

    /// Returns the classifier state.
    #[must_use]
    pub fn classifier(&self) -> &ClassifierState {
        &self.classifier
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Service descriptor returned by `GET /`.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Service name.
    pub service: &'static str,
    /// Always "ok".
    pub status: &'static str,
    /// Available endpoints.
    pub endpoints: EndpointMap,
}

/// Endpoint listing for the service descriptor.
#[derive(Debug, Serialize)]
pub struct EndpointMap {
    /// Health check path.
    pub health: &'static str,
    /// Classification route.
    pub classify: RouteInfo,
    /// Recognition page path.
    pub app: &'static str,
}

/// Path and method of a route.
#[derive(Debug, Serialize)]
pub struct RouteInfo {
    /// Route path.
    pub path: &'static str,
    /// HTTP method.
    pub method: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving.
    pub status: String,
    /// Whether model and labels are loaded.
    pub model_loaded: bool,
    /// Application version.
    pub version: String,
}

/// Error body for `/classify-sign`.
///
/// Carries the no-decision fields alongside the error so clients that only
/// read `letter`/`confidence` keep working.
#[derive(Debug, Serialize)]
pub struct ClassifyErrorResponse {
    /// Always empty.
    pub letter: String,
    /// Always 0.
    pub confidence: f64,
    /// Error message.
    pub error: String,
}

impl ClassifyErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        let none = Classification::none();
        Self {
            letter: none.letter,
            confidence: none.confidence,
            error: error.into(),
        }
    }
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ClassifyRejection = (StatusCode, Json<ClassifyErrorResponse>);

/// Maps a pipeline error to its HTTP status.
fn status_for(err: &SignError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn reject(err: &SignError) -> ClassifyRejection {
    (status_for(err), Json(ClassifyErrorResponse::new(err.to_string())))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET / - Service descriptor.
async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: SERVICE_NAME,
        status: "ok",
        endpoints: EndpointMap {
            health: "/health",
            classify: RouteInfo {
                path: "/classify-sign",
                method: "POST",
            },
            app: "/app",
        },
    })
}

/// GET /health - Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.classifier.is_ready(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /classify-sign - Classify one frame of hand landmarks.
///
/// Availability is checked before the body is looked at. A body that is not
/// valid JSON is treated like an empty object, so it fails the landmark count
/// check. The legacy `features` field is ignored.
async fn classify_sign(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Classification>, ClassifyRejection> {
    let classifier = state.classifier.classifier().map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ClassifyErrorResponse::new("Model not loaded")),
        )
    })?;

    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let frame = parse_landmarks(payload.get("landmarks")).map_err(|e| {
        debug!("Rejected landmarks: {e}");
        reject(&e)
    })?;

    let result = classifier.recognize(&frame).map_err(|e| {
        warn!("Classification failed: {e}");
        reject(&e)
    })?;

    Ok(Json(result))
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // Browser widgets call this API from other origins. OPTIONS requests are
    // answered by this layer before routing.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/classify-sign", post(classify_sign))
        .route("/app", get(static_files::serve_app))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);

    info!("Starting sign recognition server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_for_client_error() {
        assert_eq!(
            status_for(&SignError::invalid("Expected 21 landmarks")),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_status_for_server_errors() {
        let errors = [
            SignError::ModelUnavailable {
                reason: "missing".to_string(),
            },
            SignError::inference("bad tensor"),
            SignError::ModelLoad {
                path: PathBuf::from("m.safetensors"),
                reason: "missing".to_string(),
            },
        ];
        for err in &errors {
            assert_eq!(status_for(err), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_classify_error_response_carries_no_decision() {
        let body = serde_json::to_value(ClassifyErrorResponse::new("Model not loaded")).unwrap();
        assert_eq!(body["letter"], "");
        assert_eq!(body["confidence"], 0.0);
        assert_eq!(body["error"], "Model not loaded");
    }

    #[test]
    fn test_app_state_reports_unavailable() {
        let state = AppState::new(ClassifierState::Unavailable {
            reason: "missing".to_string(),
        });
        assert!(!state.classifier().is_ready());
    }
}
