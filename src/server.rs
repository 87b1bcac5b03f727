//! JSON HTTP session server.
//!
//! Exposes one in-memory session — upload, per-document extraction
//! trigger, and keyword cross-search — for UI front ends. Uploads carry
//! their payload base64-encoded in a JSON body.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/documents` | Upload a document (base64 payload) |
//! | `GET`  | `/documents` | List cached documents |
//! | `GET`  | `/documents/{id}` | Cached state for one document |
//! | `POST` | `/documents/{id}/extract` | Trigger model extraction |
//! | `POST` | `/search` | Keyword cross-search over cached sections |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "keywords must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `unsupported_format` (415), `busy` (409), `inference_error` (502),
//! `timeout` (504).
//!
//! Extraction is serialized per document identity: a duplicate trigger
//! while one is in flight gets `409 busy` and costs no inference call.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based upload widgets.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::contract::{run_extraction, ExtractionError};
use crate::infer::{InferError, InferenceClient};
use crate::ingest::{ingest_bytes, IngestError};
use crate::models::{CacheEntry, DocFormat, ExtractionOutcome};
use crate::search::{search_session, DocumentMatches, SearchQuery};
use crate::session::{SessionError, SessionStore};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<SessionStore>,
    client: Arc<dyn InferenceClient>,
}

/// Starts the session server.
///
/// Binds to the address configured in `[server].bind` and serves one
/// session store for the lifetime of the process.
pub async fn run_server(
    config: &Config,
    store: Arc<SessionStore>,
    client: Arc<dyn InferenceClient>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        client,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/documents", post(handle_upload).get(handle_list))
        .route("/documents/{id}", get(handle_get))
        .route("/documents/{id}/extract", post(handle_extract))
        .route("/search", post(handle_search))
        .layer(cors)
        .with_state(state);

    println!("Session server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "not_found", message)
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedFormat(_) => AppError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_format",
                err.to_string(),
            ),
            other => bad_request(other.to_string()),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Session(SessionError::Busy(id)) => AppError::new(
                StatusCode::CONFLICT,
                "busy",
                format!("extraction already in flight for document {}", id),
            ),
            ExtractionError::Session(SessionError::UnknownDocument(id)) => {
                not_found(format!("document not found: {}", id))
            }
            ExtractionError::Inference(InferError::Timeout(secs)) => AppError::new(
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                format!("inference timed out after {}s", secs),
            ),
            ExtractionError::Inference(other) => {
                AppError::new(StatusCode::BAD_GATEWAY, "inference_error", other.to_string())
            }
        }
    }
}

// ============ Request/response shapes ============

#[derive(Deserialize)]
struct UploadRequest {
    name: String,
    /// Declared format (`pdf` or `docx`); falls back to the name's
    /// extension when absent.
    format: Option<String>,
    content_base64: String,
}

#[derive(Serialize)]
struct DocumentSummary {
    id: String,
    name: String,
    format: DocFormat,
    lines: usize,
    section_found: bool,
    extracted: bool,
}

impl From<&CacheEntry> for DocumentSummary {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            id: entry.document.id.clone(),
            name: entry.document.name.clone(),
            format: entry.document.format,
            lines: entry.document.lines.len(),
            section_found: entry.section.is_some(),
            extracted: entry.outcome.is_some(),
        }
    }
}

#[derive(Serialize)]
struct DocumentDetail {
    #[serde(flatten)]
    summary: DocumentSummary,
    section_text: Option<String>,
    outcome: Option<ExtractionOutcome>,
}

#[derive(Deserialize)]
struct SearchRequest {
    /// Comma-separated keyword input, exactly as the user typed it.
    keywords: String,
}

#[derive(Serialize)]
struct SearchResponse {
    keywords: Vec<String>,
    results: Vec<DocumentMatches>,
}

// ============ Handlers ============

async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "resume-harness",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.model.model,
    }))
}

async fn handle_upload(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.name.trim().is_empty() {
        return Err(bad_request("name must not be empty"));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&req.content_base64)
        .map_err(|e| bad_request(format!("invalid base64 payload: {}", e)))?;

    let format = match &req.format {
        Some(declared) => DocFormat::from_extension(declared).ok_or_else(|| {
            AppError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_format",
                format!("unsupported format: {} (expected pdf or docx)", declared),
            )
        })?,
        None => crate::ingest::detect_format(std::path::Path::new(&req.name))?,
    };

    let entry = ingest_bytes(&state.store, &req.name, format, &bytes)?;
    Ok((StatusCode::CREATED, Json(DocumentSummary::from(&entry))))
}

async fn handle_list(State(state): State<AppState>) -> Json<Vec<DocumentSummary>> {
    let summaries = state
        .store
        .list()
        .iter()
        .map(DocumentSummary::from)
        .collect();
    Json(summaries)
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetail>, AppError> {
    let entry = state
        .store
        .get(&id)
        .ok_or_else(|| not_found(format!("document not found: {}", id)))?;

    Ok(Json(DocumentDetail {
        summary: DocumentSummary::from(&entry),
        section_text: entry.section.as_ref().map(|s| s.text.clone()),
        outcome: entry.outcome,
    }))
}

async fn handle_extract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExtractionOutcome>, AppError> {
    let outcome = run_extraction(&state.store, state.client.as_ref(), &id).await?;
    Ok(Json(outcome))
}

async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = SearchQuery::parse(&req.keywords);
    if query.is_empty() {
        return Err(bad_request("keywords must not be empty"));
    }
    let results = search_session(&state.store, &query);
    Ok(Json(SearchResponse {
        keywords: query.keywords().to_vec(),
        results,
    }))
}
