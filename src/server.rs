//! HTTP API for the collection gateway.
//!
//! Exposes the access checks, the manage surface, the collection search,
//! the ingest form, and the count summary as a JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/objects/{pid}/access/manage` | Manage-surface access decision |
//! | `GET`  | `/objects/{pid}/access/share-migrate` | Share/migrate access decision |
//! | `GET`  | `/objects/{pid}/access/ingest` | Ingest access decision |
//! | `GET`  | `/objects/{pid}/manage` | Manage render tree |
//! | `GET`  | `/objects/{pid}/ingest` | Built ingest form |
//! | `GET`  | `/collections/search?q=` | Filtered collection search |
//! | `GET`  | `/stats/counts` | Object and collection counts |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "forbidden", "message": "access denied" } }
//! ```
//!
//! Error codes: `bad_request` (400), `forbidden` (403), `not_found` (404),
//! `internal` (500). Access denials are deliberately uniform — nothing in
//! the response distinguishes a missing object from a wrong type or a
//! denied permission.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based
//! repository frontends can call the API cross-origin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::access::{
    ingest_access, manage_access, share_migrate_access, PermissionGate, StaticGate,
};
use crate::config::Config;
use crate::ingest::{FormBuilder, IngestForm, IngestResolver, NamedFormBuilder, PolicyResolver};
use crate::manage::{ManageRegistry, RenderTree};
use crate::models::{CollectionMatch, ObjectCounts};
use crate::objects::{ObjectStore, RestObjectStore};
use crate::search::find_collections;
use crate::stats::count_objects;
use crate::triplestore::{SparqlHttpClient, TripleStore};

/// Shared application state passed to all route handlers via Axum's `State`
/// extractor. Every collaborator sits behind an `Arc`'d trait object so
/// embedding deployments can swap in their own implementations.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub objects: Arc<dyn ObjectStore>,
    pub gate: Arc<dyn PermissionGate>,
    pub triples: Arc<dyn TripleStore>,
    pub resolver: Arc<dyn IngestResolver>,
    pub forms: Arc<dyn FormBuilder>,
    pub manage: Arc<ManageRegistry>,
}

impl AppState {
    /// Wire the default collaborators from configuration: the REST object
    /// store, the SPARQL client, the static gate, the policy resolver, and
    /// the built-in manage plugins.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let config = Arc::new(config.clone());
        Ok(Self {
            objects: Arc::new(RestObjectStore::new(&config.repository)?),
            gate: Arc::new(StaticGate::new(&config.access)),
            triples: Arc::new(SparqlHttpClient::new(&config.triplestore)?),
            resolver: Arc::new(PolicyResolver::new()),
            forms: Arc::new(NamedFormBuilder::new(&config.ingest.form)),
            manage: Arc::new(ManageRegistry::with_builtins(
                &config.repository.collection_models,
            )),
            config,
        })
    }
}

/// Starts the HTTP server with default collaborators.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    run_server_with_state(state).await
}

/// Starts the HTTP server over injected collaborators.
///
/// Like [`run_server`], but accepts a pre-built [`AppState`] so embedding
/// deployments can supply their own object store, permission gate, ingest
/// resolver, or manage plugins.
pub async fn run_server_with_state(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.server.bind.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "collection gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router. Exposed for in-process testing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/objects/{pid}/access/manage", get(handle_manage_access))
        .route(
            "/objects/{pid}/access/share-migrate",
            get(handle_share_migrate_access),
        )
        .route("/objects/{pid}/access/ingest", get(handle_ingest_access))
        .route("/objects/{pid}/manage", get(handle_manage))
        .route("/objects/{pid}/ingest", get(handle_ingest))
        .route("/collections/search", get(handle_search))
        .route("/stats/counts", get(handle_counts))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
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

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs the uniform 403 denial. Callers never attach detail.
fn forbidden() -> AppError {
    AppError {
        status: StatusCode::FORBIDDEN,
        code: "forbidden".to_string(),
        message: "access denied".to_string(),
    }
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Constructs a 500 error from a collaborator failure, logging the cause.
fn internal(err: anyhow::Error) -> AppError {
    tracing::error!(%err, "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Access checks ============

/// JSON response body for the access endpoints.
#[derive(Serialize, Deserialize)]
pub struct AccessResponse {
    pub allowed: bool,
}

async fn handle_manage_access(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<AccessResponse>, AppError> {
    let decision = manage_access(state.objects.as_ref(), state.gate.as_ref(), &pid)
        .await
        .map_err(internal)?;
    if !decision.is_allowed() {
        return Err(forbidden());
    }
    Ok(Json(AccessResponse { allowed: true }))
}

async fn handle_share_migrate_access(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<AccessResponse>, AppError> {
    let decision = share_migrate_access(state.objects.as_ref(), state.gate.as_ref(), &pid)
        .await
        .map_err(internal)?;
    if !decision.is_allowed() {
        return Err(forbidden());
    }
    Ok(Json(AccessResponse { allowed: true }))
}

async fn handle_ingest_access(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<AccessResponse>, AppError> {
    let decision = ingest_access(
        state.objects.as_ref(),
        state.gate.as_ref(),
        state.resolver.as_ref(),
        &state.config.repository.collection_models,
        &pid,
    )
    .await
    .map_err(internal)?;
    if !decision.is_allowed() {
        return Err(forbidden());
    }
    Ok(Json(AccessResponse { allowed: true }))
}

// ============ GET /objects/{pid}/manage ============

async fn handle_manage(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<RenderTree>, AppError> {
    let object = state
        .objects
        .load(&pid)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("object not found: {}", pid)))?;

    Ok(Json(state.manage.render(&object)))
}

// ============ GET /collections/search ============

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CollectionMatch>>, AppError> {
    let needle = params.q.unwrap_or_default();
    if needle.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }

    let matches = find_collections(state.triples.as_ref(), &state.config, &needle)
        .await
        .map_err(internal)?;
    Ok(Json(matches))
}

// ============ GET /objects/{pid}/ingest ============

async fn handle_ingest(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<IngestForm>, AppError> {
    let object = state
        .objects
        .load(&pid)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("object not found: {}", pid)))?;

    let configuration = state
        .resolver
        .resolve(&object)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("no ingest configuration for: {}", pid)))?;

    let form = state.forms.build(&configuration).map_err(internal)?;
    Ok(Json(form))
}

// ============ GET /stats/counts ============

async fn handle_counts(State(state): State<AppState>) -> Result<Json<ObjectCounts>, AppError> {
    let counts = count_objects(state.triples.as_ref(), &state.config)
        .await
        .map_err(internal)?;
    Ok(Json(counts))
}
