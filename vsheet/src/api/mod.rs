//! HTTP API layer exposing spreadsheet CRUD endpoints.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::{debug, error};
use vsheet_core::timestamp::Timestamp;
use vsheet_core::{Spreadsheet, SpreadsheetSummary, SpreadsheetUpdate, Workspace};

pub mod assets;
mod error;

pub use error::ApiError;

pub const DEFAULT_SERVICE_NAME: &str = "v-sheet-backend";

const INVALID_JSON: &str = "Invalid JSON in request";

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Workspace,
    pub service_name: Arc<str>,
}

impl AppState {
    pub fn new(workspace: Workspace, service_name: impl Into<Arc<str>>) -> Self {
        Self {
            workspace,
            service_name: service_name.into(),
        }
    }
}

/// Surface around the API routes.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Editor front-end root; `None` disables asset serving.
    pub static_dir: Option<PathBuf>,
    pub cors: bool,
}

#[derive(Deserialize, Default)]
struct CreateFileRequest {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Serialize)]
struct FileList {
    files: Vec<SpreadsheetSummary>,
}

#[derive(Serialize)]
struct UpdateResponse {
    success: bool,
    #[serde(with = "vsheet_core::timestamp")]
    modified: Timestamp,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentResponse {
    recent_file_id: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: String,
}

/// API and health routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/files", get(list_files).post(create_file))
        .route(
            "/api/files/{id}",
            get(get_file).put(update_file).delete(delete_file),
        )
        .route("/api/recent", get(get_recent))
        .route("/health", get(health_check))
        .layer(catch_panics())
        .with_state(state)
}

/// Complete application: API routes, optional front-end assets, tracing,
/// compression and CORS.
pub fn app(state: AppState, options: &AppOptions) -> Router {
    let mut app = router(state);
    if let Some(dir) = &options.static_dir {
        app = app.merge(assets::routes(dir));
    }

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new()),
    );

    if options.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

fn catch_panics() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(panic_response as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!(panic = %detail, "request handler panicked");
    ApiError::Internal(detail).into_response()
}

/// Decode a JSON body. `None` when the body is empty.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "rejecting request body");
        ApiError::BadRequest(INVALID_JSON.to_string())
    })
}

/// Decode a request payload already known to be a JSON object.
fn parse_object<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        debug!(error = %e, "rejecting request payload");
        ApiError::BadRequest(INVALID_JSON.to_string())
    })
}

async fn list_files(State(state): State<AppState>) -> Result<Json<FileList>, ApiError> {
    let files = state.workspace.list().await?;
    Ok(Json(FileList { files }))
}

async fn create_file(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Spreadsheet>), ApiError> {
    let req = match parse_body::<Value>(&body)? {
        None | Some(Value::Null) => CreateFileRequest::default(),
        Some(value @ Value::Object(_)) => parse_object(value)?,
        Some(_) => return Err(ApiError::BadRequest(INVALID_JSON.to_string())),
    };
    let sheet = state.workspace.create(req.name).await?;
    Ok((StatusCode::CREATED, Json(sheet)))
}

async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Spreadsheet>, ApiError> {
    let sheet = state.workspace.open(&id).await?;
    Ok(Json(sheet))
}

async fn update_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UpdateResponse>, ApiError> {
    if !state.workspace.documents().exists(&id).await? {
        return Err(ApiError::NotFound);
    }

    let update: SpreadsheetUpdate = match parse_body::<Value>(&body)? {
        Some(value @ Value::Object(_)) => parse_object(value)?,
        _ => return Err(ApiError::BadRequest(INVALID_JSON.to_string())),
    };

    let modified = state.workspace.update(&id, update).await?;
    Ok(Json(UpdateResponse {
        success: true,
        modified,
    }))
}

async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.workspace.delete(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn get_recent(State(state): State<AppState>) -> Result<Json<RecentResponse>, ApiError> {
    let recent_file_id = state.workspace.resolve_recent().await?;
    Ok(Json(RecentResponse { recent_file_id }))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: state.service_name.to_string(),
    })
}
