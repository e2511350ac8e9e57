use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::error::{JobNestError, Result};
use crate::store::validation::{validate_new, validate_patch, JobInput, ValidationError};
use crate::store::{Job, JobStore, SortOrder};

pub const JOB_DELETED_MESSAGE: &str = "Job deleted successfully";

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn JobStore>,
}

impl ApiState {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJobResponse {
    pub message: String,
    pub deleted_job: Job,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub jobs: usize,
}

impl IntoResponse for JobNestError {
    fn into_response(self) -> Response {
        let status = match &self {
            JobNestError::Validation(_) => StatusCode::BAD_REQUEST,
            JobNestError::JobNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/jobs", get(list_jobs_handler).post(create_job_handler))
        .route(
            "/api/jobs/:id",
            patch(update_job_handler).delete(delete_job_handler),
        )
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `addr` until `shutdown` is cancelled.
pub async fn run_api(addr: SocketAddr, state: ApiState, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!(addr = %addr, error = %e, "Failed to bind API server");
        JobNestError::Internal(format!("failed to bind {}: {}", addr, e))
    })?;
    serve(listener, state, shutdown).await
}

/// Serve the API on an already bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: ApiState,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener
        .local_addr()
        .map_err(|e| JobNestError::Internal(e.to_string()))?;
    tracing::info!(addr = %addr, "Starting API server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "API server failed");
            JobNestError::Internal(e.to_string())
        })
}

fn parse_job_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| JobNestError::JobNotFound(raw.to_string()))
}

fn body(payload: std::result::Result<Json<JobInput>, JsonRejection>) -> Result<JobInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()).into())
}

async fn health_handler(State(state): State<ApiState>) -> Result<Json<HealthResponse>> {
    let jobs = state.store.count().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        jobs,
    }))
}

async fn list_jobs_handler(State(state): State<ApiState>) -> Result<Json<Vec<Job>>> {
    let jobs = state.store.find_all(SortOrder::NewestFirst).await?;
    Ok(Json(jobs))
}

async fn create_job_handler(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<JobInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>)> {
    let new = validate_new(body(payload)?)?;
    let job = state.store.insert(new).await?;
    tracing::info!(job_id = %job.id, company = %job.company, role = %job.role, "Job created");
    Ok((StatusCode::CREATED, Json(job)))
}

async fn update_job_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<JobInput>, JsonRejection>,
) -> Result<Json<Job>> {
    let id = parse_job_id(&id)?;
    let patch = validate_patch(body(payload)?)?;
    let job = state
        .store
        .find_by_id_and_update(&id, patch)
        .await?
        .ok_or_else(|| JobNestError::JobNotFound(id.to_string()))?;
    tracing::info!(job_id = %job.id, status = %job.status, "Job updated");
    Ok(Json(job))
}

async fn delete_job_handler(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteJobResponse>> {
    let id = parse_job_id(&id)?;
    let deleted_job = state
        .store
        .find_by_id_and_delete(&id)
        .await?
        .ok_or_else(|| JobNestError::JobNotFound(id.to_string()))?;
    tracing::info!(job_id = %deleted_job.id, "Job deleted");
    Ok(Json(DeleteJobResponse {
        message: JOB_DELETED_MESSAGE.to_string(),
        deleted_job,
    }))
}
