//! Axum server and routes.

use axum::{
    extract::{Path, Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use docgen_pipeline::{DocumentRequest, SectionPipeline, SubmitError};
use docgen_scheduler::{Job, JobEvent, JobEventKind, JobId, Scheduler};
use docgen_types::GenerationContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub scheduler: Scheduler,
    pub pipeline: SectionPipeline,
}

/// Envelope shared by every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            code: 200,
            message: "Success".to_string(),
            data: Some(data),
        })
    }

    fn error(code: i32, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            code,
            message: message.into(),
            data: None,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/document-types", get(handle_document_types))
        .route("/documents", post(handle_submit_document))
        .route("/jobs", get(handle_list_jobs))
        .route("/jobs/clear-completed", post(handle_clear_completed))
        .route("/jobs/:id", get(handle_get_job).delete(handle_clear_job))
        .route("/jobs/:id/cancel", post(handle_cancel_job))
        .route("/jobs/:id/events", get(handle_job_events))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
pub struct DocumentTypeInfo {
    pub document_type: String,
    pub display_name: String,
    pub section_count: usize,
    pub sections: Vec<String>,
}

async fn handle_document_types(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<DocumentTypeInfo>>> {
    let types = state
        .pipeline
        .registry()
        .document_types()
        .map(|t| DocumentTypeInfo {
            document_type: t.document_type.clone(),
            display_name: t.display_name.clone(),
            section_count: t.section_count(),
            sections: t.sections.iter().map(|s| s.title.clone()).collect(),
        })
        .collect();
    ApiResponse::ok(types)
}

#[derive(Debug, Deserialize)]
pub struct SubmitDocumentBody {
    pub document_type: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

async fn handle_submit_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitDocumentBody>,
) -> Json<ApiResponse<serde_json::Value>> {
    let request = DocumentRequest {
        document_type: body.document_type,
        context: GenerationContext {
            subject: body.subject,
            parameters: body.parameters,
        },
    };
    let document_type = request.document_type.clone();
    match state.pipeline.submit(&state.scheduler, request).await {
        Ok(id) => {
            tracing::info!(job_id = %id, document_type = %document_type, "document job submitted");
            ApiResponse::ok(serde_json::json!({ "job_id": id.into_inner() }))
        }
        Err(SubmitError::Validation(e)) => ApiResponse::error(400, e.to_string()),
        Err(e) => ApiResponse::error(500, e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    /// "active", "completed", or absent for both.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
}

async fn handle_list_jobs(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListJobsQuery>,
) -> Json<ApiResponse<Vec<Job>>> {
    let job_type = q.job_type.as_deref();
    let jobs = match q.state.as_deref() {
        Some("active") => state.scheduler.list_active(job_type).await,
        Some("completed") => state.scheduler.list_completed(job_type).await,
        None => {
            let mut all = state.scheduler.list_active(job_type).await;
            all.extend(state.scheduler.list_completed(job_type).await);
            all.sort_by_key(|j| j.created_at());
            all
        }
        Some(other) => {
            return ApiResponse::error(400, format!("unknown state filter: {}", other));
        }
    };
    ApiResponse::ok(jobs)
}

async fn handle_get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<ApiResponse<Job>> {
    match state.scheduler.get(&JobId::from(id)).await {
        Some(job) => ApiResponse::ok(job),
        None => ApiResponse::error(404, "Job not found"),
    }
}

async fn handle_cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<ApiResponse<serde_json::Value>> {
    let id = JobId::from(id);
    if state.scheduler.get(&id).await.is_none() {
        return ApiResponse::error(404, "Job not found");
    }
    let cancelled = state.scheduler.cancel(&id).await;
    ApiResponse::ok(serde_json::json!({ "cancelled": cancelled }))
}

async fn handle_clear_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<ApiResponse<serde_json::Value>> {
    let cleared = state.scheduler.clear(&JobId::from(id)).await;
    ApiResponse::ok(serde_json::json!({ "cleared": cleared }))
}

async fn handle_clear_completed(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<serde_json::Value>> {
    let cleared = state.scheduler.clear_completed().await;
    ApiResponse::ok(serde_json::json!({ "cleared": cleared }))
}

/// Server-sent events: the current snapshot first, then every later event of the job.
/// The stream ends when the job record is cleared.
async fn handle_job_events(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let id = JobId::from(id);
    let Ok(rx) = state.scheduler.watch(&id).await else {
        return ApiResponse::<()>::error(404, "Job not found").into_response();
    };
    let Some(job) = state.scheduler.get(&id).await else {
        return ApiResponse::<()>::error(404, "Job not found").into_response();
    };
    let snapshot = JobEvent::new(JobEventKind::Transition, &job, Utc::now());

    let updates = BroadcastStream::new(rx).filter_map(|r| r.ok());
    let events = tokio_stream::once(snapshot)
        .chain(updates)
        .map(|ev| Event::default().event(ev.status.as_str()).json_data(&ev));
    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
