//! HTTP surface: a thin axum layer over the orchestrator and repositories.
//! Grounded in the teacher's `AppState`-plus-command-handler shape, adapted
//! from Tauri `#[command]` functions to axum route handlers, with the same
//! "parse request, call the pipeline, map `PipelineError` to a response"
//! structure.

use crate::config::Config;
use crate::db;
use crate::errors::PipelineError;
use crate::orchestrator::Orchestrator;
use crate::repo::resume_repo;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub conn: Mutex<rusqlite::Connection>,
    pub orchestrator: Orchestrator,
    pub config: Config,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/jd/analyze", post(analyze_jd_handler))
        .route("/api/resumes/generate", post(generate_resume_handler))
        .route("/api/resumes", get(list_resumes_handler))
        .route("/api/resumes/:id", get(get_resume_handler))
        .route("/api/resumes/:id/download", get(download_resume_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn new_app_state(config: Config) -> Result<AppState, PipelineError> {
    db::init_database().map_err(PipelineError::from)?;
    let conn = db::get_connection().map_err(PipelineError::from)?;
    let orchestrator = Orchestrator::new(config.clone());
    Ok(AppState { conn: Mutex::new(conn), orchestrator, config })
}

async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeJdRequest {
    raw_text: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeJdResponse {
    id: i64,
    structured_data: crate::domain::jd::JdData,
    created_at: String,
}

async fn analyze_jd_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeJdRequest>,
) -> impl IntoResponse {
    let conn = state.conn.lock().await;
    match state.orchestrator.analyze_and_store_jd(&conn, &payload.raw_text).await {
        Ok((jd_id, jd_data, created_at)) => {
            (StatusCode::CREATED, Json(AnalyzeJdResponse { id: jd_id, structured_data: jd_data, created_at })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResumeRequest {
    profile_id: i64,
    jd_id: i64,
}

#[derive(Debug, Serialize)]
struct GenerateResumeResponse {
    resume_id: i64,
    job_title: String,
    version: i64,
    pdf_path: Option<String>,
    docx_path: Option<String>,
    jd_analysis: crate::domain::jd::JdData,
    skill_confidence: std::collections::HashMap<String, crate::domain::draft::Confidence>,
    keyword_coverage: std::collections::HashMap<String, bool>,
}

async fn generate_resume_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateResumeRequest>,
) -> impl IntoResponse {
    let mut conn = state.conn.lock().await;
    match state.orchestrator.generate_resume(&mut conn, payload.profile_id, payload.jd_id).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(GenerateResumeResponse {
                resume_id: outcome.record.id,
                job_title: outcome.record.job_title,
                version: outcome.record.version,
                pdf_path: outcome.pdf_path,
                docx_path: outcome.docx_path,
                jd_analysis: outcome.jd_data,
                skill_confidence: outcome.skill_confidence,
                keyword_coverage: outcome.keyword_coverage,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct ListResumesQuery {
    profile_id: i64,
}

async fn list_resumes_handler(
    State(state): State<Arc<AppState>>,
    axum::extract::Query(query): axum::extract::Query<ListResumesQuery>,
) -> impl IntoResponse {
    let conn = state.conn.lock().await;
    match resume_repo::list_by_profile(&conn, query.profile_id) {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn get_resume_handler(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> impl IntoResponse {
    let conn = state.conn.lock().await;
    match resume_repo::get(&conn, id) {
        Ok(Some(summary)) => (StatusCode::OK, Json(summary)).into_response(),
        Ok(None) => {
            PipelineError::Database(crate::errors::DatabaseError::NotFound(format!("no resume with id {}", id)))
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "pdf".to_string()
}

async fn download_resume_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    axum::extract::Query(query): axum::extract::Query<DownloadQuery>,
) -> impl IntoResponse {
    let conn = state.conn.lock().await;
    let summary = match resume_repo::get(&conn, id) {
        Ok(Some(summary)) => summary,
        Ok(None) => {
            return PipelineError::Database(crate::errors::DatabaseError::NotFound(format!("no resume with id {}", id)))
                .into_response()
        }
        Err(e) => return e.into_response(),
    };
    drop(conn);

    let path = match query.format.as_str() {
        "docx" => summary.docx_path.clone(),
        _ => summary.pdf_path.clone(),
    };

    let Some(path) = path else {
        return PipelineError::Database(crate::errors::DatabaseError::NotFound(format!(
            "no {} render for resume {}",
            query.format, id
        )))
        .into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => (StatusCode::OK, bytes).into_response(),
        Err(e) => PipelineError::from(e).into_response(),
    }
}
