//! HTTP request handlers

use super::stream::data_stream_response;
use super::types::{ChatRequest, ErrorResponse, WorkflowRunResponse};
use super::AppState;
use crate::llm::{LlmError, LlmErrorKind};
use crate::weather::FetchError;
use crate::workflow::{StepError, StepFailure, ValidationStage};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde_json::Value;
use uuid::Uuid;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Streamed chat with the weather agent
        .route("/api/chat", post(chat))
        // Activity planning workflow
        .route("/api/workflows/weather", post(run_weather_workflow))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let prompt = request
        .last_user_message()
        .ok_or_else(|| AppError::BadRequest("No user message supplied".to_string()))?;

    tracing::info!(
        agent = %state.chat_agent.name(),
        messages = request.messages.len(),
        "Chat request"
    );
    let (mut chunks, full) = state.chat_agent.stream_text(prompt).split();

    // Commit to a streamed 200 only once the model has produced something
    let first = chunks.next().await;
    if let Some(Err(e)) = first {
        return Err(AppError::Chat(e));
    }

    tokio::spawn(async move {
        match full.await {
            Ok(reply) => tracing::info!(chars = reply.len(), "Chat reply completed"),
            Err(e) if e.kind == LlmErrorKind::Cancelled => {
                tracing::debug!("Chat reply abandoned by client");
            }
            Err(e) => tracing::warn!(error = %e, "Chat reply not completed"),
        }
    });

    Ok(data_stream_response(first, chunks))
}

// ============================================================
// Workflows
// ============================================================

async fn run_weather_workflow(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WorkflowRunResponse>, AppError> {
    let Json(trigger) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let run = state.workflow.create_run();
    tracing::debug!(run_id = %run.run_id(), "Workflow run created");
    let result = run.start(trigger).await;
    tracing::info!(
        workflow = %result.workflow,
        run_id = %result.run_id,
        status = ?result.status,
        duration_ms = %result.duration.as_millis(),
        "Workflow run finished"
    );
    match result.failure {
        Some(failure) => Err(AppError::RunFailed {
            run_id: result.run_id,
            failure,
        }),
        None => Ok(Json(WorkflowRunResponse::from_result(&result))),
    }
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("forecast-assistant ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

pub enum AppError {
    BadRequest(String),
    Chat(LlmError),
    RunFailed { run_id: Uuid, failure: StepFailure },
}

/// HTTP status for a failed run. Only a rejected trigger is a client error.
fn step_status(error: &StepError) -> StatusCode {
    match error {
        StepError::Validation { stage, .. } => match stage {
            ValidationStage::Trigger => StatusCode::BAD_REQUEST,
            ValidationStage::Output => StatusCode::BAD_GATEWAY,
            ValidationStage::Input => StatusCode::INTERNAL_SERVER_ERROR,
        },
        StepError::Fetch(FetchError::NotFound { .. }) => StatusCode::NOT_FOUND,
        StepError::Fetch(_) | StepError::Model(_) => StatusCode::BAD_GATEWAY,
        StepError::Timeout(_) | StepError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Invalid request", msg),
            ),
            AppError::Chat(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("An error occurred while generating a reply", e.message),
            ),
            AppError::RunFailed { run_id, failure } => {
                let mut body =
                    ErrorResponse::new("Workflow run failed", failure.error.to_string());
                body.run_id = Some(run_id);
                body.step_id = Some(failure.step_id);
                (step_status(&failure.error), body)
            }
        };

        (status, Json(body)).into_response()
    }
}
