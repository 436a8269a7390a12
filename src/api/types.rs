//! API request and response types

use crate::workflow::{RunResult, RunStatus};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Chat turn role as sent by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One message of the client-side conversation
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Request to stream a chat reply
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Content of the most recent non-blank user message
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User && !m.content.trim().is_empty())
            .map(|m| m.content.as_str())
    }
}

/// Response for a completed workflow run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRunResponse {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub output: Value,
    pub steps: IndexMap<String, Value>,
}

impl WorkflowRunResponse {
    pub fn from_result(result: &RunResult) -> Self {
        Self {
            run_id: result.run_id,
            status: result.status,
            output: result.output().cloned().unwrap_or(Value::Null),
            steps: result.context.steps().clone(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: error.into(),
            run_id: None,
            step_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowContext;
    use serde_json::json;

    #[test]
    fn test_last_user_message_skips_assistant_and_blank() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [
                { "role": "user", "content": "Weather in Paris?" },
                { "role": "assistant", "content": "Sunny." },
                { "role": "user", "content": "And Tokyo?" },
                { "role": "user", "content": "   " },
            ]
        }))
        .unwrap();
        assert_eq!(request.last_user_message(), Some("And Tokyo?"));
    }

    fn run_result(status: RunStatus) -> RunResult {
        let mut context = WorkflowContext::new(json!({ "city": "Oslo" }));
        context.commit("fetch", json!([1, 2]));
        context.commit("plan", json!({ "activities": "Ski" }));
        RunResult {
            run_id: Uuid::new_v4(),
            workflow: "w".to_string(),
            status,
            context,
            failure: None,
            duration: std::time::Duration::ZERO,
        }
    }

    #[test]
    fn test_run_response_carries_final_output_and_steps() {
        let result = run_result(RunStatus::Completed);
        let body = serde_json::to_value(WorkflowRunResponse::from_result(&result)).unwrap();
        assert_eq!(body["status"], "completed");
        assert_eq!(body["output"], json!({ "activities": "Ski" }));
        assert_eq!(body["steps"]["fetch"], json!([1, 2]));
        assert_eq!(body["runId"], result.run_id.to_string());
    }

    #[test]
    fn test_run_response_has_no_output_unless_completed() {
        let result = run_result(RunStatus::Failed);
        let response = WorkflowRunResponse::from_result(&result);
        assert_eq!(response.output, Value::Null);
        assert_eq!(response.steps.len(), 2);
    }

    #[test]
    fn test_error_response_omits_run_fields() {
        let body = serde_json::to_value(ErrorResponse::new("Failed", "boom")).unwrap();
        assert_eq!(body, json!({ "message": "Failed", "error": "boom" }));
    }
}
