//! `OpenAI`-compatible streaming provider
//!
//! Talks to any `/chat/completions` endpoint that supports `stream: true`.

use super::sse::data_events;
use super::types::{ContentBlock, LlmMessage, LlmRequest, LlmStreamEvent, MessageRole, Usage};
use super::{LlmError, LlmEventStream, LlmService};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::pin::Pin;
use std::time::Duration;

/// Connection settings for an `OpenAI`-compatible backend
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Limit on connecting and on each silent gap while a reply streams.
    /// The reply as a whole may take longer.
    pub idle_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// `OpenAI` chat completions service
pub struct OpenAiService {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl OpenAiService {
    pub fn new(config: &OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(config.idle_timeout)
            .read_timeout(config.idle_timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> OpenAIRequest {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        for message in &request.messages {
            translate_message(message, &mut messages);
        }

        let tools: Vec<OpenAITool> = request
            .tools
            .iter()
            .map(|t| OpenAITool {
                r#type: "function".to_string(),
                function: OpenAIFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.input_schema.clone(),
                },
            })
            .collect();

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            max_tokens: request.max_tokens,
            stream: true,
            stream_options: StreamOptions {
                include_usage: true,
            },
        }
    }
}

/// Tool results become separate `tool` role messages; everything else in a
/// message is folded into one chat message.
fn translate_message(msg: &LlmMessage, out: &mut Vec<OpenAIMessage>) {
    let role = match msg.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for block in &msg.content {
        match block {
            ContentBlock::Text { text: t } => text.push_str(t),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(OpenAIToolCall {
                id: id.clone(),
                r#type: "function".to_string(),
                function: OpenAIFunctionCall {
                    name: name.clone(),
                    arguments: input.to_string(),
                },
            }),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => out.push(OpenAIMessage {
                role: "tool".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(tool_use_id.clone()),
            }),
        }
    }

    if !text.is_empty() || !tool_calls.is_empty() {
        out.push(OpenAIMessage {
            role: role.to_string(),
            content: (!text.is_empty()).then_some(text),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: None,
        });
    }
}

fn classify_error(status: reqwest::StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<OpenAIErrorResponse>(body)
        .map_or_else(|_| body.chars().take(500).collect(), |r| r.error.message);
    match status.as_u16() {
        401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
        429 => LlmError::rate_limit(format!("Rate limited: {message}")),
        400 | 404 | 422 => LlmError::invalid_request(format!("Invalid request: {message}")),
        500..=599 => LlmError::server_error(format!("Server error: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

#[async_trait]
impl LlmService for OpenAiService {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmEventStream, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::auth("OPENAI_API_KEY is not set"))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.translate_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            let error = classify_error(status, &body);
            return Err(match retry_after {
                Some(delay) => error.with_retry_after(delay),
                None => error,
            });
        }

        let bytes = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(std::io::Error::other)),
        );
        Ok(decode_events(data_events(bytes)))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ============================================================
// Chunk decoding
// ============================================================

/// Turn SSE payloads into stream events.
///
/// Text deltas are forwarded as they arrive; tool call fragments are held
/// until the turn ends, then emitted whole, followed by `Finished`.
pub(crate) fn decode_events<S>(payloads: S) -> LlmEventStream
where
    S: Stream<Item = Result<String, LlmError>> + Send + 'static,
{
    let state = DecodeState {
        payloads: Box::pin(payloads),
        acc: ChunkAccumulator::default(),
        pending: VecDeque::new(),
        done: false,
    };

    Box::pin(futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                return Some((Ok(event), st));
            }
            if st.done {
                return None;
            }

            let step = match st.payloads.next().await {
                Some(Ok(payload)) if payload.trim() == "[DONE]" => {
                    st.done = true;
                    st.acc.finish()
                }
                Some(Ok(payload)) => st.acc.apply(&payload),
                Some(Err(e)) => Err(e),
                None => {
                    st.done = true;
                    if st.acc.stop_reason.is_some() {
                        st.acc.finish()
                    } else {
                        Err(LlmError::stream("Stream ended before the model finished"))
                    }
                }
            };

            match step {
                Ok(events) => st.pending.extend(events),
                Err(e) => {
                    st.done = true;
                    st.pending.clear();
                    return Some((Err(e), st));
                }
            }
        }
    }))
}

struct DecodeState {
    payloads: Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>,
    acc: ChunkAccumulator,
    pending: VecDeque<LlmStreamEvent>,
    done: bool,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

#[derive(Debug, Default)]
struct ChunkAccumulator {
    tool_calls: BTreeMap<u32, PartialToolCall>,
    stop_reason: Option<String>,
    usage: Usage,
}

impl ChunkAccumulator {
    fn apply(&mut self, payload: &str) -> Result<Vec<LlmStreamEvent>, LlmError> {
        let chunk: OpenAIChunk = serde_json::from_str(payload)
            .map_err(|e| LlmError::stream(format!("Failed to parse stream chunk: {e}")))?;

        if let Some(error) = chunk.error {
            return Err(LlmError::stream(error.message));
        }

        let mut events = Vec::new();
        for choice in chunk.choices {
            if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                events.push(LlmStreamEvent::TextDelta(text));
            }
            for fragment in choice.delta.tool_calls.unwrap_or_default() {
                let call = self.tool_calls.entry(fragment.index).or_default();
                if let Some(id) = fragment.id {
                    call.id = id;
                }
                if let Some(function) = fragment.function {
                    if let Some(name) = function.name {
                        call.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        call.arguments.push_str(&arguments);
                    }
                }
            }
            if choice.finish_reason.is_some() {
                self.stop_reason = choice.finish_reason;
            }
        }

        if let Some(usage) = chunk.usage {
            self.usage = Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            };
        }

        Ok(events)
    }

    fn finish(&mut self) -> Result<Vec<LlmStreamEvent>, LlmError> {
        let mut events = Vec::new();
        for (_, call) in std::mem::take(&mut self.tool_calls) {
            if call.name.is_empty() {
                return Err(LlmError::stream("Tool call without a function name"));
            }
            let input = if call.arguments.trim().is_empty() {
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                serde_json::from_str(&call.arguments).map_err(|e| {
                    LlmError::stream(format!("Invalid arguments for tool {}: {e}", call.name))
                })?
            };
            events.push(LlmStreamEvent::ToolCall {
                id: call.id,
                name: call.name,
                input,
            });
        }
        events.push(LlmStreamEvent::Finished {
            stop_reason: self.stop_reason.take(),
            usage: self.usage,
        });
        Ok(events)
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    stream_options: StreamOptions,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    r#type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCall {
    id: String,
    r#type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChunk {
    #[serde(default)]
    choices: Vec<OpenAIChunkChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
    #[serde(default)]
    error: Option<OpenAIError>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChunkChoice {
    #[serde(default)]
    delta: OpenAIDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCallDelta {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<OpenAIFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
