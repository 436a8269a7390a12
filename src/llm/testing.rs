//! Scripted LLM for testing
//!
//! Each call to `stream` pops the next queued script.

use super::{LlmError, LlmEventStream, LlmRequest, LlmService, LlmStreamEvent, Usage};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

enum Script {
    /// Reject the request before any output
    Open(LlmError),
    /// Emit these items, then end (or stay pending forever if `hang`)
    Events {
        items: Vec<Result<LlmStreamEvent, LlmError>>,
        hang: bool,
    },
}

/// Mock LLM that replays queued event scripts
pub struct ScriptedLlm {
    scripts: Mutex<VecDeque<Script>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
    /// Number of streams that have been dropped by their consumer
    dropped_streams: Arc<AtomicUsize>,
}

impl ScriptedLlm {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
            dropped_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Queue a turn producing `chunks` as text, then finishing normally
    pub fn queue_text(&self, chunks: &[&str]) {
        let mut items: Vec<_> = chunks
            .iter()
            .map(|c| Ok(LlmStreamEvent::TextDelta((*c).to_string())))
            .collect();
        items.push(Ok(finished("stop")));
        self.push(Script::Events { items, hang: false });
    }

    /// Queue a turn that only requests one tool call
    pub fn queue_tool_call(&self, id: &str, name: &str, input: serde_json::Value) {
        self.push(Script::Events {
            items: vec![
                Ok(LlmStreamEvent::ToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    input,
                }),
                Ok(finished("tool_calls")),
            ],
            hang: false,
        });
    }

    /// Queue a turn producing `chunks` and then failing
    pub fn queue_error_after(&self, chunks: &[&str], error: LlmError) {
        let mut items: Vec<_> = chunks
            .iter()
            .map(|c| Ok(LlmStreamEvent::TextDelta((*c).to_string())))
            .collect();
        items.push(Err(error));
        self.push(Script::Events { items, hang: false });
    }

    /// Queue a turn producing `chunks` and then never finishing
    pub fn queue_hanging(&self, chunks: &[&str]) {
        let items = chunks
            .iter()
            .map(|c| Ok(LlmStreamEvent::TextDelta((*c).to_string())))
            .collect();
        self.push(Script::Events { items, hang: true });
    }

    /// Queue a request rejection
    pub fn queue_open_error(&self, error: LlmError) {
        self.push(Script::Open(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn dropped_streams(&self) -> usize {
        self.dropped_streams.load(Ordering::SeqCst)
    }
}

fn finished(stop_reason: &str) -> LlmStreamEvent {
    LlmStreamEvent::Finished {
        stop_reason: Some(stop_reason.to_string()),
        usage: Usage::default(),
    }
}

/// Bumps a counter when the owning stream is dropped
struct DropGuard(Arc<AtomicUsize>);

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmEventStream, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::network("No scripted response queued"))?;

        let (items, hang) = match script {
            Script::Open(e) => return Err(e),
            Script::Events { items, hang } => (items, hang),
        };

        let guard = DropGuard(Arc::clone(&self.dropped_streams));
        let events = futures::stream::iter(items);
        let stream = if hang {
            events.chain(futures::stream::pending()).boxed()
        } else {
            events.boxed()
        };
        Ok(Box::pin(stream.map(move |item| {
            let _held = &guard;
            item
        })))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
