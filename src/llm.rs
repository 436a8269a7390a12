//! LLM provider abstraction
//!
//! Provides a common streaming interface for conversational models.

mod error;
mod openai;
mod sse;
mod types;

#[cfg(test)]
pub mod testing;

pub use error::{LlmError, LlmErrorKind};
pub use openai::{OpenAiConfig, OpenAiService};
pub use types::*;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// Incremental events of one model turn, in generation order
pub type LlmEventStream = Pin<Box<dyn Stream<Item = Result<LlmStreamEvent, LlmError>> + Send>>;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Start a streamed completion.
    ///
    /// Errors returned here mean the request was rejected before any output;
    /// failures after that arrive as `Err` items on the stream.
    async fn stream(&self, request: &LlmRequest) -> Result<LlmEventStream, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmEventStream, LlmError> {
        let start = Instant::now();
        let result = self.inner.stream(request).await;

        let stream = match result {
            Ok(stream) => {
                tracing::debug!(
                    model = %self.model_id,
                    open_ms = %start.elapsed().as_millis(),
                    "LLM stream opened"
                );
                stream
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    retry_after_secs = ?e.retry_after.map(|d| d.as_secs()),
                    "LLM request failed"
                );
                return Err(e);
            }
        };

        let model_id = self.model_id.clone();
        Ok(Box::pin(stream.inspect(move |event| match event {
            Ok(LlmStreamEvent::Finished { usage, stop_reason }) => {
                tracing::info!(
                    model = %model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    stop_reason = stop_reason.as_deref().unwrap_or("none"),
                    "LLM stream completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    error = %e.message,
                    "LLM stream failed"
                );
            }
            Ok(_) => {}
        })))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
