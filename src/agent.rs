//! Agents: a model, fixed instructions and a tool set
//!
//! An agent turn may span several model rounds. Text from every round flows
//! to the consumer as it arrives; tool calls are executed between rounds and
//! their results fed back to the model.

pub mod stream;

pub use stream::{ChunkStream, CompletionStream};

use crate::llm::{
    ContentBlock, LlmError, LlmMessage, LlmRequest, LlmService, LlmStreamEvent, MessageRole,
};
use crate::tools::{ToolContext, ToolOutput, ToolRegistry};
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use stream::ChunkSender;

/// Default number of tool rounds before the model must answer in text
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

/// A configured conversational agent
#[derive(Clone)]
pub struct Agent {
    name: String,
    instructions: String,
    llm: Arc<dyn LlmService>,
    tools: ToolRegistry,
    max_tool_rounds: usize,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        llm: Arc<dyn LlmService>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            llm,
            tools: ToolRegistry::empty(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a completion for `messages`.
    ///
    /// Must be called within a tokio runtime. The completion runs in the
    /// background and stops as soon as the returned stream is dropped.
    pub fn stream(&self, messages: Vec<LlmMessage>) -> CompletionStream {
        let (tx, completion) = stream::channel();
        let turn = AgentTurn {
            agent: self.clone(),
            messages,
        };

        tokio::spawn(async move {
            let cancel = tx.cancel_token();
            tokio::select! {
                result = turn.run(&tx) => {
                    if let Err(e) = &result {
                        tracing::warn!(agent = %turn.agent.name, error = %e, "Agent turn failed");
                    }
                    tx.close(result).await;
                }
                () = cancel.cancelled() => {
                    tracing::debug!(agent = %turn.agent.name, "Completion abandoned by consumer");
                }
            }
        });

        completion
    }

    /// Convenience for a single user message
    pub fn stream_text(&self, prompt: impl Into<String>) -> CompletionStream {
        self.stream(vec![LlmMessage::user(prompt)])
    }
}

struct AgentTurn {
    agent: Agent,
    messages: Vec<LlmMessage>,
}

impl AgentTurn {
    async fn run(&self, tx: &ChunkSender) -> Result<(), LlmError> {
        let agent = &self.agent;
        let definitions = agent.tools.definitions();
        let mut messages = self.messages.clone();
        let mut round = 0;

        loop {
            let offer_tools = round < agent.max_tool_rounds && !agent.tools.is_empty();
            let request = LlmRequest {
                system: Some(agent.instructions.clone()),
                messages: messages.clone(),
                tools: if offer_tools {
                    definitions.clone()
                } else {
                    Vec::new()
                },
                max_tokens: None,
            };

            let mut events = agent.llm.stream(&request).await?;
            let mut text = String::new();
            let mut calls: Vec<(String, String, Value)> = Vec::new();

            while let Some(event) = events.next().await {
                match event? {
                    LlmStreamEvent::TextDelta(delta) => {
                        text.push_str(&delta);
                        tx.send(delta).await?;
                    }
                    LlmStreamEvent::ToolCall { id, name, input } => calls.push((id, name, input)),
                    LlmStreamEvent::Finished { .. } => break,
                }
            }

            if calls.is_empty() {
                return Ok(());
            }
            if !offer_tools {
                return Err(LlmError::stream(
                    "Model requested a tool after the tool budget was spent",
                ));
            }

            let mut assistant = Vec::with_capacity(calls.len() + 1);
            if !text.is_empty() {
                assistant.push(ContentBlock::text(text));
            }
            for (id, name, input) in &calls {
                assistant.push(ContentBlock::tool_use(id, name, input.clone()));
            }
            messages.push(LlmMessage {
                role: MessageRole::Assistant,
                content: assistant,
            });

            let mut results = Vec::with_capacity(calls.len());
            for (id, name, input) in calls {
                tracing::info!(agent = %agent.name, tool = %name, round, "Executing tool");
                let output = agent
                    .tools
                    .execute(&name, input, ToolContext::new(tx.cancel_token()))
                    .await
                    .unwrap_or_else(|| ToolOutput::error(format!("Unknown tool: {name}")));
                if !output.success {
                    tracing::warn!(agent = %agent.name, tool = %name, output = %output.output, "Tool reported failure");
                }
                results.push(ContentBlock::tool_result(id, output.output, !output.success));
            }
            messages.push(LlmMessage {
                role: MessageRole::User,
                content: results,
            });

            round += 1;
        }
    }
}
