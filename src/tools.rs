//! Tools the model can invoke
//!
//! Tools are stateless singletons; per-call context arrives via `ToolContext`.

mod weather;

pub use weather::WeatherTool;

use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// All context needed for a tool invocation
#[derive(Clone, Default)]
pub struct ToolContext {
    /// Cancelled when the completion that requested the call is abandoned
    pub cancel: CancellationToken,
}

impl ToolContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

/// Trait for tools that can be executed by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool. Failures are reported in the output, not raised.
    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput;
}

/// Collection of tools available to an agent
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Registry with no tools
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name with context
    pub async fn execute(&self, name: &str, input: Value, ctx: ToolContext) -> Option<ToolOutput> {
        for tool in &self.tools {
            if tool.name() == name {
                return Some(tool.run(input, ctx).await);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> String {
            "Echo the input".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn run(&self, input: Value, _ctx: ToolContext) -> ToolOutput {
            ToolOutput::success(input.to_string())
        }
    }

    #[tokio::test]
    async fn test_execute_by_name() {
        let registry = ToolRegistry::new(vec![Arc::new(EchoTool)]);
        let output = registry
            .execute("echo", json!({ "x": 1 }), ToolContext::default())
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.output, r#"{"x":1}"#);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_none() {
        let registry = ToolRegistry::new(vec![Arc::new(EchoTool)]);
        assert!(registry
            .execute("missing", json!({}), ToolContext::default())
            .await
            .is_none());
    }

    #[test]
    fn test_definitions() {
        let registry = ToolRegistry::new(vec![Arc::new(EchoTool)]);
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
        assert!(ToolRegistry::empty().is_empty());
    }
}
