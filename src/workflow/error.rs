//! Workflow error types

use crate::llm::LlmError;
use crate::schema::ValidationError;
use crate::weather::FetchError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which boundary a validation failure happened at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    Trigger,
    Input,
    Output,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trigger => "trigger",
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// Why a step (or the trigger) failed. Fatal to the run.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Invalid {stage}: {source}")]
    Validation {
        stage: ValidationStage,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("Step timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Failed(String),
}

impl StepError {
    pub fn validation(stage: ValidationStage, source: ValidationError) -> Self {
        Self::Validation { stage, source }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Rejected workflow definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Workflow '{0}' has no steps")]
    Empty(String),

    #[error("Duplicate step id '{0}'")]
    DuplicateStep(String),

    #[error("Step id '{0}' is reserved")]
    ReservedId(String),

    #[error("Step '{step}' reads '{reads}', which is not registered before it")]
    UnknownPredecessor { step: String, reads: String },
}
