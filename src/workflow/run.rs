//! Run status and results

use super::context::WorkflowContext;
use super::error::StepError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Lifecycle of a single run.
///
/// Valid transitions:
/// - `Pending` -> `Running`
/// - `Running` -> `Completed`
/// - `Running` -> `Failed`
///
/// Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_transition_to(self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed | Self::Failed)
        )
    }
}

/// The step that stopped a run, and why
#[derive(Debug)]
pub struct StepFailure {
    pub step_id: String,
    pub error: StepError,
}

/// Outcome of a finished run
#[derive(Debug)]
pub struct RunResult {
    pub run_id: Uuid,
    pub workflow: String,
    pub status: RunStatus,
    pub context: WorkflowContext,
    pub failure: Option<StepFailure>,
    pub duration: Duration,
}

impl RunResult {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Output of the final step, present only for completed runs
    pub fn output(&self) -> Option<&Value> {
        if self.is_completed() {
            self.context.last().map(|(_, v)| v)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn step_output(&self, id: &str) -> Option<&Value> {
        self.context.steps().get(id)
    }
}
