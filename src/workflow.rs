//! Sequential step workflows
//!
//! A workflow is an ordered, immutable list of steps assembled with
//! [`Workflow::builder`]. Each run validates the trigger, then executes the
//! steps in registration order, checking every input and output against the
//! step's declared shapes. The first failure stops the run.
//!
//! ```text
//! Pending -> Running -> Completed
//!                    -> Failed
//! ```

mod context;
mod error;
mod run;
mod step;

#[cfg(test)]
mod proptests;

pub use context::{WorkflowContext, TRIGGER_ID};
pub use error::{StepError, ValidationStage, WorkflowError};
pub use run::{RunResult, RunStatus, StepFailure};
pub use step::{FnStep, Step};

use crate::schema::{validate, Shape};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Where a step's input comes from, resolved at commit time
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    Trigger,
    Step(String),
}

struct Slot {
    step: Arc<dyn Step>,
    input: InputSource,
}

/// Assembles a workflow. Nothing is checked until [`WorkflowBuilder::commit`].
pub struct WorkflowBuilder {
    name: String,
    trigger_shape: Shape,
    steps: Vec<Arc<dyn Step>>,
    step_timeout: Option<Duration>,
}

impl WorkflowBuilder {
    /// Register the first step
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Register the next step
    pub fn then(self, step: impl Step + 'static) -> Self {
        self.step(step)
    }

    /// Fail any step that runs longer than `timeout`. Off by default.
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    /// Freeze the step list
    pub fn commit(self) -> Result<Workflow, WorkflowError> {
        if self.steps.is_empty() {
            return Err(WorkflowError::Empty(self.name));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut inputs = Vec::with_capacity(self.steps.len());
        let mut previous: Option<&str> = None;

        for step in &self.steps {
            let id = step.id();
            if id == TRIGGER_ID {
                return Err(WorkflowError::ReservedId(id.to_string()));
            }
            if seen.contains(id) {
                return Err(WorkflowError::DuplicateStep(id.to_string()));
            }

            let input = match step.reads() {
                Some(TRIGGER_ID) => InputSource::Trigger,
                Some(reads) if seen.contains(reads) => InputSource::Step(reads.to_string()),
                Some(reads) => {
                    return Err(WorkflowError::UnknownPredecessor {
                        step: id.to_string(),
                        reads: reads.to_string(),
                    })
                }
                None => previous.map_or(InputSource::Trigger, |p| InputSource::Step(p.to_string())),
            };

            seen.insert(id);
            previous = Some(id);
            inputs.push(input);
        }

        let slots = self
            .steps
            .iter()
            .zip(inputs)
            .map(|(step, input)| Slot {
                step: Arc::clone(step),
                input,
            })
            .collect();

        Ok(Workflow {
            name: self.name,
            trigger_shape: self.trigger_shape,
            slots,
            step_timeout: self.step_timeout,
        })
    }
}

/// A committed, immutable workflow definition. Shareable across runs.
pub struct Workflow {
    name: String,
    trigger_shape: Shape,
    slots: Vec<Slot>,
    step_timeout: Option<Duration>,
}

impl Workflow {
    pub fn builder(name: impl Into<String>, trigger_shape: Shape) -> WorkflowBuilder {
        WorkflowBuilder {
            name: name.into(),
            trigger_shape,
            steps: Vec::new(),
            step_timeout: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Step ids in execution order
    pub fn step_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.step.id()).collect()
    }

    /// A fresh run with its own id and empty context
    pub fn create_run(&self) -> WorkflowRun<'_> {
        WorkflowRun {
            workflow: self,
            run_id: Uuid::new_v4(),
            status: RunStatus::Pending,
        }
    }
}

/// A single execution of a workflow. Consumed by [`WorkflowRun::start`].
pub struct WorkflowRun<'a> {
    workflow: &'a Workflow,
    run_id: Uuid,
    status: RunStatus,
}

impl WorkflowRun<'_> {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Execute every step against `trigger` and report the outcome
    pub async fn start(self, trigger: Value) -> RunResult {
        let span = tracing::info_span!(
            "workflow_run",
            workflow = %self.workflow.name,
            run_id = %self.run_id,
        );
        let result = self.execute(trigger).instrument(span).await;
        debug_assert!(result.status.is_terminal());
        result
    }

    fn advance(&mut self, next: RunStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "invalid run transition {:?} -> {next:?}",
            self.status
        );
        self.status = next;
    }

    async fn execute(mut self, trigger: Value) -> RunResult {
        let started = Instant::now();
        self.advance(RunStatus::Running);
        tracing::info!("Workflow run started");

        let trigger = match validate(&self.workflow.trigger_shape, &trigger) {
            Ok(normalized) => normalized,
            Err(e) => {
                let error = StepError::validation(ValidationStage::Trigger, e);
                return self.fail(WorkflowContext::new(trigger), TRIGGER_ID, error, started);
            }
        };

        let mut context = WorkflowContext::new(trigger);
        let workflow = self.workflow;

        for slot in &workflow.slots {
            let id = slot.step.id();
            let input = match &slot.input {
                InputSource::Trigger => context.trigger().clone(),
                InputSource::Step(source) => match context.get(source) {
                    Some(value) => value.clone(),
                    None => {
                        let error = StepError::failed(format!("Output of '{source}' is missing"));
                        return self.fail(context, id, error, started);
                    }
                },
            };

            let step_started = Instant::now();
            let result = self
                .run_step(slot.step.as_ref(), input, &context)
                .instrument(tracing::info_span!("step", step_id = %id))
                .await;

            match result {
                Ok(output) => {
                    tracing::info!(
                        step_id = %id,
                        duration_ms = %step_started.elapsed().as_millis(),
                        "Step completed"
                    );
                    context.commit(id, output);
                }
                Err(error) => return self.fail(context, id, error, started),
            }
        }

        self.advance(RunStatus::Completed);
        tracing::info!(
            steps = context.len(),
            duration_ms = %started.elapsed().as_millis(),
            "Workflow run completed"
        );
        RunResult {
            run_id: self.run_id,
            workflow: workflow.name.clone(),
            status: self.status,
            context,
            failure: None,
            duration: started.elapsed(),
        }
    }

    async fn run_step(
        &self,
        step: &dyn Step,
        input: Value,
        context: &WorkflowContext,
    ) -> Result<Value, StepError> {
        let input = validate(step.input_shape(), &input)
            .map_err(|e| StepError::validation(ValidationStage::Input, e))?;

        let output = match self.workflow.step_timeout {
            Some(limit) => tokio::time::timeout(limit, step.execute(input, context))
                .await
                .map_err(|_| StepError::Timeout(limit))??,
            None => step.execute(input, context).await?,
        };

        validate(step.output_shape(), &output)
            .map_err(|e| StepError::validation(ValidationStage::Output, e))
    }

    fn fail(
        mut self,
        context: WorkflowContext,
        step_id: &str,
        error: StepError,
        started: Instant,
    ) -> RunResult {
        self.advance(RunStatus::Failed);
        tracing::warn!(
            step_id = %step_id,
            error = %error,
            duration_ms = %started.elapsed().as_millis(),
            "Workflow run failed"
        );
        RunResult {
            run_id: self.run_id,
            workflow: self.workflow.name.clone(),
            status: self.status,
            context,
            failure: Some(StepFailure {
                step_id: step_id.to_string(),
                error,
            }),
            duration: started.elapsed(),
        }
    }
}
