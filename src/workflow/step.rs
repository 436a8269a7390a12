//! Step definitions

use super::context::WorkflowContext;
use super::error::StepError;
use crate::schema::Shape;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

/// One unit of a workflow.
///
/// The runner validates the input against `input_shape` before calling
/// `execute`, and the result against `output_shape` after.
#[async_trait]
pub trait Step: Send + Sync {
    /// Stable identifier, unique within its workflow
    fn id(&self) -> &str;

    fn input_shape(&self) -> &Shape;

    fn output_shape(&self) -> &Shape;

    /// Id of the earlier step whose output becomes this step's input.
    ///
    /// `None` means the step registered immediately before, or the trigger
    /// for the first step.
    fn reads(&self) -> Option<&str> {
        None
    }

    async fn execute(&self, input: Value, ctx: &WorkflowContext) -> Result<Value, StepError>;
}

/// Step built from an async closure over its input
pub struct FnStep<F> {
    id: String,
    input_shape: Shape,
    output_shape: Shape,
    reads: Option<String>,
    f: F,
}

impl<F, Fut> FnStep<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, StepError>> + Send,
{
    pub fn new(id: impl Into<String>, input_shape: Shape, output_shape: Shape, f: F) -> Self {
        Self {
            id: id.into(),
            input_shape,
            output_shape,
            reads: None,
            f,
        }
    }

    /// Take input from step `id` instead of the preceding one
    pub fn reading(mut self, id: impl Into<String>) -> Self {
        self.reads = Some(id.into());
        self
    }
}

#[async_trait]
impl<F, Fut> Step for FnStep<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, StepError>> + Send,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    fn reads(&self) -> Option<&str> {
        self.reads.as_deref()
    }

    async fn execute(&self, input: Value, _ctx: &WorkflowContext) -> Result<Value, StepError> {
        (self.f)(input).await
    }
}
