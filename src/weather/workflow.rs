//! Weather activity planning workflow
//!
//! `fetch-weather` resolves the trigger's city to a daily forecast, then
//! `plan-activities` asks the planning agent for suggestions based on it.

use super::{forecast_shape, ForecastEntry, ForecastSource};
use crate::agent::Agent;
use crate::prompts::activities_prompt;
use crate::schema::{Field, Shape};
use crate::workflow::{
    FnStep, Step, StepError, Workflow, WorkflowContext, WorkflowError, TRIGGER_ID,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const WORKFLOW_NAME: &str = "weather-workflow";
pub const FETCH_WEATHER_STEP: &str = "fetch-weather";
pub const PLAN_ACTIVITIES_STEP: &str = "plan-activities";

/// `{ city }`
pub fn trigger_shape() -> Shape {
    Shape::object(vec![
        Field::required("city", Shape::string()).describe("The city to get the weather for")
    ])
}

/// `{ activities }`
pub fn activities_shape() -> Shape {
    Shape::object(vec![Field::required("activities", Shape::string())])
}

/// Fetches the forecast for the trigger's city
pub fn fetch_weather_step(source: Arc<dyn ForecastSource>) -> impl Step {
    FnStep::new(
        FETCH_WEATHER_STEP,
        trigger_shape(),
        forecast_shape(),
        move |input: Value| {
            let source = Arc::clone(&source);
            async move {
                let city = input["city"].as_str().unwrap_or_default();
                let forecast = source.forecast(city).await?;
                tracing::info!(city = %city, days = forecast.len(), "Forecast fetched");
                serde_json::to_value(forecast)
                    .map_err(|e| StepError::failed(format!("Failed to encode forecast: {e}")))
            }
        },
    )
    .reading(TRIGGER_ID)
}

/// Streams activity suggestions for a forecast from the planning agent
pub struct PlanActivitiesStep {
    agent: Agent,
    input: Shape,
    output: Shape,
}

impl PlanActivitiesStep {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            input: forecast_shape(),
            output: activities_shape(),
        }
    }
}

#[async_trait]
impl Step for PlanActivitiesStep {
    fn id(&self) -> &str {
        PLAN_ACTIVITIES_STEP
    }

    fn input_shape(&self) -> &Shape {
        &self.input
    }

    fn output_shape(&self) -> &Shape {
        &self.output
    }

    fn reads(&self) -> Option<&str> {
        Some(FETCH_WEATHER_STEP)
    }

    async fn execute(&self, input: Value, _ctx: &WorkflowContext) -> Result<Value, StepError> {
        let forecast: Vec<ForecastEntry> = serde_json::from_value(input)
            .map_err(|e| StepError::failed(format!("Unreadable forecast: {e}")))?;
        if forecast.is_empty() {
            return Err(StepError::failed("Forecast data not found"));
        }

        let prompt = activities_prompt(&forecast)
            .map_err(|e| StepError::failed(format!("Failed to encode forecast: {e}")))?;

        let activities = self
            .agent
            .stream_text(prompt)
            .mirror(|chunk| tracing::info!(chunk = %chunk, "Planner output"))
            .text()
            .await?;

        Ok(json!({ "activities": activities }))
    }
}

/// `fetch-weather` then `plan-activities`
pub fn weather_workflow(
    source: Arc<dyn ForecastSource>,
    planner: Agent,
    step_timeout: Option<Duration>,
) -> Result<Workflow, WorkflowError> {
    let mut builder = Workflow::builder(WORKFLOW_NAME, trigger_shape())
        .step(fetch_weather_step(source))
        .then(PlanActivitiesStep::new(planner));
    if let Some(timeout) = step_timeout {
        builder = builder.step_timeout(timeout);
    }
    builder.commit()
}
