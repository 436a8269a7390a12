//! Weather tool - current forecast for a named place

use super::{Tool, ToolContext, ToolOutput};
use crate::schema::{validate, Field, Shape};
use crate::weather::ForecastSource;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Lets the model look up the daily forecast for a location
pub struct WeatherTool {
    source: Arc<dyn ForecastSource>,
}

impl WeatherTool {
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        Self { source }
    }

    fn input_shape() -> Shape {
        Shape::object(vec![Field::required("location", Shape::string())
            .describe("City name, in English (e.g. \"New York\" rather than \"New York, NY\")")])
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn description(&self) -> String {
        "Get the daily weather forecast for a location: date, min/max temperature in °C, precipitation chance and conditions.".to_string()
    }

    fn input_schema(&self) -> Value {
        Self::input_shape().to_json_schema()
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let input = match validate(&Self::input_shape(), &input) {
            Ok(v) => v,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };
        let location = input["location"].as_str().unwrap_or_default();

        let result = tokio::select! {
            r = self.source.forecast(location) => r,
            () = ctx.cancel.cancelled() => return ToolOutput::error("Cancelled"),
        };

        match result {
            Ok(entries) => match serde_json::to_string(&entries) {
                Ok(json) => ToolOutput::success(json),
                Err(e) => ToolOutput::error(format!("Failed to encode forecast: {e}")),
            },
            Err(e) => {
                tracing::warn!(location = %location, error = %e, "Weather tool lookup failed");
                ToolOutput::error(e.to_string())
            }
        }
    }
}
