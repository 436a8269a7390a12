//! Forecast Assistant - weather chat and activity planning service
//!
//! Serves a streamed chat endpoint backed by a tool-using weather agent, and
//! a two-step workflow that fetches a forecast and plans activities for it.

mod agent;
mod api;
mod config;
mod llm;
mod prompts;
mod schema;
mod tools;
mod weather;
mod workflow;

use agent::Agent;
use api::{create_router, AppState};
use config::AppConfig;
use llm::{LlmService, LoggingService, OpenAiService};
use prompts::{
    PLANNER_AGENT_NAME, PLANNER_INSTRUCTIONS, WEATHER_AGENT_INSTRUCTIONS, WEATHER_AGENT_NAME,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::{ToolRegistry, WeatherTool};
use tower_http::{
    compression::{
        predicate::{NotForContentType, Predicate},
        CompressionLayer, DefaultPredicate,
    },
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather::workflow::weather_workflow;
use weather::{ForecastSource, OpenMeteoClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_assistant=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();
    if config.openai.api_key.is_none() {
        tracing::warn!("No LLM API key configured. Set OPENAI_API_KEY.");
    }

    // Services are built once and shared by every request
    let openai = OpenAiService::new(&config.openai)?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(openai)));
    let source: Arc<dyn ForecastSource> = Arc::new(OpenMeteoClient::new(config.open_meteo.clone())?);

    let chat_agent = Agent::new(WEATHER_AGENT_NAME, WEATHER_AGENT_INSTRUCTIONS, Arc::clone(&llm))
        .with_tools(ToolRegistry::new(vec![Arc::new(WeatherTool::new(
            Arc::clone(&source),
        ))]))
        .with_max_tool_rounds(config.max_tool_rounds);
    let planner = Agent::new(PLANNER_AGENT_NAME, PLANNER_INSTRUCTIONS, llm);
    let workflow = weather_workflow(source, planner, config.step_timeout)?;

    tracing::info!(
        model = %config.openai.model,
        workflow = %workflow.name(),
        steps = ?workflow.step_ids(),
        step_timeout_secs = ?config.step_timeout.map(|t| t.as_secs()),
        "Services initialized"
    );

    // Create application state
    let state = AppState::new(chat_agent, workflow);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Chat replies (text/plain) must reach the client fragment by fragment
    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true)
        .compress_when(
            DefaultPredicate::new().and(NotForContentType::const_new("text/plain")),
        );

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Forecast Assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
