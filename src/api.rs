//! HTTP API
//!
//! - `POST /api/chat` streams a reply from the weather agent
//! - `POST /api/workflows/weather` runs the activity planning workflow
//! - `GET /version`

mod handlers;
mod stream;
mod types;

pub use handlers::create_router;

use crate::agent::Agent;
use crate::workflow::Workflow;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat_agent: Agent,
    pub workflow: Arc<Workflow>,
}

impl AppState {
    pub fn new(chat_agent: Agent, workflow: Workflow) -> Self {
        Self {
            chat_agent,
            workflow: Arc::new(workflow),
        }
    }
}
