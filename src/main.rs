//! Word Quest · mission backend
//!
//! - Axum HTTP API for missions, sanitation, mentoring, reports, revenge queue, study plans
//! - Optional OpenAI integration (via environment variables)
//! - Static game frontend fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   DATA_DIR          : directory for persisted blobs (default "./data")
//!   OPENAI_API_KEY    : enables OpenAI integration if present
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_MODEL      : default "gpt-4o-mini"
//!   WORD_QUEST_CONFIG : path to TOML config (prompts, storage, mission settings)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod config;
mod domain;
mod logic;
mod mentor;
mod openai;
mod persistence;
mod prompts;
mod protocol;
mod report;
mod revenge;
mod routes;
mod sanitizer;
mod seeds;
mod snapshot;
mod state;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "word_quest", error = %e, "Failed to listen for shutdown signal");
  }
  info!(target: "word_quest", "Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (prompts, storage, revenge queue, OpenAI client).
  let state = Arc::new(AppState::new());

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "word_quest", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}
