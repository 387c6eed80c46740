//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! - LOG_LEVEL controls the filter, e.g. "debug" or
//!   "info,mission=debug,revenge=debug,ai_metrics=info,tower_http=warn".
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Targets in use: `word_quest` (lifecycle), `mission` (generation and sanitation),
//! `revenge` (queue persistence), `ai_metrics` (one record per model call).

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,mission=debug,revenge=debug,word_quest=debug,tower_http=info,axum=info";

#[derive(Debug, PartialEq, Eq)]
enum LogFormat {
  Pretty,
  Json,
}

impl LogFormat {
  fn from_env_value(v: Option<&str>) -> Self {
    match v.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
      Some("json") => LogFormat::Json,
      _ => LogFormat::Pretty,
    }
  }
}

pub fn init_tracing() {
  let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .with_file(true)
    .with_line_number(true);

  // The two branches produce different subscriber types, so each one calls init itself.
  match LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref()) {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}
