//! Application state: prompts, storage, the revenge queue and the optional OpenAI client.
//!
//! This module owns:
//!   - the prompts struct (from TOML or defaults)
//!   - the key-value store (None when the data directory is unusable)
//!   - the revenge queue, loaded once at startup and written back on every mutation
//!   - optional OpenAI client

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::{load_agent_config_from_env, AgentConfig, Prompts};
use crate::openai::OpenAI;
use crate::persistence::{FileStore, KvStore};
use crate::revenge::RevengeQueue;

#[derive(Clone)]
pub struct AppState {
  pub prompts: Prompts,
  pub openai: Option<OpenAI>,
  pub revenge: Arc<RwLock<RevengeQueue>>,
  pub revenge_mix: usize,
}

impl AppState {
  /// Build state from env: load config, open storage, load the revenge queue, init OpenAI.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let cfg = load_agent_config_from_env().unwrap_or_default();

    let data_dir = std::env::var("DATA_DIR")
      .map(PathBuf::from)
      .unwrap_or_else(|_| cfg.storage.data_dir.clone());
    let store: Option<Arc<dyn KvStore>> = match FileStore::open(&data_dir) {
      Ok(fs) => {
        info!(target: "word_quest", data_dir = %data_dir.display(), "Storage ready");
        let shared: Arc<dyn KvStore> = Arc::new(fs);
        Some(shared)
      }
      Err(e) => {
        error!(target: "word_quest", data_dir = %data_dir.display(), error = %e, "Storage unavailable; revenge queue will not persist");
        None
      }
    };

    let openai = OpenAI::from_env();
    if let Some(oa) = &openai {
      info!(target: "word_quest", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
    } else {
      info!(target: "word_quest", "OpenAI disabled (no OPENAI_API_KEY). Using built-in missions.");
    }

    Self::from_parts(cfg, store, openai)
  }

  pub fn from_parts(cfg: AgentConfig, store: Option<Arc<dyn KvStore>>, openai: Option<OpenAI>) -> Self {
    let queue = RevengeQueue::load(store);
    info!(target: "revenge", count = queue.len(), "Startup revenge queue");
    Self {
      prompts: cfg.prompts,
      openai,
      revenge: Arc::new(RwLock::new(queue)),
      revenge_mix: cfg.mission.revenge_mix,
    }
  }
}
