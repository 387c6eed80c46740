//! Loading agent configuration (prompts, storage, mission settings) from TOML.
//!
//! See `AgentConfig` and `Prompts` for expected schema. Every section is optional.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub storage: StorageCfg,
  #[serde(default)]
  pub mission: MissionCfg,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageCfg {
  /// Directory holding one JSON blob per storage key.
  #[serde(default = "default_data_dir")]
  pub data_dir: PathBuf,
}

impl Default for StorageCfg {
  fn default() -> Self {
    Self { data_dir: default_data_dir() }
  }
}

fn default_data_dir() -> PathBuf {
  PathBuf::from("./data")
}

#[derive(Clone, Debug, Deserialize)]
pub struct MissionCfg {
  /// How many revenge entries are mixed into the front of a freshly generated mission.
  #[serde(default = "default_revenge_mix")]
  pub revenge_mix: usize,
}

impl Default for MissionCfg {
  fn default() -> Self {
    Self { revenge_mix: default_revenge_mix() }
  }
}

fn default_revenge_mix() -> usize {
  2
}

/// System prompts sent to the model. Defaults target English learners and can be
/// overridden in TOML to tune tone. User prompts are built in `crate::prompts`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub level_system: String,
  pub mentor_system: String,
  pub report_system: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      level_system: LEVEL_SYSTEM.trim().into(),
      mentor_system: MENTOR_SYSTEM.trim().into(),
      report_system: REPORT_SYSTEM.trim().into(),
    }
  }
}

const LEVEL_SYSTEM: &str = r#"
You are an English-learning quiz designer for a battle game. Each quiz item is a "monster".
Respond ONLY with strict JSON.

Item selection rubric:
- grammar: 50% of items
- vocab: 30% of items
- reading: 20% of items

Every monster MUST have these fields:
- id (integer, unique in the batch)
- type ("grammar" | "vocab" | "reading")
- question (English only)
- options (exactly 4 real answer strings, never bare labels like "A" or "Option B")
- correct_index (0-3)
- correctAnswer (the text of options[correct_index])
- hint (English, short, never reveals the answer)
- explanation (may use the learner's native language)
- skillTag (the specific skill tested, e.g. "past-simple", "collocation")
- difficulty ("easy" | "medium" | "hard")
- questionMode ("choice" | "typing" | "fill-blank")

Hard constraint: NOT every monster may use "choice" mode. Include at least one "typing" or
"fill-blank" monster in every batch.
"#;

const MENTOR_SYSTEM: &str = r#"
You are a patient English mentor. The learner just answered a quiz item wrongly.
Explain briefly why the correct answer is right and why the learner's answer is not.
Respond ONLY with strict JSON containing:
- explanation: 2-4 sentences
- cause_tag: root cause of the mistake, one of "vocab_gap", "grammar_rule",
  "reading_comprehension", "careless_slip", "other"
- next_action: one concrete remediation step the learner should do next
"#;

const REPORT_SYSTEM: &str = r#"
You are a game narrator and English coach. Summarize the finished mission in a short,
encouraging report: overall result, the skills that need work (from the missed items),
and two concrete study suggestions. Plain text, under 150 words.
"#;

/// Attempt to load `AgentConfig` from WORD_QUEST_CONFIG. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("WORD_QUEST_CONFIG").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "word_quest", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "word_quest", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "word_quest", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
