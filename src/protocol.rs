//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{MissedItem, Question, RevengeEntry, StudyPlanItem, StudyPlanStatus};
use crate::sanitizer::SanitizeReport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionIn {
  pub text: String,
  /// Overrides the configured number of revenge entries mixed into the mission.
  #[serde(default)]
  pub revenge_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionOut {
  pub mission_id: String,
  /// "openai" or "fallback".
  pub source: &'static str,
  pub monsters: Vec<Question>,
  pub revenge_count: usize,
  pub mode_variety: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeOut {
  pub monsters: Vec<Question>,
  pub report: SanitizeReport,
  pub mode_variety: bool,
}

#[derive(Debug, Deserialize)]
pub struct LevelPromptIn {
  pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PromptOut {
  pub system: String,
  pub prompt: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MentorIn {
  pub question: String,
  pub user_answer: String,
  pub correct_answer: String,
  pub skill_tag: String,
  pub difficulty: String,
  pub question_mode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIn {
  /// When absent, computed from `total_questions` and the number of missed items.
  #[serde(default)]
  pub score: Option<u32>,
  pub total_questions: usize,
  #[serde(default)]
  pub missed_items: Vec<MissedItem>,
}

#[derive(Debug, Serialize)]
pub struct ReportOut {
  pub score: u32,
  pub text: String,
  /// "openai" or "local".
  pub source: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RevengeIn {
  /// Raw question record; it is sanitized before being queued.
  pub question: Value,
}

#[derive(Debug, Serialize)]
pub struct RevengeListOut {
  pub entries: Vec<RevengeEntry>,
}

#[derive(Debug, Serialize)]
pub struct RemovedOut {
  pub removed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotIn {
  #[serde(default)]
  pub items: Vec<StudyPlanItem>,
  #[serde(default)]
  pub status_by_id: HashMap<String, StudyPlanStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportIn {
  #[serde(default)]
  pub score: Option<u32>,
  pub total_questions: usize,
  #[serde(default)]
  pub missed_items: Vec<MissedItem>,
  #[serde(default)]
  pub items: Vec<StudyPlanItem>,
  #[serde(default)]
  pub status_by_id: HashMap<String, StudyPlanStatus>,
  #[serde(default)]
  pub narrative: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}
