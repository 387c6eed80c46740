//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Generating a mission (model or built-in seeds), sanitizing it, mixing in revenge items
//!   - Mentor explanations and mission reports, with local fallbacks
//!   - Revenge queue operations
//!   - Study plan snapshots and the exportable progress report

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{MentorReply, MissedItem, Question, RevengeEntry};
use crate::mentor::local_mentor_reply;
use crate::prompts::mission_score;
use crate::protocol::{ExportIn, MentorIn, MissionOut, SanitizeOut};
use crate::report::{local_summary, render_markdown, ProgressReport};
use crate::sanitizer::{has_mode_variety, normalize_with_report, parse_raw_batch, resanitize, SanitizeReport};
use crate::seeds::seed_mission;
use crate::snapshot::compute_study_plan_completion_snapshot;
use crate::state::AppState;

fn log_report(mission_id: &str, report: &SanitizeReport) {
  if report.is_clean() {
    debug!(target: "mission", %mission_id, "Mission content passed sanitation untouched");
  } else {
    warn!(
      target: "mission",
      %mission_id,
      labels_stripped = report.labels_stripped,
      placeholders_replaced = report.placeholders_replaced,
      slots_filled = report.slots_filled,
      indices_recovered = report.indices_recovered,
      hints_replaced = report.hints_replaced,
      script_fallbacks = report.script_fallbacks,
      empty_fallbacks = report.empty_fallbacks,
      "Mission content repaired"
    );
  }
}

#[instrument(level = "info", skip(state, input_text), fields(text_len = input_text.len()))]
pub async fn generate_mission(state: &AppState, input_text: &str, revenge_count: Option<usize>) -> MissionOut {
  let mission_id = Uuid::new_v4().to_string();

  let (raw, source) = match &state.openai {
    Some(oa) => match oa.generate_mission(&state.prompts, input_text).await {
      Ok(raw) => (raw, "openai"),
      Err(e) => {
        error!(target: "mission", %mission_id, error = %e, "Mission generation failed; using built-in mission");
        (seed_mission(input_text), "fallback")
      }
    },
    None => (seed_mission(input_text), "fallback"),
  };

  let (fresh, report) = normalize_with_report(&raw);
  log_report(&mission_id, &report);

  let wanted = revenge_count.unwrap_or(state.revenge_mix);
  let revenge = { resanitize(&state.revenge.read().await.peek_questions(wanted)) };
  let revenge_count = revenge.len();

  let mut monsters = revenge;
  monsters.extend(fresh);

  let mode_variety = has_mode_variety(&monsters);
  if !mode_variety {
    warn!(target: "mission", %mission_id, count = monsters.len(), "Mission uses only choice mode");
  }
  info!(target: "mission", %mission_id, %source, count = monsters.len(), revenge_count, "Mission ready");

  MissionOut { mission_id, source, monsters, revenge_count, mode_variety }
}

/// Sanitizes an arbitrary payload (array or wrapper object) from an external generator.
pub fn sanitize_payload(payload: &Value) -> SanitizeOut {
  let raw = parse_raw_batch(payload);
  let (monsters, report) = normalize_with_report(&raw);
  log_report("external", &report);
  let mode_variety = has_mode_variety(&monsters);
  SanitizeOut { monsters, report, mode_variety }
}

#[instrument(level = "info", skip(state, req), fields(skill_tag = %req.skill_tag))]
pub async fn mentor_reply(state: &AppState, req: &MentorIn) -> MentorReply {
  if let Some(oa) = &state.openai {
    match oa
      .mentor(
        &state.prompts,
        &req.question,
        &req.user_answer,
        &req.correct_answer,
        &req.skill_tag,
        &req.difficulty,
        &req.question_mode,
      )
      .await
    {
      Ok(reply) => return reply,
      Err(e) => error!(target: "mission", error = %e, "Mentor call failed; using local explanation"),
    }
  }
  local_mentor_reply(&req.user_answer, &req.correct_answer, &req.skill_tag)
}

/// Returns the score used, the report text and where it came from.
#[instrument(level = "info", skip(state, missed), fields(missed = missed.len()))]
pub async fn mission_report(
  state: &AppState,
  score: Option<u32>,
  total_questions: usize,
  missed: &[MissedItem],
) -> (u32, String, &'static str) {
  let score = score.unwrap_or_else(|| mission_score(total_questions, missed.len())).min(100);
  if let Some(oa) = &state.openai {
    match oa.mission_report(&state.prompts, score, total_questions, missed).await {
      Ok(text) if !text.is_empty() => return (score, text, "openai"),
      Ok(_) => warn!(target: "mission", "Report model returned empty text; using local summary"),
      Err(e) => error!(target: "mission", error = %e, "Report call failed; using local summary"),
    }
  }
  (score, local_summary(score, total_questions, missed), "local")
}

/// Sanitizes a client-submitted question and queues it. `None` when the payload holds no record.
#[instrument(level = "info", skip(state, question))]
pub async fn record_miss(state: &AppState, question: &Value) -> Option<RevengeEntry> {
  let raw = parse_raw_batch(question);
  let (clean, report) = normalize_with_report(&raw);
  log_report("revenge", &report);
  let q: &Question = clean.first()?;
  let entry = state.revenge.write().await.enqueue(q).await;
  info!(target: "revenge", id = entry.id, "Question queued for revenge");
  Some(entry)
}

pub async fn list_revenge(state: &AppState) -> Vec<RevengeEntry> {
  state.revenge.read().await.entries().to_vec()
}

#[instrument(level = "info", skip(state))]
pub async fn resolve_revenge(state: &AppState, id: i64) -> bool {
  state.revenge.write().await.remove(id).await
}

#[instrument(level = "info", skip(state))]
pub async fn clear_revenge(state: &AppState) {
  state.revenge.write().await.clear().await;
}

#[instrument(level = "info", skip(state, req), fields(missed = req.missed_items.len(), items = req.items.len()))]
pub async fn export_report(state: &AppState, req: &ExportIn) -> String {
  let score = req
    .score
    .unwrap_or_else(|| mission_score(req.total_questions, req.missed_items.len()))
    .min(100);
  let snapshot = (!req.items.is_empty())
    .then(|| compute_study_plan_completion_snapshot(&req.items, &req.status_by_id));
  let revenge_queue_len = state.revenge.read().await.len();
  let fallback;
  let narrative = match req.narrative.as_deref() {
    Some(n) => n,
    None => {
      fallback = local_summary(score, req.total_questions, &req.missed_items);
      fallback.as_str()
    }
  };
  render_markdown(&ProgressReport {
    score,
    total_questions: req.total_questions,
    missed: &req.missed_items,
    snapshot: snapshot.as_ref(),
    revenge_queue_len,
    narrative: Some(narrative),
  })
}
