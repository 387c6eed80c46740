//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::{header, StatusCode},
  response::IntoResponse,
  Json,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::prompts::generate_level_prompt;
use crate::snapshot::compute_study_plan_completion_snapshot;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_mission(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MissionIn>,
) -> impl IntoResponse {
  let out = generate_mission(&state, &body.text, body.revenge_count).await;
  info!(target: "mission", id = %out.mission_id, source = out.source, count = out.monsters.len(), "HTTP mission served");
  Json(out)
}

#[instrument(level = "info", skip(body))]
pub async fn http_post_sanitize(Json(body): Json<Value>) -> impl IntoResponse {
  Json(sanitize_payload(&body))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_level_prompt(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LevelPromptIn>,
) -> impl IntoResponse {
  Json(PromptOut {
    system: state.prompts.level_system.clone(),
    prompt: generate_level_prompt(&body.text),
  })
}

#[instrument(level = "info", skip(state, body), fields(skill_tag = %body.skill_tag))]
pub async fn http_post_mentor(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MentorIn>,
) -> impl IntoResponse {
  let reply = mentor_reply(&state, &body).await;
  info!(target: "mission", cause_tag = reply.cause_tag.as_str(), "HTTP mentor reply served");
  Json(reply)
}

#[instrument(level = "info", skip(state, body), fields(total = body.total_questions, missed = body.missed_items.len()))]
pub async fn http_post_report(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ReportIn>,
) -> impl IntoResponse {
  let (score, text, source) = mission_report(&state, body.score, body.total_questions, &body.missed_items).await;
  Json(ReportOut { score, text, source })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_report_export(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExportIn>,
) -> impl IntoResponse {
  let md = export_report(&state, &body).await;
  ([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], md)
}

#[instrument(level = "info", skip(body), fields(items = body.items.len()))]
pub async fn http_post_snapshot(Json(body): Json<SnapshotIn>) -> impl IntoResponse {
  Json(compute_study_plan_completion_snapshot(&body.items, &body.status_by_id))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_revenge(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(RevengeListOut { entries: list_revenge(&state).await })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_revenge(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RevengeIn>,
) -> impl IntoResponse {
  match record_miss(&state, &body.question).await {
    Some(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
    None => (StatusCode::UNPROCESSABLE_ENTITY, "question must be a JSON object").into_response(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_revenge_entry(
  State(state): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> impl IntoResponse {
  let removed = resolve_revenge(&state, id).await;
  info!(target: "revenge", id, removed, "HTTP revenge entry resolved");
  Json(RemovedOut { removed })
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_revenge(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  clear_revenge(&state).await;
  StatusCode::NO_CONTENT
}
