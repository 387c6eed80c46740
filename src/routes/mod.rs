//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
  routing::{delete, get, post},
  Router,
};
use tower_http::{
  cors::{Any, CorsLayer},
  services::{ServeDir, ServeFile},
  trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - Static game frontend from `./static` with index fallback
/// - CORS (allow any origin/method/headers); adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
  // Static files with SPA fallback
  let static_service = ServeDir::new("./static")
    .append_index_html_on_directories(true)
    .not_found_service(ServeFile::new("./static/index.html"));

  Router::new()
    .route("/api/v1/health", get(http::http_health))
    .route("/api/v1/mission", post(http::http_post_mission))
    .route("/api/v1/mission/sanitize", post(http::http_post_sanitize))
    .route("/api/v1/prompts/level", post(http::http_post_level_prompt))
    .route("/api/v1/mentor", post(http::http_post_mentor))
    .route("/api/v1/report", post(http::http_post_report))
    .route("/api/v1/report/export", post(http::http_post_report_export))
    .route("/api/v1/study-plan/snapshot", post(http::http_post_snapshot))
    .route(
      "/api/v1/revenge",
      get(http::http_get_revenge)
        .post(http::http_post_revenge)
        .delete(http::http_delete_revenge),
    )
    .route("/api/v1/revenge/:id", delete(http::http_delete_revenge_entry))
    // State + CORS + HTTP tracing
    .with_state(state)
    .layer(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any),
    )
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    // Frontend fallback
    .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
  };
  use serde_json::{json, Value};
  use tower::ServiceExt;

  use super::build_router;
  use crate::config::AgentConfig;
  use crate::persistence::{KvStore, MemoryStore};
  use crate::revenge::load_initial_revenge_queue;
  use crate::state::AppState;

  fn app_with_store() -> (Router, Arc<dyn KvStore>) {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::default());
    let state = AppState::from_parts(AgentConfig::default(), Some(store.clone()), None);
    (build_router(Arc::new(state)), store)
  }

  async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/json")
      .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
  }

  async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let v = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, v)
  }

  #[tokio::test]
  async fn health_is_ok() {
    let (app, _) = app_with_store();
    let (status, body) = send_json(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
  }

  #[tokio::test]
  async fn sanitize_endpoint_repairs_payload() {
    let (app, _) = app_with_store();
    let payload = json!({"monsters": [
      {"id": 1, "question": "Where do students study?", "options": ["A. classroom", "B. kitchen", "C. river", "D. cloud"], "correct_index": 0},
      {"id": 2, "question": "这是什么?", "options": ["A", "B", "C", "D"], "correct_index": 2}
    ]});
    let (status, body) = send_json(&app, "POST", "/api/v1/mission/sanitize", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    let monsters = body["monsters"].as_array().unwrap();
    assert_eq!(monsters.len(), 2);
    assert_eq!(monsters[0]["options"], json!(["classroom", "kitchen", "river", "cloud"]));
    assert_eq!(monsters[0]["correctAnswer"], "classroom");
    assert_eq!(monsters[1]["correct_index"], 2);
    assert_eq!(body["report"]["scriptFallbacks"], 1);
    assert_eq!(body["report"]["labelsStripped"], 4);
  }

  #[tokio::test]
  async fn mission_without_model_uses_fallback_and_revenge_mix() {
    let (app, store) = app_with_store();
    let missed = json!({"question": {
      "id": 3, "type": "vocab", "question": "Opposite of noisy?",
      "options": ["quiet", "loud", "busy", "angry"], "correct_index": 0
    }});
    let (status, entry) = send_json(&app, "POST", "/api/v1/revenge", Some(missed)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(entry["id"], 3);
    assert_eq!(entry["sourceContextSpan"], "revenge");
    assert_eq!(load_initial_revenge_queue(Some(store.as_ref())).len(), 1);

    let (status, body) = send_json(&app, "POST", "/api/v1/mission", Some(json!({"text": "The students walked into the classroom."}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["revengeCount"], 1);
    assert_eq!(body["modeVariety"], true);
    let monsters = body["monsters"].as_array().unwrap();
    assert_eq!(monsters[0]["question"], "Opposite of noisy?");
    assert_eq!(monsters[0]["sourceContextSpan"], "revenge");

    let id = entry["id"].as_i64().unwrap();
    let (_, removed) = send_json(&app, "DELETE", &format!("/api/v1/revenge/{id}"), None).await;
    assert_eq!(removed["removed"], true);
    let (_, list) = send_json(&app, "GET", "/api/v1/revenge", None).await;
    assert!(list["entries"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn revenge_rejects_non_object_question() {
    let (app, _) = app_with_store();
    let (status, _) = send(&app, "POST", "/api/v1/revenge", Some(json!({"question": "nope"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn snapshot_endpoint_defaults_unknown_statuses() {
    let (app, _) = app_with_store();
    let body = json!({
      "items": [
        {"id": "a1", "title": "Verbs", "estimatedMinutes": 10},
        {"id": "a2", "title": "Story", "estimatedMinutes": 12},
        {"id": "a3", "title": "Words", "estimatedMinutes": 8}
      ],
      "statusById": {"a1": "completed", "a2": "skipped", "a3": "paused"}
    });
    let (status, snap) = send_json(&app, "POST", "/api/v1/study-plan/snapshot", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["totalActions"], 3);
    assert_eq!(snap["completedActions"], 1);
    assert_eq!(snap["skippedActions"], 1);
    assert_eq!(snap["pendingActions"], 1);
    assert_eq!(snap["plannedMinutes"], 30.0);
    assert_eq!(snap["completedMinutes"], 10.0);
    assert_eq!(snap["rows"][2]["status"], "pending");
  }

  #[tokio::test]
  async fn report_and_export_without_model() {
    let (app, _) = app_with_store();
    let (status, report) = send_json(
      &app,
      "POST",
      "/api/v1/report",
      Some(json!({"totalQuestions": 4, "missedItems": [{"question": "q", "userAnswer": "a", "correctAnswer": "b", "skillTag": "tense"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["score"], 75);
    assert_eq!(report["source"], "local");

    let (status, bytes) = send(
      &app,
      "POST",
      "/api/v1/report/export",
      Some(json!({"score": 50, "totalQuestions": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let md = String::from_utf8(bytes).unwrap();
    assert!(md.contains("Mission Score: 50 / 100"));
    assert!(md.contains("Total Questions: 10"));
  }

  #[tokio::test]
  async fn level_prompt_and_mentor_fallback() {
    let (app, _) = app_with_store();
    let (_, p) = send_json(&app, "POST", "/api/v1/prompts/level", Some(json!({"text": "Tom likes apples."}))).await;
    assert!(p["prompt"].as_str().unwrap().contains("Tom likes apples."));
    assert!(p["system"].as_str().unwrap().contains("questionMode"));

    let (_, m) = send_json(
      &app,
      "POST",
      "/api/v1/mentor",
      Some(json!({"question": "He ___ football.", "userAnswer": "play", "correctAnswer": "plays", "skillTag": "grammar"})),
    )
    .await;
    assert_eq!(m["causeTag"], "grammar_rule");
    assert!(!m["nextAction"].as_str().unwrap().is_empty());
  }
}
