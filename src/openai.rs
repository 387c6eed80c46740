//! Minimal OpenAI client for mission generation, mentoring and reports.
//!
//! Each call is a single attempt (no retry/backoff). Every call emits one structured
//! `ai_metrics` record: provider, model, outcome, latency, status code, rate limiting.
//!
//! NOTE: We never log the API key and we keep payload truncations short to avoid PII leaks.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::{MentorReply, MissedItem, RawQuestion};
use crate::mentor::parse_mentor_reply;
use crate::prompts::{generate_level_prompt, generate_mentor_prompt, generate_report_prompt};
use crate::sanitizer::parse_raw_batch_str;
use crate::util::trunc_for_log;

const PROVIDER: &str = "openai";

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
  Success,
  Error,
  Timeout,
}

/// Observability record for one model call.
#[derive(Clone, Debug, Serialize)]
pub struct AiCallRecord {
  pub provider: &'static str,
  pub model: String,
  pub operation: &'static str,
  pub outcome: CallOutcome,
  pub attempt: u32,
  pub retries: u32,
  pub rate_limited: bool,
  pub latency_ms: u64,
  pub status_code: Option<u16>,
}

impl AiCallRecord {
  fn emit(&self) {
    info!(
      target: "ai_metrics",
      provider = self.provider,
      model = %self.model,
      operation = self.operation,
      outcome = ?self.outcome,
      attempt = self.attempt,
      retries = self.retries,
      rate_limited = self.rate_limited,
      latency_ms = self.latency_ms,
      status_code = ?self.status_code,
      "AI call finished"
    );
  }
}

/// Outcome classification from the transport result and HTTP status.
pub fn classify_outcome(timed_out: bool, status: Option<StatusCode>) -> (CallOutcome, bool) {
  let rate_limited = status == Some(StatusCode::TOO_MANY_REQUESTS);
  let outcome = if timed_out || status == Some(StatusCode::GATEWAY_TIMEOUT) || status == Some(StatusCode::REQUEST_TIMEOUT) {
    CallOutcome::Timeout
  } else if status.map(|s| s.is_success()).unwrap_or(false) {
    CallOutcome::Success
  } else {
    CallOutcome::Error
  };
  (outcome, rate_limited)
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(45))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// Chat completion returning the raw message text. `json` requests a strict JSON object.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat(
    &self,
    operation: &'static str,
    system: &str,
    user: &str,
    temperature: f32,
    json: bool,
  ) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: json.then(|| ResponseFormat { r#type: "json_object".into() }),
    };

    let start = Instant::now();
    let sent = self.client.post(&url)
      .header(USER_AGENT, "word-quest-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await;

    let mut record = AiCallRecord {
      provider: PROVIDER,
      model: self.model.clone(),
      operation,
      outcome: CallOutcome::Error,
      attempt: 1,
      retries: 0,
      rate_limited: false,
      latency_ms: 0,
      status_code: None,
    };

    let res = match sent {
      Ok(res) => res,
      Err(e) => {
        let (outcome, _) = classify_outcome(e.is_timeout(), None);
        record.outcome = outcome;
        record.latency_ms = start.elapsed().as_millis() as u64;
        record.emit();
        return Err(e.to_string());
      }
    };

    let status = res.status();
    let (outcome, rate_limited) = classify_outcome(false, Some(status));
    record.status_code = Some(status.as_u16());
    record.rate_limited = rate_limited;

    let result = if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      record.outcome = outcome;
      Err(format!("OpenAI HTTP {}: {}", status, msg))
    } else {
      match res.json::<ChatCompletionResponse>().await {
        Ok(body) => {
          if let Some(usage) = &body.usage {
            debug!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
          }
          record.outcome = CallOutcome::Success;
          Ok(body.choices.first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default().trim().to_string())
        }
        Err(e) => {
          let (outcome, _) = classify_outcome(e.is_timeout(), None);
          record.outcome = outcome;
          Err(e.to_string())
        }
      }
    };
    record.latency_ms = start.elapsed().as_millis() as u64;
    record.emit();
    result
  }

  // --- High-level helpers (domain-specialized) ---

  /// Generates raw mission records from the learner's text. Records are NOT sanitized here.
  #[instrument(level = "info", skip(self, prompts, input_text), fields(text_len = input_text.len()))]
  pub async fn generate_mission(&self, prompts: &Prompts, input_text: &str) -> Result<Vec<RawQuestion>, String> {
    let user = generate_level_prompt(input_text);
    let text = self.chat("level", &prompts.level_system, &user, 0.8, true).await?;
    let raw = parse_raw_batch_str(&text);
    if raw.is_empty() {
      warn!(target: "mission", payload = %trunc_for_log(&text, 200), "Model returned no usable monsters");
      return Err("model returned no monsters".into());
    }
    info!(target: "mission", count = raw.len(), "Model returned monsters");
    Ok(raw)
  }

  #[instrument(level = "info", skip_all, fields(skill_tag = %skill_tag))]
  #[allow(clippy::too_many_arguments)]
  pub async fn mentor(
    &self,
    prompts: &Prompts,
    question: &str,
    user_answer: &str,
    correct_answer: &str,
    skill_tag: &str,
    difficulty: &str,
    question_mode: &str,
  ) -> Result<MentorReply, String> {
    let user = generate_mentor_prompt(question, user_answer, correct_answer, skill_tag, difficulty, question_mode);
    let text = self.chat("mentor", &prompts.mentor_system, &user, 0.3, true).await?;
    Ok(parse_mentor_reply(&text))
  }

  #[instrument(level = "info", skip(self, prompts, missed), fields(missed = missed.len()))]
  pub async fn mission_report(
    &self,
    prompts: &Prompts,
    score: u32,
    total_questions: usize,
    missed: &[MissedItem],
  ) -> Result<String, String> {
    let user = generate_report_prompt(score, total_questions, missed);
    self.chat("report", &prompts.report_system, &user, 0.7, false).await
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn outcome_classification() {
    assert_eq!(classify_outcome(false, Some(StatusCode::OK)), (CallOutcome::Success, false));
    assert_eq!(classify_outcome(false, Some(StatusCode::TOO_MANY_REQUESTS)), (CallOutcome::Error, true));
    assert_eq!(classify_outcome(true, None), (CallOutcome::Timeout, false));
    assert_eq!(classify_outcome(false, Some(StatusCode::GATEWAY_TIMEOUT)).0, CallOutcome::Timeout);
    assert_eq!(classify_outcome(false, None).0, CallOutcome::Error);
  }

  #[test]
  fn error_body_message_is_extracted() {
    let body = r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Rate limit reached"));
    assert_eq!(extract_openai_error("<html>"), None);
  }
}
