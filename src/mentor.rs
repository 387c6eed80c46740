//! Mentor replies: permissive parsing of the model's remediation JSON, plus a local fallback
//! used when no model is reachable.

use serde_json::Value;

use crate::domain::{CauseTag, MentorReply};

fn default_next_action(tag: CauseTag) -> &'static str {
  match tag {
    CauseTag::VocabGap => "Write the new word in three sentences of your own, then review it tomorrow.",
    CauseTag::GrammarRule => "Review the rule with two examples, then retry this question from the revenge queue.",
    CauseTag::ReadingComprehension => "Re-read the source sentence slowly and underline the words that answer the question.",
    CauseTag::CarelessSlip => "Slow down: read every option before answering the next question.",
    CauseTag::Other => "Retry this question later from the revenge queue.",
  }
}

fn text_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
  keys
    .iter()
    .find_map(|k| obj.get(*k).and_then(Value::as_str))
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
}

/// Parses the mentor model output. Plain text (no JSON) becomes the explanation with an
/// `other` cause tag; a missing `next_action` gets a default for the tag.
pub fn parse_mentor_reply(text: &str) -> MentorReply {
  let trimmed = text.trim();
  let body = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .map(|s| s.trim_end().trim_end_matches("```").trim())
    .unwrap_or(trimmed);

  match serde_json::from_str::<Value>(body) {
    Ok(Value::Object(obj)) => {
      let cause_tag = text_field(&obj, &["cause_tag", "causeTag"])
        .map(|t| CauseTag::parse(&t))
        .unwrap_or(CauseTag::Other);
      let explanation = text_field(&obj, &["explanation", "text", "message"]).unwrap_or_default();
      let next_action = text_field(&obj, &["next_action", "nextAction"])
        .unwrap_or_else(|| default_next_action(cause_tag).to_string());
      MentorReply { explanation, cause_tag, next_action }
    }
    _ => MentorReply {
      explanation: trimmed.to_string(),
      cause_tag: CauseTag::Other,
      next_action: default_next_action(CauseTag::Other).to_string(),
    },
  }
}

/// Offline explanation built from the question data alone.
pub fn local_mentor_reply(user_answer: &str, correct_answer: &str, skill_tag: &str) -> MentorReply {
  let cause_tag = if user_answer.trim().eq_ignore_ascii_case(correct_answer.trim()) {
    CauseTag::CarelessSlip
  } else if skill_tag.is_empty() {
    CauseTag::Other
  } else {
    CauseTag::parse(skill_tag)
  };
  let skill = if skill_tag.is_empty() { "this skill" } else { skill_tag };
  MentorReply {
    explanation: format!(
      "The correct answer is \"{}\", not \"{}\". This question practises {}.",
      correct_answer.trim(),
      user_answer.trim(),
      skill
    ),
    cause_tag,
    next_action: default_next_action(cause_tag).to_string(),
  }
}
