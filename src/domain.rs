//! Domain models: quiz questions ("monsters") in raw and canonical form, revenge entries,
//! study plan items, missed items and mentor replies.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// How the quiz UI collects the answer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionMode {
  #[default]
  Choice,
  Typing,
  FillBlank,
}

impl QuestionMode {
  /// Lenient parse of whatever label the model produced. Unknown labels map to `Choice`.
  pub fn parse(label: &str) -> Self {
    let l = label.trim().to_lowercase().replace(['_', ' '], "-");
    match l.as_str() {
      "typing" | "type" | "typed" | "input" => QuestionMode::Typing,
      "fill-blank" | "fill-in-the-blank" | "fillblank" | "fill-in" | "cloze" | "blank" => QuestionMode::FillBlank,
      _ => QuestionMode::Choice,
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Difficulty {
  /// Accepts names and the 1..=3 ordinal. Anything else is `Medium`.
  pub fn parse(label: &str) -> Self {
    match label.trim().to_lowercase().as_str() {
      "easy" | "beginner" | "low" | "1" => Difficulty::Easy,
      "hard" | "advanced" | "high" | "3" => Difficulty::Hard,
      _ => Difficulty::Medium,
    }
  }
}

/// Canonical, displayable question. Only the sanitizer builds these from model output.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: i64,
  #[serde(rename = "type")]
  pub question_type: String,
  pub question: String,
  pub options: Vec<String>,
  #[serde(rename = "correct_index")]
  pub correct_index: usize,
  pub correct_answer: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
  pub skill_tag: String,
  pub difficulty: Difficulty,
  pub question_mode: QuestionMode,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_context_span: Option<String>,
}

/// Untrusted question record as returned by the model. Every field is optional and
/// kept as raw JSON so that wrong types (numbers as strings, etc.) survive parsing.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct RawQuestion {
  #[serde(default)]
  pub id: Option<Value>,
  #[serde(default, rename = "type")]
  pub question_type: Option<Value>,
  #[serde(default)]
  pub question: Option<Value>,
  #[serde(default)]
  pub options: Option<Value>,
  #[serde(default, alias = "correctIndex", alias = "answerIndex", alias = "answer_index")]
  pub correct_index: Option<Value>,
  #[serde(default, rename = "correctAnswer", alias = "correct_answer", alias = "answer")]
  pub correct_answer: Option<Value>,
  #[serde(default)]
  pub hint: Option<Value>,
  #[serde(default)]
  pub explanation: Option<Value>,
  #[serde(default, rename = "skillTag", alias = "skill_tag")]
  pub skill_tag: Option<Value>,
  #[serde(default)]
  pub difficulty: Option<Value>,
  #[serde(default, rename = "questionMode", alias = "question_mode", alias = "mode")]
  pub question_mode: Option<Value>,
  #[serde(default, rename = "sourceContextSpan", alias = "source_context_span")]
  pub source_context_span: Option<Value>,
}

/// Reduced projection of a missed question, persisted across sessions.
/// `id` is reassigned at enqueue time; `explanation` is not kept (the mentor regenerates it).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevengeEntry {
  pub id: i64,
  #[serde(rename = "type")]
  pub question_type: String,
  pub question: String,
  pub options: Vec<String>,
  #[serde(rename = "correct_index")]
  pub correct_index: usize,
  pub correct_answer: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint: Option<String>,
  #[serde(default)]
  pub skill_tag: String,
  #[serde(default)]
  pub difficulty: Difficulty,
  #[serde(default)]
  pub question_mode: QuestionMode,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_context_span: Option<String>,
}

/// A planned learning action.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanItem {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub estimated_minutes: f64,
}

/// Resolved status of a study plan item. Unknown labels deserialize as `Pending`,
/// so every item always resolves to exactly one of the three variants.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StudyPlanStatus {
  Completed,
  Skipped,
  #[default]
  Pending,
}

impl StudyPlanStatus {
  pub fn parse(label: &str) -> Self {
    match label.trim().to_lowercase().as_str() {
      "completed" | "complete" | "done" => StudyPlanStatus::Completed,
      "skipped" | "skip" => StudyPlanStatus::Skipped,
      _ => StudyPlanStatus::Pending,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      StudyPlanStatus::Completed => "completed",
      StudyPlanStatus::Skipped => "skipped",
      StudyPlanStatus::Pending => "pending",
    }
  }
}

impl<'de> Deserialize<'de> for StudyPlanStatus {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
      Value::String(s) => StudyPlanStatus::parse(&s),
      _ => StudyPlanStatus::Pending,
    })
  }
}

/// One wrong answer from a finished mission, as fed to the report prompt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MissedItem {
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub user_answer: String,
  #[serde(default)]
  pub correct_answer: String,
  #[serde(default)]
  pub skill_tag: String,
}

/// Root-cause classification the mentor model tags its explanation with.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CauseTag {
  VocabGap,
  GrammarRule,
  ReadingComprehension,
  CarelessSlip,
  Other,
}

impl CauseTag {
  pub fn parse(label: &str) -> Self {
    let l = label.trim().to_lowercase().replace(['-', ' '], "_");
    match l.as_str() {
      "vocab_gap" | "vocabulary" | "vocab" | "word_meaning" => CauseTag::VocabGap,
      "grammar_rule" | "grammar" | "tense" | "agreement" => CauseTag::GrammarRule,
      "reading_comprehension" | "reading" | "comprehension" | "misread" => CauseTag::ReadingComprehension,
      "careless_slip" | "careless" | "typo" | "spelling" => CauseTag::CarelessSlip,
      _ => CauseTag::Other,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      CauseTag::VocabGap => "vocab_gap",
      CauseTag::GrammarRule => "grammar_rule",
      CauseTag::ReadingComprehension => "reading_comprehension",
      CauseTag::CarelessSlip => "careless_slip",
      CauseTag::Other => "other",
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MentorReply {
  pub explanation: String,
  pub cause_tag: CauseTag,
  pub next_action: String,
}
