//! Mission sanitizer: the only boundary between untrusted model output and the quiz loop.
//!
//! Every raw record is repaired independently and none is ever dropped:
//! - enumeration labels ("A. classroom") are stripped when the options carry them in sequence,
//! - placeholder options ("B", "Option C", "3") are replaced with position-distinct fillers,
//! - records whose question/options/answer carry CJK ideographs are swapped for an
//!   English fallback question of the same shape (same option count and correct index),
//! - `correctAnswer` always ends up equal to `options[correct_index]`,
//! - ids are unique within the batch.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{Difficulty, Question, QuestionMode, RawQuestion};
use crate::util::contains_cjk;

pub const OPTION_COUNT: usize = 4;

/// Distractors used to fill empty or placeholder slots. Slot `i` starts looking at entry `i`.
const FILLER_OPTIONS: [&str; 6] = [
  "none of these",
  "not enough information",
  "all of the above",
  "it depends on the context",
  "no answer given",
  "something else",
];

const GENERIC_HINT: &str = "Read the sentence again and look for clue words around the gap.";

struct FallbackSet {
  question: &'static str,
  correct: &'static str,
  distractors: [&'static str; 3],
  hint: &'static str,
  explanation: &'static str,
}

const FALLBACK_SETS: [FallbackSet; 3] = [
  FallbackSet {
    question: "Which word is spelled correctly?",
    correct: "necessary",
    distractors: ["neccessary", "necesary", "neccesary"],
    hint: "Think: one collar (c), two sleeves (ss).",
    explanation: "\"Necessary\" is written with one c and a double s.",
  },
  FallbackSet {
    question: "Complete the sentence: She ___ to school every day.",
    correct: "walks",
    distractors: ["walk", "walking", "have walked"],
    hint: "The subject is \"she\" and the action is a daily habit.",
    explanation: "Habits use the present simple; with he/she/it the verb takes -s.",
  },
  FallbackSet {
    question: "Which word means the opposite of \"ancient\"?",
    correct: "modern",
    distractors: ["old", "historic", "antique"],
    hint: "Look for a word that describes something from today.",
    explanation: "\"Ancient\" means very old, so its opposite is \"modern\".",
  },
];

/// Counters describing what the sanitizer had to repair. Callers log these.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeReport {
  pub labels_stripped: usize,
  pub placeholders_replaced: usize,
  pub slots_filled: usize,
  pub indices_recovered: usize,
  pub hints_replaced: usize,
  pub script_fallbacks: usize,
  pub empty_fallbacks: usize,
}

impl SanitizeReport {
  pub fn is_clean(&self) -> bool {
    *self == SanitizeReport::default()
  }
}

fn placeholder_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"^(?:[a-d]|(?:option|choice)\s*[a-d]?|\d+)$").expect("placeholder regex is valid")
  })
}

fn label_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"^\s*\(?([A-Za-z]|[0-9]{1,2})\s*[.):：、](\s*)(\S.*?)\s*$").expect("label regex is valid")
  })
}

/// True when the option is a bare label rather than content:
/// a letter A–D, "option"/"choice" with an optional letter, or digits. Case-insensitive.
pub fn is_placeholder_option(option: &str) -> bool {
  let lowered = option.trim().to_lowercase();
  let core = lowered
    .trim_start_matches('(')
    .trim_end_matches(['.', ')', ':', '：'])
    .trim();
  placeholder_re().is_match(core)
}

/// Splits a leading enumeration label ("A. ", "(b)", "3)") into the lowercased label and
/// the remaining text. "1.5" is a number, not a label.
fn split_label(option: &str) -> Option<(String, String)> {
  let caps = label_re().captures(option)?;
  let label = caps[1].to_lowercase();
  let rest = &caps[3];
  let glued_digits = caps[2].is_empty()
    && label.starts_with(|c: char| c.is_ascii_digit())
    && rest.starts_with(|c: char| c.is_ascii_digit());
  if glued_digits {
    return None;
  }
  Some((label, rest.to_string()))
}

fn slot_label(slot: usize, numeric: bool) -> Option<String> {
  if numeric {
    Some((slot + 1).to_string())
  } else {
    ('a'..='z').nth(slot).map(String::from)
  }
}

/// Removes enumeration labels, but only when every option carries one and they run in
/// order (A, B, C, D... or 1, 2, 3, 4...). Returns the options and whether labels were removed.
pub fn strip_option_labels(options: &[String]) -> (Vec<String>, bool) {
  let split: Vec<Option<(String, String)>> = options.iter().map(|o| split_label(o)).collect();
  let in_sequence = |numeric: bool| {
    split.iter().enumerate().all(|(slot, s)| match s {
      Some((label, _)) => slot_label(slot, numeric).as_deref() == Some(label.as_str()),
      None => false,
    })
  };
  if !options.is_empty() && (in_sequence(false) || in_sequence(true)) {
    (split.into_iter().flatten().map(|(_, rest)| rest).collect(), true)
  } else {
    (options.iter().map(|o| o.trim().to_string()).collect(), false)
  }
}

fn needs_fill(option: &str) -> bool {
  option.trim().is_empty() || is_placeholder_option(option)
}

fn value_text(v: &Option<Value>) -> String {
  match v {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Number(n)) => n.to_string(),
    Some(Value::Bool(b)) => b.to_string(),
    _ => String::new(),
  }
}

fn value_index(v: &Option<Value>) -> Option<i64> {
  match v {
    Some(Value::Number(n)) => n
      .as_i64()
      .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
    Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
    _ => None,
  }
}

fn non_empty(s: String) -> Option<String> {
  let t = s.trim();
  if t.is_empty() { None } else { Some(t.to_string()) }
}

fn raw_options(v: &Option<Value>) -> Vec<String> {
  match v {
    Some(Value::Array(items)) => items.iter().map(|i| value_text(&Some(i.clone()))).collect(),
    // {"A": "...", "B": "..."}; map keys iterate in sorted order.
    Some(Value::Object(map)) => map.values().map(|i| value_text(&Some(i.clone()))).collect(),
    _ => Vec::new(),
  }
}

/// Finds the correct option from the declared answer: text match first, then a bare letter.
fn recover_index(options: &[String], answer: &str) -> Option<usize> {
  let wanted = answer.trim().to_lowercase();
  if wanted.is_empty() {
    return None;
  }
  if let Some(i) = options.iter().position(|o| o.trim().to_lowercase() == wanted) {
    return Some(i);
  }
  let letter = wanted.trim_start_matches('(').trim_end_matches(['.', ')', ':']);
  let by_letter = match letter {
    "a" => Some(0),
    "b" => Some(1),
    "c" => Some(2),
    "d" => Some(3),
    _ => None,
  };
  by_letter.filter(|i| *i < options.len().max(OPTION_COUNT))
}

fn pick_filler(slot: usize, options: &[String]) -> String {
  let taken = |candidate: &str| options.iter().any(|o| o.trim().eq_ignore_ascii_case(candidate));
  (0..FILLER_OPTIONS.len())
    .map(|k| FILLER_OPTIONS[(slot + k) % FILLER_OPTIONS.len()])
    .find(|c| !taken(c))
    .map(str::to_string)
    .unwrap_or_else(|| format!("{} ({})", FILLER_OPTIONS[slot % FILLER_OPTIONS.len()], slot + 1))
}

/// Replaces all text of `q` with an English question of the same shape.
fn apply_fallback(q: &mut Question) {
  let set = &FALLBACK_SETS[q.id.rem_euclid(FALLBACK_SETS.len() as i64) as usize];
  let mut distractors = set.distractors.iter();
  q.question = set.question.to_string();
  q.options = (0..OPTION_COUNT)
    .map(|slot| {
      if slot == q.correct_index {
        set.correct.to_string()
      } else {
        distractors.next().copied().unwrap_or(FILLER_OPTIONS[slot]).to_string()
      }
    })
    .collect();
  q.correct_answer = set.correct.to_string();
  q.hint = Some(set.hint.to_string());
  q.explanation = Some(set.explanation.to_string());
}

fn normalize_one(raw: &RawQuestion, id: i64, report: &mut SanitizeReport) -> Question {
  let question_type = non_empty(value_text(&raw.question_type))
    .map(|t| t.to_lowercase())
    .unwrap_or_else(|| "vocab".to_string());
  let skill_tag = non_empty(value_text(&raw.skill_tag)).unwrap_or_else(|| question_type.clone());
  let question_mode = QuestionMode::parse(&value_text(&raw.question_mode));
  let difficulty = Difficulty::parse(&value_text(&raw.difficulty));
  let question = value_text(&raw.question).trim().to_string();

  let (mut options, labeled) = strip_option_labels(&raw_options(&raw.options));
  let declared_answer = value_text(&raw.correct_answer);
  let answer_text = if labeled {
    report.labels_stripped += options.len();
    split_label(&declared_answer)
      .map(|(_, rest)| rest)
      .unwrap_or_else(|| declared_answer.trim().to_string())
  } else {
    declared_answer.trim().to_string()
  };
  let answer_usable = !needs_fill(&answer_text);

  let declared = value_index(&raw.correct_index)
    .filter(|i| *i >= 0 && (*i as usize) < options.len())
    .map(|i| i as usize);
  let mut resolved = declared.or_else(|| recover_index(&options, &answer_text));
  if declared.is_none() {
    report.indices_recovered += 1;
  }

  // Keep the correct option when cutting down to OPTION_COUNT slots.
  if let Some(i) = resolved {
    if i >= OPTION_COUNT && i < options.len() {
      options.swap(i, OPTION_COUNT - 1);
      resolved = Some(OPTION_COUNT - 1);
    }
  }
  options.truncate(OPTION_COUNT);
  options.resize(OPTION_COUNT, String::new());

  let correct_index = match resolved {
    Some(i) => {
      if needs_fill(&options[i]) && answer_usable {
        options[i] = answer_text.clone();
      }
      i
    }
    None if answer_usable => {
      let slot = options.iter().position(|o| needs_fill(o)).unwrap_or(0);
      options[slot] = answer_text.clone();
      slot
    }
    None => 0,
  };

  for slot in 0..OPTION_COUNT {
    if needs_fill(&options[slot]) {
      if options[slot].trim().is_empty() {
        report.slots_filled += 1;
      } else {
        report.placeholders_replaced += 1;
      }
      options[slot] = pick_filler(slot, &options);
    }
  }

  let hint = non_empty(value_text(&raw.hint)).map(|h| {
    if contains_cjk(&h) {
      report.hints_replaced += 1;
      GENERIC_HINT.to_string()
    } else {
      h
    }
  });

  let mut q = Question {
    id,
    question_type,
    correct_answer: options[correct_index].clone(),
    question,
    options,
    correct_index,
    hint,
    explanation: non_empty(value_text(&raw.explanation)),
    skill_tag,
    difficulty,
    question_mode,
    source_context_span: non_empty(value_text(&raw.source_context_span)),
  };

  let disallowed_script = contains_cjk(&q.question)
    || q.options.iter().any(|o| contains_cjk(o))
    || contains_cjk(&answer_text);
  if disallowed_script {
    report.script_fallbacks += 1;
    apply_fallback(&mut q);
  } else if q.question.is_empty() {
    report.empty_fallbacks += 1;
    apply_fallback(&mut q);
  }
  q
}

/// Normalizes a batch of raw records. Output has the same length and order as the input.
pub fn normalize_mission_monsters(raw: &[RawQuestion]) -> Vec<Question> {
  normalize_with_report(raw).0
}

/// Gives every record a batch-unique id. The first record declaring an id keeps it; records
/// with no id (or a repeated one) get the lowest positive id nobody declared.
fn assign_ids(raw: &[RawQuestion]) -> Vec<i64> {
  let declared: Vec<Option<i64>> = raw.iter().map(|r| value_index(&r.id)).collect();
  let reserved: HashSet<i64> = declared.iter().flatten().copied().collect();
  let mut claimed = HashSet::new();
  let mut next_free = 1;
  declared
    .into_iter()
    .map(|d| match d {
      Some(id) if claimed.insert(id) => id,
      _ => {
        while reserved.contains(&next_free) || claimed.contains(&next_free) {
          next_free += 1;
        }
        claimed.insert(next_free);
        next_free
      }
    })
    .collect()
}

/// Same as [`normalize_mission_monsters`], also returning what was repaired.
pub fn normalize_with_report(raw: &[RawQuestion]) -> (Vec<Question>, SanitizeReport) {
  let mut report = SanitizeReport::default();
  let out = raw
    .iter()
    .zip(assign_ids(raw))
    .map(|(r, id)| normalize_one(r, id, &mut report))
    .collect();
  (out, report)
}

/// Re-runs already canonical questions through the sanitizer (e.g. entries loaded from storage).
pub fn resanitize(questions: &[Question]) -> Vec<Question> {
  let raw: Vec<RawQuestion> = questions
    .iter()
    .map(|q| {
      serde_json::to_value(q)
        .ok()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
    })
    .collect();
  normalize_mission_monsters(&raw)
}

/// Extracts raw records from a model payload: a bare array, or an object holding
/// `monsters` / `questions` / `items`. Non-object elements become empty records.
pub fn parse_raw_batch(value: &Value) -> Vec<RawQuestion> {
  let items: &[Value] = match value {
    Value::Array(items) => items.as_slice(),
    Value::Object(map) => {
      match ["monsters", "questions", "items"].iter().find_map(|k| map.get(*k).and_then(Value::as_array)) {
        Some(items) => items.as_slice(),
        None if map.contains_key("question") => std::slice::from_ref(value),
        None => &[],
      }
    }
    _ => &[],
  };
  items
    .iter()
    .map(|item| match item {
      Value::Object(_) => serde_json::from_value::<RawQuestion>(item.clone()).unwrap_or_default(),
      _ => RawQuestion::default(),
    })
    .collect()
}

/// Parses model text (optionally wrapped in a ```json fence). Unparseable text yields no records.
pub fn parse_raw_batch_str(text: &str) -> Vec<RawQuestion> {
  let trimmed = text.trim();
  let body = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .map(|s| s.trim_end().trim_end_matches("```"))
    .unwrap_or(trimmed);
  match serde_json::from_str::<Value>(body.trim()) {
    Ok(v) => parse_raw_batch(&v),
    Err(_) => Vec::new(),
  }
}

/// Whether a mission mixes answer modes. Batches of fewer than two questions always pass.
/// This is reported, not enforced: modes are never rewritten here.
pub fn has_mode_variety(questions: &[Question]) -> bool {
  questions.len() < 2 || questions.iter().any(|q| q.question_mode != QuestionMode::Choice)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn raw(v: Value) -> RawQuestion {
    serde_json::from_value(v).unwrap()
  }

  fn assert_canonical(q: &Question) {
    assert_eq!(q.options.len(), OPTION_COUNT);
    assert!(q.correct_index < OPTION_COUNT);
    assert_eq!(q.correct_answer, q.options[q.correct_index]);
    for o in &q.options {
      assert!(!is_placeholder_option(o), "placeholder leaked: {o:?}");
      assert!(!contains_cjk(o), "cjk leaked: {o:?}");
      assert!(!o.trim().is_empty());
    }
    assert!(!contains_cjk(&q.question));
    assert!(!contains_cjk(&q.correct_answer));
  }

  #[test]
  fn placeholder_pattern_matches_bare_labels_only() {
    for p in ["A", "b", " C ", "d.", "(A)", "Option", "option b", "CHOICE", "choice D", "Option A:", "3", "42"] {
      assert!(is_placeholder_option(p), "{p:?} should be a placeholder");
    }
    for p in ["apple", "E", "options", "choice words", "a cat", "3 cats", "classroom"] {
      assert!(!is_placeholder_option(p), "{p:?} should be content");
    }
  }

  #[test]
  fn label_stripping_keeps_answer() {
    let batch = vec![raw(json!({
      "id": 7,
      "type": "vocab",
      "question": "Where do students study?",
      "options": ["A. classroom", "B. kitchen", "C. river", "D. cloud"],
      "correct_index": 0,
      "correctAnswer": "A. classroom"
    }))];
    let out = normalize_mission_monsters(&batch);
    assert_eq!(out[0].options, vec!["classroom", "kitchen", "river", "cloud"]);
    assert_eq!(out[0].correct_index, 0);
    assert_eq!(out[0].correct_answer, "classroom");

    // Running the canonical output through again changes nothing.
    let again = resanitize(&out);
    assert_eq!(again, out);

    // Only the enumeration label goes; label-like content stays, also on a second pass.
    let batch = vec![raw(json!({
      "id": 8,
      "question": "Who wrote the story?",
      "options": ["A. B. King", "B. C. Lewis", "C. Dahl", "D. Rowling"],
      "correct_index": 1
    }))];
    let out = normalize_mission_monsters(&batch);
    assert_eq!(out[0].options, vec!["B. King", "C. Lewis", "Dahl", "Rowling"]);
    assert_eq!(out[0].correct_answer, "C. Lewis");
    assert_eq!(resanitize(&out), out);
  }

  #[test]
  fn labels_need_the_full_sequence() {
    let strip = |opts: &[&str]| strip_option_labels(&opts.iter().map(|o| o.to_string()).collect::<Vec<_>>());

    let (out, labeled) = strip(&["A.classroom", "B)kitchen", "(c) river", "D: cloud"]);
    assert!(labeled);
    assert_eq!(out, vec!["classroom", "kitchen", "river", "cloud"]);

    let (out, labeled) = strip(&["1) run", "2) ran", "3) runs", "4) running"]);
    assert!(labeled);
    assert_eq!(out, vec!["run", "ran", "runs", "running"]);

    let (out, labeled) = strip(&["B. King", "C. Lewis", "Dahl", "Rowling"]);
    assert!(!labeled);
    assert_eq!(out[0], "B. King");

    let (out, labeled) = strip(&["1.5", "2.5", "3.5", "4.5"]);
    assert!(!labeled);
    assert_eq!(out, vec!["1.5", "2.5", "3.5", "4.5"]);
  }

  #[test]
  fn answer_and_mode_aliases_are_read() {
    let batch = vec![raw(json!({
      "question": "Where do students study?",
      "options": ["classroom", "kitchen", "river", "cloud"],
      "answer": "kitchen",
      "mode": "typing"
    }))];
    let out = normalize_mission_monsters(&batch);
    assert_eq!(out[0].correct_index, 1);
    assert_eq!(out[0].correct_answer, "kitchen");
    assert_eq!(out[0].question_mode, QuestionMode::Typing);
  }

  #[test]
  fn ids_are_unique_within_batch() {
    let batch = parse_raw_batch(&json!([
      {"id": 2, "question": "a", "options": ["w", "x", "y", "z"], "correct_index": 0},
      {"question": "b", "options": ["w", "x", "y", "z"], "correct_index": 0},
      {"id": 1, "question": "c", "options": ["w", "x", "y", "z"], "correct_index": 0},
      {"id": 2, "question": "d", "options": ["w", "x", "y", "z"], "correct_index": 0}
    ]));
    let ids: Vec<i64> = normalize_mission_monsters(&batch).iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![2, 3, 1, 4]);
  }

  #[test]
  fn placeholder_options_never_surface() {
    let batch = vec![raw(json!({
      "id": 1,
      "question": "Pick the verb.",
      "options": ["A", "Option B", "run", "4"],
      "correct_index": 2,
      "correctAnswer": "run"
    }))];
    let (out, report) = normalize_with_report(&batch);
    assert_canonical(&out[0]);
    assert_eq!(out[0].correct_index, 2);
    assert_eq!(out[0].correct_answer, "run");
    assert_eq!(report.placeholders_replaced, 3);
    // Fillers are distinct per position.
    let mut seen = out[0].options.clone();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), OPTION_COUNT);
  }

  #[test]
  fn placeholder_at_correct_slot_takes_answer_text() {
    let batch = vec![raw(json!({
      "question": "Opposite of hot?",
      "options": ["warm", "B", "boiling", "spicy"],
      "correct_index": 1,
      "correctAnswer": "cold"
    }))];
    let out = normalize_mission_monsters(&batch);
    assert_eq!(out[0].options[1], "cold");
    assert_eq!(out[0].correct_answer, "cold");
  }

  #[test]
  fn cjk_records_become_english_fallback_with_same_shape() {
    let batch = vec![raw(json!({
      "id": 12,
      "type": "grammar",
      "question": "选择正确的单词",
      "options": ["apple", "banana", "cherry", "grape"],
      "correct_index": 3,
      "correctAnswer": "grape",
      "skillTag": "word-choice",
      "difficulty": "hard",
      "questionMode": "typing"
    }))];
    let (out, report) = normalize_with_report(&batch);
    let q = &out[0];
    assert_canonical(q);
    assert_eq!(report.script_fallbacks, 1);
    assert_eq!(q.id, 12);
    assert_eq!(q.question_type, "grammar");
    assert_eq!(q.correct_index, 3);
    assert_eq!(q.skill_tag, "word-choice");
    assert_eq!(q.difficulty, Difficulty::Hard);
    assert_eq!(q.question_mode, QuestionMode::Typing);
    assert_ne!(q.question, "选择正确的单词");
  }

  #[test]
  fn cjk_in_option_or_answer_triggers_fallback() {
    let batch = vec![
      raw(json!({"id": 1, "question": "Pick one", "options": ["教室", "kitchen", "river", "cloud"], "correct_index": 0})),
      raw(json!({"id": 2, "question": "Pick one", "options": ["a cat", "kitchen", "river", "cloud"], "correct_index": 0, "correctAnswer": "猫"})),
    ];
    let (out, report) = normalize_with_report(&batch);
    assert_eq!(report.script_fallbacks, 2);
    out.iter().for_each(assert_canonical);
  }

  #[test]
  fn cjk_hint_is_replaced_but_explanation_kept() {
    let batch = vec![raw(json!({
      "question": "She ___ happy.",
      "options": ["is", "are", "am", "be"],
      "correct_index": 0,
      "hint": "注意主语",
      "explanation": "主语是第三人称单数"
    }))];
    let out = normalize_mission_monsters(&batch);
    assert_eq!(out[0].hint.as_deref(), Some(GENERIC_HINT));
    assert_eq!(out[0].explanation.as_deref(), Some("主语是第三人称单数"));
    assert_eq!(out[0].question, "She ___ happy.");
  }

  #[test]
  fn malformed_records_are_repaired_not_dropped() {
    let batch = parse_raw_batch(&json!([
      {"id": "5", "question": "Capital of France?", "options": ["Paris", "Rome"], "correct_index": "0"},
      {"question": "2 + 2 = ?", "options": ["three", "four", "five", "six"], "correct_index": 9, "correctAnswer": "four"},
      {"question": "Pick B", "options": ["x", "y", "z", "w"], "correctAnswer": "B"},
      {"question": "Typed answer", "questionMode": "typing", "correctAnswer": "because"},
      "not an object",
      42,
      {}
    ]));
    assert_eq!(batch.len(), 7);
    let out = normalize_mission_monsters(&batch);
    assert_eq!(out.len(), batch.len());
    out.iter().for_each(assert_canonical);

    assert_eq!(out[0].id, 5);
    assert_eq!(out[0].correct_answer, "Paris");
    assert_eq!(out[1].correct_index, 1);
    assert_eq!(out[2].correct_index, 1);
    assert_eq!(out[2].correct_answer, "y");
    assert_eq!(out[3].correct_index, 0);
    assert_eq!(out[3].correct_answer, "because");
    let ids: Vec<i64> = out.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![5, 1, 2, 3, 4, 6, 7]);
  }

  #[test]
  fn correct_option_beyond_fourth_slot_survives_truncation() {
    let batch = vec![raw(json!({
      "question": "Which is a fruit?",
      "options": ["car", "desk", "lamp", "door", "mango"],
      "correct_index": 4
    }))];
    let out = normalize_mission_monsters(&batch);
    assert_eq!(out[0].correct_index, 3);
    assert_eq!(out[0].correct_answer, "mango");
  }

  #[test]
  fn valid_records_pass_through() {
    let batch = vec![raw(json!({
      "id": 3,
      "type": "reading",
      "question": "What did Tom buy?",
      "options": ["bread", "milk", "eggs", "tea"],
      "correct_index": 2,
      "correctAnswer": "eggs",
      "hint": "Look at the second paragraph.",
      "skillTag": "detail",
      "difficulty": "easy",
      "questionMode": "choice",
      "sourceContextSpan": "para-2"
    }))];
    let (out, report) = normalize_with_report(&batch);
    assert!(report.is_clean(), "{report:?}");
    let q = &out[0];
    assert_eq!(q.options, vec!["bread", "milk", "eggs", "tea"]);
    assert_eq!(q.correct_index, 2);
    assert_eq!(q.hint.as_deref(), Some("Look at the second paragraph."));
    assert_eq!(q.source_context_span.as_deref(), Some("para-2"));
  }

  #[test]
  fn parse_accepts_wrappers_and_fences() {
    let text = "```json\n{\"monsters\": [{\"question\": \"Q1\"}, {\"question\": \"Q2\"}]}\n```";
    assert_eq!(parse_raw_batch_str(text).len(), 2);
    assert_eq!(parse_raw_batch(&json!({"questions": [{}]})).len(), 1);
    assert_eq!(parse_raw_batch(&json!({"question": "solo"})).len(), 1);
    assert!(parse_raw_batch_str("sorry, I cannot do that").is_empty());
  }

  #[test]
  fn mode_variety_is_reported() {
    let batch = parse_raw_batch(&json!([
      {"question": "a", "questionMode": "choice"},
      {"question": "b", "questionMode": "multiple choice"}
    ]));
    let mut out = normalize_mission_monsters(&batch);
    assert!(!has_mode_variety(&out));
    out[1].question_mode = QuestionMode::FillBlank;
    assert!(has_mode_variety(&out));
    assert!(has_mode_variety(&out[..1]));
  }
}
