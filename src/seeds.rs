//! Built-in mission content used when no model is configured or the model call fails.
//! Records are produced in raw form and go through the sanitizer like model output does.

use serde_json::json;

use crate::domain::RawQuestion;
use crate::sanitizer::parse_raw_batch;
use crate::util::is_cjk;

const DISTRACTOR_WORDS: [&str; 6] = ["window", "garden", "yellow", "pocket", "thunder", "blanket"];

fn seed_values() -> serde_json::Value {
  json!([
    {
      "id": 1, "type": "grammar", "difficulty": "easy", "questionMode": "choice",
      "question": "Choose the correct form: He ___ football every Saturday.",
      "options": ["play", "plays", "playing", "played"], "correct_index": 1,
      "hint": "Every Saturday is a habit; the subject is he.",
      "explanation": "Present simple with he/she/it adds -s.",
      "skillTag": "present-simple"
    },
    {
      "id": 2, "type": "vocab", "difficulty": "easy", "questionMode": "choice",
      "question": "Where do students usually have lessons?",
      "options": ["classroom", "kitchen", "river", "cloud"], "correct_index": 0,
      "hint": "It is a room in a school.",
      "skillTag": "places"
    },
    {
      "id": 3, "type": "grammar", "difficulty": "medium", "questionMode": "fill-blank",
      "question": "Fill in the blank: Yesterday we ___ (go) to the museum.",
      "options": ["went", "go", "gone", "going"], "correct_index": 0,
      "hint": "Yesterday means the past.",
      "skillTag": "past-simple-irregular"
    },
    {
      "id": 4, "type": "vocab", "difficulty": "medium", "questionMode": "typing",
      "question": "Type the opposite of \"noisy\".",
      "options": ["quiet", "loud", "busy", "angry"], "correct_index": 0,
      "hint": "A library should be ...",
      "skillTag": "antonyms"
    }
  ])
}

/// Up to `n` distinct longer words from the learner's text, longest first.
fn pick_words(input_text: &str, n: usize) -> Vec<String> {
  let mut words: Vec<String> = input_text
    .split(|c: char| !c.is_ascii_alphabetic())
    .filter(|w| w.len() >= 5 && !w.chars().any(is_cjk))
    .map(|w| w.to_lowercase())
    .collect();
  words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
  words.dedup();
  words.truncate(n);
  words
}

fn mask_word(word: &str) -> String {
  word
    .chars()
    .enumerate()
    .map(|(i, c)| if i % 3 == 1 { '_' } else { c })
    .collect()
}

/// Fallback mission: fixed items plus a couple built from the learner's own text.
pub fn seed_mission(input_text: &str) -> Vec<RawQuestion> {
  let mut raw = parse_raw_batch(&seed_values());
  let lowered = input_text.to_lowercase();
  for (k, word) in pick_words(input_text, 2).into_iter().enumerate() {
    let id = 100 + k as i64;
    let distractors: Vec<&str> = DISTRACTOR_WORDS
      .iter()
      .copied()
      .filter(|d| *d != word && !lowered.contains(d))
      .skip(k * 3)
      .take(3)
      .collect();
    let mut options = vec![word.clone()];
    options.extend(distractors.iter().map(|d| d.to_string()));
    let item = if k % 2 == 0 {
      json!({
        "id": id, "type": "reading", "difficulty": "easy", "questionMode": "choice",
        "question": "Which of these words appears in your text?",
        "options": options, "correct_index": 0,
        "hint": "Scan your text for the longest words.",
        "skillTag": "text-recall", "sourceContextSpan": word
      })
    } else {
      json!({
        "id": id, "type": "vocab", "difficulty": "medium", "questionMode": "fill-blank",
        "question": format!("Complete the word from your text: {}", mask_word(&word)),
        "options": options, "correct_index": 0,
        "hint": format!("It has {} letters.", word.len()),
        "skillTag": "spelling", "sourceContextSpan": word
      })
    };
    raw.extend(parse_raw_batch(&json!([item])));
  }
  raw
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sanitizer::{has_mode_variety, normalize_with_report};

  #[test]
  fn seed_mission_is_clean_and_varied() {
    let raw = seed_mission("The students walked into the classroom before breakfast.");
    assert_eq!(raw.len(), 6);
    let (out, report) = normalize_with_report(&raw);
    assert!(report.is_clean(), "{report:?}");
    assert!(has_mode_variety(&out));
    assert_eq!(out[4].correct_answer, "breakfast");
    assert_eq!(out[5].question, "Complete the word from your text: c_as_ro_m");
  }

  #[test]
  fn cjk_only_text_falls_back_to_fixed_items() {
    assert_eq!(seed_mission("我们一起学习吧").len(), 4);
  }
}
