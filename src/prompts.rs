//! Prompt builders for the level, mentor and report model calls.
//! Pure string functions: arguments are interpolated verbatim and in order.
//!
//! User templates are fixed; only the system prompts in [`crate::config::Prompts`] come from config.

use crate::domain::MissedItem;
use crate::util::fill_template;

const LEVEL_USER_TEMPLATE: &str = "Source text:\n\"\"\"\n{input}\n\"\"\"\n\nCreate the mission from the source text above. Respond ONLY with strict JSON of the form {\"monsters\": [ ... ]}. No markdown, no commentary.";

const MENTOR_USER_TEMPLATE: &str = "Question: {question}\nLearner answer: {user_answer}\nCorrect answer: {correct_answer}\nSkill tag: {skill_tag}\nDifficulty: {difficulty}\nQuestion mode: {question_mode}\n\nExplain the mistake and return JSON {\"explanation\": string, \"cause_tag\": string, \"next_action\": string}.";

const REPORT_USER_TEMPLATE: &str = "Mission Score: {score} / 100\nTotal Questions: {total}\nMissed items:\n{missed}\n\nWrite the mission report.";

/// User prompt asking for a mission built from the learner's source text.
pub fn generate_level_prompt(input_text: &str) -> String {
  fill_template(LEVEL_USER_TEMPLATE, &[("input", input_text)])
}

/// User prompt asking the mentor to explain one wrong answer.
pub fn generate_mentor_prompt(
  question: &str,
  user_answer: &str,
  correct_answer: &str,
  skill_tag: &str,
  difficulty: &str,
  question_mode: &str,
) -> String {
  fill_template(
    MENTOR_USER_TEMPLATE,
    &[
      ("question", question),
      ("user_answer", user_answer),
      ("correct_answer", correct_answer),
      ("skill_tag", skill_tag),
      ("difficulty", difficulty),
      ("question_mode", question_mode),
    ],
  )
}

/// User prompt for the end-of-mission narrative.
pub fn generate_report_prompt(score: u32, total_questions: usize, missed_items: &[MissedItem]) -> String {
  let score = score.to_string();
  let total = total_questions.to_string();
  let missed = format_missed_items(missed_items);
  fill_template(
    REPORT_USER_TEMPLATE,
    &[("score", score.as_str()), ("total", total.as_str()), ("missed", missed.as_str())],
  )
}

pub fn format_missed_items(items: &[MissedItem]) -> String {
  if items.is_empty() {
    return "(none)".to_string();
  }
  items
    .iter()
    .enumerate()
    .map(|(i, m)| {
      format!(
        "{}. Q: {} | Learner: {} | Correct: {} | Skill: {}",
        i + 1,
        m.question,
        m.user_answer,
        m.correct_answer,
        if m.skill_tag.is_empty() { "general" } else { m.skill_tag.as_str() }
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// Percentage of correctly answered questions, rounded. 0 when there were no questions.
pub fn mission_score(total_questions: usize, missed: usize) -> u32 {
  if total_questions == 0 {
    return 0;
  }
  let correct = total_questions.saturating_sub(missed);
  ((correct as f64 / total_questions as f64) * 100.0).round() as u32
}
