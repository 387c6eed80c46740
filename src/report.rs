//! Exportable progress report (Markdown) for a finished mission.

use std::fmt::Write as _;

use crate::domain::MissedItem;
use crate::snapshot::CompletionSnapshot;

pub struct ProgressReport<'a> {
  pub score: u32,
  pub total_questions: usize,
  pub missed: &'a [MissedItem],
  pub snapshot: Option<&'a CompletionSnapshot>,
  pub revenge_queue_len: usize,
  /// Narrative produced by the report model (or the local summary).
  pub narrative: Option<&'a str>,
}

fn cell(s: &str) -> String {
  s.replace('|', "\\|").replace('\n', " ")
}

fn fmt_minutes(m: f64) -> String {
  if m.fract() == 0.0 { format!("{}", m as i64) } else { format!("{:.1}", m) }
}

/// Short summary used when no report model is available.
pub fn local_summary(score: u32, total_questions: usize, missed: &[MissedItem]) -> String {
  let mut skills: Vec<&str> = missed
    .iter()
    .map(|m| m.skill_tag.as_str())
    .filter(|s| !s.is_empty())
    .collect();
  skills.sort_unstable();
  skills.dedup();
  let verdict = match score {
    90..=100 => "Outstanding run, the monsters never stood a chance.",
    70..=89 => "Solid victory with a few scratches.",
    40..=69 => "You survived, but some monsters will be back.",
    _ => "A tough battle. Regroup and try again.",
  };
  let focus = if skills.is_empty() {
    "No weak spots this time.".to_string()
  } else {
    format!("Focus next on: {}.", skills.join(", "))
  };
  format!(
    "{} You answered {} of {} questions correctly. {}",
    verdict,
    total_questions.saturating_sub(missed.len()),
    total_questions,
    focus
  )
}

pub fn render_markdown(report: &ProgressReport<'_>) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "# Word Quest Progress Report\n");
  let _ = writeln!(out, "Mission Score: {} / 100", report.score);
  let _ = writeln!(out, "Total Questions: {}", report.total_questions);
  let _ = writeln!(out, "Revenge Queue: {} waiting\n", report.revenge_queue_len);

  if let Some(n) = report.narrative.filter(|n| !n.trim().is_empty()) {
    let _ = writeln!(out, "## Summary\n\n{}\n", n.trim());
  }

  let _ = writeln!(out, "## Missed Questions\n");
  if report.missed.is_empty() {
    let _ = writeln!(out, "None.\n");
  } else {
    let _ = writeln!(out, "| # | Question | Your answer | Correct | Skill |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    for (i, m) in report.missed.iter().enumerate() {
      let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} |",
        i + 1,
        cell(&m.question),
        cell(&m.user_answer),
        cell(&m.correct_answer),
        cell(&m.skill_tag)
      );
    }
    out.push('\n');
  }

  if let Some(s) = report.snapshot {
    let _ = writeln!(out, "## Study Plan\n");
    let _ = writeln!(
      out,
      "Completed {} of {} actions ({:.0}%), skipped {}, pending {}.",
      s.completed_actions,
      s.total_actions,
      s.completion_percent(),
      s.skipped_actions,
      s.pending_actions
    );
    let _ = writeln!(
      out,
      "Minutes: {} completed of {} planned.\n",
      fmt_minutes(s.completed_minutes),
      fmt_minutes(s.planned_minutes)
    );
    if !s.rows.is_empty() {
      let _ = writeln!(out, "| Action | Minutes | Status |");
      let _ = writeln!(out, "|---|---|---|");
      for r in &s.rows {
        let _ = writeln!(out, "| {} | {} | {} |", cell(&r.title), fmt_minutes(r.minutes), r.status.as_str());
      }
    }
  }
  out
}
