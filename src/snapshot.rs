//! Study plan completion snapshot: a pure fold of plan items against their statuses.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{StudyPlanItem, StudyPlanStatus};

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRow {
  pub id: String,
  pub title: String,
  pub minutes: f64,
  pub status: StudyPlanStatus,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSnapshot {
  pub total_actions: usize,
  pub completed_actions: usize,
  pub skipped_actions: usize,
  pub pending_actions: usize,
  pub planned_minutes: f64,
  pub completed_minutes: f64,
  pub rows: Vec<CompletionRow>,
}

impl CompletionSnapshot {
  /// Share of actions completed, 0..=100. 0 for an empty plan.
  pub fn completion_percent(&self) -> f64 {
    if self.total_actions == 0 {
      0.0
    } else {
      (self.completed_actions as f64 / self.total_actions as f64) * 100.0
    }
  }
}

/// Negative or non-finite estimates count as zero minutes.
fn minutes_of(item: &StudyPlanItem) -> f64 {
  if item.estimated_minutes.is_finite() && item.estimated_minutes > 0.0 {
    item.estimated_minutes
  } else {
    0.0
  }
}

/// Items missing from `status_by_id` are pending. Rows keep input order.
pub fn compute_study_plan_completion_snapshot(
  items: &[StudyPlanItem],
  status_by_id: &HashMap<String, StudyPlanStatus>,
) -> CompletionSnapshot {
  let rows: Vec<CompletionRow> = items
    .iter()
    .map(|item| CompletionRow {
      id: item.id.clone(),
      title: item.title.clone(),
      minutes: minutes_of(item),
      status: status_by_id.get(&item.id).copied().unwrap_or_default(),
    })
    .collect();

  let count = |s: StudyPlanStatus| rows.iter().filter(|r| r.status == s).count();
  let completed_minutes = rows
    .iter()
    .filter(|r| r.status == StudyPlanStatus::Completed)
    .map(|r| r.minutes)
    .sum();

  CompletionSnapshot {
    total_actions: rows.len(),
    completed_actions: count(StudyPlanStatus::Completed),
    skipped_actions: count(StudyPlanStatus::Skipped),
    pending_actions: count(StudyPlanStatus::Pending),
    planned_minutes: rows.iter().map(|r| r.minutes).sum(),
    completed_minutes,
    rows,
  }
}
