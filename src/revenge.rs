//! Revenge queue: missed questions kept across sessions for later re-review.
//!
//! The whole queue lives under a single storage key and is rewritten on every mutation
//! (last writer wins). Loading never fails: a missing, corrupt or unreachable blob is an
//! empty queue. Deciding when an entry is consumed is up to the caller.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::{Question, RevengeEntry};
use crate::persistence::{KvStore, StoreError};

pub const REVENGE_STORAGE_KEY: &str = "wordquest_revenge_queue";
pub const REVENGE_SOURCE: &str = "revenge";

static LAST_QUEUE_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp, bumped so that ids are strictly increasing within the process
/// and never equal to `original`.
fn next_queue_id(original: i64) -> i64 {
  let now = chrono::Utc::now().timestamp_millis();
  let mut issued = now;
  let _ = LAST_QUEUE_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
    let mut candidate = now.max(last + 1);
    if candidate == original {
      candidate += 1;
    }
    issued = candidate;
    Some(candidate)
  });
  issued
}

fn read_queue(store: &dyn KvStore) -> Result<Vec<RevengeEntry>, StoreError> {
  match store.get(REVENGE_STORAGE_KEY)? {
    Some(blob) if !blob.trim().is_empty() => Ok(serde_json::from_str(&blob)?),
    _ => Ok(Vec::new()),
  }
}

fn write_queue(store: &dyn KvStore, entries: &[RevengeEntry]) -> Result<(), StoreError> {
  let blob = serde_json::to_string(entries)?;
  store.set(REVENGE_STORAGE_KEY, &blob)
}

/// Reads the persisted queue. `None` means no storage is available in this context.
pub fn load_initial_revenge_queue(store: Option<&dyn KvStore>) -> Vec<RevengeEntry> {
  let Some(store) = store else {
    debug!(target: "revenge", "No storage available; starting with empty revenge queue");
    return Vec::new();
  };
  match read_queue(store) {
    Ok(entries) => {
      debug!(target: "revenge", count = entries.len(), "Loaded revenge queue");
      entries
    }
    Err(e) => {
      warn!(target: "revenge", error = %e, "Revenge queue unreadable; treating as empty");
      Vec::new()
    }
  }
}

/// Replaces the persisted queue with `entries`. Failures are logged only.
pub fn persist_revenge_queue(store: Option<&dyn KvStore>, entries: &[RevengeEntry]) {
  let Some(store) = store else {
    warn!(target: "revenge", count = entries.len(), "No storage available; revenge queue not persisted");
    return;
  };
  match write_queue(store, entries) {
    Ok(()) => debug!(target: "revenge", count = entries.len(), "Persisted revenge queue"),
    Err(e) => error!(target: "revenge", error = %e, count = entries.len(), "Failed to persist revenge queue"),
  }
}

/// Projects a missed question into the persisted shape with a fresh id and `revenge` provenance.
pub fn sanitize_for_queue(question: &Question) -> RevengeEntry {
  RevengeEntry {
    id: next_queue_id(question.id),
    question_type: question.question_type.clone(),
    question: question.question.clone(),
    options: question.options.clone(),
    correct_index: question.correct_index,
    correct_answer: question.correct_answer.clone(),
    hint: question.hint.clone(),
    skill_tag: question.skill_tag.clone(),
    difficulty: question.difficulty,
    question_mode: question.question_mode,
    source_context_span: Some(REVENGE_SOURCE.to_string()),
  }
}

/// Turns a stored entry back into a quiz question. Callers should run the result through
/// the sanitizer, since the stored blob is not trusted.
pub fn entry_to_question(entry: &RevengeEntry) -> Question {
  Question {
    id: entry.id,
    question_type: entry.question_type.clone(),
    question: entry.question.clone(),
    options: entry.options.clone(),
    correct_index: entry.correct_index,
    correct_answer: entry.correct_answer.clone(),
    hint: entry.hint.clone(),
    explanation: None,
    skill_tag: entry.skill_tag.clone(),
    difficulty: entry.difficulty,
    question_mode: entry.question_mode,
    source_context_span: Some(REVENGE_SOURCE.to_string()),
  }
}

/// In-memory owner of the queue; every mutation is written back to storage.
pub struct RevengeQueue {
  entries: Vec<RevengeEntry>,
  store: Option<Arc<dyn KvStore>>,
}

impl RevengeQueue {
  pub fn load(store: Option<Arc<dyn KvStore>>) -> Self {
    let entries = load_initial_revenge_queue(store.as_deref());
    Self { entries, store }
  }

  pub fn entries(&self) -> &[RevengeEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Writes the current entries back on the blocking pool. Exclusive access is held until
  /// the write has finished.
  async fn persist(&self) {
    let Some(store) = self.store.clone() else {
      persist_revenge_queue(None, &self.entries);
      return;
    };
    let entries = self.entries.clone();
    let written = tokio::task::spawn_blocking(move || persist_revenge_queue(Some(store.as_ref()), &entries)).await;
    if let Err(e) = written {
      error!(target: "revenge", error = %e, "Revenge queue write task failed");
    }
  }

  /// Adds a missed question. A question whose text is already queued is not added twice;
  /// the existing entry is returned instead.
  pub async fn enqueue(&mut self, question: &Question) -> RevengeEntry {
    let key = question.question.trim().to_lowercase();
    if let Some(existing) = self.entries.iter().find(|e| e.question.trim().to_lowercase() == key) {
      debug!(target: "revenge", id = existing.id, "Question already queued");
      return existing.clone();
    }
    let entry = sanitize_for_queue(question);
    self.entries.push(entry.clone());
    self.persist().await;
    entry
  }

  /// Removes an entry (typically once answered correctly). Returns whether it existed.
  pub async fn remove(&mut self, id: i64) -> bool {
    let before = self.entries.len();
    self.entries.retain(|e| e.id != id);
    let removed = self.entries.len() != before;
    if removed {
      self.persist().await;
    }
    removed
  }

  pub async fn clear(&mut self) {
    self.entries.clear();
    self.persist().await;
  }

  /// The oldest `n` entries as questions, without removing them.
  pub fn peek_questions(&self, n: usize) -> Vec<Question> {
    self.entries.iter().take(n).map(entry_to_question).collect()
  }
}
