//! Accumulated event history
//!
//! The engine keeps only a bounded ring of recent events and hands back the
//! whole ring on every snapshot. [`EventHistory::absorb`] appends just the
//! part of a batch that has not been seen yet, using the last absorbed raw
//! record as the cursor.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use meshlens_core::{EventRecord, RawEvent};

use crate::translator::translate_batch;

/// Result of absorbing one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absorbed {
    /// The batch held nothing new
    Nothing,
    /// The batch continued the history; `n` records were appended
    New(usize),
    /// The cursor was no longer in the batch, so the whole batch of `n`
    /// records was appended; events in between may have been lost
    Gap(usize),
}

impl Absorbed {
    /// Number of appended records
    pub fn appended(&self) -> usize {
        match self {
            Self::Nothing => 0,
            Self::New(n) | Self::Gap(n) => *n,
        }
    }
}

/// Append-only log of every raw event seen during one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHistory {
    events: Vec<RawEvent>,
}

impl EventHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one snapshot's events, given oldest first
    pub fn absorb(&mut self, batch: &[RawEvent]) -> Absorbed {
        if batch.is_empty() {
            return Absorbed::Nothing;
        }

        let Some(tail) = self.events.last() else {
            self.events.extend_from_slice(batch);
            debug!(appended = batch.len(), "Seeded event history");
            return Absorbed::New(batch.len());
        };

        // Search from the end: the cursor is normally near the newest entries.
        match batch.iter().rposition(|raw| raw == tail) {
            Some(index) => {
                let fresh = &batch[index + 1..];
                if fresh.is_empty() {
                    return Absorbed::Nothing;
                }
                self.events.extend_from_slice(fresh);
                Absorbed::New(fresh.len())
            }
            None => {
                warn!(
                    appended = batch.len(),
                    history = self.events.len(),
                    "Event buffer wrapped around since the last poll, some events may be lost"
                );
                self.events.extend_from_slice(batch);
                Absorbed::Gap(batch.len())
            }
        }
    }

    /// Raw records, oldest first
    pub fn raw(&self) -> &[RawEvent] {
        &self.events
    }

    /// Newest raw record
    pub fn last(&self) -> Option<&RawEvent> {
        self.events.last()
    }

    /// Translate every record; untranslatable ones are skipped
    pub fn records(&self) -> Vec<EventRecord> {
        translate_batch(&self.events)
    }

    /// Translate records from `offset` onwards
    pub fn records_since(&self, offset: usize) -> Vec<EventRecord> {
        translate_batch(self.events.get(offset..).unwrap_or_default())
    }

    /// Number of raw records
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing has been absorbed
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Raw records as a JSON array literal, or `None` when empty
    ///
    /// Records are emitted verbatim, one per line.
    pub fn export_json(&self) -> Option<String> {
        if self.events.is_empty() {
            return None;
        }
        let body = self
            .events
            .iter()
            .map(|raw| format!("    {}", raw))
            .collect::<Vec<_>>()
            .join(",\n");
        Some(format!("[\n{}\n]", body))
    }

    /// Translated records as `[time] [LEVEL] message` lines, or `None` when empty
    pub fn export_text(&self) -> Option<String> {
        if self.events.is_empty() {
            return None;
        }
        let lines: Vec<String> = self.records().iter().map(EventRecord::export_line).collect();
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(items: &[&str]) -> Vec<RawEvent> {
        items.iter().copied().map(RawEvent::from).collect()
    }

    fn history(items: &[&str]) -> EventHistory {
        let mut history = EventHistory::new();
        history.absorb(&batch(items));
        history
    }

    fn raw(history: &EventHistory) -> Vec<&str> {
        history.raw().iter().map(RawEvent::as_str).collect()
    }

    #[test]
    fn test_first_batch_seeds_history() {
        let mut history = EventHistory::new();
        assert_eq!(history.absorb(&batch(&["A", "B"])), Absorbed::New(2));
        assert_eq!(raw(&history), vec!["A", "B"]);
    }

    #[test]
    fn test_appends_only_new_tail() {
        let mut history = history(&["A", "B", "C"]);
        let outcome = history.absorb(&batch(&["A", "B", "C", "D", "E"]));

        assert_eq!(outcome, Absorbed::New(2));
        assert_eq!(raw(&history), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_ring_shift_keeps_cursor() {
        let mut history = history(&["A", "B", "C"]);
        let outcome = history.absorb(&batch(&["C", "D"]));

        assert_eq!(outcome, Absorbed::New(1));
        assert_eq!(raw(&history), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_no_new_events() {
        let mut history = history(&["A", "B", "C"]);
        assert_eq!(history.absorb(&batch(&["A", "B", "C"])), Absorbed::Nothing);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_wraparound_appends_whole_batch() {
        let mut history = history(&["A", "B", "C"]);
        let outcome = history.absorb(&batch(&["X", "Y", "Z"]));

        assert_eq!(outcome, Absorbed::Gap(3));
        assert_eq!(outcome.appended(), 3);
        assert_eq!(raw(&history), vec!["A", "B", "C", "X", "Y", "Z"]);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut history = history(&["A"]);
        assert_eq!(history.absorb(&[]), Absorbed::Nothing);
        assert_eq!(raw(&history), vec!["A"]);

        let mut empty = EventHistory::new();
        assert_eq!(empty.absorb(&[]), Absorbed::Nothing);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_repeated_tail_uses_last_occurrence() {
        let mut history = history(&["A", "B"]);
        let outcome = history.absorb(&batch(&["B", "C", "B", "D"]));

        assert_eq!(outcome, Absorbed::New(1));
        assert_eq!(raw(&history), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_export_json() {
        assert_eq!(EventHistory::new().export_json(), None);

        let history = history(&[r#"{"a":1}"#, r#"{"b":2}"#]);
        assert_eq!(
            history.export_json().unwrap(),
            "[\n    {\"a\":1},\n    {\"b\":2}\n]"
        );
    }

    #[test]
    fn test_clear() {
        let mut history = history(&["A", "B"]);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.absorb(&batch(&["X"])), Absorbed::New(1));
    }
}
