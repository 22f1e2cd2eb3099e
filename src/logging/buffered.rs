//! In-memory logger.

use std::sync::{Mutex, PoisonError};

use super::{LogEvent, LogEventKind, Logger};

/// Logger that keeps events in memory instead of writing them.
#[derive(Debug, Default)]
pub struct BufferedLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl BufferedLogger {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the buffered events.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return all buffered events.
    pub fn take(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replay buffered events, oldest first, into another logger.
    ///
    /// The buffer is emptied.
    pub fn replay_into(&self, target: &dyn Logger) {
        for event in self.take() {
            target.record(event);
        }
    }

    /// Text of every `Text` event, in order.
    pub fn texts(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.text().map(str::to_string))
            .collect()
    }

    /// Whether any text event contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First event matching a predicate.
    pub fn find(&self, predicate: impl Fn(&LogEventKind) -> bool) -> Option<LogEvent> {
        self.events().into_iter().find(|e| predicate(&e.kind))
    }
}

impl Logger for BufferedLogger {
    fn record(&self, event: LogEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
