//! Log events produced by the engine and by steps.

use chrono::{DateTime, Local};

use crate::testcase::Stage;

/// Severity of a text log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Progress information.
    Info,
    /// Something unexpected that does not fail the step.
    Warning,
    /// A failure.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEventKind {
    /// A test case run began.
    TestStart { test: String },
    /// A test case run finished.
    TestEnd { test: String, passed: bool },
    /// A stage began.
    StageStart { stage: Stage },
    /// A stage finished, including the drain of its concurrent steps.
    StageEnd { stage: Stage },
    /// A step began.
    StepStart { step: String, concurrent: bool },
    /// A step returned.
    StepEnd {
        step: String,
        concurrent: bool,
        failed: bool,
    },
    /// Free text at a level.
    Text { level: LogLevel, text: String },
    /// A block of data, e.g. a response body.
    Data { description: String, data: String },
}

/// A timestamped log event.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// When the event was recorded.
    pub timestamp: DateTime<Local>,
    /// The event itself.
    pub kind: LogEventKind,
}

impl LogEvent {
    /// Stamp an event with the current local time.
    pub fn now(kind: LogEventKind) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
        }
    }

    /// Text of a `Text` event.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            LogEventKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}
