//! Logging sinks for test runs.
//!
//! Every engine and step message goes through a [`Logger`]:
//!
//! - [`TracingLogger`] - writes live through `tracing`
//! - [`BufferedLogger`] - accumulates events in memory and replays them
//!   into another logger; concurrent steps each get one so their output
//!   is spliced into the main log as a block
//!
//! # Example
//!
//! ```
//! use stagehand::logging::{BufferedLogger, LogLevel, Logger};
//!
//! let buffer = BufferedLogger::new();
//! buffer.log(LogLevel::Info, "connecting");
//!
//! let main = BufferedLogger::new();
//! buffer.replay_into(&main);
//! assert_eq!(main.texts(), vec!["connecting".to_string()]);
//! ```

pub mod buffered;
pub mod event;
pub mod tracing_sink;

pub use buffered::BufferedLogger;
pub use event::{LogEvent, LogEventKind, LogLevel};
pub use tracing_sink::TracingLogger;

use crate::testcase::Stage;

/// Sink for all engine and step output.
pub trait Logger: Send + Sync {
    /// Record one event.
    fn record(&self, event: LogEvent);

    /// A test case run began.
    fn test_start(&self, test: &str) {
        self.record(LogEvent::now(LogEventKind::TestStart {
            test: test.to_string(),
        }));
    }

    /// A test case run finished.
    fn test_end(&self, test: &str, passed: bool) {
        self.record(LogEvent::now(LogEventKind::TestEnd {
            test: test.to_string(),
            passed,
        }));
    }

    /// A stage began.
    fn stage_start(&self, stage: Stage) {
        self.record(LogEvent::now(LogEventKind::StageStart { stage }));
    }

    /// A stage finished.
    fn stage_end(&self, stage: Stage) {
        self.record(LogEvent::now(LogEventKind::StageEnd { stage }));
    }

    /// A step began.
    fn step_start(&self, step: &str, concurrent: bool) {
        self.record(LogEvent::now(LogEventKind::StepStart {
            step: step.to_string(),
            concurrent,
        }));
    }

    /// A step returned.
    fn step_end(&self, step: &str, concurrent: bool, failed: bool) {
        self.record(LogEvent::now(LogEventKind::StepEnd {
            step: step.to_string(),
            concurrent,
            failed,
        }));
    }

    /// Free text at a level.
    fn log(&self, level: LogLevel, text: &str) {
        self.record(LogEvent::now(LogEventKind::Text {
            level,
            text: text.to_string(),
        }));
    }

    /// A block of data.
    fn log_data(&self, description: &str, data: &str) {
        self.record(LogEvent::now(LogEventKind::Data {
            description: description.to_string(),
            data: data.to_string(),
        }));
    }

    /// An error with its full cause chain.
    fn log_exception(&self, error: &(dyn std::error::Error + 'static)) {
        let mut text = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            text.push_str("\n  caused by: ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        self.log(LogLevel::Error, &text);
    }
}
