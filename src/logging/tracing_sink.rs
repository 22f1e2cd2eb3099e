//! Live logger backed by `tracing`.

use tracing::{error, info, warn};

use super::{LogEvent, LogEventKind, LogLevel, Logger};

/// Logger that writes each event immediately through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    /// Create a tracing logger.
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn record(&self, event: LogEvent) {
        let at = event.timestamp.format("%H:%M:%S%.3f");
        match event.kind {
            LogEventKind::TestStart { test } => {
                info!("{} Test '{}' started", at, test);
            }
            LogEventKind::TestEnd { test, passed: true } => {
                info!("{} Test '{}' PASSED", at, test);
            }
            LogEventKind::TestEnd {
                test,
                passed: false,
            } => {
                error!("{} Test '{}' FAILED", at, test);
            }
            LogEventKind::StageStart { stage } => {
                info!("{} Stage {} started", at, stage);
            }
            LogEventKind::StageEnd { stage } => {
                info!("{} Stage {} ended", at, stage);
            }
            LogEventKind::StepStart { step, concurrent } => {
                let mode = if concurrent { " (concurrent)" } else { "" };
                info!("{} Step '{}' started{}", at, step, mode);
            }
            LogEventKind::StepEnd {
                step,
                concurrent,
                failed,
            } => {
                let mode = if concurrent { " (concurrent)" } else { "" };
                if failed {
                    warn!("{} Step '{}' failed{}", at, step, mode);
                } else {
                    info!("{} Step '{}' ended{}", at, step, mode);
                }
            }
            LogEventKind::Text { level, text } => match level {
                LogLevel::Info => info!("{} {}", at, text),
                LogLevel::Warning => warn!("{} {}", at, text),
                LogLevel::Error => error!("{} {}", at, text),
            },
            LogEventKind::Data { description, data } => {
                info!("{} {}:\n{}", at, description, data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testcase::Stage;

    #[test]
    fn records_every_event_kind_without_subscriber() {
        let logger = TracingLogger::new();
        logger.test_start("t");
        logger.stage_start(Stage::Setup);
        logger.step_start("s", true);
        logger.step_end("s", true, false);
        logger.step_end("s", false, true);
        logger.log(LogLevel::Warning, "careful");
        logger.log_data("body", "{}");
        logger.stage_end(Stage::Setup);
        logger.test_end("t", false);
    }
}
