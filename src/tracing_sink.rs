use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use tracing::info;

/// Target used for every event emitted by [`TracingSink`].
pub const CALL_LOG_TARGET: &str = "call_log";

/// Sink that hands each record to the installed `tracing` subscriber as
/// an `INFO` event whose message is `Log Entry: <json>`.
///
/// Method name and duration are also attached as event fields so that a
/// JSON formatter or filter can pick them up without reparsing the line.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn send(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = record.to_json()?;
        info!(
            target: CALL_LOG_TARGET,
            method = record.method_name(),
            execution_time_ms = record.execution_time_millis(),
            "Log Entry: {}",
            line
        );
        Ok(())
    }
}
