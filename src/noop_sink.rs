use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of interception itself without any
/// I/O, and for code paths that must stay instrumented but silent.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn send(&self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
