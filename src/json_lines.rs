use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Sink that writes one compact JSON object per line to any writer.
///
/// The writer sits behind a mutex, so a single sink can be shared by every
/// interceptor in the process and lines from concurrent calls never
/// interleave mid-record.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        Ok(self.writer.into_inner()?)
    }
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl JsonLinesSink<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl JsonLinesSink<File> {
    /// Open (or create) `path` in append mode.
    pub fn file(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> LogSink for JsonLinesSink<W> {
    fn send(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock()?;
        writer.write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock()?.flush()?;
        Ok(())
    }
}
