use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use std::sync::{Arc, Mutex};

/// Sink that keeps every record in memory.
///
/// Clones share the same storage, so a host can keep one handle for
/// inspection while the interceptor owns another.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far, in emission order.
    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Drain and return the stored records.
    pub fn take(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(mut records) => std::mem::take(&mut *records),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        match self.records.lock() {
            Ok(records) => records.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn send(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.records.lock()?.push(record.clone());
        Ok(())
    }
}
