use crate::record::LogRecord;
use std::error::Error;

/// Destination for [`LogRecord`]s produced by the interceptor.
///
/// The interceptor calls `send` inline, on the same thread as the wrapped
/// call, once per logged call. There is no buffering or background task in
/// between, so implementations that are shared across threads must make
/// their own writes safe for concurrent callers.
pub trait LogSink: Send + Sync {
    /// Emit a single record.
    ///
    /// **Parameters**
    /// - `record`: fully-populated [`LogRecord`] for one completed call.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was written.
    /// - `Err(..)` if serialization or the underlying write failed. The
    ///   interceptor counts and reports the failure but never passes it on
    ///   to the caller of the wrapped method. A panic inside `send` is
    ///   caught and counted the same way.
    fn send(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Flush any buffered output, if the sink buffers.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Error returned by a [`LogSink`].
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink lock poisoned by a panicking writer")]
    Poisoned,

    #[error(transparent)]
    Backend(#[from] Box<dyn Error + Send + Sync>),
}

impl<T> From<std::sync::PoisonError<T>> for SinkError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        SinkError::Poisoned
    }
}
