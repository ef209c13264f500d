use std::path::PathBuf;
use std::sync::Arc;

use crate::json_lines::JsonLinesSink;
use crate::memory_sink::MemorySink;
use crate::noop_sink::NoopSink;
use crate::sink::{LogSink, SinkError};
use crate::tracing_sink::TracingSink;

/// Supported sink kinds that can be selected via DSN or config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Stdout,
    Stderr,
    Tracing,
    Noop,
    Memory,
    File(PathBuf),
}

/// Sink configuration built from a DSN string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Selected sink implementation.
    pub kind: BackendKind,
    /// Raw DSN that was used to construct this config.
    pub dsn: String,
}

impl BackendConfig {
    pub fn new(kind: BackendKind, dsn: impl Into<String>) -> Self {
        BackendConfig {
            kind,
            dsn: dsn.into(),
        }
    }
}

/// Parse a DSN string and infer the sink kind from it.
///
/// Examples:
/// - "stdout", "stderr": one JSON line per record
/// - "tracing": `Log Entry: <json>` events through the `tracing` subscriber
/// - "noop", "memory"
/// - "file:///var/log/app/calls.jsonl"
pub fn parse_dsn(dsn: &str) -> Result<BackendConfig, DsnError> {
    let trimmed = dsn.trim();
    let lower = trimmed.to_ascii_lowercase();

    let kind = match lower.as_str() {
        "stdout" => BackendKind::Stdout,
        "stderr" => BackendKind::Stderr,
        "tracing" => BackendKind::Tracing,
        "noop" => BackendKind::Noop,
        "memory" => BackendKind::Memory,
        _ if lower.starts_with("file://") => {
            let path = &trimmed["file://".len()..];
            if path.is_empty() {
                return Err(DsnError::MissingPath);
            }
            BackendKind::File(PathBuf::from(path))
        }
        _ => return Err(DsnError::UnknownScheme(trimmed.to_string())),
    };

    Ok(BackendConfig::new(kind, trimmed))
}

/// Error type returned when parsing a DSN.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DsnError {
    #[error("unknown or unsupported sink DSN: {0:?}")]
    UnknownScheme(String),

    #[error("file DSN has no path")]
    MissingPath,
}

/// Error type returned when building a sink from configuration.
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error(transparent)]
    Dsn(#[from] DsnError),

    #[error("failed to open log file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: SinkError,
    },
}

/// Create a concrete `LogSink` implementation from a `BackendConfig`.
///
/// This is the main entry point for applications that want to select
/// a sink using a single DSN string instead of constructing sinks
/// manually. A `memory` sink built here is only reachable through the
/// returned handle; build a [`MemorySink`] directly to inspect it.
pub fn make_sink_from_config(cfg: &BackendConfig) -> Result<Arc<dyn LogSink>, BackendBuildError> {
    let sink: Arc<dyn LogSink> = match &cfg.kind {
        BackendKind::Stdout => Arc::new(JsonLinesSink::stdout()),
        BackendKind::Stderr => Arc::new(JsonLinesSink::stderr()),
        BackendKind::Tracing => Arc::new(TracingSink),
        BackendKind::Noop => Arc::new(NoopSink),
        BackendKind::Memory => Arc::new(MemorySink::new()),
        BackendKind::File(path) => {
            let sink = JsonLinesSink::file(path).map_err(|source| BackendBuildError::Open {
                path: path.clone(),
                source,
            })?;
            Arc::new(sink)
        }
    };
    Ok(sink)
}

/// Parse `dsn` and build the sink in one step.
pub fn make_sink(dsn: &str) -> Result<Arc<dyn LogSink>, BackendBuildError> {
    make_sink_from_config(&parse_dsn(dsn)?)
}
