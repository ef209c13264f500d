use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Settings for the process-wide `tracing` subscriber.
///
/// Only needed when records go through [`crate::TracingSink`] or when the
/// interceptor's own diagnostics (sink failures, skipped calls) should be
/// visible. Services that already install a subscriber can skip this.
///
/// **Fields**
/// - `default_directive`: filter used when `RUST_LOG` is unset.
/// - `with_target`: print the event target (`call_log` for records).
/// - `ansi`: colorize output.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub default_directive: String,
    pub with_target: bool,
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            with_target: true,
            ansi: true,
        }
    }
}

/// Error returned when the global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("invalid log filter directive: {0}")]
    Filter(#[from] ParseError),

    #[error("a global tracing subscriber is already set: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install a [`Registry`] with an env filter and a `fmt` layer as the
/// global default subscriber.
///
/// `RUST_LOG` takes precedence over `config.default_directive`.
pub fn init_tracing_with_config(config: TracingConfig) -> Result<(), InitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.default_directive)?,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_ansi(config.ansi);

    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Initialize tracing with sensible defaults.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`TracingConfig::default`].
pub fn init_tracing() -> Result<(), InitError> {
    init_tracing_with_config(TracingConfig::default())
}
