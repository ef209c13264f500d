pub mod record;
pub mod sink;
pub mod invocation;
pub mod context;
pub mod interceptor;
pub mod marker;

pub mod noop_sink;
pub mod memory_sink;
pub mod json_lines;
pub mod tracing_sink;

pub mod backend;
pub mod env;
pub mod init;

pub use context::{CallContext, RequestContext};
pub use interceptor::{FailurePolicy, Interceptor, InterceptorConfig, InterceptorStats};
pub use invocation::{CallArgs, Invocation};
pub use json_lines::JsonLinesSink;
pub use marker::{Logged, LoggedFn};
pub use memory_sink::MemorySink;
pub use noop_sink::NoopSink;
pub use record::LogRecord;
pub use sink::{LogSink, SinkError};
pub use tracing_sink::TracingSink;
