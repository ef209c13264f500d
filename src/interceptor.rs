use crate::context::{CallContext, ANONYMOUS_USER, DEFAULT_SOURCE_ADDRESS};
use crate::invocation::{capture, Invocation};
use crate::marker::{Logged, LoggedFn};
use crate::record::LogRecord;
use crate::sink::LogSink;
use serde::Serialize;
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// What to do when the wrapped call returns an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Emit nothing for failed calls. Only successful calls are logged.
    #[default]
    Skip,
    /// Emit a record with the error message and no result.
    Record,
}

/// Settings shared by every call that goes through one [`Interceptor`].
///
/// **Fields**
/// - `anonymous_user`: username recorded when the context has no principal.
/// - `source_address_placeholder`: address recorded when the context
///   cannot name the origin of the call.
/// - `service_name`: optional service tag for shared log streams.
/// - `failure_policy`: whether failed calls produce a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterceptorConfig {
    pub anonymous_user: String,
    pub source_address_placeholder: String,
    pub service_name: Option<String>,
    pub failure_policy: FailurePolicy,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            anonymous_user: ANONYMOUS_USER.to_string(),
            source_address_placeholder: DEFAULT_SOURCE_ADDRESS.to_string(),
            service_name: None,
            failure_policy: FailurePolicy::Skip,
        }
    }
}

/// Counters updated by the interceptor. Shared by all clones.
#[derive(Debug, Default)]
pub struct InterceptorStats {
    intercepted: AtomicU64,
    emitted: AtomicU64,
    sink_failures: AtomicU64,
    skipped: AtomicU64,
}

impl InterceptorStats {
    /// Calls that entered the interceptor and completed without unwinding.
    pub fn intercepted(&self) -> u64 {
        self.intercepted.load(Ordering::Relaxed)
    }

    /// Records accepted by the sink.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Records the sink rejected.
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    /// Failed calls for which no record was built.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Wraps calls so that each one is timed and logged as a [`LogRecord`].
///
/// The wrapped call runs first; the record is built from its outcome,
/// handed to the [`LogSink`] inline, and only then is the original result
/// returned. The interceptor never changes what the call returns: sink
/// failures are counted and reported through `tracing`, nothing more.
///
/// Cloning is cheap and clones share the sink and the counters. No
/// per-call state is kept on the interceptor itself, so it can be used
/// from any number of threads at once.
///
/// ```rust
/// use std::sync::Arc;
/// use call_log_sink::{Interceptor, Invocation, MemorySink, RequestContext};
///
/// let sink = MemorySink::new();
/// let interceptor = Interceptor::new(Arc::new(sink.clone()));
/// let ctx = RequestContext::anonymous().with_principal("alice");
///
/// let sum = interceptor.call(&ctx, Invocation::with_args("add", &(2, 3)), || 2 + 3);
/// assert_eq!(sum, 5);
/// assert_eq!(sink.records()[0].username(), "alice");
/// ```
#[derive(Clone)]
pub struct Interceptor {
    sink: Arc<dyn LogSink>,
    config: Arc<InterceptorConfig>,
    stats: Arc<InterceptorStats>,
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Interceptor {
    /// Interceptor with [`InterceptorConfig::default`].
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self::with_config(sink, InterceptorConfig::default())
    }

    pub fn with_config(sink: Arc<dyn LogSink>, config: InterceptorConfig) -> Self {
        Self {
            sink,
            config: Arc::new(config),
            stats: Arc::new(InterceptorStats::default()),
        }
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    pub fn stats(&self) -> &InterceptorStats {
        &self.stats
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Run a fallible call through the interceptor.
    ///
    /// **Parameters**
    /// - `ctx`: caller identity and origin for this call.
    /// - `invocation`: method name and captured arguments.
    /// - `f`: the real implementation.
    ///
    /// **Returns**
    /// - exactly what `f` returned.
    ///
    /// On `Ok` one record is emitted. On `Err` the [`FailurePolicy`]
    /// decides; by default nothing is emitted. A panic inside `f` unwinds
    /// straight through and produces no record.
    pub fn intercept<C, T, E, F>(&self, ctx: &C, invocation: Invocation, f: F) -> Result<T, E>
    where
        C: CallContext + ?Sized,
        T: Serialize,
        E: fmt::Display,
        F: FnOnce() -> Result<T, E>,
    {
        let start = Instant::now();
        let outcome = f();
        self.complete(ctx, invocation, elapsed_millis(start), &outcome);
        outcome
    }

    /// Run a call that cannot fail through the interceptor.
    pub fn call<C, T, F>(&self, ctx: &C, invocation: Invocation, f: F) -> T
    where
        C: CallContext + ?Sized,
        T: Serialize,
        F: FnOnce() -> T,
    {
        match self.intercept(ctx, invocation, || Ok::<T, Infallible>(f())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Async counterpart of [`Interceptor::intercept`].
    ///
    /// Timing covers the whole await of `fut`. The record is emitted
    /// inside this future, before it resolves; nothing is spawned.
    pub async fn intercept_async<C, T, E, Fut>(
        &self,
        ctx: &C,
        invocation: Invocation,
        fut: Fut,
    ) -> Result<T, E>
    where
        C: CallContext + ?Sized,
        T: Serialize,
        E: fmt::Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let outcome = fut.await;
        self.complete(ctx, invocation, elapsed_millis(start), &outcome);
        outcome
    }

    /// Async counterpart of [`Interceptor::call`].
    pub async fn call_async<C, T, Fut>(&self, ctx: &C, invocation: Invocation, fut: Fut) -> T
    where
        C: CallContext + ?Sized,
        T: Serialize,
        Fut: Future<Output = T>,
    {
        let wrapped = async { Ok::<T, Infallible>(fut.await) };
        match self.intercept_async(ctx, invocation, wrapped).await {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Mark a single function: every call through the returned handle is
    /// intercepted under `method_name`.
    pub fn wrap<F>(&self, method_name: impl Into<Cow<'static, str>>, f: F) -> LoggedFn<F> {
        LoggedFn::new(self.clone(), method_name, f)
    }

    /// Mark a whole target value: every method invoked through the
    /// returned handle is intercepted.
    pub fn mark<S>(&self, target: S) -> Logged<S> {
        Logged::new(target, self.clone())
    }

    fn complete<C, T, E>(
        &self,
        ctx: &C,
        invocation: Invocation,
        execution_time: u64,
        outcome: &Result<T, E>,
    ) where
        C: CallContext + ?Sized,
        T: Serialize,
        E: fmt::Display,
    {
        self.stats.intercepted.fetch_add(1, Ordering::Relaxed);

        let record = match outcome {
            Ok(value) => self
                .build_record(ctx, invocation, execution_time)
                .with_result(Some(capture(value))),
            Err(err) => match self.config.failure_policy {
                FailurePolicy::Skip => {
                    self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        method = invocation.method_name(),
                        execution_time_ms = execution_time,
                        "intercepted call failed, no record emitted"
                    );
                    return;
                }
                FailurePolicy::Record => self
                    .build_record(ctx, invocation, execution_time)
                    .with_error(err.to_string()),
            },
        };

        self.emit(&record);
    }

    fn build_record<C>(&self, ctx: &C, invocation: Invocation, execution_time: u64) -> LogRecord
    where
        C: CallContext + ?Sized,
    {
        let username = ctx
            .principal()
            .filter(|p| !p.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.config.anonymous_user.clone());
        let ip_address = ctx
            .source_address()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| self.config.source_address_placeholder.clone());
        let (method_name, arguments) = invocation.into_parts();

        LogRecord::new(method_name, arguments, execution_time, username, ip_address)
            .with_service_name(self.config.service_name.clone())
    }

    /// A panicking sink is treated like a failing one: the wrapped call's
    /// result has already been computed and must still reach the caller.
    fn emit(&self, record: &LogRecord) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.sink.send(record))) {
            Ok(Ok(())) => {
                self.stats.emitted.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                self.stats.sink_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    method = record.method_name(),
                    error = %e,
                    "failed to emit call log record"
                );
            }
            Err(_) => {
                self.stats.sink_failures.fetch_add(1, Ordering::Relaxed);
                warn!(method = record.method_name(), "log sink panicked while emitting record");
            }
        }
    }
}

/// Whole milliseconds since `start`. `Instant` is monotonic so the delta
/// is never negative; absurdly long calls saturate at `u64::MAX`.
fn elapsed_millis(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
