//! Marking calls for interception.
//!
//! Marking is decided where the function or value is registered rather
//! than at each call site: wrap a function once with
//! [`Interceptor::wrap`] or a whole value with [`Interceptor::mark`], and
//! hand out the wrapper instead of the original.

use crate::context::CallContext;
use crate::interceptor::Interceptor;
use crate::invocation::{CallArgs, Invocation};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// A single function whose calls are always intercepted.
///
/// Arguments are passed as one tuple so they can be captured in order
/// before the function runs.
///
/// ```rust
/// use std::sync::Arc;
/// use call_log_sink::{Interceptor, MemorySink};
///
/// let sink = MemorySink::new();
/// let interceptor = Interceptor::new(Arc::new(sink.clone()));
/// let add = interceptor.wrap("add", |(a, b): (i32, i32)| a + b);
///
/// assert_eq!(add.call(&(), (2, 3)), 5);
/// assert_eq!(sink.records()[0].method_name(), "add");
/// ```
pub struct LoggedFn<F> {
    interceptor: Interceptor,
    method_name: Cow<'static, str>,
    f: F,
}

impl<F> fmt::Debug for LoggedFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggedFn")
            .field("method_name", &self.method_name)
            .finish_non_exhaustive()
    }
}

impl<F> LoggedFn<F> {
    pub(crate) fn new(
        interceptor: Interceptor,
        method_name: impl Into<Cow<'static, str>>,
        f: F,
    ) -> Self {
        Self {
            interceptor,
            method_name: method_name.into(),
            f,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Call a function that cannot fail.
    pub fn call<C, A, T>(&self, ctx: &C, args: A) -> T
    where
        C: CallContext + ?Sized,
        A: CallArgs,
        T: Serialize,
        F: Fn(A) -> T,
    {
        let invocation = Invocation::with_args(self.method_name.clone(), &args);
        self.interceptor.call(ctx, invocation, || (self.f)(args))
    }

    /// Call a function returning `Result`; the error is passed back as is.
    pub fn try_call<C, A, T, E>(&self, ctx: &C, args: A) -> Result<T, E>
    where
        C: CallContext + ?Sized,
        A: CallArgs,
        T: Serialize,
        E: fmt::Display,
        F: Fn(A) -> Result<T, E>,
    {
        let invocation = Invocation::with_args(self.method_name.clone(), &args);
        self.interceptor.intercept(ctx, invocation, || (self.f)(args))
    }
}

/// A value whose every method call goes through the interceptor.
///
/// Each invocation names the method and passes its arguments as a tuple
/// together with a closure that performs the real call on the target.
pub struct Logged<S> {
    target: S,
    interceptor: Interceptor,
}

impl<S: fmt::Debug> fmt::Debug for Logged<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logged")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<S> Logged<S> {
    pub fn new(target: S, interceptor: Interceptor) -> Self {
        Self {
            target,
            interceptor,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.target
    }

    pub fn into_inner(self) -> S {
        self.target
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn invoke<C, A, T, F>(
        &self,
        ctx: &C,
        method_name: impl Into<Cow<'static, str>>,
        args: A,
        f: F,
    ) -> T
    where
        C: CallContext + ?Sized,
        A: CallArgs,
        T: Serialize,
        F: FnOnce(&S, A) -> T,
    {
        let invocation = Invocation::with_args(method_name, &args);
        self.interceptor
            .call(ctx, invocation, || f(&self.target, args))
    }

    pub fn try_invoke<C, A, T, E, F>(
        &self,
        ctx: &C,
        method_name: impl Into<Cow<'static, str>>,
        args: A,
        f: F,
    ) -> Result<T, E>
    where
        C: CallContext + ?Sized,
        A: CallArgs,
        T: Serialize,
        E: fmt::Display,
        F: FnOnce(&S, A) -> Result<T, E>,
    {
        let invocation = Invocation::with_args(method_name, &args);
        self.interceptor
            .intercept(ctx, invocation, || f(&self.target, args))
    }

    /// Like [`Logged::invoke`] for methods that need `&mut self`.
    pub fn invoke_mut<C, A, T, F>(
        &mut self,
        ctx: &C,
        method_name: impl Into<Cow<'static, str>>,
        args: A,
        f: F,
    ) -> T
    where
        C: CallContext + ?Sized,
        A: CallArgs,
        T: Serialize,
        F: FnOnce(&mut S, A) -> T,
    {
        let invocation = Invocation::with_args(method_name, &args);
        let target = &mut self.target;
        self.interceptor.call(ctx, invocation, || f(target, args))
    }
}
