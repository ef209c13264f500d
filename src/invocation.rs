use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

/// Identity and arguments of one pending call.
///
/// Arguments are captured as JSON values before the call runs, in the
/// order they were passed.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    method_name: Cow<'static, str>,
    arguments: Vec<Value>,
}

impl Invocation {
    /// An invocation with no arguments.
    pub fn new(method_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            method_name: method_name.into(),
            arguments: Vec::new(),
        }
    }

    /// Capture arguments from a tuple: `()` is no arguments, `(a,)` is one,
    /// `(a, b, c)` is three. A single value of any type, including a `Vec`
    /// or `None`, goes in a one-element tuple and is logged as one argument.
    ///
    /// ```rust
    /// use call_log_sink::invocation::Invocation;
    /// use serde_json::json;
    ///
    /// let call = Invocation::with_args("add", &(2, 3));
    /// assert_eq!(call.arguments(), &[json!(2), json!(3)]);
    /// assert!(Invocation::with_args("ping", &()).arguments().is_empty());
    /// assert_eq!(
    ///     Invocation::with_args("sum", &(vec![1, 2],)).arguments(),
    ///     &[json!([1, 2])]
    /// );
    /// ```
    pub fn with_args<A: CallArgs>(method_name: impl Into<Cow<'static, str>>, args: &A) -> Self {
        Self {
            method_name: method_name.into(),
            arguments: args.to_arguments(),
        }
    }

    /// Append one argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.arguments.push(capture(value));
        self
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Value>) {
        (self.method_name.into_owned(), self.arguments)
    }
}

/// Argument lists that can be captured for logging.
///
/// Implemented for `()` and for tuples of up to twelve serializable
/// values, one tuple element per argument.
pub trait CallArgs {
    fn to_arguments(&self) -> Vec<Value>;
}

impl CallArgs for () {
    fn to_arguments(&self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! impl_call_args {
    ($($ty:ident $var:ident),+) => {
        impl<$($ty: Serialize),+> CallArgs for ($($ty,)+) {
            fn to_arguments(&self) -> Vec<Value> {
                let ($($var,)+) = self;
                vec![$(capture($var)),+]
            }
        }
    };
}

impl_call_args!(A1 a1);
impl_call_args!(A1 a1, A2 a2);
impl_call_args!(A1 a1, A2 a2, A3 a3);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9, A10 a10);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9, A10 a10, A11 a11);
impl_call_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8, A9 a9, A10 a10, A11 a11, A12 a12);

/// Serialize a value for logging. Values serde cannot represent (maps with
/// non-string keys, failing custom impls) are logged as a marker string
/// rather than failing the call.
pub(crate) fn capture<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| Value::String(format!("<unserializable: {}>", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn tuple_arguments_keep_order() {
        let call = Invocation::with_args("join", &("a", 2, true));
        assert_eq!(call.method_name(), "join");
        assert_eq!(call.arguments(), &[json!("a"), json!(2), json!(true)]);
    }

    #[test]
    fn single_element_tuple_wraps_collections() {
        let call = Invocation::with_args("sum", &(vec![1, 2, 3],));
        assert_eq!(call.arguments(), &[json!([1, 2, 3])]);
    }

    #[test]
    fn single_none_is_one_argument() {
        let call = Invocation::with_args("maybe", &(Option::<u8>::None,));
        assert_eq!(call.arguments(), &[Value::Null]);
    }

    #[test]
    fn twelve_arguments() {
        let call = Invocation::with_args("wide", &(1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, "last"));
        assert_eq!(call.arguments().len(), 12);
        assert_eq!(call.arguments()[11], json!("last"));
    }

    #[test]
    fn builder_appends_in_order() {
        let call = Invocation::new("greet").arg("bob").arg(&42u8);
        assert_eq!(call.arguments(), &[json!("bob"), json!(42)]);
    }

    #[test]
    fn unserializable_argument_becomes_marker() {
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON object keys");
        let call = Invocation::new("store").arg(&bad);

        let logged = call.arguments()[0].as_str().unwrap();
        assert!(logged.starts_with("<unserializable:"), "{logged}");
    }
}
