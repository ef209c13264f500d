//! Caller identity and origin address for an intercepted call.
//!
//! Nothing here is ambient: the host builds a context from whatever
//! request object it already holds and passes it to the interceptor
//! explicitly with every call.

use std::fmt;
use std::net::SocketAddr;

/// Username recorded when no caller identity is established.
pub const ANONYMOUS_USER: &str = "Anonymous";

/// Address recorded when the origin of the call cannot be derived.
pub const DEFAULT_SOURCE_ADDRESS: &str = "127.0.0.1";

/// Read-only view of the current caller, queried once per intercepted call.
pub trait CallContext {
    /// Name of the authenticated caller, if any.
    fn principal(&self) -> Option<&str>;

    /// Origin network address of the triggering request, if known.
    fn source_address(&self) -> Option<String> {
        None
    }
}

/// The unit context has no identity and no address.
impl CallContext for () {
    fn principal(&self) -> Option<&str> {
        None
    }
}

impl<C: CallContext + ?Sized> CallContext for &C {
    fn principal(&self) -> Option<&str> {
        (**self).principal()
    }

    fn source_address(&self) -> Option<String> {
        (**self).source_address()
    }
}

/// Plain owned context built by the host from its request state.
///
/// ```rust
/// use call_log_sink::context::{CallContext, RequestContext};
///
/// let ctx = RequestContext::anonymous()
///     .with_principal("alice")
///     .with_source_address("192.168.1.20");
/// assert_eq!(ctx.principal(), Some("alice"));
/// assert_eq!(ctx.source_address().as_deref(), Some("192.168.1.20"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    principal: Option<String>,
    source_address: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Blank names are treated as "no identity".
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        let principal = principal.into();
        self.principal = if principal.trim().is_empty() {
            None
        } else {
            Some(principal)
        };
        self
    }

    pub fn with_source_address(mut self, address: impl fmt::Display) -> Self {
        self.source_address = Some(address.to_string());
        self
    }

    /// Record only the IP of a connected peer; the port is dropped.
    pub fn with_peer(self, peer: SocketAddr) -> Self {
        self.with_source_address(peer.ip())
    }
}

impl CallContext for RequestContext {
    fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    fn source_address(&self) -> Option<String> {
        self.source_address.clone()
    }
}
