//! Capability traits for the inbound request surface.
//!
//! The core never owns the HTTP abstraction. The surrounding web layer
//! implements these minimal traits over its own request/response types
//! and passes them per invocation.

use std::sync::Arc;

use crate::session::SessionHandle;

/// Read-only view of an inbound request.
pub trait CasRequest: Send + Sync {
    /// Uppercase HTTP method name, e.g. `"GET"` or `"POST"`.
    fn method(&self) -> &str;

    /// Looks up a parameter in the query string.
    fn query_parameter(&self, name: &str) -> Option<String>;

    /// Looks up a parameter in the request body (form-encoded POST).
    fn body_parameter(&self, name: &str) -> Option<String>;

    /// The current local session, if the web layer has one established
    /// for this request.
    fn session(&self) -> Option<Arc<dyn SessionHandle>>;

    /// Looks up a parameter in the query string, falling back to the
    /// body.
    fn parameter(&self, name: &str) -> Option<String> {
        self.query_parameter(name)
            .or_else(|| self.body_parameter(name))
    }
}

/// Outbound response capabilities the core is allowed to use.
pub trait CasResponse: Send + Sync {
    /// Redirects the caller to `url`.
    ///
    /// One-shot; the collaborator must make this a no-op if the response
    /// has already been committed.
    fn redirect(&self, url: &str);
}
