//! Opaque handle to a local session.

/// Reference to a local session owned by the surrounding web layer.
///
/// The correlation store holds a shared reference plus the id string
/// captured at registration time, since a handle may become unusable
/// after invalidation.
pub trait SessionHandle: Send + Sync {
    /// The session's identifier.
    fn id(&self) -> String;

    /// Invalidates the session. Idempotent.
    fn invalidate(&self);
}
