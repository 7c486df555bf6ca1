//! Local-session handling for single logout.

pub mod correlation;
pub mod handle;

pub use correlation::{InMemorySessionCorrelationStore, SessionCorrelationStorage};
pub use handle::SessionHandle;
