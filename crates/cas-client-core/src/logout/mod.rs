//! Single logout: message codec and request handling.

pub mod codec;
pub mod handler;

pub use codec::{LogoutMessage, decode, encode_back_channel, encode_front_channel};
pub use handler::{Disposition, RequestKind, SingleLogoutHandler};
