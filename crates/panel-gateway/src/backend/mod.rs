//! Upstream registry and dispatcher.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{API_KEY_HEADER, ProxyDispatcher, UpstreamReply};
pub use registry::InMemoryUpstreamRegistry;
