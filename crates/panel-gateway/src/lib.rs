//! `panel-gateway`: admin panel gateway runtime.
//!
//! This crate provides the concrete implementations of the contracts defined
//! in `panel-kernel`:
//!
//! | Kernel contract | Implementation |
//! |----------------|----------------|
//! | [`UpstreamRegistry`](gateway::UpstreamRegistry) | [`backend::InMemoryUpstreamRegistry`] |
//! | [`GatewayFilter`](gateway::GatewayFilter) | [`filter::SessionFilter`], [`filter::LoggingFilter`] |
//! | [`CredentialVerifier`](panel_kernel::session::CredentialVerifier) | [`session::StaticPasswordVerifier`] |
//! | [`SessionTokens`](panel_kernel::session::SessionTokens) | [`session::SignedSessionTokens`], [`session::MarkerSessionTokens`] |
//!
//! Upstream calls go through [`backend::ProxyDispatcher`]; health reports
//! are merged by [`health::HealthAggregator`]. The [`server::GatewayServer`]
//! wires everything together into an axum HTTP service.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use panel_gateway::server::{GatewayServer, GatewayServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GatewayServerConfig {
//!         port: 3000,
//!         admin_password: Some("change-me".into()),
//!         ..GatewayServerConfig::from_env()
//!     };
//!
//!     GatewayServer::new(config).start().await.unwrap();
//! }
//! ```

pub mod backend;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod health;
pub mod server;
pub mod session;
pub mod state;

// Re-export the kernel gateway types for convenience.
pub use panel_kernel::gateway;
