//! Gateway kernel contract.
//!
//! This module defines the *trait interfaces and configuration types* for the
//! admin panel gateway. No concrete implementations live here; those belong
//! in `panel-gateway`.
//!
//! # Architecture mapping
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              panel-kernel  (this module)                    │
//! │  UpstreamRegistry trait   GatewayFilter trait               │
//! │  GatewayConfig + validate()   GatewayError                  │
//! │  GatewayRequest/Response/Context                            │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │  depends on
//! ┌──────────────────────────▼──────────────────────────────────┐
//! │              panel-gateway  (runtime crate)                 │
//! │  InMemoryUpstreamRegistry: impl UpstreamRegistry            │
//! │  SessionFilter / LoggingFilter                              │
//! │  ProxyDispatcher  (reqwest)   HealthAggregator              │
//! │  GatewayServer  (axum HTTP server)                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use panel_kernel::gateway::{GatewayConfig, ServiceId, UpstreamConfig};
//!
//! let config = GatewayConfig::new()
//!     .with_upstream(
//!         UpstreamConfig::new(ServiceId::SharedVariables)
//!             .with_base_url("http://shared-variables:4000")
//!             .with_api_key("secret"),
//!     )
//!     .with_timeout_ms(5_000);
//!
//! config.validate().expect("gateway config is valid");
//! ```

pub mod error;
pub mod filter;
pub mod upstream;
pub mod validation;

// ── Flat re-exports ────────────────────────────────────────────────────────

pub use error::GatewayError;
pub use filter::{FilterAction, FilterOrder, GatewayFilter};
pub use upstream::{
    CallKind, HeaderPolicy, ServiceId, UpstreamDescriptor, UpstreamRegistry, UpstreamSlot,
};
pub use validation::{GatewayConfig, UpstreamConfig};

// types module is pub so implementors in panel-gateway can use the structs
pub mod types;
pub use types::{GatewayContext, GatewayRequest, GatewayResponse, HttpMethod};
