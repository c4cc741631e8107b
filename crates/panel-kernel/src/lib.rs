//! `panel-kernel`: contract crate for the admin panel gateway.
//!
//! Everything here is free of network I/O: trait interfaces, configuration
//! types, the health display model and the value coercion rules. The
//! runtime that wires these into an HTTP service lives in `panel-gateway`.

// gateway contract module
pub mod gateway;

// session and credential contracts
pub mod session;

// variable values and text coercion
pub mod variable;

// normalized health model
pub mod health;
