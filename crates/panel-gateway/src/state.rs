//! Shared application state for the gateway server

use crate::backend::ProxyDispatcher;
use crate::filter::FilterPipeline;
use crate::health::HealthAggregator;
use panel_kernel::session::{CredentialVerifier, SessionTokens};
use std::sync::Arc;

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Sends calls to the configured upstreams
    pub dispatcher: Arc<ProxyDispatcher>,
    pub health: Arc<HealthAggregator>,
    /// Filters run around every request
    pub pipeline: Arc<FilterPipeline>,
    /// Login password check
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Session token scheme
    pub sessions: Arc<dyn SessionTokens>,
    /// Whether session cookies carry the `Secure` attribute
    pub cookie_secure: bool,
}
