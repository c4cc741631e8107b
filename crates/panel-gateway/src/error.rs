//! Gateway error types.
//!
//! Every handler returns [`PanelResult`]; nothing is allowed to escape the
//! HTTP boundary as a panic or an unstructured 500. Upstream business errors
//! are *not* represented here: a non-success upstream status is relayed
//! verbatim as an ordinary reply.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use panel_kernel::gateway::{GatewayError, ServiceId};
use serde_json::json;
use thiserror::Error;

/// Request-time errors.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Missing or invalid session cookie.
    #[error("Unauthorized")]
    Unauthorized,

    /// Login attempt with the wrong password.
    #[error("Invalid password")]
    InvalidPassword,

    /// `?service=` named something other than a known upstream.
    #[error("Invalid service specified")]
    UnknownService(String),

    /// The request body is missing fields or carries unusable values.
    #[error("{0}")]
    Validation(String),

    /// Required configuration is absent; names the service and variable,
    /// never the secret.
    #[error(transparent)]
    Config(GatewayError),

    /// Upstream unreachable, timed out, or failed mid-response.
    #[error("Network error or service unreachable: {message}")]
    Network { service: ServiceId, message: String },

    /// Upstream answered with a body that is not JSON.
    #[error("Malformed response from upstream: {message}")]
    MalformedUpstream { service: ServiceId, message: String },
}

impl From<GatewayError> for PanelError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownService(s) => PanelError::UnknownService(s),
            other => PanelError::Config(other),
        }
    }
}

impl PanelError {
    pub fn status(&self) -> StatusCode {
        match self {
            PanelError::Unauthorized | PanelError::InvalidPassword => StatusCode::UNAUTHORIZED,
            PanelError::UnknownService(_) | PanelError::Validation(_) => StatusCode::BAD_REQUEST,
            PanelError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PanelError::Network { .. } | PanelError::MalformedUpstream { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Upstream the error concerns, if one was being called.
    pub fn service(&self) -> Option<ServiceId> {
        match self {
            PanelError::Network { service, .. } | PanelError::MalformedUpstream { service, .. } => {
                Some(*service)
            }
            _ => None,
        }
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            PanelError::Network { service, .. } | PanelError::MalformedUpstream { service, .. } => {
                json!({
                    "service": service.display_name(),
                    "status": "error",
                    "error": self.to_string(),
                })
            }
            PanelError::Config(err) => match err.service() {
                Some(service) => json!({
                    "service": service,
                    "status": "error",
                    "error": err.to_string(),
                }),
                None => json!({ "message": err.to_string() }),
            },
            PanelError::UnknownService(requested) => json!({
                "message": self.to_string(),
                "service": requested,
            }),
            _ => json!({ "message": self.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(service) = self.service() {
            response.extensions_mut().insert(service);
        }
        response
    }
}

pub type PanelResult<T> = Result<T, PanelError>;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] GatewayError),

    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid session signing key: {0}")]
    SessionKey(String),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
