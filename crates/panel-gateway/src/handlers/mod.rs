//! Request handlers for the panel gateway API

pub mod auth;
pub mod health;
pub mod variables;

pub use auth::auth_router;
pub use health::health_router;
pub use variables::variables_router;

use crate::error::{PanelError, PanelResult};
use axum::{Json, extract::rejection::JsonRejection};

/// Unwrap a JSON body, turning extractor rejections into validation errors.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> PanelResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| PanelError::Validation(rejection.body_text()))
}
