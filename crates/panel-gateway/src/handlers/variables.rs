//! Shared variable endpoints
//!
//! GET  /variables               - list the store
//! POST /variables               - create `{name, value}`
//! PUT  /variables               - update `{name, value}` via the item path
//! GET  /variables/{name}        - fetch one variable
//! PUT  /variables/{name}        - update `{value}`
//! GET  /variables/{name}/draft  - editable text form of one value
//!
//! All calls go to the shared-variables service. String values are coerced
//! to typed values before they leave the gateway; validation failures are
//! answered locally without any upstream call.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use panel_kernel::gateway::{CallKind, HttpMethod, ServiceId};
use panel_kernel::variable::{TypedValue, ValueError, Variable, render_json};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::json_body;
use crate::backend::UpstreamReply;
use crate::error::{PanelError, PanelResult};
use crate::state::AppState;

const SERVICE: ServiceId = ServiceId::SharedVariables;
const COLLECTION: &str = "variables";

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /variables` and `PUT /variables`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VariableInput {
    pub name: Option<String>,
    pub value: Option<Value>,
}

/// Body of `PUT /variables/{name}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValueInput {
    pub value: Option<Value>,
}

/// Response of `GET /variables/{name}/draft`.
#[derive(Debug, Serialize)]
pub struct VariableDraft {
    pub name: String,
    pub text: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

fn required_name(name: Option<String>) -> PanelResult<String> {
    match name {
        Some(name) if !name.trim().is_empty() => item_name(name),
        _ => Err(PanelError::Validation("Variable name is required".to_string())),
    }
}

/// `.` and `..` would be collapsed by URL normalization and address the
/// collection instead of the item.
fn item_name(name: String) -> PanelResult<String> {
    if name == "." || name == ".." {
        return Err(PanelError::Validation(format!("Invalid variable name '{name}'")));
    }
    Ok(name)
}

fn typed_value(value: Option<Value>) -> PanelResult<TypedValue> {
    TypedValue::from_input(value.unwrap_or(Value::Null)).map_err(|e| {
        PanelError::Validation(match e {
            ValueError::Missing => "Variable value is required".to_string(),
            ValueError::Empty => "Variable value cannot be empty".to_string(),
        })
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /variables
pub async fn list_variables(State(state): State<AppState>) -> PanelResult<UpstreamReply> {
    state
        .dispatcher
        .forward(SERVICE, CallKind::Data, HttpMethod::Get, &[COLLECTION], None)
        .await
}

/// POST /variables
pub async fn create_variable(
    State(state): State<AppState>,
    body: Result<Json<VariableInput>, JsonRejection>,
) -> PanelResult<UpstreamReply> {
    let input = json_body(body)?;
    let name = required_name(input.name)?;
    let value = typed_value(input.value)?;

    let payload = json!(Variable::new(name, value));
    state
        .dispatcher
        .forward(SERVICE, CallKind::Data, HttpMethod::Post, &[COLLECTION], Some(&payload))
        .await
}

/// PUT /variables
///
/// The upstream has no update-by-body operation, so the name moves into the
/// path and only the value is sent.
pub async fn update_variable_by_body(
    State(state): State<AppState>,
    body: Result<Json<VariableInput>, JsonRejection>,
) -> PanelResult<UpstreamReply> {
    let input = json_body(body)?;
    let name = required_name(input.name)?;
    let value = typed_value(input.value)?;
    put_value(&state, &name, value).await
}

/// GET /variables/{name}
pub async fn get_variable(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> PanelResult<UpstreamReply> {
    let name = item_name(name)?;
    state
        .dispatcher
        .forward(SERVICE, CallKind::Data, HttpMethod::Get, &[COLLECTION, name.as_str()], None)
        .await
}

/// PUT /variables/{name}
pub async fn update_variable(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<ValueInput>, JsonRejection>,
) -> PanelResult<UpstreamReply> {
    let name = item_name(name)?;
    let value = typed_value(json_body(body)?.value)?;
    put_value(&state, &name, value).await
}

/// GET /variables/{name}/draft
pub async fn variable_draft(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> PanelResult<Response> {
    let name = item_name(name)?;
    let reply = state
        .dispatcher
        .forward(SERVICE, CallKind::Data, HttpMethod::Get, &[COLLECTION, name.as_str()], None)
        .await?;
    if !reply.is_success() {
        return Ok(reply.into_response());
    }

    let value = reply.body.as_ref().and_then(stored_value).ok_or_else(|| {
        PanelError::MalformedUpstream {
            service: SERVICE,
            message: format!("variable '{name}' has no value field"),
        }
    })?;
    let text = render_json(value);
    Ok(Json(VariableDraft { name, text }).into_response())
}

async fn put_value(state: &AppState, name: &str, value: TypedValue) -> PanelResult<UpstreamReply> {
    let payload = json!({ "value": Value::from(value) });
    state
        .dispatcher
        .forward(SERVICE, CallKind::Data, HttpMethod::Put, &[COLLECTION, name], Some(&payload))
        .await
}

/// `value` of a single-variable response, bare or wrapped in `variable`.
fn stored_value(body: &Value) -> Option<&Value> {
    body.get("value")
        .or_else(|| body.get("variable").and_then(|v| v.get("value")))
}

/// Build the variables router sub-tree
pub fn variables_router() -> axum::Router<AppState> {
    use axum::routing::get;
    axum::Router::new()
        .route(
            "/variables",
            get(list_variables)
                .post(create_variable)
                .put(update_variable_by_body),
        )
        .route("/variables/{name}", get(get_variable).put(update_variable))
        .route("/variables/{name}/draft", get(variable_draft))
}
