//! HTTP API: current time, time setting, format conversion, and a
//! terminal-command bridge with sanitized output.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::CollaboratorError;
use crate::interpreter::{Interpreter, Session, DANGEROUS_COMMAND_MSG};
use crate::security::{sanitize_output, Classification};
use crate::system::{TimeSetter, TimeSource};
use crate::timefmt::{convert_date_format, format_date, parse_date, FormatSpec};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub interpreter: Arc<Interpreter>,
    pub time_source: Arc<dyn TimeSource>,
    pub time_setter: Option<Arc<dyn TimeSetter>>,
    pub collaborator_timeout: Duration,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/getCurrentTime", get(get_current_time))
        .route("/api/setTime", post(set_time))
        .route("/api/convertDateFormat", post(convert_format))
        .route("/api/command", post(run_command))
        .with_state(state)
}

/// Bind and serve the API until the task is cancelled.
pub async fn serve(address: &str, state: ApiState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("HTTP API listening on {}", address);
    axum::serve(listener, router(state)).await
}

async fn get_current_time(
    State(state): State<ApiState>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let timestamp = tokio::time::timeout(state.collaborator_timeout, state.time_source.now())
        .await
        .unwrap_or(Err(CollaboratorError::Timeout(state.collaborator_timeout)))
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error getting current time: {e}"),
            )
        })?;

    let current = format_date(&timestamp, &FormatSpec::default_display());
    Ok(Json(json!({ "currentTime": current })))
}

#[derive(Debug, Deserialize)]
pub struct SetTimeRequest {
    #[serde(rename = "newTime")]
    pub new_time: String,
}

async fn set_time(
    State(state): State<ApiState>,
    Json(request): Json<SetTimeRequest>,
) -> (StatusCode, String) {
    let Some(setter) = &state.time_setter else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Time setting is not configured".to_string(),
        );
    };

    let spec = FormatSpec::default_display();
    let Some(timestamp) = parse_date(&request.new_time, &spec) else {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid 'newTime' parameter".to_string(),
        );
    };

    let formatted = format_date(&timestamp, &spec);
    let applied = tokio::time::timeout(state.collaborator_timeout, setter.apply(&formatted))
        .await
        .unwrap_or(Err(CollaboratorError::Timeout(state.collaborator_timeout)));
    match applied {
        Ok(()) => (StatusCode::OK, "Time updated successfully".to_string()),
        Err(e) => (StatusCode::BAD_REQUEST, format!("Error setting time: {e}")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub date_string: String,
    pub from_format: String,
    pub to_format: String,
}

async fn convert_format(
    Json(request): Json<ConvertRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    match convert_date_format(
        &request.date_string,
        &request.from_format,
        &request.to_format,
    ) {
        Some(converted) => Ok(Json(json!({ "convertedDate": converted }))),
        None => Err((
            StatusCode::BAD_REQUEST,
            "Error converting date format".to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

// Bridge for terminal frontends. Fail-closed classification runs before the
// interpreter, and the reply is escaped because it renders into markup.
// HTTP carries no connection, so each command runs in a throwaway session.
async fn run_command(
    State(state): State<ApiState>,
    Json(request): Json<CommandRequest>,
) -> Json<Value> {
    let response = match state.interpreter.filter().classify(&request.command) {
        Classification::Malicious => DANGEROUS_COMMAND_MSG.to_string(),
        Classification::Benign => {
            let mut session = Session::new();
            state.interpreter.handle(&request.command, &mut session).await
        }
    };
    Json(json!({ "response": sanitize_output(&response) }))
}
