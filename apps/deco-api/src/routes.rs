use axum::{
	Json, Router,
	extract::{Path, Query, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::Serialize;

use deco_service::{ChatRequest, ChatResponse, Error as ServiceError, ResetRequest, ResetResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/chat", post(chat).delete(reset))
		.route("/api/chat/{session_id}", delete(reset_session))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn chat(
	State(state): State<AppState>,
	payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
	let Json(payload) = payload.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", err.body_text())
	})?;
	let response = state.service.chat(payload).await?;

	Ok(Json(response))
}

async fn reset(
	State(state): State<AppState>,
	Query(payload): Query<ResetRequest>,
) -> Json<ResetResponse> {
	Json(state.service.reset(payload))
}

async fn reset_session(
	State(state): State<AppState>,
	Path(session_id): Path<String>,
) -> Json<ResetResponse> {
	Json(state.service.reset(ResetRequest { session_id: Some(session_id) }))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::Provider { message } => internal("provider_error", message),
			ServiceError::Storage { message } => internal("storage_error", message),
			ServiceError::Index { message } => internal("index_error", message),
			ServiceError::Timeout { message } => internal("timeout", message),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

fn internal(code: &str, message: String) -> ApiError {
	tracing::error!(error_code = code, message = %message, "Chat request failed.");

	json_error(StatusCode::INTERNAL_SERVER_ERROR, code, message)
}
