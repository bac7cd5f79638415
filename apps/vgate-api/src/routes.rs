use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::{HeaderMap, HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;

use vgate_domain::collection;
use vgate_service::{QueryRequest, QueryResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(root))
		.route("/health", get(health))
		.route("/search", post(search))
		.with_state(state)
}

async fn root() -> Json<Value> {
	Json(serde_json::json!({
		"message": "Vector Gate API",
		"version": vgate_cli::VERSION,
	}))
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
	let header_name = state.service.cfg.service.api_key_header.as_str();
	let secret = headers.get(header_name).and_then(|value| value.to_str().ok()).unwrap_or_default();
	let (authenticated, credential) = state.service.authenticate(secret).await;
	let Some(credential) = credential.filter(|_| authenticated) else {
		return Err(ApiError::unauthorized(header_name));
	};
	let Json(request) = payload.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", err.body_text())
	})?;

	if request.query.trim().is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"query must be non-empty.",
		));
	}

	let service = state.service.clone();
	let collection = collection::collection_for_owner(
		&credential.owner_email,
		&service.cfg.search.collection_suffix,
	);
	// Detached from the request future so a disconnecting client cannot cancel the audit write.
	let task = tokio::spawn(async move {
		service.process_query(&collection, &request, &credential).await
	});
	let response = task.await.map_err(|err| {
		tracing::error!(error = %err, "Query task failed.");

		json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Query failed.")
	})?;

	Ok(Json(response))
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
	challenge: Option<String>,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), challenge: None }
	}

	fn unauthorized(header_name: &str) -> Self {
		Self {
			challenge: Some(format!("ApiKey header=\"{header_name}\"")),
			..Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid or missing API key.")
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };
		let mut response = (self.status, Json(body)).into_response();

		if let Some(challenge) = self.challenge
			&& let Ok(value) = HeaderValue::from_str(&challenge)
		{
			response.headers_mut().insert(WWW_AUTHENTICATE, value);
		}

		response
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
