use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use anifind_service::{Error as ServiceError, MatchesResponse, QueryRequest, RankedResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	let cors = state.service.cfg.service.cors_allow_any_origin;
	let router = Router::new()
		.route("/health", get(health))
		.route("/query", post(query))
		.route("/matches", post(matches))
		.with_state(state);

	if cors {
		router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
	} else {
		router
	}
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn query(
	State(state): State<AppState>,
	payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<RankedResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.query(payload).await?;

	Ok(Json(response))
}

async fn matches(
	State(state): State<AppState>,
	payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<MatchesResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.matches(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } => ApiError::new(
				StatusCode::BAD_REQUEST,
				"INVALID_REQUEST",
				message,
				Some(vec!["$.text".to_string()]),
			),
			ServiceError::Embedding { message, .. } => {
				tracing::error!(error = %message, "Embedding stage failed.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"EMBEDDING_FAILED",
					"Failed to get embedding.",
					None,
				)
			},
			ServiceError::Index { message, .. } => {
				tracing::error!(error = %message, "Retrieval stage failed.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INDEX_FAILED",
					"Failed to query the vector index.",
					None,
				)
			},
			ServiceError::Selection { message, .. } => {
				tracing::error!(error = %message, "Selection stage failed.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"SELECTION_FAILED",
					"Failed to rank candidates.",
					None,
				)
			},
			ServiceError::SideStore { message } => ApiError::new(
				StatusCode::INTERNAL_SERVER_ERROR,
				"INTERNAL_ERROR",
				message,
				None,
			),
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text(), None)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
