use std::str::FromStr;

use axum::{
	Json, Router,
	body::Body,
	extract::{FromRequestParts, Path, Query, State},
	http::{HeaderMap, Request, StatusCode, request::Parts},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::state::AppState;
use notely_service::{
	CreateNoteRequest, Error as ServiceError, NoteFilter, NoteFlagsPatch, NoteResponse,
	SearchRequest, SearchResponse, UpdateNoteRequest, UserRequest, UserResponse,
};

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_SOCKET_ID: &str = "x-socket-id";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/notes", get(list_notes).post(create_note))
		.route("/notes/search", post(search_notes))
		.route("/notes/{id}", get(get_note).put(update_note).delete(delete_note))
		.route("/notes/{id}/flags", put(set_note_flags))
		.route("/users", get(list_users).post(create_user))
		.route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
		.layer(middleware::from_fn(request_context))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/notes/{id}", axum::routing::delete(admin_delete_note))
		.layer(middleware::from_fn(request_context))
		.with_state(state)
}

/// Caller identity taken from the `x-user-id` header.
#[derive(Clone, Debug)]
pub struct UserId(pub String);
impl<S> FromRequestParts<S> for UserId
where
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		read_header(&parts.headers, HEADER_USER_ID).map(|value| Self(value.to_string())).ok_or_else(
			|| {
				json_error(
					StatusCode::BAD_REQUEST,
					"INVALID_REQUEST",
					format!("{HEADER_USER_ID} header is required."),
				)
			},
		)
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct ListNotesQuery {
	#[serde(default)]
	pub filter: Option<String>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_notes(
	State(state): State<AppState>,
	Query(query): Query<ListNotesQuery>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
	let filter = NoteFilter::from_str(query.filter.as_deref().unwrap_or_default())
		.map_err(ServiceError::from)?;
	let notes = state.service.list_notes(filter).await?;

	Ok(Json(notes))
}

async fn get_note(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(note_id): Path<Uuid>,
) -> Result<Json<NoteResponse>, ApiError> {
	Ok(Json(state.service.get_note(&user_id, note_id).await?))
}

async fn create_note(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Json(payload): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
	let note = state.service.create_note(&user_id, payload).await?;

	Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(note_id): Path<Uuid>,
	Json(payload): Json<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
	Ok(Json(state.service.update_note(&user_id, note_id, payload).await?))
}

async fn set_note_flags(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(note_id): Path<Uuid>,
	Json(payload): Json<NoteFlagsPatch>,
) -> Result<Json<NoteResponse>, ApiError> {
	Ok(Json(state.service.set_note_flags(&user_id, note_id, payload).await?))
}

async fn delete_note(
	State(state): State<AppState>,
	UserId(user_id): UserId,
	Path(note_id): Path<Uuid>,
) -> Result<Json<NoteResponse>, ApiError> {
	Ok(Json(state.service.delete_note(&user_id, note_id).await?))
}

async fn search_notes(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	Ok(Json(state.service.search(payload).await?))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
	Ok(Json(state.service.list_users().await?))
}

async fn get_user(
	State(state): State<AppState>,
	Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
	Ok(Json(state.service.get_user(user_id).await?))
}

async fn create_user(
	State(state): State<AppState>,
	Json(payload): Json<UserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
	let user = state.service.create_user(payload).await?;

	Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
	State(state): State<AppState>,
	Path(user_id): Path<Uuid>,
	Json(payload): Json<UserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
	Ok(Json(state.service.update_user(user_id, payload).await?))
}

async fn delete_user(
	State(state): State<AppState>,
	Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
	Ok(Json(state.service.delete_user(user_id).await?))
}

async fn admin_delete_note(
	State(state): State<AppState>,
	Path(note_id): Path<Uuid>,
) -> Result<Json<NoteResponse>, ApiError> {
	Ok(Json(state.service.admin_delete_note(note_id).await?))
}

/// Opens a request span carrying the caller and socket ids, and echoes `x-socket-id` back so
/// realtime clients can drop their own updates.
async fn request_context(req: Request<Body>, next: Next) -> Response {
	let socket_id = req.headers().get(HEADER_SOCKET_ID).cloned();
	let span = tracing::info_span!(
		"request",
		method = %req.method(),
		path = %req.uri().path(),
		user_id = read_header(req.headers(), HEADER_USER_ID).unwrap_or_default(),
		socket_id = socket_id.as_ref().and_then(|value| value.to_str().ok()).unwrap_or_default(),
	);
	let mut response = next.run(req).instrument(span).await;

	if let Some(value) = socket_id {
		response.headers_mut().insert(HEADER_SOCKET_ID, value);
	}

	response
}

fn read_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	let value = headers.get(name)?.to_str().ok()?.trim();

	if value.is_empty() { None } else { Some(value) }
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
	pub fn status(&self) -> StatusCode {
		self.status
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			ServiceError::UpdateFailed { message } =>
				json_error(StatusCode::CONFLICT, "UPDATE_FAILED", message),
			ServiceError::DeleteFailed { message } =>
				json_error(StatusCode::CONFLICT, "DELETE_FAILED", message),
			ServiceError::Conflict { message } =>
				json_error(StatusCode::CONFLICT, "CONFLICT", message),
			ServiceError::Provider { message } => {
				tracing::error!(%message, "Provider failure.");

				json_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", "Embedding provider failed.")
			},
			ServiceError::Storage { message } => {
				tracing::error!(%message, "Storage failure.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", "Storage failure.")
			},
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
	ApiError { status, error_code: code.to_string(), message: message.into() }
}
