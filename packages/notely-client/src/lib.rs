//! Typed bindings for the notes HTTP API.
//!
//! Every call resolves to an [`ApiResult`]. Transport, status, and decode failures are folded into
//! its `error` field instead of escaping as `Err`.

mod error;

pub use error::{Error, Result};

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use notely_service::{
	CreateNoteRequest, NoteFilter, NoteFlagsPatch, NoteResponse, SearchRequest, SearchResponse,
	UpdateNoteRequest, UserRequest, UserResponse,
};

const HEADER_USER_ID: &str = "x-user-id";
const HEADER_SOCKET_ID: &str = "x-socket-id";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
	pub data: Option<T>,
	pub error: Option<String>,
}
impl<T> ApiResult<T> {
	pub fn is_ok(&self) -> bool {
		self.error.is_none()
	}

	pub fn into_result(self) -> std::result::Result<Option<T>, String> {
		match self.error {
			Some(error) => Err(error),
			None => Ok(self.data),
		}
	}
}
impl<T> From<Result<T>> for ApiResult<T> {
	fn from(result: Result<T>) -> Self {
		match result {
			Ok(data) => Self { data: Some(data), error: None },
			Err(err) => Self { data: None, error: Some(err.to_string()) },
		}
	}
}

#[derive(Clone, Debug)]
pub struct NotelyClient {
	http: Client,
	base_url: String,
	user_id: Option<String>,
}
impl NotelyClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self::with_http(Client::new(), base_url)
	}

	pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
		let base_url = base_url.into().trim_end_matches('/').to_string();

		Self { http, base_url, user_id: None }
	}

	/// Identity sent as `x-user-id` on owner-scoped calls.
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());

		self
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Lists every note. `filter` narrows to active, archived, or trashed notes.
	pub async fn get_all_notes(&self, filter: Option<NoteFilter>) -> ApiResult<Vec<NoteResponse>> {
		let path = match filter {
			Some(filter) => format!("/notes?filter={filter}"),
			None => "/notes".to_string(),
		};

		self.send("get_all_notes", self.request(Method::GET, &path, None)).await.into()
	}

	pub async fn get_note_by_id(&self, id: Uuid) -> ApiResult<NoteResponse> {
		let req = self.request(Method::GET, &format!("/notes/{id}"), None);

		self.send("get_note_by_id", req).await.into()
	}

	pub async fn search_notes(&self, query: &str) -> ApiResult<SearchResponse> {
		let body = SearchRequest { query: Some(query.to_string()), ..Default::default() };

		self.search(&body).await
	}

	/// Searches with an explicit request, e.g. a raw embedding or custom threshold.
	pub async fn search(&self, body: &SearchRequest) -> ApiResult<SearchResponse> {
		let req = self.request(Method::POST, "/notes/search", None).json(body);

		self.send("search_notes", req).await.into()
	}

	pub async fn create_note(
		&self,
		body: &CreateNoteRequest,
		socket_id: Option<&str>,
	) -> ApiResult<NoteResponse> {
		let req = self.request(Method::POST, "/notes", socket_id).json(body);

		self.send("create_note", req).await.into()
	}

	pub async fn update_note(&self, id: Uuid, body: &UpdateNoteRequest) -> ApiResult<NoteResponse> {
		let req = self.request(Method::PUT, &format!("/notes/{id}"), None).json(body);

		self.send("update_note", req).await.into()
	}

	pub async fn delete_note(&self, id: Uuid) -> ApiResult<NoteResponse> {
		let req = self.request(Method::DELETE, &format!("/notes/{id}"), None);

		self.send("delete_note", req).await.into()
	}

	pub async fn archive_note(&self, id: Uuid, socket_id: &str) -> ApiResult<NoteResponse> {
		self.set_flags("archive_note", id, Some(socket_id), None, Some(true)).await
	}

	pub async fn move_note_to_trash(&self, id: Uuid, socket_id: &str) -> ApiResult<NoteResponse> {
		self.set_flags("move_note_to_trash", id, Some(socket_id), Some(true), None).await
	}

	pub async fn restore_from_trash(&self, id: Uuid, socket_id: &str) -> ApiResult<NoteResponse> {
		self.set_flags("restore_from_trash", id, Some(socket_id), Some(false), None).await
	}

	pub async fn restore_from_archive(&self, id: Uuid, socket_id: &str) -> ApiResult<NoteResponse> {
		self.set_flags("restore_from_archive", id, Some(socket_id), None, Some(false)).await
	}

	pub async fn list_users(&self) -> ApiResult<Vec<UserResponse>> {
		self.send("list_users", self.request(Method::GET, "/users", None)).await.into()
	}

	pub async fn get_user(&self, id: Uuid) -> ApiResult<UserResponse> {
		let req = self.request(Method::GET, &format!("/users/{id}"), None);

		self.send("get_user", req).await.into()
	}

	pub async fn create_user(&self, body: &UserRequest) -> ApiResult<UserResponse> {
		let req = self.request(Method::POST, "/users", None).json(body);

		self.send("create_user", req).await.into()
	}

	pub async fn update_user(&self, id: Uuid, body: &UserRequest) -> ApiResult<UserResponse> {
		let req = self.request(Method::PUT, &format!("/users/{id}"), None).json(body);

		self.send("update_user", req).await.into()
	}

	pub async fn delete_user(&self, id: Uuid) -> ApiResult<UserResponse> {
		let req = self.request(Method::DELETE, &format!("/users/{id}"), None);

		self.send("delete_user", req).await.into()
	}

	async fn set_flags(
		&self,
		operation: &'static str,
		id: Uuid,
		socket_id: Option<&str>,
		is_in_trash: Option<bool>,
		is_in_archive: Option<bool>,
	) -> ApiResult<NoteResponse> {
		let patch = NoteFlagsPatch { is_in_trash, is_in_archive };
		let req = self.request(Method::PUT, &format!("/notes/{id}/flags"), socket_id).json(&patch);

		self.send(operation, req).await.into()
	}

	fn request(&self, method: Method, path: &str, socket_id: Option<&str>) -> RequestBuilder {
		let mut req = self.http.request(method, format!("{}{path}", self.base_url));

		if let Some(user_id) = self.user_id.as_deref() {
			req = req.header(HEADER_USER_ID, user_id);
		}
		if let Some(socket_id) = socket_id {
			req = req.header(HEADER_SOCKET_ID, socket_id);
		}

		req
	}

	async fn send<T>(&self, operation: &'static str, req: RequestBuilder) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let result = match req.send().await {
			Ok(res) => decode(res).await,
			Err(err) => Err(Error::from(err)),
		};

		result.inspect_err(|err| tracing::warn!(operation, error = %err, "API call failed."))
	}
}

async fn decode<T>(res: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let status = res.status();
	let bytes = res.bytes().await?;

	if !status.is_success() {
		return Err(Error::Status { status: status.as_u16(), message: error_message(&bytes) });
	}

	serde_json::from_slice(&bytes).map_err(|err| Error::Decode { message: err.to_string() })
}

/// Prefers the `message` of a JSON error body and falls back to the raw text.
fn error_message(bytes: &[u8]) -> String {
	if let Ok(json) = serde_json::from_slice::<Value>(bytes)
		&& let Some(message) = json.get("message").and_then(Value::as_str)
	{
		return message.to_string();
	}

	let text = String::from_utf8_lossy(bytes).trim().to_string();

	if text.is_empty() { "Empty response body.".to_string() } else { text }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_message_prefers_json_message() {
		let body = br#"{"error_code":"NOT_FOUND","message":"Note with ID x not found."}"#;

		assert_eq!(error_message(body), "Note with ID x not found.");
		assert_eq!(error_message(b"  gateway timeout "), "gateway timeout");
		assert_eq!(error_message(b""), "Empty response body.");
	}

	#[test]
	fn base_url_trailing_slash_is_trimmed() {
		let client = NotelyClient::new("http://localhost:8080/");

		assert_eq!(client.base_url(), "http://localhost:8080");
	}

	#[test]
	fn api_result_from_error_keeps_message() {
		let result: ApiResult<u8> =
			Err(Error::Status { status: 404, message: "missing".to_string() }).into();

		assert!(!result.is_ok());
		assert_eq!(result.into_result(), Err("Request failed with status 404: missing".to_string()));
	}
}
