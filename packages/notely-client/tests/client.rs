use axum::{
	Json, Router,
	extract::Path,
	http::{HeaderMap, StatusCode},
	routing::{get, put},
};
use serde_json::Value;
use tokio::net::TcpListener;
use uuid::Uuid;

use notely_client::NotelyClient;
use notely_service::{CreateNoteRequest, NoteFilter, NoteMetadata};

fn note_json(id: &str, headers: &HeaderMap, metadata: Value) -> Value {
	serde_json::json!({
		"id": id,
		"title": "Groceries",
		"content": "Milk.",
		"metadata": metadata,
		"created_at": "2024-05-01T10:00:00Z",
		"updated_at": "2024-05-01T10:00:00Z",
		"created_by": headers.get("x-user-id").and_then(|v| v.to_str().ok()).unwrap_or("anonymous"),
		"updated_by": headers.get("x-socket-id").and_then(|v| v.to_str().ok()),
	})
}

async fn spawn_mock() -> String {
	let app = Router::new()
		.route(
			"/notes",
			get(|| async {
				Json(serde_json::json!([note_json(
					"00000000-0000-0000-0000-000000000001",
					&HeaderMap::new(),
					serde_json::json!({ "is_in_trash": false, "is_in_archive": false })
				)]))
			})
			.post(|headers: HeaderMap, Json(body): Json<Value>| async move {
				(
					StatusCode::CREATED,
					Json(note_json("00000000-0000-0000-0000-000000000002", &headers, body["metadata"].clone())),
				)
			}),
		)
		.route(
			"/notes/{id}",
			get(|Path(id): Path<String>| async move {
				(
					StatusCode::NOT_FOUND,
					Json(serde_json::json!({
						"error_code": "NOT_FOUND",
						"message": format!("Note with ID {id} not found.")
					})),
				)
			}),
		)
		.route(
			"/notes/{id}/flags",
			put(|Path(id): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
				let mut metadata = serde_json::json!({ "is_in_trash": false, "is_in_archive": false });

				if let (Some(target), Some(patch)) = (metadata.as_object_mut(), body.as_object()) {
					target.extend(patch.clone());
				}

				Json(note_json(&id, &headers, metadata))
			}),
		)
		.route("/users", get(|| async { "not json" }));
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind listener.");
	let addr = listener.local_addr().expect("Failed to read listener address.");

	tokio::spawn(async move {
		let _ = axum::serve(listener, app).await;
	});

	format!("http://{addr}")
}

#[tokio::test]
async fn list_and_create_decode_notes() {
	let client = NotelyClient::new(spawn_mock().await).with_user_id("u1");
	let listed = client.get_all_notes(Some(NoteFilter::Active)).await;

	assert!(listed.is_ok(), "{listed:?}");
	assert_eq!(listed.data.map(|notes| notes.len()), Some(1));

	let mut metadata = NoteMetadata::default();

	metadata.extra.insert("color".to_string(), serde_json::json!("green"));

	let req = CreateNoteRequest {
		title: "Groceries".to_string(),
		content: "Milk.".to_string(),
		metadata,
		embedding: None,
		chunks: None,
	};
	let created = client.create_note(&req, Some("sock-9")).await;
	let note = created.data.expect("Expected created note.");

	assert_eq!(note.created_by, "u1");
	assert_eq!(note.updated_by.as_deref(), Some("sock-9"));
	assert_eq!(note.metadata.extra.get("color"), Some(&serde_json::json!("green")));
}

#[tokio::test]
async fn flag_helpers_send_patch_and_socket_id() {
	let client = NotelyClient::new(spawn_mock().await).with_user_id("u1");
	let id = Uuid::new_v4();
	let archived = client.archive_note(id, "sock-1").await.data.expect("Expected note.");

	assert!(archived.metadata.is_in_archive);
	assert!(!archived.metadata.is_in_trash);
	assert_eq!(archived.updated_by.as_deref(), Some("sock-1"));

	let trashed = client.move_note_to_trash(id, "sock-1").await.data.expect("Expected note.");

	assert!(trashed.metadata.is_in_trash);

	let restored = client.restore_from_trash(id, "sock-1").await.data.expect("Expected note.");

	assert!(!restored.metadata.is_in_trash);

	let unarchived = client.restore_from_archive(id, "sock-1").await.data.expect("Expected note.");

	assert!(!unarchived.metadata.is_in_archive);
}

#[tokio::test]
async fn failures_become_error_messages() {
	let client = NotelyClient::new(spawn_mock().await).with_user_id("u1");
	let id = Uuid::new_v4();
	let missing = client.get_note_by_id(id).await;

	assert!(missing.data.is_none());
	assert!(
		missing.error.as_deref().is_some_and(|error| error.contains("404")
			&& error.contains(&format!("Note with ID {id} not found."))),
		"{missing:?}"
	);

	let undecodable = client.list_users().await;

	assert!(undecodable.data.is_none());
	assert!(
		undecodable.error.as_deref().is_some_and(|error| error.starts_with("Failed to decode")),
		"{undecodable:?}"
	);
}

#[tokio::test]
async fn unreachable_server_is_reported_not_raised() {
	let client = NotelyClient::new("http://127.0.0.1:1");
	let result = client.search_notes("milk").await;

	assert!(result.data.is_none());
	assert!(result.error.is_some());
}
