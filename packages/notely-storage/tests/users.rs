use uuid::Uuid;

use notely_config::Postgres;
use notely_storage::{Error, db::Db, models::NewUser, users};
use notely_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set NOTELY_PG_DSN to run."]
async fn users_crud_round_trip() {
	let Some(base_dsn) = notely_testkit::env_dsn() else {
		eprintln!("Skipping users_crud_round_trip; set NOTELY_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(2).await.expect("Failed to ensure schema.");

	let ada = NewUser { name: "Ada".to_string(), email: "ada@example.com".to_string() };
	let created = users::create_user(&db, &ada).await.expect("Failed to create user.");
	let err = users::create_user(
		&db,
		&NewUser { name: "Other".to_string(), email: "ADA@example.com".to_string() },
	)
	.await
	.expect_err("Expected duplicate email conflict.");

	assert!(matches!(err, Error::Conflict(_)), "Unexpected error: {err}");

	let renamed = NewUser { name: "Ada L.".to_string(), email: "ada@example.com".to_string() };
	let updated = users::update_user(&db, created.id, &renamed, time::OffsetDateTime::now_utc())
		.await
		.expect("Failed to update user.");

	assert_eq!(updated.name, "Ada L.");
	assert_eq!(users::list_users(&db).await.expect("Failed to list users.").len(), 1);

	let err = users::update_user(&db, Uuid::new_v4(), &renamed, time::OffsetDateTime::now_utc())
		.await
		.expect_err("Expected UpdateFailed for unknown user.");

	assert!(matches!(err, Error::UpdateFailed(_)), "Unexpected error: {err}");

	users::delete_user(&db, created.id).await.expect("Failed to delete user.");

	let err = users::get_user(&db, created.id).await.expect_err("Expected NotFound.");

	assert!(matches!(err, Error::NotFound(_)), "Unexpected error: {err}");

	let err = users::delete_user(&db, created.id).await.expect_err("Expected DeleteFailed.");

	assert!(matches!(err, Error::DeleteFailed(_)), "Unexpected error: {err}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
