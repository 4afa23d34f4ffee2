use notely_config::Postgres;
use notely_storage::db::Db;
use notely_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set NOTELY_PG_DSN to run."]
async fn db_connects_and_bootstraps_idempotently() {
	let Some(base_dsn) = notely_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_idempotently; set NOTELY_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(4).await.expect("Failed to ensure schema.");
	db.ensure_schema(4).await.expect("Second schema bootstrap must be a no-op.");

	for table in ["users", "notes", "chunks"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Missing table {table}.");
	}

	let functions: i64 =
		sqlx::query_scalar("SELECT count(*) FROM pg_proc WHERE proname = 'match_chunks'")
			.fetch_one(&db.pool)
			.await
			.expect("Failed to query functions.");

	assert_eq!(functions, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
