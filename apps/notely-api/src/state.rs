use std::sync::Arc;

use notely_service::NotelyService;
use notely_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NotelyService>,
}
impl AppState {
	/// Connects the pool and applies the schema before any route is served.
	pub async fn new(config: notely_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.vector_dim).await?;

		Ok(Self::from_service(NotelyService::new(config, db)))
	}

	pub fn from_service(service: NotelyService) -> Self {
		Self { service: Arc::new(service) }
	}
}
