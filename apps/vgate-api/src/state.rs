use std::sync::Arc;

use vgate_service::GateService;
use vgate_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<GateService>,
}
impl AppState {
	pub async fn new(config: vgate_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		Ok(Self::from_service(GateService::new(config, db, qdrant)))
	}

	pub fn from_service(service: GateService) -> Self {
		Self { service: Arc::new(service) }
	}
}
