use std::sync::Arc;

use deco_service::DecoService;
use deco_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DecoService>,
}
impl AppState {
	/// Connects storage, optionally re-imports the catalog CSV and builds the search index.
	pub async fn new(config: deco_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.sqlite).await?;

		db.ensure_schema().await?;

		let csv_path = config.catalog.csv_path.clone();
		let service = DecoService::new(config, db);

		if let Some(path) = csv_path {
			service.import_catalog_csv(&path).await?;
		}

		service.load_catalog().await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: DecoService) -> Self {
		Self { service: Arc::new(service) }
	}
}
