use std::{io::Write, sync::Arc, sync::atomic::Ordering};

use deco_service::{DecoService, Providers};
use deco_storage::queries;

use super::{EchoComposer, HashEmbedding, ScriptedGenerator};

const ALL: &str = "SELECT * FROM furniture";

#[tokio::test]
async fn first_load_embeds_in_batches() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let index = harness.service.catalog_index();

	assert_eq!(index.len(), 10);
	assert_eq!(index.dimensions(), deco_testkit::TEST_DIMENSIONS as usize);
	assert_eq!(index.item_ids(), (101..=110).collect::<Vec<i64>>());
	assert_eq!(harness.embedded_texts.load(Ordering::SeqCst), 10);
	assert_eq!(harness.embedding_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn reload_reuses_cached_vectors() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let report = harness.service.load_catalog().await.expect("Reload failed.");

	assert_eq!(report.items, 10);
	assert_eq!(report.reused, 10);
	assert_eq!(report.embedded, 0);
	assert_eq!(harness.embedded_texts.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn changed_description_is_embedded_again() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let mut items = deco_testkit::fixture_items();

	items[0].description = format!("{} Now with washable covers.", items[0].description);

	queries::replace_catalog(&harness.service.db, &items).await.expect("Failed to update catalog.");

	let report = harness.service.load_catalog().await.expect("Reload failed.");

	assert_eq!(report.embedded, 1);
	assert_eq!(report.reused, 9);
	assert_eq!(harness.embedded_texts.load(Ordering::SeqCst), 11);
}

#[tokio::test]
async fn new_embedding_model_does_not_reuse_old_vectors() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let mut cfg = super::test_config();

	cfg.providers.embedding.model = "hash-embed-v2".to_string();

	let providers = Providers::new(
		Arc::new(HashEmbedding::new()),
		Arc::new(ScriptedGenerator::sql(ALL)),
		Arc::new(EchoComposer::new()),
	);
	let service = DecoService::with_providers(cfg, harness.service.db.clone(), providers);
	let report = service.load_catalog().await.expect("Load failed.");

	assert_eq!(report.embedded, 10);
	assert_eq!(report.reused, 0);
}

#[tokio::test]
async fn csv_import_replaces_the_catalog() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file.");

	file.write_all(deco_testkit::FIXTURE_CSV.as_bytes()).expect("Failed to write CSV.");

	let imported = harness.service.import_catalog_csv(file.path()).await.expect("Import failed.");

	assert_eq!(imported.imported, 3);
	assert_eq!(imported.skipped, 2);

	let report = harness.service.load_catalog().await.expect("Reload failed.");

	assert_eq!(report.items, 3);
	assert_eq!(report.embedded, 3);
	assert_eq!(harness.service.catalog_index().item_ids(), vec![60155602, 80395704, 90420332]);

	let outcome = harness.service.retrieve("a bar table", 5).await.expect("Retrieval failed.");

	assert_eq!(outcome.candidates.len(), 3);
}

#[tokio::test]
async fn retrieval_before_load_returns_nothing() {
	let providers = Providers::new(
		Arc::new(HashEmbedding::new()),
		Arc::new(ScriptedGenerator::sql(ALL)),
		Arc::new(EchoComposer::new()),
	);
	let service = DecoService::with_providers(super::test_config(), super::seeded_db().await, providers);
	let outcome = service.retrieve("a sofa", 5).await.expect("Retrieval failed.");

	assert!(outcome.candidates.is_empty());
	assert_eq!(outcome.pool_size, 0);
}
