use deco_service::{ChatRequest, FallbackReason, PoolKind};

use super::{EchoComposer, Script, ScriptedGenerator};

const SOFA_FILTER: &str = "SELECT * FROM furniture WHERE category LIKE '%Sofa%'";

fn request(message: &str, session_id: &str) -> ChatRequest {
	ChatRequest { message: message.to_string(), session_id: Some(session_id.to_string()) }
}

#[tokio::test]
async fn sofa_query_searches_only_sofa_rows() {
	let harness = super::harness(ScriptedGenerator::sql(SOFA_FILTER)).await;
	let turn = harness
		.service
		.chat_turn(request("I need a comfortable sofa for my living room", "s1"))
		.await
		.expect("Chat turn failed.");
	let mut ids = super::candidate_ids(&turn.retrieval);

	assert_eq!(turn.retrieval.pool, PoolKind::Filtered);
	assert_eq!(turn.retrieval.pool_size, 3);
	assert_eq!(turn.retrieval.fallback, None);
	assert_eq!(turn.retrieval.filter_sql.as_deref(), Some(SOFA_FILTER));
	assert!(
		turn.retrieval
			.candidates
			.iter()
			.all(|candidate| candidate.attributes.category == "Sofas & armchairs")
	);

	ids.sort_unstable();

	assert_eq!(ids, vec![101, 102, 103]);
	assert_eq!(turn.response.metadata.len(), 3);
	assert_eq!(
		harness.generator_prompts(),
		vec!["I need a comfortable sofa for my living room".to_string()]
	);
}

#[tokio::test]
async fn candidates_are_ordered_by_similarity() {
	let harness = super::harness(ScriptedGenerator::sql("SELECT * FROM furniture")).await;
	let outcome = harness.service.retrieve("shelving unit for storage", 5).await.expect("Retrieval failed.");

	assert_eq!(outcome.candidates.len(), 5);
	assert!(outcome.candidates.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[tokio::test]
async fn candidates_never_exceed_top_k() {
	let harness = super::harness(ScriptedGenerator::sql("SELECT * FROM furniture")).await;
	let turn = harness
		.service
		.chat_turn(request("Show me everything you have", "s1"))
		.await
		.expect("Chat turn failed.");

	assert_eq!(turn.retrieval.pool, PoolKind::Filtered);
	assert_eq!(turn.retrieval.pool_size, 10);
	assert_eq!(turn.retrieval.candidates.len(), 5);
}

#[tokio::test]
async fn small_pool_returns_fewer_candidates() {
	let harness =
		super::harness(ScriptedGenerator::sql("SELECT item_id FROM furniture WHERE category = 'Chairs'"))
			.await;
	let turn = harness.service.chat_turn(request("A chair please", "s1")).await.expect("Chat turn failed.");
	let mut ids = super::candidate_ids(&turn.retrieval);

	ids.sort_unstable();

	assert_eq!(turn.retrieval.pool, PoolKind::Filtered);
	assert_eq!(ids, vec![104, 105]);
}

#[tokio::test]
async fn fenced_filter_is_normalized_before_execution() {
	let harness = super::harness(ScriptedGenerator::sql(
		"Here you go:\n```sql\nSELECT * FROM furniture WHERE category = 'Beds';\n```",
	))
	.await;
	let outcome = harness.service.retrieve("a bed with storage", 5).await.expect("Retrieval failed.");

	assert_eq!(outcome.pool, PoolKind::Filtered);
	assert_eq!(super::candidate_ids(&outcome), vec![108]);
}

#[tokio::test]
async fn malformed_filter_falls_back_to_full_catalog() {
	let harness = super::harness(ScriptedGenerator::sql("SELEC * FRM furniture WHERE")).await;
	let turn = harness
		.service
		.chat_turn(request("I need a comfortable sofa for my living room", "s1"))
		.await
		.expect("A malformed filter must not fail the turn.");

	assert_eq!(turn.retrieval.pool, PoolKind::FullCatalog);
	assert_eq!(turn.retrieval.pool_size, 10);
	assert_eq!(turn.retrieval.fallback, Some(FallbackReason::FilterFailed));
	assert_eq!(turn.retrieval.candidates.len(), 5);
	assert!(!turn.response.response.is_empty());
}

#[tokio::test]
async fn write_statements_are_refused_and_fall_back() {
	let harness = super::harness(ScriptedGenerator::sql("DELETE FROM furniture")).await;
	let outcome = harness.service.retrieve("anything", 5).await.expect("Retrieval failed.");

	assert_eq!(outcome.pool, PoolKind::FullCatalog);
	assert_eq!(outcome.fallback, Some(FallbackReason::FilterFailed));

	let reloaded = harness.service.load_catalog().await.expect("Reload failed.");

	assert_eq!(reloaded.items, 10);
}

#[tokio::test]
async fn failed_filter_matches_empty_filter_and_full_catalog() {
	let query = "Something comfortable to sit on in the living room";
	let failing = super::harness(ScriptedGenerator::sql("SELECT * FROM nowhere")).await;
	let empty =
		super::harness(ScriptedGenerator::sql("SELECT * FROM furniture WHERE price < 0")).await;
	let unavailable =
		super::harness(ScriptedGenerator::new(Script::Fail("generator offline".to_string()))).await;
	let full = super::harness(ScriptedGenerator::sql("SELECT * FROM furniture")).await;
	let failing = failing.service.retrieve(query, 5).await.expect("Retrieval failed.");
	let empty = empty.service.retrieve(query, 5).await.expect("Retrieval failed.");
	let unavailable = unavailable.service.retrieve(query, 5).await.expect("Retrieval failed.");
	let full = full.service.retrieve(query, 5).await.expect("Retrieval failed.");

	assert_eq!(failing.fallback, Some(FallbackReason::FilterFailed));
	assert_eq!(empty.fallback, Some(FallbackReason::EmptyResult));
	assert_eq!(unavailable.fallback, Some(FallbackReason::GeneratorFailed));
	assert_eq!(full.fallback, None);
	assert_eq!(super::candidate_ids(&failing), super::candidate_ids(&full));
	assert_eq!(super::candidate_ids(&empty), super::candidate_ids(&full));
	assert_eq!(super::candidate_ids(&unavailable), super::candidate_ids(&full));
}

#[tokio::test]
async fn generator_timeout_falls_back() {
	let harness = super::harness(ScriptedGenerator::new(Script::Hang)).await;
	let turn = harness
		.service
		.chat_turn(request("A desk for the home office", "s1"))
		.await
		.expect("A slow generator must not fail the turn.");

	assert_eq!(turn.retrieval.pool, PoolKind::FullCatalog);
	assert_eq!(turn.retrieval.fallback, Some(FallbackReason::GeneratorTimeout));
	assert_eq!(turn.retrieval.filter_sql, None);
	assert_eq!(turn.retrieval.candidates.len(), 5);
}

#[tokio::test]
async fn empty_filter_without_fallback_yields_no_candidates() {
	let mut cfg = super::test_config();

	cfg.retrieval.fallback_on_empty = false;

	let harness = super::harness_with(
		cfg,
		ScriptedGenerator::sql("SELECT * FROM furniture WHERE price > 1000000"),
		EchoComposer::new(),
	)
	.await;
	let turn = harness
		.service
		.chat_turn(request("A golden throne", "s1"))
		.await
		.expect("Chat turn failed.");

	assert_eq!(turn.retrieval.pool, PoolKind::Filtered);
	assert_eq!(turn.retrieval.pool_size, 0);
	assert!(turn.retrieval.candidates.is_empty());
	assert!(turn.response.metadata.is_empty());
	assert_eq!(harness.composer_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_finite_numbers_are_null_in_metadata() {
	let harness =
		super::harness(ScriptedGenerator::sql("SELECT * FROM furniture WHERE name = 'POÄNG'")).await;
	let response = harness
		.service
		.chat(request("An armchair to read in", "s1"))
		.await
		.expect("Chat failed.");

	assert_eq!(response.metadata.len(), 1);
	assert_eq!(response.metadata[0].item_id, 104);
	assert_eq!(response.metadata[0].price, None);

	let json = serde_json::to_value(&response).expect("Response must serialize.");
	let attributes = json["metadata"][0].as_object().expect("Metadata entries are objects.");

	assert!(attributes.contains_key("price"));
	assert!(attributes["price"].is_null());
	assert_eq!(attributes["depth"], 82.0);
}
