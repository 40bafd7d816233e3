use std::sync::atomic::Ordering;

use deco_service::{ChatRequest, Error, ResetRequest};

use super::{EchoComposer, Script, ScriptedGenerator};

const ALL: &str = "SELECT * FROM furniture";

fn request(message: &str, session_id: &str) -> ChatRequest {
	ChatRequest { message: message.to_string(), session_id: Some(session_id.to_string()) }
}

#[tokio::test]
async fn enrichment_keeps_only_the_last_six_turns() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;

	for idx in 1..=7 {
		harness
			.service
			.chat_turn(request(&format!("new question {idx}"), "s1"))
			.await
			.expect("Chat turn failed.");
	}

	let turn = harness
		.service
		.chat_turn(request("what about cheaper ones", "s1"))
		.await
		.expect("Chat turn failed.");

	assert!(turn.is_follow_up);
	assert!(!turn.enriched_query.contains("question 1"));
	assert!(
		turn.enriched_query
			.starts_with("User: new question 2\nAssistant: reply to new question 2\n")
	);
	assert!(turn.enriched_query.ends_with("\nUser: what about cheaper ones"));
	assert_eq!(turn.enriched_query.matches("Assistant: ").count(), 6);
	assert_eq!(harness.service.history(Some("s1")).len(), 8);
}

#[tokio::test]
async fn reset_keyword_starts_a_fresh_search() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;

	for message in ["a sofa", "in grey", "under 1000"] {
		harness.service.chat_turn(request(message, "s1")).await.expect("Chat turn failed.");
	}

	let turn = harness
		.service
		.chat_turn(request("new search: a bed", "s1"))
		.await
		.expect("Chat turn failed.");

	assert!(!turn.is_follow_up);
	assert_eq!(turn.enriched_query, "new search: a bed");
	assert_eq!(harness.generator_prompts().last().map(String::as_str), Some("new search: a bed"));
}

#[tokio::test]
async fn follow_up_marker_without_history_is_still_a_follow_up() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let turn = harness
		.service
		.chat_turn(request("follow-up on tables", "fresh"))
		.await
		.expect("Chat turn failed.");

	assert!(turn.is_follow_up);
	assert_eq!(turn.enriched_query, "\nUser: follow-up on tables");
}

#[tokio::test]
async fn first_message_is_not_a_follow_up() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let turn =
		harness.service.chat_turn(request("a bookcase", "fresh")).await.expect("Chat turn failed.");

	assert!(!turn.is_follow_up);
	assert_eq!(turn.enriched_query, "a bookcase");
	assert_eq!(turn.response.response, "reply to a bookcase");
}

#[tokio::test]
async fn empty_message_is_rejected_before_any_provider_call() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let embedding_calls = harness.embedding_calls.load(Ordering::SeqCst);

	for message in ["", "   \n\t"] {
		let err = harness
			.service
			.chat(request(message, "s1"))
			.await
			.expect_err("Expected an empty message to be rejected.");

		assert!(matches!(err, Error::InvalidRequest { .. }));
	}

	assert!(harness.generator_prompts().is_empty());
	assert_eq!(harness.composer_calls.load(Ordering::SeqCst), 0);
	assert_eq!(harness.embedding_calls.load(Ordering::SeqCst), embedding_calls);
	assert!(harness.service.history(Some("s1")).is_empty());
}

#[tokio::test]
async fn oversized_message_is_rejected() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let message = "x".repeat(2_001);
	let err = harness
		.service
		.chat(request(&message, "s1"))
		.await
		.expect_err("Expected an oversized message to be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(harness.generator_prompts().is_empty());
}

#[tokio::test]
async fn composer_failure_leaves_history_untouched() {
	let harness = super::harness_with(
		super::test_config(),
		ScriptedGenerator::sql(ALL),
		EchoComposer::scripted(Script::Fail("composer offline".to_string())),
	)
	.await;
	let err = harness
		.service
		.chat(request("a sofa", "s1"))
		.await
		.expect_err("Expected the composer failure to surface.");

	assert!(matches!(err, Error::Provider { .. }));
	assert!(harness.service.history(Some("s1")).is_empty());
}

#[tokio::test]
async fn composer_timeout_is_a_provider_error() {
	let harness = super::harness_with(
		super::test_config(),
		ScriptedGenerator::sql(ALL),
		EchoComposer::scripted(Script::Hang),
	)
	.await;
	let err = harness
		.service
		.chat(request("a sofa", "s1"))
		.await
		.expect_err("Expected the composer timeout to surface.");

	assert!(matches!(err, Error::Provider { .. }));
	assert!(harness.service.history(Some("s1")).is_empty());
}

#[tokio::test]
async fn sessions_do_not_share_history() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;

	harness.service.chat(request("a sofa", "alice")).await.expect("Chat failed.");
	harness.service.chat(request("a bed", "bob")).await.expect("Chat failed.");

	let turn = harness
		.service
		.chat_turn(request("in white", "bob"))
		.await
		.expect("Chat turn failed.");

	assert!(turn.enriched_query.contains("User: a bed"));
	assert!(!turn.enriched_query.contains("a sofa"));
	assert_eq!(harness.service.history(Some("alice")).len(), 1);
	assert_eq!(harness.service.history(Some("bob")).len(), 2);
}

#[tokio::test]
async fn missing_session_id_uses_the_default_session() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;

	harness
		.service
		.chat(ChatRequest { message: "a lamp".to_string(), session_id: None })
		.await
		.expect("Chat failed.");
	harness
		.service
		.chat(ChatRequest { message: "a rug".to_string(), session_id: Some("  ".to_string()) })
		.await
		.expect("Chat failed.");

	let history = harness.service.history(Some("default"));

	assert_eq!(history.len(), 2);
	assert_eq!(history[0].query, "a lamp");
	assert_eq!(history[1].query, "a rug");
}

#[tokio::test]
async fn reset_is_idempotent_and_clears_history() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;

	harness.service.chat(request("a sofa", "s1")).await.expect("Chat failed.");

	for _ in 0..2 {
		let reset = harness.service.reset(ResetRequest { session_id: Some("s1".to_string()) });

		assert_eq!(reset.status, "success");
	}

	let unknown = harness.service.reset(ResetRequest { session_id: Some("never-seen".to_string()) });

	assert_eq!(unknown.status, "success");
	assert!(harness.service.history(Some("s1")).is_empty());

	let turn = harness
		.service
		.chat_turn(request("in grey", "s1"))
		.await
		.expect("Chat turn failed.");

	assert!(!turn.is_follow_up);
	assert_eq!(turn.enriched_query, "in grey");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_turns_on_one_session_keep_pairs_intact() {
	let harness = super::harness(ScriptedGenerator::sql(ALL)).await;
	let mut tasks = Vec::new();

	for idx in 0..8 {
		let service = harness.service.clone();

		tasks.push(tokio::spawn(async move {
			service.chat(request(&format!("new query {idx}"), "shared")).await
		}));
	}

	for task in tasks {
		task.await.expect("Chat task panicked.").expect("Chat failed.");
	}

	let history = harness.service.history(Some("shared"));

	assert_eq!(history.len(), 8);

	for turn in &history {
		assert_eq!(turn.response, format!("reply to {}", turn.query));
	}
}
