use std::{
	sync::{Arc, atomic::AtomicUsize},
	time::Duration,
};

use librarian_providers::chat::ChatCompletion;
use librarian_service::{AskRequest, Capability, Error, Providers};

use super::{
	FailingEmbedding, ScriptedChat, SlowChat, SpyEmbedding, StubIndex, build_service, hit,
	test_config,
};

fn ask(question: &str) -> AskRequest {
	AskRequest { question: question.to_string() }
}

#[tokio::test]
async fn reasoning_timeout_surfaces_as_timeout() {
	let mut cfg = test_config(3, "books".to_string());

	cfg.providers.llm.timeout_ms = 20;

	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(SlowChat { delay: Duration::from_secs(5) }),
	);
	let service = build_service(cfg, Arc::new(StubIndex::with_hits(vec![hit("Dune", 0.2)])), providers)
		.expect("Failed to build service.");
	let err = service.ask(ask("a desert epic")).await.expect_err("Slow model must time out.");

	assert!(matches!(err, Error::Timeout { capability: Capability::Reasoning, .. }), "{err:?}");
	assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_embedding_fails_the_request() {
	let providers =
		Providers::new(Arc::new(FailingEmbedding), Arc::new(ScriptedChat::new(Vec::new())));
	let service =
		build_service(test_config(3, "books".to_string()), Arc::new(StubIndex::default()), providers)
			.expect("Failed to build service.");
	let err = service.ask(ask("anything")).await.expect_err("Embedding failure must surface.");

	assert!(
		matches!(err, Error::UpstreamUnavailable { capability: Capability::Embedding, .. }),
		"{err:?}"
	);
}

#[tokio::test]
async fn wrong_embedding_dimension_is_rejected() {
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 4, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);
	let service =
		build_service(test_config(3, "books".to_string()), Arc::new(StubIndex::default()), providers)
			.expect("Failed to build service.");
	let err = service.retrieve("anything", 3).await.expect_err("Dimension mismatch must surface.");

	assert!(matches!(err, Error::UpstreamUnavailable { capability: Capability::Embedding, .. }));
}

#[tokio::test]
async fn unreachable_index_is_not_an_empty_result() {
	let index = StubIndex { unreachable: true, ..Default::default() };
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);
	let service = build_service(test_config(3, "books".to_string()), Arc::new(index), providers)
		.expect("Failed to build service.");
	let err = service.ask(ask("anything")).await.expect_err("Index failure must surface.");

	assert!(matches!(err, Error::Index { .. }), "{err:?}");
}

#[tokio::test]
async fn empty_model_output_is_not_replaced_by_a_default_answer() {
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(vec![ChatCompletion::default()])),
	);
	let service = build_service(
		test_config(3, "books".to_string()),
		Arc::new(StubIndex::with_hits(vec![hit("Emma", 0.3)])),
		providers,
	)
	.expect("Failed to build service.");
	let err = service.ask(ask("a comedy")).await.expect_err("Empty output must fail.");

	assert!(
		matches!(err, Error::UpstreamUnavailable { capability: Capability::Reasoning, .. }),
		"{err:?}"
	);
}

#[tokio::test]
async fn second_round_failure_discards_the_partial_conversation() {
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(vec![ChatCompletion {
			text: None,
			tool_calls: vec![super::tool_call(
				"call_1",
				librarian_service::tools::LOOKUP_DETAIL,
				r#"{"title":"Emma"}"#,
			)],
		}])),
	);
	let service = build_service(
		test_config(3, "books".to_string()),
		Arc::new(StubIndex::with_hits(vec![hit("Emma", 0.3)])),
		providers,
	)
	.expect("Failed to build service.");
	let err = service.ask(ask("a comedy")).await.expect_err("Missing second round must fail.");

	assert!(matches!(err, Error::UpstreamUnavailable { capability: Capability::Reasoning, .. }));
}

#[test]
fn invalid_guard_pattern_is_a_config_error() {
	let mut cfg = test_config(3, "books".to_string());

	cfg.guard.patterns = vec!["(unclosed".to_string()];

	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);
	let err = librarian_service::LibrarianService::with_providers(
		cfg,
		super::test_corpus(),
		Arc::new(StubIndex::default()),
		providers,
	)
	.err()
	.expect("Invalid pattern must fail.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn unvalidated_config_is_rejected_at_construction() {
	let mut cfg = test_config(3, "books".to_string());

	cfg.ingest.batch_size = 0;

	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);
	let err = librarian_service::LibrarianService::with_providers(
		cfg,
		super::test_corpus(),
		Arc::new(StubIndex::default()),
		providers,
	)
	.err()
	.expect("Zero batch size must fail.");

	assert!(matches!(err, Error::InvalidConfig { .. }), "{err:?}");
}
