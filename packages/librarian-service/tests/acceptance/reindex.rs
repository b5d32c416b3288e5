use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use librarian_service::{Error, Providers, ReindexRequest};

use super::{ScriptedChat, SpyEmbedding, StubIndex, build_service, entry, test_config};

#[tokio::test]
async fn reindex_embeds_in_batches_and_dedupes_titles() {
	let embed_calls = Arc::new(AtomicUsize::new(0));
	let index = Arc::new(StubIndex::default());
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: embed_calls.clone() }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);
	let service = build_service(test_config(3, "books".to_string()), index.clone(), providers)
		.expect("Failed to build service.");
	let report = service
		.reindex(ReindexRequest {
			entries: vec![
				entry("1984", "Surveillance."),
				entry("Dune", "Spice."),
				entry("Emma", "Matchmaking."),
				entry("dune", "Desert politics."),
				entry("Ubik", "Time slips."),
			],
			recreate: true,
		})
		.await
		.expect("Reindex failed.");

	assert_eq!(report.indexed, 4);
	assert_eq!(report.batches, 2);
	assert_eq!(report.missing_details, vec!["Ubik".to_string()]);
	assert_eq!(embed_calls.load(Ordering::SeqCst), 2);
	assert_eq!(*index.prepared.lock().expect("Prepare log poisoned."), vec![true]);
	assert_eq!(
		*index.upserted.lock().expect("Upsert log poisoned."),
		vec![
			vec!["1984".to_string(), "dune".to_string()],
			vec!["Emma".to_string(), "Ubik".to_string()],
		]
	);
}

#[tokio::test]
async fn strict_coverage_rejects_before_touching_the_index() {
	let mut cfg = test_config(3, "books".to_string());

	cfg.ingest.require_detail_coverage = true;

	let index = Arc::new(StubIndex::default());
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);
	let service = build_service(cfg, index.clone(), providers).expect("Failed to build service.");
	let err = service
		.reindex(ReindexRequest { entries: vec![entry("Ubik", "Time slips.")], recreate: false })
		.await
		.expect_err("Missing detail must fail under strict coverage.");

	assert!(matches!(err, Error::InvalidRequest { .. }), "{err:?}");
	assert!(index.prepared.lock().expect("Prepare log poisoned.").is_empty());
}

#[tokio::test]
async fn empty_catalog_prepares_but_writes_nothing() {
	let index = Arc::new(StubIndex::default());
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);
	let service = build_service(test_config(3, "books".to_string()), index.clone(), providers)
		.expect("Failed to build service.");
	let report = service
		.reindex(ReindexRequest { entries: Vec::new(), recreate: false })
		.await
		.expect("Reindex failed.");

	assert_eq!(report.indexed, 0);
	assert_eq!(report.batches, 0);
	assert_eq!(*index.prepared.lock().expect("Prepare log poisoned."), vec![false]);
	assert!(index.upserted.lock().expect("Upsert log poisoned.").is_empty());
}

#[tokio::test]
async fn distinct_titles_with_the_same_slug_are_all_indexed() {
	let index = Arc::new(StubIndex::default());
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);
	let mut cfg = test_config(3, "books".to_string());

	cfg.ingest.batch_size = 8;

	let service = build_service(cfg, index.clone(), providers).expect("Failed to build service.");
	let report = service
		.reindex(ReindexRequest {
			entries: vec![
				entry("Война и мир", "War and peace."),
				entry("Мастер и Маргарита", "The devil visits Moscow."),
				entry("C++ Primer", "Templates."),
				entry("C Primer", "Pointers."),
			],
			recreate: false,
		})
		.await
		.expect("Reindex failed.");

	assert_eq!(report.indexed, 4);
	assert_eq!(
		*index.upserted.lock().expect("Upsert log poisoned."),
		vec![vec![
			"Война и мир".to_string(),
			"Мастер и Маргарита".to_string(),
			"C++ Primer".to_string(),
			"C Primer".to_string(),
		]]
	);
}
