use std::sync::{Arc, atomic::AtomicUsize};

use librarian_service::Providers;

use super::{ScriptedChat, SpyEmbedding, StubIndex, build_service, hit, test_config};

fn service_with(hits: Vec<librarian_storage::qdrant::IndexHit>) -> librarian_service::LibrarianService {
	let providers = Providers::new(
		Arc::new(SpyEmbedding { vector_dim: 3, calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(ScriptedChat::new(Vec::new())),
	);

	build_service(test_config(3, "books".to_string()), Arc::new(StubIndex::with_hits(hits)), providers)
		.expect("Failed to build service.")
}

#[tokio::test]
async fn results_never_exceed_k_and_are_sorted() {
	let service = service_with(vec![
		hit("Emma", 0.7),
		hit("1984", 0.12),
		hit("Dune", 0.3),
		hit("Ubik", 0.5),
	]);

	for k in 0..6 {
		let candidates = service.retrieve("any query", k).await.expect("Retrieve failed.");

		assert!(candidates.len() <= k as usize, "k={k}");
		assert!(
			candidates.windows(2).all(|pair| pair[0].distance <= pair[1].distance),
			"k={k}: {candidates:?}"
		);
	}
}

#[tokio::test]
async fn empty_index_is_an_empty_list() {
	let candidates =
		service_with(Vec::new()).retrieve("anything", 3).await.expect("Retrieve failed.");

	assert!(candidates.is_empty());
}
