use std::cmp::Ordering;

use librarian_storage::qdrant::IndexHit;

use crate::{Capability, Error, LibrarianService, Result};

/// A ranked retrieval hit for one query. Lower distance is more similar.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
	pub id: String,
	pub title: String,
	pub summary: String,
	pub distance: f32,
}

impl LibrarianService {
	/// Embeds `query` and returns at most `k` candidates, closest first.
	///
	/// An empty index yields an empty list. Embedding and index failures are errors.
	pub async fn retrieve(&self, query: &str, k: u32) -> Result<Vec<Candidate>> {
		if k == 0 {
			return Ok(Vec::new());
		}

		let query_vec = self.embed_query(query).await?;
		let hits = self.index.nearest(query_vec, u64::from(k)).await.map_err(Error::from_index)?;
		let candidates = rank_candidates(hits, k as usize);

		tracing::debug!(k, candidates = candidates.len(), "Retrieved candidates.");

		Ok(candidates)
	}

	async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let embeddings = self.embed_texts(std::slice::from_ref(&query.to_string())).await?;

		embeddings.into_iter().next().ok_or_else(|| {
			Error::malformed(Capability::Embedding, "Embedding provider returned no vectors.")
		})
	}
}

/// Keeps the index's order among equal distances and never returns more than `k`.
pub(crate) fn rank_candidates(hits: Vec<IndexHit>, k: usize) -> Vec<Candidate> {
	let mut candidates = hits
		.into_iter()
		.map(|hit| Candidate {
			id: hit.id,
			title: hit.title,
			summary: hit.summary,
			distance: sanitize_distance(hit.distance),
		})
		.collect::<Vec<_>>();

	candidates.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
	candidates.truncate(k);

	candidates
}

fn sanitize_distance(distance: f32) -> f32 {
	if distance.is_nan() {
		return f32::MAX;
	}

	distance.max(0.0)
}
