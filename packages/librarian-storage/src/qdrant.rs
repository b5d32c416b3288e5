pub const DENSE_VECTOR_NAME: &str = "dense";
pub const SLUG_KEY: &str = "slug";
pub const TITLE_KEY: &str = "title";
pub const SUMMARY_KEY: &str = "summary";

use std::collections::HashMap;

use qdrant_client::{
	Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder, ScoredPoint,
		UpsertPointsBuilder, Value, Vector, VectorParamsBuilder, VectorsConfigBuilder, value::Kind,
	},
};
use uuid::Uuid;

use librarian_domain::catalog::CatalogEntry;

use crate::{Error, Result};

/// One nearest-neighbor hit. `distance` is cosine distance, lower is closer.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexHit {
	pub id: String,
	pub title: String,
	pub summary: String,
	pub distance: f32,
}

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &librarian_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub async fn collection_exists(&self) -> Result<bool> {
		let response = self.client.list_collections().await?;

		Ok(response.collections.iter().any(|collection| collection.name == self.collection))
	}

	pub async fn ensure_collection(&self) -> Result<()> {
		if self.collection_exists().await? {
			return Ok(());
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone()).vectors_config(vectors_config),
			)
			.await?;

		tracing::info!(collection = %self.collection, "Qdrant collection created.");

		Ok(())
	}

	/// Drops the collection if present and creates an empty one.
	pub async fn recreate_collection(&self) -> Result<()> {
		if self.collection_exists().await? {
			self.client.delete_collection(self.collection.clone()).await?;

			tracing::info!(collection = %self.collection, "Qdrant collection dropped.");
		}

		self.ensure_collection().await
	}

	/// Upserts catalog entries with their summary embeddings, positionally aligned.
	pub async fn upsert_entries(
		&self,
		entries: &[CatalogEntry],
		vectors: Vec<Vec<f32>>,
	) -> Result<()> {
		if entries.len() != vectors.len() {
			return Err(Error::InvalidArgument(format!(
				"Expected {} vectors, got {}.",
				entries.len(),
				vectors.len()
			)));
		}
		if entries.is_empty() {
			return Ok(());
		}

		let mut points = Vec::with_capacity(entries.len());

		for (entry, vec) in entries.iter().zip(vectors) {
			if vec.len() != self.vector_dim as usize {
				return Err(Error::InvalidArgument(format!(
					"Vector for {:?} has dimension {}, expected {}.",
					entry.title,
					vec.len(),
					self.vector_dim
				)));
			}

			let slug = entry.slug();
			let mut payload = Payload::new();

			payload.insert(SLUG_KEY, slug.clone());
			payload.insert(TITLE_KEY, entry.title.clone());
			payload.insert(SUMMARY_KEY, entry.short_summary.clone());

			let mut vectors = HashMap::new();

			vectors.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(vec));

			points.push(PointStruct::new(point_id(&entry.key()).to_string(), vectors, payload));
		}

		self.client
			.upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
			.await?;

		Ok(())
	}

	/// Nearest neighbors under cosine distance, closest first.
	///
	/// A missing collection means nothing has been indexed yet and yields no hits.
	pub async fn nearest(&self, vector: Vec<f32>, k: u64) -> Result<Vec<IndexHit>> {
		if k == 0 {
			return Ok(Vec::new());
		}
		if !self.collection_exists().await? {
			tracing::warn!(collection = %self.collection, "Qdrant collection is missing.");

			return Ok(Vec::new());
		}

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.using(DENSE_VECTOR_NAME)
			.with_payload(true)
			.limit(k);
		let response = self.client.query(search).await?;

		Ok(response.result.into_iter().map(scored_point_to_hit).collect())
	}
}

/// Stable point id for a normalized catalog title.
pub fn point_id(key: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

fn scored_point_to_hit(point: ScoredPoint) -> IndexHit {
	let title = payload_string(&point.payload, TITLE_KEY).unwrap_or_else(|| "unknown".to_string());
	let id = payload_string(&point.payload, SLUG_KEY)
		.unwrap_or_else(|| librarian_domain::slugify(&title));
	let summary = payload_string(&point.payload, SUMMARY_KEY).unwrap_or_default();

	IndexHit { id, title, summary, distance: cosine_distance(point.score) }
}

/// Qdrant reports cosine similarity for cosine collections.
fn cosine_distance(score: f32) -> f32 {
	if !score.is_finite() {
		return f32::MAX;
	}

	(1.0 - score).max(0.0)
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}
