pub mod ask;
pub mod conversation;
pub mod ingest;
pub mod lookup;
pub mod retrieve;
pub mod tools;

mod error;

pub use ask::{AskOutcome, AskRequest, AskResponse};
pub use conversation::{Conversation, ToolInvocation};
pub use error::{Capability, Error, Result};
pub use ingest::{ReindexReport, ReindexRequest};
pub use lookup::LookupTool;
pub use retrieve::Candidate;
pub use tools::LibraryTool;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use librarian_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use librarian_domain::{catalog::CatalogEntry, guard::InputGuard};
use librarian_providers::{
	chat::{self, ChatCompletion, ChatRequest},
	embedding,
};
use librarian_storage::{
	corpus::CorpusStore,
	qdrant::{IndexHit, QdrantStore},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, librarian_providers::Result<Vec<Vec<f32>>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a ChatRequest,
	) -> BoxFuture<'a, librarian_providers::Result<ChatCompletion>>;
}

/// Nearest-neighbor index over catalog entries.
pub trait CatalogIndex
where
	Self: Send + Sync,
{
	fn nearest<'a>(
		&'a self,
		vector: Vec<f32>,
		k: u64,
	) -> BoxFuture<'a, librarian_storage::Result<Vec<IndexHit>>>;

	/// Creates the index if missing; with `recreate`, drops existing contents first.
	fn prepare<'a>(&'a self, recreate: bool) -> BoxFuture<'a, librarian_storage::Result<()>>;

	fn upsert<'a>(
		&'a self,
		entries: &'a [CatalogEntry],
		vectors: Vec<Vec<f32>>,
	) -> BoxFuture<'a, librarian_storage::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn ChatProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, chat: Arc<dyn ChatProvider>) -> Self {
		Self { embedding, chat }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), chat: provider }
	}
}

pub struct LibrarianService {
	pub cfg: Config,
	pub corpus: Arc<CorpusStore>,
	pub index: Arc<dyn CatalogIndex>,
	pub providers: Providers,
	guard: InputGuard,
	lookup: LookupTool,
}
impl LibrarianService {
	pub fn new(cfg: Config, corpus: Arc<CorpusStore>, index: Arc<dyn CatalogIndex>) -> Result<Self> {
		Self::with_providers(cfg, corpus, index, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		corpus: Arc<CorpusStore>,
		index: Arc<dyn CatalogIndex>,
		providers: Providers,
	) -> Result<Self> {
		librarian_config::validate(&cfg)
			.map_err(|err| Error::InvalidConfig { message: err.to_string() })?;

		let guard = InputGuard::from_config(&cfg.guard).map_err(|err| Error::InvalidConfig {
			message: format!("guard.patterns contains an invalid pattern: {err}"),
		})?;
		let lookup = LookupTool::new(corpus.clone());

		Ok(Self { cfg, corpus, index, providers, guard, lookup })
	}

	pub fn guard(&self) -> &InputGuard {
		&self.guard
	}

	pub fn lookup(&self) -> &LookupTool {
		&self.lookup
	}

	pub(crate) async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let cfg = &self.cfg.providers.embedding;
		let vectors = bounded(
			Capability::Embedding,
			cfg.timeout_ms,
			self.providers.embedding.embed(cfg, texts),
		)
		.await?;

		if vectors.len() != texts.len() {
			return Err(Error::malformed(
				Capability::Embedding,
				format!("Expected {} vectors, got {}.", texts.len(), vectors.len()),
			));
		}
		if vectors.iter().any(|vec| vec.len() != self.cfg.storage.qdrant.vector_dim as usize) {
			return Err(Error::malformed(
				Capability::Embedding,
				"Embedding vector dimension mismatch.",
			));
		}

		Ok(vectors)
	}

	pub(crate) async fn reason(&self, request: &ChatRequest) -> Result<ChatCompletion> {
		let cfg = &self.cfg.providers.llm;

		bounded(Capability::Reasoning, cfg.timeout_ms, self.providers.chat.complete(cfg, request))
			.await
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, librarian_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}
impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a ChatRequest,
	) -> BoxFuture<'a, librarian_providers::Result<ChatCompletion>> {
		Box::pin(chat::complete(cfg, request))
	}
}

impl CatalogIndex for QdrantStore {
	fn nearest<'a>(
		&'a self,
		vector: Vec<f32>,
		k: u64,
	) -> BoxFuture<'a, librarian_storage::Result<Vec<IndexHit>>> {
		Box::pin(QdrantStore::nearest(self, vector, k))
	}

	fn prepare<'a>(&'a self, recreate: bool) -> BoxFuture<'a, librarian_storage::Result<()>> {
		Box::pin(async move {
			if recreate { self.recreate_collection().await } else { self.ensure_collection().await }
		})
	}

	fn upsert<'a>(
		&'a self,
		entries: &'a [CatalogEntry],
		vectors: Vec<Vec<f32>>,
	) -> BoxFuture<'a, librarian_storage::Result<()>> {
		Box::pin(self.upsert_entries(entries, vectors))
	}
}

/// Bounds a provider call by `timeout_ms` and maps its failure to a service error.
async fn bounded<T, F>(capability: Capability, timeout_ms: u64, call: F) -> Result<T>
where
	F: Future<Output = librarian_providers::Result<T>>,
{
	match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
		Ok(Ok(value)) => Ok(value),
		Ok(Err(err)) => Err(Error::from_provider(capability, err)),
		Err(_) => Err(Error::Timeout {
			capability,
			message: format!("No response within {timeout_ms} ms."),
		}),
	}
}
