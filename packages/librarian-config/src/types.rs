use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub guard: Guard,
	#[serde(default)]
	pub ingest: Ingest,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
	pub corpus: Corpus,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Corpus {
	/// JSON object mapping each title to its detailed summary.
	pub details_path: PathBuf,
	/// Markdown catalog read by the ingester. Sections start with `## title: <Title>`.
	pub catalog_path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Either the key itself or `env:NAME`.
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Either the key itself or `env:NAME`.
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { top_k: 3 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Guard {
	/// Case-insensitive regular expressions. Any match rejects the input.
	pub patterns: Vec<String>,
	pub refusal_message: String,
}
impl Default for Guard {
	fn default() -> Self {
		Self {
			patterns: default_guard_patterns(),
			refusal_message: default_refusal_message(),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ingest {
	pub batch_size: u32,
	/// Fail the reindex when a catalog title has no detailed summary.
	pub require_detail_coverage: bool,
}
impl Default for Ingest {
	fn default() -> Self {
		Self { batch_size: 64, require_detail_coverage: false }
	}
}

pub fn default_guard_patterns() -> Vec<String> {
	[r"\bidiot\b", r"\bprost\b", r"\bnaiba\b", r"\bdracu\b"]
		.into_iter()
		.map(ToString::to_string)
		.collect()
}

pub fn default_refusal_message() -> String {
	"I understand the frustration, but let's keep the language respectful. How can I help you find a book?"
		.to_string()
}
