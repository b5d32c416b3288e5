use std::{collections::HashMap, fs, path::Path};

use serde_json::{Map, Value};

use crate::{Error, Result};

/// A (title, detailed summary) record used for exact-title lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailEntry {
	pub title: String,
	pub detail_summary: String,
}

/// Read-only map of detailed summaries keyed by normalized title.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it while serving.
#[derive(Debug, Default)]
pub struct CorpusStore {
	entries: HashMap<String, DetailEntry>,
}
impl CorpusStore {
	/// Loads a JSON object of `"<title>": "<detailed summary>"` pairs.
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadCorpus { path: path.to_path_buf(), source: err })?;
		let object: Map<String, Value> = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseCorpus { path: path.to_path_buf(), source: err })?;
		let mut pairs = Vec::with_capacity(object.len());

		for (title, value) in object {
			let Value::String(detail_summary) = value else {
				return Err(Error::InvalidArgument(format!(
					"Corpus entry {title:?} in {} must be a string.",
					path.display()
				)));
			};

			pairs.push((title, detail_summary));
		}

		let store = Self::from_entries(pairs);

		tracing::debug!(path = %path.display(), entries = store.len(), "Corpus loaded.");

		Ok(store)
	}

	/// Titles that normalize to the same key keep the last summary.
	pub fn from_entries<I, T, S>(entries: I) -> Self
	where
		I: IntoIterator<Item = (T, S)>,
		T: Into<String>,
		S: Into<String>,
	{
		let mut map = HashMap::new();

		for (title, detail_summary) in entries {
			let title = title.into().trim().to_string();
			let key = librarian_domain::normalize_title(&title);

			if key.is_empty() {
				continue;
			}

			map.insert(key, DetailEntry { title, detail_summary: detail_summary.into() });
		}

		Self { entries: map }
	}

	/// Case-insensitive exact match after trimming.
	pub fn get(&self, title: &str) -> Option<&DetailEntry> {
		self.entries.get(&librarian_domain::normalize_title(title))
	}

	pub fn contains(&self, title: &str) -> bool {
		self.get(title).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
