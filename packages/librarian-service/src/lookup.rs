use std::sync::Arc;

use librarian_storage::corpus::CorpusStore;

/// Returned when the title is empty or whitespace.
pub const INVALID_TITLE: &str = "No valid title was provided.";
/// Returned when no detailed summary exists for the title.
pub const NOT_FOUND: &str = "No detailed summary was found for this title.";

/// Exact-title lookup of detailed summaries.
///
/// Never fails: its output is fed back to the model as data.
#[derive(Clone, Debug)]
pub struct LookupTool {
	corpus: Arc<CorpusStore>,
}
impl LookupTool {
	pub fn new(corpus: Arc<CorpusStore>) -> Self {
		Self { corpus }
	}

	pub fn lookup_detail(&self, title: &str) -> String {
		if title.trim().is_empty() {
			return INVALID_TITLE.to_string();
		}

		match self.corpus.get(title) {
			Some(entry) => entry.detail_summary.clone(),
			None => NOT_FOUND.to_string(),
		}
	}
}
