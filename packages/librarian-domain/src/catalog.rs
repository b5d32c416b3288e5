use std::sync::LazyLock;

use regex::Regex;

static TITLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)^##\s*title:\s*(.+)$").expect("Title marker pattern must compile.")
});

/// A (title, short summary) record indexed for semantic search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
	pub title: String,
	pub short_summary: String,
}
impl CatalogEntry {
	/// Identity of the entry: the case-insensitive title.
	pub fn key(&self) -> String {
		crate::normalize_title(&self.title)
	}

	/// Display id. Not unique: distinct titles may share a slug.
	pub fn slug(&self) -> String {
		crate::slugify(&self.title)
	}
}

/// Parses the catalog markdown.
///
/// Each `## title: <Title>` line opens a section; the non-blank lines that follow are
/// trimmed and joined with single spaces. Text before the first marker is ignored and
/// sections with an empty title or summary are dropped.
pub fn parse_catalog(markdown: &str) -> Vec<CatalogEntry> {
	let mut entries = Vec::new();
	let mut current: Option<String> = None;
	let mut buffer: Vec<&str> = Vec::new();

	for line in markdown.lines() {
		let line = line.trim();

		if let Some(captures) = TITLE_MARKER.captures(line) {
			flush(&mut entries, current.take(), &mut buffer);

			current = captures.get(1).map(|title| title.as_str().trim().to_string());

			continue;
		}
		if current.is_some() && !line.is_empty() {
			buffer.push(line);
		}
	}

	flush(&mut entries, current, &mut buffer);

	entries
}

fn flush(entries: &mut Vec<CatalogEntry>, title: Option<String>, buffer: &mut Vec<&str>) {
	let short_summary = buffer.join(" ");

	buffer.clear();

	let Some(title) = title else {
		return;
	};

	if title.is_empty() || short_summary.is_empty() {
		return;
	}

	entries.push(CatalogEntry { title, short_summary });
}
