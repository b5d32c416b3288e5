use std::collections::HashMap;

use librarian_domain::catalog::CatalogEntry;

use crate::{Error, LibrarianService, Result};

#[derive(Clone, Debug)]
pub struct ReindexRequest {
	pub entries: Vec<CatalogEntry>,
	/// Drop the existing index before writing.
	pub recreate: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReindexReport {
	pub indexed: u64,
	pub batches: u64,
	/// Catalog titles with no detailed summary in the corpus.
	pub missing_details: Vec<String>,
}

impl LibrarianService {
	pub async fn reindex(&self, req: ReindexRequest) -> Result<ReindexReport> {
		let entries = dedupe_by_title(req.entries);
		let missing_details = entries
			.iter()
			.filter(|entry| !self.corpus.contains(&entry.title))
			.map(|entry| entry.title.clone())
			.collect::<Vec<_>>();

		if !missing_details.is_empty() {
			tracing::warn!(
				missing = missing_details.len(),
				titles = ?missing_details,
				"Catalog titles have no detailed summary."
			);

			if self.cfg.ingest.require_detail_coverage {
				return Err(Error::InvalidRequest {
					message: format!(
						"{} catalog titles have no detailed summary: {}.",
						missing_details.len(),
						missing_details.join(", ")
					),
				});
			}
		}

		self.index.prepare(req.recreate).await.map_err(Error::from_index)?;

		let mut report = ReindexReport { missing_details, ..Default::default() };

		for batch in entries.chunks(self.cfg.ingest.batch_size as usize) {
			let texts = batch.iter().map(|entry| entry.short_summary.clone()).collect::<Vec<_>>();
			let vectors = self.embed_texts(&texts).await?;

			self.index.upsert(batch, vectors).await.map_err(Error::from_index)?;

			report.indexed += batch.len() as u64;
			report.batches += 1;
		}

		tracing::info!(
			indexed = report.indexed,
			batches = report.batches,
			recreate = req.recreate,
			"Catalog reindexed."
		);

		Ok(report)
	}
}

/// Keeps the last entry for each case-insensitive title, in first-seen order.
fn dedupe_by_title(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
	let mut positions: HashMap<String, usize> = HashMap::new();
	let mut out: Vec<CatalogEntry> = Vec::with_capacity(entries.len());

	for entry in entries {
		let key = entry.key();

		match positions.get(&key) {
			Some(&position) => out[position] = entry,
			None => {
				positions.insert(key, out.len());
				out.push(entry);
			},
		}
	}

	out
}
