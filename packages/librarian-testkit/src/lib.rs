mod error;

pub use error::{Error, Result};

use std::{env, future::Future, thread, time::Duration};

use qdrant_client::Qdrant;
use tokio::{runtime::Builder, time};
use uuid::Uuid;

pub const QDRANT_URL_ENV: &str = "LIBRARIAN_QDRANT_URL";

/// A uniquely named Qdrant collection that is deleted when the test finishes.
pub struct TestCollection {
	url: String,
	name: String,
	cleaned: bool,
}
impl TestCollection {
	pub fn new(url: &str, prefix: &str) -> Self {
		let name = format!("{prefix}_{}", Uuid::new_v4().simple());

		Self { url: url.to_string(), name, cleaned: false }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn qdrant_config(&self, vector_dim: u32) -> librarian_config::Qdrant {
		librarian_config::Qdrant {
			url: self.url.clone(),
			collection: self.name.clone(),
			vector_dim,
		}
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner().await
	}

	async fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		delete_collection(&self.url, &self.name).await?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestCollection {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let url = self.url.clone();
		let name = self.name.clone();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test collection cleanup failed: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(delete_collection(&url, &name)) {
				eprintln!("Test Qdrant cleanup failed: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}

pub fn env_qdrant_url() -> Option<String> {
	env::var(QDRANT_URL_ENV).ok()
}

pub async fn with_test_collection<F, Fut, T>(url: &str, prefix: &str, f: F) -> Result<T>
where
	F: FnOnce(&TestCollection) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let collection = TestCollection::new(url, prefix);
	let result = f(&collection).await;
	let mut collection = collection;

	if let Err(err) = collection.cleanup_inner().await {
		eprintln!("Test collection cleanup warning: {err}.");

		if result.is_ok() {
			return Err(err);
		}
	}

	result
}

async fn delete_collection(url: &str, name: &str) -> Result<()> {
	let client = Qdrant::from_url(url)
		.build()
		.map_err(|err| Error::Message(format!("Failed to build Qdrant client: {err}.")))?;
	let existing = time::timeout(Duration::from_secs(10), client.list_collections())
		.await
		.map_err(|_| Error::Message("Qdrant list_collections timed out.".to_string()))??;

	if !existing.collections.iter().any(|collection| collection.name == name) {
		return Ok(());
	}

	time::timeout(Duration::from_secs(10), client.delete_collection(name.to_string()))
		.await
		.map_err(|_| {
			Error::Message(format!("Timed out deleting Qdrant collection {name:?}."))
		})??;

	Ok(())
}
