use std::fmt::{Display, Formatter, Result as FmtResult};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// External model capability a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
	Embedding,
	Reasoning,
}
impl Display for Capability {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::Embedding => f.write_str("embedding"),
			Self::Reasoning => f.write_str("reasoning"),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("The {capability} capability is unavailable: {message}")]
	UpstreamUnavailable { capability: Capability, message: String },
	#[error("The {capability} capability timed out: {message}")]
	Timeout { capability: Capability, message: String },
	#[error("Semantic index error: {message}")]
	Index { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid configuration: {message}")]
	InvalidConfig { message: String },
}
impl Error {
	/// Failures worth retrying later from the caller's side.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::UpstreamUnavailable { .. } | Self::Timeout { .. } | Self::Index { .. })
	}

	pub(crate) fn malformed(capability: Capability, message: impl Into<String>) -> Self {
		Self::UpstreamUnavailable { capability, message: message.into() }
	}

	pub(crate) fn from_provider(capability: Capability, err: librarian_providers::Error) -> Self {
		if err.is_timeout() {
			return Self::Timeout { capability, message: err.to_string() };
		}

		Self::UpstreamUnavailable { capability, message: err.to_string() }
	}

	pub(crate) fn from_index(err: librarian_storage::Error) -> Self {
		Self::Index { message: err.to_string() }
	}
}
