pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Request timed out: {message}")]
	Timeout { message: String },
	#[error("Transport failure: {message}")]
	Transport { message: String },
	#[error("Upstream returned HTTP {status}: {message}")]
	Status { status: u16, message: String },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}
impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			return Self::Timeout { message: err.to_string() };
		}
		if let Some(status) = err.status() {
			return Self::Status { status: status.as_u16(), message: err.to_string() };
		}

		Self::Transport { message: err.to_string() }
	}
}
