pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("Provider returned HTTP {status}: {body}")]
	Status { status: u16, body: String },
	#[error("{message}")]
	InvalidResponse { message: String, body: String },
}
impl Error {
	/// Raw provider payload attached to the failure, when the provider sent one.
	pub fn raw_payload(&self) -> Option<&str> {
		match self {
			Self::Status { body, .. } | Self::InvalidResponse { body, .. } => Some(body),
			_ => None,
		}
	}
}
