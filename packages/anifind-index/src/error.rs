#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Index returned HTTP {status}: {body}")]
	Status { status: u16, body: String },
	#[error("{message}")]
	InvalidResponse { message: String, body: String },
}
impl Error {
	pub fn raw_payload(&self) -> Option<&str> {
		match self {
			Self::Status { body, .. } | Self::InvalidResponse { body, .. } => Some(body),
			_ => None,
		}
	}
}

impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
