pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Embedding failed: {message}")]
	Embedding { message: String, raw: Option<String> },
	#[error("Index query failed: {message}")]
	Index { message: String, raw: Option<String> },
	#[error("Selection failed: {message}")]
	Selection { message: String, raw: Option<String> },
	#[error("Synopsis store error: {message}")]
	SideStore { message: String },
}
impl From<anifind_index::Error> for Error {
	fn from(err: anifind_index::Error) -> Self {
		Self::Index { raw: err.raw_payload().map(str::to_string), message: err.to_string() }
	}
}

impl From<csv::Error> for Error {
	fn from(err: csv::Error) -> Self {
		Self::SideStore { message: err.to_string() }
	}
}
