pub mod pinecone;
pub mod qdrant;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

use serde_json::{Map, Value};

use crate::{pinecone::PineconeIndex, qdrant::QdrantIndex};

/// One nearest-neighbour hit with the metadata stored alongside its vector.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
	pub id: String,
	pub score: f32,
	pub metadata: Map<String, Value>,
}

/// Hits in the order the index returned them (descending similarity).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexQueryResult {
	pub hits: Vec<IndexHit>,
	pub namespace: Option<String>,
}

pub enum IndexClient {
	Qdrant(QdrantIndex),
	Pinecone(PineconeIndex),
}
impl IndexClient {
	pub fn from_config(cfg: &anifind_config::Index) -> Result<Self> {
		match cfg.backend.as_str() {
			anifind_config::BACKEND_QDRANT => {
				let qdrant = cfg.qdrant.as_ref().ok_or_else(|| {
					Error::InvalidArgument("index.qdrant is not configured.".to_string())
				})?;

				Ok(Self::Qdrant(QdrantIndex::new(qdrant, cfg.timeout_ms)?))
			},
			anifind_config::BACKEND_PINECONE => {
				let pinecone = cfg.pinecone.as_ref().ok_or_else(|| {
					Error::InvalidArgument("index.pinecone is not configured.".to_string())
				})?;

				Ok(Self::Pinecone(PineconeIndex::new(pinecone, cfg.timeout_ms)?))
			},
			other => Err(Error::InvalidArgument(format!("Unknown index backend {other}."))),
		}
	}

	pub async fn query(&self, vector: &[f32], top_k: u32) -> Result<IndexQueryResult> {
		match self {
			Self::Qdrant(index) => index.query(vector, top_k).await,
			Self::Pinecone(index) => index.query(vector, top_k).await,
		}
	}
}
