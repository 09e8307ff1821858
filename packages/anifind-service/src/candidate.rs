use serde::Serialize;
use serde_json::{Map, Value};

use anifind_index::IndexHit;

const NAME_KEY: &str = "name";
const GENRES_KEY: &str = "genres";

/// A retrieved item joined with its synopsis. Immutable once built for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
	pub id: String,
	pub score: f32,
	pub metadata: CandidateMetadata,
	pub synopsis: String,
}

/// Index metadata of one item. Serializes as the stored map, unchanged; `name` and `genres` are
/// parsed views of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateMetadata {
	#[serde(skip)]
	pub name: String,
	#[serde(skip)]
	pub genres: Vec<String>,
	#[serde(flatten)]
	pub stored: Map<String, Value>,
}
impl CandidateMetadata {
	/// Returns `None` when the stored metadata has no string `name`.
	pub fn from_map(map: Map<String, Value>) -> Option<Self> {
		let name = map.get(NAME_KEY)?.as_str()?.to_string();
		let genres = map.get(GENRES_KEY).map(parse_genres).unwrap_or_default();

		Some(Self { name, genres, stored: map })
	}
}

impl Candidate {
	pub fn from_hit(hit: IndexHit, synopsis: String) -> Option<Self> {
		let metadata = CandidateMetadata::from_map(hit.metadata)?;

		Some(Self { id: hit.id, score: hit.score, metadata, synopsis })
	}

	pub fn name(&self) -> &str {
		&self.metadata.name
	}
}

// Genres are stored either as a list or as one comma-separated string.
fn parse_genres(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) =>
			items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
		Value::String(joined) => joined
			.split(',')
			.map(str::trim)
			.filter(|genre| !genre.is_empty())
			.map(str::to_string)
			.collect(),
		_ => Vec::new(),
	}
}
