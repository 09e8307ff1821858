use serde::{Serialize, Serializer};

use crate::{Candidate, Selection};

/// One `[name, [synopsis, score, genres]]` pair of the response.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
	pub name: String,
	pub synopsis: String,
	pub score: f32,
	pub genres: Vec<String>,
}
impl RankedEntry {
	fn from_candidate(candidate: &Candidate) -> Self {
		Self {
			name: candidate.metadata.name.clone(),
			synopsis: candidate.synopsis.clone(),
			score: candidate.score,
			genres: candidate.metadata.genres.clone(),
		}
	}
}

impl Serialize for RankedEntry {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		(&self.name, (&self.synopsis, self.score, &self.genres)).serialize(serializer)
	}
}

/// Candidates with the selected one first. Serializes as a JSON array of pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedResponse {
	pub entries: Vec<RankedEntry>,
}
impl RankedResponse {
	pub fn names(&self) -> Vec<&str> {
		self.entries.iter().map(|entry| entry.name.as_str()).collect()
	}
}

/// Moves the chosen candidate to the front; everything else keeps retrieval order. The output is
/// always a permutation of `candidates`.
pub fn assemble(candidates: &[Candidate], selection: &Selection) -> RankedResponse {
	let promoted = selection
		.chosen()
		.and_then(|name| candidates.iter().position(|candidate| candidate.name() == name));
	let mut entries = Vec::with_capacity(candidates.len());

	if let Some(index) = promoted {
		entries.push(RankedEntry::from_candidate(&candidates[index]));
	}

	entries.extend(
		candidates
			.iter()
			.enumerate()
			.filter(|(i, _)| Some(*i) != promoted)
			.map(|(_, candidate)| RankedEntry::from_candidate(candidate)),
	);

	RankedResponse { entries }
}
