use std::{collections::HashMap, io::Read};

use anifind_index::IndexHit;

use crate::{Candidate, Error, Result};

/// Substituted when the store has no usable synopsis for a retrieved name.
pub const MISSING_SYNOPSIS: &str = "Synopsis not available";

/// Read-only name → synopsis table, loaded once at startup.
#[derive(Debug, Default)]
pub struct SynopsisStore {
	by_name: HashMap<String, String>,
}
impl SynopsisStore {
	pub fn load(cfg: &anifind_config::Synopses) -> Result<Self> {
		let file = std::fs::File::open(&cfg.path).map_err(|err| Error::SideStore {
			message: format!("Failed to open {}: {err}", cfg.path.display()),
		})?;
		let store = Self::from_reader(file, &cfg.name_column, &cfg.synopsis_column)?;

		tracing::info!(path = %cfg.path.display(), entries = store.len(), "Synopsis store loaded.");

		Ok(store)
	}

	/// Parses CSV with a header row. When a name repeats, the first row wins.
	pub fn from_reader<R>(reader: R, name_column: &str, synopsis_column: &str) -> Result<Self>
	where
		R: Read,
	{
		let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
		let headers = csv.headers()?.clone();
		let column = |wanted: &str| {
			headers.iter().position(|header| header == wanted).ok_or_else(|| Error::SideStore {
				message: format!("Synopsis table has no {wanted:?} column."),
			})
		};
		let name_idx = column(name_column)?;
		let synopsis_idx = column(synopsis_column)?;
		let mut by_name = HashMap::new();

		for record in csv.records() {
			let record = record?;
			let Some(name) = record.get(name_idx) else {
				continue;
			};
			let synopsis = record.get(synopsis_idx).unwrap_or_default();

			by_name.entry(name.to_string()).or_insert_with(|| synopsis.to_string());
		}

		Ok(Self { by_name })
	}

	pub fn from_rows<I, K, V>(rows: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut by_name = HashMap::new();

		for (name, synopsis) in rows {
			by_name.entry(name.into()).or_insert_with(|| synopsis.into());
		}

		Self { by_name }
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}

	/// Exact, case-sensitive lookup. Blank synopses count as missing.
	pub fn synopsis_for(&self, name: &str) -> &str {
		self.by_name
			.get(name)
			.map(String::as_str)
			.filter(|synopsis| !synopsis.trim().is_empty())
			.unwrap_or(MISSING_SYNOPSIS)
	}

	/// Joins raw hits against the store, keeping retrieval order. Hits without a string
	/// `metadata.name` cannot be joined and are dropped.
	pub fn enrich(&self, hits: Vec<IndexHit>) -> Vec<Candidate> {
		let mut candidates = Vec::with_capacity(hits.len());

		for hit in hits {
			let id = hit.id.clone();
			let Some(mut candidate) = Candidate::from_hit(hit, String::new()) else {
				tracing::warn!(id, "Index hit has no metadata.name; skipping.");

				continue;
			};

			self.attach(&mut candidate);
			candidates.push(candidate);
		}

		candidates
	}

	pub fn attach(&self, candidate: &mut Candidate) {
		candidate.synopsis = self.synopsis_for(&candidate.metadata.name).to_string();
	}
}
