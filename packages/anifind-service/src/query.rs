use serde::{Deserialize, Serialize};

use anifind_index::IndexQueryResult;

use crate::{
	AnifindService, Candidate, Error, RankedResponse, Result, Selection, assemble, retry,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
	#[serde(default)]
	pub text: Option<String>,
}

/// Enriched candidates in retrieval order, without ranking.
#[derive(Debug, Clone, Serialize)]
pub struct MatchesResponse {
	pub matches: Vec<Candidate>,
	pub namespace: Option<String>,
}

impl AnifindService {
	/// Embed → retrieve → enrich → select → assemble.
	pub async fn query(&self, req: QueryRequest) -> Result<RankedResponse> {
		let text = validate_query(req.text.as_deref())?;
		let (candidates, _) = self.candidates(text).await?;
		let selection = self.select(text, &candidates).await?;
		let response = assemble(&candidates, &selection);

		tracing::info!(
			candidates = candidates.len(),
			selection = selection.label(),
			top = response.entries.first().map(|entry| entry.name.as_str()).unwrap_or_default(),
			"Query answered."
		);

		Ok(response)
	}

	/// Embed → retrieve → enrich, returned as-is.
	pub async fn matches(&self, req: QueryRequest) -> Result<MatchesResponse> {
		let text = validate_query(req.text.as_deref())?;
		let (matches, namespace) = self.candidates(text).await?;

		tracing::info!(candidates = matches.len(), "Matches answered.");

		Ok(MatchesResponse { matches, namespace })
	}

	/// Returns exactly one vector for `text`, of `providers.embedding.dimensions` length.
	pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let input = [text.to_string()];
		let mut embeddings = retry::with_retries("embedding", cfg.max_retries, || {
			self.providers.embedding.embed(cfg, &input)
		})
		.await
		.map_err(|err| {
			let raw = err.raw_payload().map(str::to_string);

			tracing::warn!(
				provider = %cfg.provider_id,
				error = %err,
				raw = raw.as_deref().unwrap_or_default(),
				"Embedding provider call failed."
			);

			Error::Embedding { message: err.to_string(), raw }
		})?;

		if embeddings.len() != 1 {
			return Err(Error::Embedding {
				message: format!(
					"Embedding provider returned {} vectors for one input.",
					embeddings.len()
				),
				raw: None,
			});
		}

		let vector = embeddings.remove(0);
		let expected = cfg.dimensions as usize;

		if vector.len() != expected {
			tracing::warn!(
				provider = %cfg.provider_id,
				got = vector.len(),
				expected,
				"Embedding has the wrong dimensionality."
			);

			return Err(Error::Embedding {
				message: format!(
					"Embedding provider returned {} dimensions; expected {expected}.",
					vector.len()
				),
				raw: None,
			});
		}

		Ok(vector)
	}

	/// Nearest neighbours of `vector`, at most `index.top_k`, in the index's own order.
	pub async fn retrieve(&self, vector: &[f32]) -> Result<IndexQueryResult> {
		let top_k = self.cfg.index.top_k;
		let mut result = retry::with_retries("index", self.cfg.index.max_retries, || {
			self.providers.index.search(vector, top_k)
		})
		.await
		.map_err(|err| {
			tracing::warn!(
				backend = %self.cfg.index.backend,
				error = %err,
				raw = err.raw_payload().unwrap_or_default(),
				"Index query failed."
			);

			Error::from(err)
		})?;

		result.hits.truncate(top_k as usize);

		Ok(result)
	}

	/// Runs the ranking stage when configured. A provider failure degrades to
	/// [`Selection::Skipped`] unless `ranking.fallback_on_error` is off.
	pub async fn select(&self, query: &str, candidates: &[Candidate]) -> Result<Selection> {
		let Some(selector) = self.selector.as_ref() else {
			return Ok(Selection::Skipped);
		};

		match selector.select(query, candidates).await {
			Ok(selection) => Ok(selection),
			Err(err) if self.cfg.ranking.fallback_on_error => {
				tracing::warn!(error = %err, "Ranking degraded to retrieval order.");

				Ok(Selection::Skipped)
			},
			Err(err) => Err(err),
		}
	}

	async fn candidates(&self, text: &str) -> Result<(Vec<Candidate>, Option<String>)> {
		let vector = self.embed(text).await?;
		let result = self.retrieve(&vector).await?;
		let candidates = self.synopses.enrich(result.hits);

		tracing::debug!(candidates = candidates.len(), "Candidates enriched.");

		Ok((candidates, result.namespace))
	}
}

fn validate_query(text: Option<&str>) -> Result<&str> {
	let text = text.map(str::trim).unwrap_or_default();

	if text.is_empty() {
		return Err(Error::InvalidRequest { message: "Text input is required.".to_string() });
	}

	Ok(text)
}
