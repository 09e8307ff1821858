use std::time::Duration;

use reqwest::{
	Client,
	header::{HeaderMap, HeaderValue},
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Error, IndexHit, IndexQueryResult, Result};

const API_VERSION: &str = "2024-07";

pub struct PineconeIndex {
	client: Client,
	host: String,
	namespace: Option<String>,
	headers: HeaderMap,
}
impl PineconeIndex {
	pub fn new(cfg: &anifind_config::Pinecone, timeout_ms: u64) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(timeout_ms)).build()?;
		let mut headers = HeaderMap::new();

		headers.insert("api-key", HeaderValue::from_str(&cfg.api_key)?);
		headers.insert("x-pinecone-api-version", HeaderValue::from_static(API_VERSION));

		Ok(Self { client, host: cfg.host.clone(), namespace: cfg.namespace.clone(), headers })
	}

	pub async fn query(&self, vector: &[f32], top_k: u32) -> Result<IndexQueryResult> {
		let url = format!("{}/query", self.host);
		let mut body = serde_json::json!({
			"vector": vector,
			"topK": top_k,
			"includeMetadata": true,
			"includeValues": false,
		});

		if let Some(namespace) = self.namespace.as_ref() {
			body["namespace"] = Value::String(namespace.clone());
		}

		let res = self.client.post(url).headers(self.headers.clone()).json(&body).send().await?;
		let status = res.status();
		let text = res.text().await?;

		if !status.is_success() {
			tracing::warn!(status = status.as_u16(), body = %text, "Pinecone query failed.");

			return Err(Error::Status { status: status.as_u16(), body: text });
		}

		parse_query_response(&text)
	}
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
	#[serde(default)]
	matches: Vec<QueryMatch>,
	namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
	id: String,
	score: f32,
	#[serde(default)]
	metadata: Option<Map<String, Value>>,
}

fn parse_query_response(text: &str) -> Result<IndexQueryResult> {
	let response: QueryResponse =
		serde_json::from_str(text).map_err(|err| Error::InvalidResponse {
			message: format!("Pinecone query response is malformed: {err}"),
			body: text.to_string(),
		})?;
	let hits = response
		.matches
		.into_iter()
		.map(|m| IndexHit { id: m.id, score: m.score, metadata: m.metadata.unwrap_or_default() })
		.collect();

	Ok(IndexQueryResult { hits, namespace: response.namespace })
}
