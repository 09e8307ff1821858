pub mod chat;
pub mod embedding;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub(crate) fn client(timeout_ms: u64) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(timeout_ms)).build()?)
}

/// Posts `body` and decodes the reply as JSON, keeping the raw text on any failure.
pub(crate) async fn post_json(
	client: &Client,
	url: &str,
	headers: HeaderMap,
	body: &Value,
) -> Result<Value> {
	let res = client.post(url).headers(headers).json(body).send().await?;
	let status = res.status();
	let text = res.text().await?;

	tracing::debug!(url, status = status.as_u16(), bytes = text.len(), "Provider responded.");

	if !status.is_success() {
		return Err(Error::Status { status: status.as_u16(), body: text });
	}

	serde_json::from_str(&text).map_err(|_| Error::InvalidResponse {
		message: "Provider response is not valid JSON.".to_string(),
		body: text,
	})
}
