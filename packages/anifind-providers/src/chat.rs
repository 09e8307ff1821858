use serde_json::Value;

use crate::{Error, Result};

/// Sends one single-turn chat request and returns the reply text. Never retried: each call is
/// billed by the provider.
pub async fn complete(cfg: &anifind_config::LlmProviderConfig, prompt: &str) -> Result<String> {
	let client = crate::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	let json = crate::post_json(&client, &url, headers, &body).await?;

	parse_chat_response(json)
}

fn parse_chat_response(json: Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing choices[0].message.content.".to_string(),
			body: json.to_string(),
		})
}
