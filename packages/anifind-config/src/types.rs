use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub index: Index,
	pub synopses: Synopses,
	#[serde(default)]
	pub ranking: Ranking,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Browser frontends are served from a different origin than the API.
	#[serde(default = "default_true")]
	pub cors_allow_any_origin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub api_key_env: Option<String>,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	#[serde(default = "default_true")]
	pub normalized: bool,
	#[serde(default = "default_embedding_type")]
	pub embedding_type: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub max_retries: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub api_key_env: Option<String>,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Index {
	/// One of `qdrant` or `pinecone`; the matching sub-table must be present.
	pub backend: String,
	#[serde(default = "default_top_k")]
	pub top_k: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub max_retries: u32,
	pub qdrant: Option<Qdrant>,
	pub pinecone: Option<Pinecone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	/// Named dense vector to search. Unnamed collections leave this empty.
	pub vector_name: Option<String>,
	pub api_key: Option<String>,
	pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pinecone {
	/// Data-plane host of the index, e.g. `https://testmal-abc123.svc.pinecone.io`.
	pub host: String,
	pub namespace: Option<String>,
	#[serde(default)]
	pub api_key: String,
	pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Synopses {
	pub path: std::path::PathBuf,
	#[serde(default = "default_name_column")]
	pub name_column: String,
	/// The upstream dataset spells this column `Sypnopsis`.
	#[serde(default = "default_synopsis_column")]
	pub synopsis_column: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub enabled: bool,
	pub fallback_on_error: bool,
}
impl Default for Ranking {
	fn default() -> Self {
		Self { enabled: true, fallback_on_error: true }
	}
}

fn default_true() -> bool {
	true
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_embedding_type() -> String {
	"float".to_string()
}

fn default_top_k() -> u32 {
	5
}

fn default_name_column() -> String {
	"Name".to_string()
}

fn default_synopsis_column() -> String {
	"Sypnopsis".to_string()
}
