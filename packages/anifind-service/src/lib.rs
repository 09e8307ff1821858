pub mod assemble;
pub mod candidate;
pub mod query;
pub mod selection;
pub mod synopsis;

mod error;
mod retry;

pub use assemble::{RankedEntry, RankedResponse, assemble};
pub use candidate::{Candidate, CandidateMetadata};
pub use error::{Error, Result};
pub use query::{MatchesResponse, QueryRequest};
pub use selection::{Selection, Selector, build_prompt, parse_reply};
pub use synopsis::{MISSING_SYNOPSIS, SynopsisStore};

use std::{future::Future, pin::Pin, sync::Arc};

use anifind_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use anifind_index::{IndexClient, IndexQueryResult};
use anifind_providers::{chat, embedding};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, anifind_providers::Result<Vec<Vec<f32>>>>;
}

pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, anifind_index::Result<IndexQueryResult>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, anifind_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub index: Arc<dyn VectorIndex>,
	pub chat: Arc<dyn ChatProvider>,
}

/// The query pipeline. Everything it holds is read-only after construction and shared by
/// concurrent requests.
pub struct AnifindService {
	pub cfg: Config,
	pub providers: Providers,
	pub synopses: Arc<SynopsisStore>,
	selector: Option<Selector>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, anifind_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, anifind_providers::Result<String>> {
		Box::pin(chat::complete(cfg, prompt))
	}
}

impl VectorIndex for IndexClient {
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, anifind_index::Result<IndexQueryResult>> {
		Box::pin(self.query(vector, top_k))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		index: Arc<dyn VectorIndex>,
		chat: Arc<dyn ChatProvider>,
	) -> Self {
		Self { embedding, index, chat }
	}

	/// HTTP-backed providers plus the index client selected by `index.backend`.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let index = IndexClient::from_config(&cfg.index)?;
		let provider = Arc::new(DefaultProviders);

		Ok(Self { embedding: provider.clone(), index: Arc::new(index), chat: provider })
	}
}

impl AnifindService {
	pub fn new(cfg: Config) -> Result<Self> {
		let synopses = SynopsisStore::load(&cfg.synopses)?;
		let providers = Providers::from_config(&cfg)?;

		Ok(Self::with_providers(cfg, providers, synopses))
	}

	pub fn with_providers(cfg: Config, providers: Providers, synopses: SynopsisStore) -> Self {
		let selector = cfg
			.ranking
			.enabled
			.then(|| Selector::new(cfg.providers.llm.clone(), providers.chat.clone()));

		Self { cfg, providers, synopses: Arc::new(synopses), selector }
	}

	pub fn ranking_enabled(&self) -> bool {
		self.selector.is_some()
	}
}
