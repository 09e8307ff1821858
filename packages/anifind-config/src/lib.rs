mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Index, LlmProviderConfig, Pinecone, Providers, Qdrant,
	Ranking, Service, Synopses,
};

use std::{env, fs, path::Path};

pub const BACKEND_QDRANT: &str = "qdrant";
pub const BACKEND_PINECONE: &str = "pinecone";
pub const MAX_TOP_K: u32 = 100;

pub fn load(path: &Path) -> Result<Config> {
	load_with_env(path, |var| env::var(var).ok())
}

/// Same as [`load`], with credential lookups routed through `lookup` instead of the process
/// environment.
pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	resolve_credentials(&mut cfg, lookup)?;
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

/// Fills every `api_key` that names an `api_key_env` variable. Inline keys take precedence.
pub fn resolve_credentials<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	let resolve = |field: &str, inline: &str, var: Option<&String>| -> Result<Option<String>> {
		if !inline.trim().is_empty() {
			return Ok(None);
		}

		let Some(var) = var.filter(|var| !var.trim().is_empty()) else {
			return Ok(None);
		};

		lookup(var)
			.map(Some)
			.ok_or_else(|| Error::MissingEnv { field: field.to_string(), var: var.clone() })
	};

	let embedding = &mut cfg.providers.embedding;

	if let Some(key) = resolve(
		"providers.embedding.api_key_env",
		&embedding.api_key,
		embedding.api_key_env.as_ref(),
	)? {
		embedding.api_key = key;
	}

	let llm = &mut cfg.providers.llm;

	if let Some(key) = resolve("providers.llm.api_key_env", &llm.api_key, llm.api_key_env.as_ref())? {
		llm.api_key = key;
	}
	if let Some(pinecone) = cfg.index.pinecone.as_mut()
		&& let Some(key) = resolve(
			"index.pinecone.api_key_env",
			&pinecone.api_key,
			pinecone.api_key_env.as_ref(),
		)? {
		pinecone.api_key = key;
	}
	if let Some(qdrant) = cfg.index.qdrant.as_mut()
		&& let Some(key) = resolve(
			"index.qdrant.api_key_env",
			qdrant.api_key.as_deref().unwrap_or_default(),
			qdrant.api_key_env.as_ref(),
		)? {
		qdrant.api_key = Some(key);
	}

	Ok(())
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.model must be non-empty.".to_string(),
		});
	}
	if cfg.providers.llm.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.llm.model must be non-empty.".to_string(),
		});
	}
	if !cfg.providers.llm.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.providers.llm.temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("providers.embedding.timeout_ms", cfg.providers.embedding.timeout_ms),
		("providers.llm.timeout_ms", cfg.providers.llm.timeout_ms),
		("index.timeout_ms", cfg.index.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.index.top_k == 0 || cfg.index.top_k > MAX_TOP_K {
		return Err(Error::Validation {
			message: format!("index.top_k must be in the range 1-{MAX_TOP_K}."),
		});
	}

	match cfg.index.backend.as_str() {
		BACKEND_QDRANT => {
			let Some(qdrant) = cfg.index.qdrant.as_ref() else {
				return Err(Error::Validation {
					message: "index.qdrant must be set when index.backend is qdrant.".to_string(),
				});
			};

			if qdrant.url.trim().is_empty() || qdrant.collection.trim().is_empty() {
				return Err(Error::Validation {
					message: "index.qdrant.url and index.qdrant.collection must be non-empty."
						.to_string(),
				});
			}
		},
		BACKEND_PINECONE => {
			let Some(pinecone) = cfg.index.pinecone.as_ref() else {
				return Err(Error::Validation {
					message: "index.pinecone must be set when index.backend is pinecone."
						.to_string(),
				});
			};

			if pinecone.host.trim().is_empty() {
				return Err(Error::Validation {
					message: "index.pinecone.host must be non-empty.".to_string(),
				});
			}
			if pinecone.api_key.trim().is_empty() {
				return Err(Error::Validation {
					message: "Index pinecone api_key must be non-empty.".to_string(),
				});
			}
		},
		_ => {
			return Err(Error::Validation {
				message: "index.backend must be one of qdrant or pinecone.".to_string(),
			});
		},
	}

	for (label, key) in
		[("embedding", &cfg.providers.embedding.api_key), ("llm", &cfg.providers.llm.api_key)]
	{
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.synopses.path.as_os_str().is_empty() {
		return Err(Error::Validation { message: "synopses.path must be non-empty.".to_string() });
	}
	if cfg.synopses.name_column.trim().is_empty() || cfg.synopses.synopsis_column.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "synopses.name_column and synopses.synopsis_column must be non-empty."
				.to_string(),
		});
	}
	if cfg.synopses.name_column == cfg.synopses.synopsis_column {
		return Err(Error::Validation {
			message: "synopses.name_column and synopses.synopsis_column must differ.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.index.backend = cfg.index.backend.trim().to_ascii_lowercase();

	if let Some(qdrant) = cfg.index.qdrant.as_mut()
		&& qdrant.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false)
	{
		qdrant.api_key = None;
	}
	if let Some(qdrant) = cfg.index.qdrant.as_mut()
		&& qdrant.vector_name.as_deref().map(|name| name.trim().is_empty()).unwrap_or(false)
	{
		qdrant.vector_name = None;
	}
	if let Some(pinecone) = cfg.index.pinecone.as_mut() {
		pinecone.host = pinecone.host.trim_end_matches('/').to_string();

		if pinecone.namespace.as_deref().map(|ns| ns.trim().is_empty()).unwrap_or(false) {
			pinecone.namespace = None;
		}
	}
}
