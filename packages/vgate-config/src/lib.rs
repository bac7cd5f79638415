mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Auth, Config, EmbeddingProviderConfig, Postgres, Providers, Qdrant, Search, Semantic, Service,
	Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.api_key_header", &cfg.service.api_key_header),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("storage.qdrant.url", &cfg.storage.qdrant.url),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.auth.cache_ttl_ms == 0 {
		return Err(Error::Validation {
			message: "auth.cache_ttl_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_top_k == 0 {
		return Err(Error::Validation {
			message: "search.default_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_top_k > cfg.search.max_top_k {
		return Err(Error::Validation {
			message: "search.default_top_k must not exceed search.max_top_k.".to_string(),
		});
	}
	if cfg.search.stage_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.stage_timeout_ms must be greater than zero.".to_string(),
		});
	}

	let threshold = cfg.semantic.similarity_threshold;

	if !threshold.is_finite() {
		return Err(Error::Validation {
			message: "semantic.similarity_threshold must be a finite number.".to_string(),
		});
	}
	if !(-1.0..=1.0).contains(&threshold) {
		return Err(Error::Validation {
			message: "semantic.similarity_threshold must be in the range -1.0-1.0.".to_string(),
		});
	}
	if !cfg.semantic.boost_factor.is_finite() {
		return Err(Error::Validation {
			message: "semantic.boost_factor must be a finite number.".to_string(),
		});
	}
	if cfg.semantic.boost_factor <= 0.0 {
		return Err(Error::Validation {
			message: "semantic.boost_factor must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.storage.qdrant.api_key = None;
	}
	if cfg.storage.qdrant.vector_name.as_deref().map(|name| name.trim().is_empty()).unwrap_or(false)
	{
		cfg.storage.qdrant.vector_name = None;
	}
}
