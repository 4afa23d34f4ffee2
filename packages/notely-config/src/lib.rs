mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chunking, Config, EmbeddingProviderConfig, Notes, Postgres, Providers, Search, Security,
	Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
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
	if cfg.storage.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.vector_dim must be greater than zero.".to_string(),
		});
	}
	// pgvector's HNSW index accepts at most 2,000 dimensions.
	if cfg.storage.vector_dim > 2_000 {
		return Err(Error::Validation {
			message: "storage.vector_dim must be 2,000 or less.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.vector_dim.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.max_chars == 0 {
		return Err(Error::Validation {
			message: "chunking.max_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.overlap_chars >= cfg.chunking.max_chars {
		return Err(Error::Validation {
			message: "chunking.overlap_chars must be less than chunking.max_chars.".to_string(),
		});
	}

	let threshold = cfg.search.default_match_threshold;

	if !threshold.is_finite() {
		return Err(Error::Validation {
			message: "search.default_match_threshold must be a finite number.".to_string(),
		});
	}
	if !(-1.0..=1.0).contains(&threshold) {
		return Err(Error::Validation {
			message: "search.default_match_threshold must be in the range -1.0-1.0.".to_string(),
		});
	}
	if cfg.search.max_match_count == 0 {
		return Err(Error::Validation {
			message: "search.max_match_count must be greater than zero.".to_string(),
		});
	}
	if i32::try_from(cfg.search.max_match_count).is_err() {
		return Err(Error::Validation {
			message: format!("search.max_match_count must be {} or less.", i32::MAX),
		});
	}
	if cfg.search.default_match_count == 0
		|| cfg.search.default_match_count > cfg.search.max_match_count
	{
		return Err(Error::Validation {
			message:
				"search.default_match_count must be between 1 and search.max_match_count."
					.to_string(),
		});
	}
	if cfg.notes.max_title_chars == 0 {
		return Err(Error::Validation {
			message: "notes.max_title_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.notes.max_content_chars == 0 {
		return Err(Error::Validation {
			message: "notes.max_content_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.service.log_level.is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	while cfg.providers.embedding.api_base.ends_with('/') {
		cfg.providers.embedding.api_base.pop();
	}
}
