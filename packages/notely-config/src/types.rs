use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub chunking: Chunking,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub notes: Notes,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	/// Dimension of every `vector` column and of every embedding accepted on write or search.
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Chunking {
	pub max_chars: u32,
	pub overlap_chars: u32,
	/// Re-derive chunks through the embedding provider when an update changes content and
	/// carries no chunk payload of its own.
	pub rechunk_on_update: bool,
}
impl Default for Chunking {
	fn default() -> Self {
		Self { max_chars: 1_200, overlap_chars: 200, rechunk_on_update: true }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_match_threshold: f64,
	pub default_match_count: u32,
	pub max_match_count: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { default_match_threshold: 0.78, default_match_count: 10, max_match_count: 100 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Notes {
	pub max_title_chars: u32,
	pub max_content_chars: u32,
}
impl Default for Notes {
	fn default() -> Self {
		Self { max_title_chars: 512, max_content_chars: 200_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Security {
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}
