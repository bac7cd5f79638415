use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub auth: Auth,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub semantic: Semantic,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Request header carrying the API secret.
	#[serde(default = "default_api_key_header")]
	pub api_key_header: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub api_key: Option<String>,
	/// Optional. Named dense vector to query; unnamed collections leave this unset.
	pub vector_name: Option<String>,
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
pub struct Auth {
	/// Lifetime of a cached successful authentication.
	#[serde(default = "default_cache_ttl_ms")]
	pub cache_ttl_ms: u64,
}
impl Default for Auth {
	fn default() -> Self {
		Self { cache_ttl_ms: default_cache_ttl_ms() }
	}
}

#[derive(Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_top_k")]
	pub default_top_k: u32,
	#[serde(default = "default_max_top_k")]
	pub max_top_k: u32,
	/// Ask the backend to return stored vectors so the semantic passes can run.
	#[serde(default = "default_with_vectors")]
	pub with_vectors: bool,
	/// Upper bound for a single embedding or search call.
	#[serde(default = "default_stage_timeout_ms")]
	pub stage_timeout_ms: u64,
	#[serde(default = "default_collection_suffix")]
	pub collection_suffix: String,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_top_k: default_top_k(),
			max_top_k: default_max_top_k(),
			with_vectors: default_with_vectors(),
			stage_timeout_ms: default_stage_timeout_ms(),
			collection_suffix: default_collection_suffix(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Semantic {
	#[serde(default = "default_similarity_threshold")]
	pub similarity_threshold: f32,
	#[serde(default = "default_boost_factor")]
	pub boost_factor: f32,
}
impl Default for Semantic {
	fn default() -> Self {
		Self {
			similarity_threshold: default_similarity_threshold(),
			boost_factor: default_boost_factor(),
		}
	}
}

fn default_api_key_header() -> String {
	"X-API-Key".to_string()
}

fn default_cache_ttl_ms() -> u64 {
	10_000
}

fn default_top_k() -> u32 {
	10
}

fn default_max_top_k() -> u32 {
	100
}

fn default_with_vectors() -> bool {
	true
}

fn default_stage_timeout_ms() -> u64 {
	15_000
}

fn default_collection_suffix() -> String {
	"_knowledge_base".to_string()
}

fn default_similarity_threshold() -> f32 {
	0.75
}

fn default_boost_factor() -> f32 {
	1.2
}
