pub mod audit;
pub mod auth;
pub mod query;
pub mod secret;

mod backends;
mod error;

pub use audit::AuditRecord;
pub use auth::{AuthCache, Authenticator, Clock, SystemClock, TtlCache};
pub use backends::{HttpEmbedding, PostgresStore};
pub use error::{Error, Result};
pub use query::{QueryItem, QueryRequest, QueryResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;

use vgate_config::{Config, EmbeddingProviderConfig};
use vgate_domain::{credential::Credential, filter::FilterExpression, semantic::ScoredResult};
use vgate_storage::{db::Db, qdrant::QdrantStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub struct SearchArgs<'a> {
	pub collection: &'a str,
	pub vector: &'a [f32],
	pub filter: &'a FilterExpression,
	pub limit: u32,
	pub with_vectors: bool,
}

pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn collection_exists<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<bool>>;

	fn search<'a>(&'a self, args: SearchArgs<'a>) -> BoxFuture<'a, Result<Vec<ScoredResult>>>;
}

pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Active, unexpired credentials in storage order.
	fn fetch_active_credentials<'a>(
		&'a self,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Vec<Credential>>>;
}

pub trait AuditSink
where
	Self: Send + Sync,
{
	fn persist<'a>(&'a self, record: &'a AuditRecord) -> BoxFuture<'a, Result<()>>;
}

#[derive(Clone)]
pub struct Backends {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub search: Arc<dyn SearchBackend>,
	pub credentials: Arc<dyn CredentialStore>,
	pub audit: Arc<dyn AuditSink>,
}
impl Backends {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		search: Arc<dyn SearchBackend>,
		credentials: Arc<dyn CredentialStore>,
		audit: Arc<dyn AuditSink>,
	) -> Self {
		Self { embedding, search, credentials, audit }
	}

	/// Postgres for credentials and audit, Qdrant for search, HTTP for embeddings.
	pub fn connected(db: Db, qdrant: QdrantStore) -> Self {
		let store = Arc::new(PostgresStore::new(db));

		Self {
			embedding: Arc::new(HttpEmbedding),
			search: Arc::new(qdrant),
			credentials: store.clone(),
			audit: store,
		}
	}
}

pub struct GateService {
	pub cfg: Config,
	pub backends: Backends,
	pub authenticator: Authenticator,
}
impl GateService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		Self::with_backends(cfg, Backends::connected(db, qdrant))
	}

	pub fn with_backends(cfg: Config, backends: Backends) -> Self {
		let authenticator = Authenticator::with_ttl(
			backends.credentials.clone(),
			time::Duration::milliseconds(i64::try_from(cfg.auth.cache_ttl_ms).unwrap_or(i64::MAX)),
		);

		Self { cfg, backends, authenticator }
	}

	pub fn with_authenticator(cfg: Config, backends: Backends, authenticator: Authenticator) -> Self {
		Self { cfg, backends, authenticator }
	}

	pub async fn authenticate(&self, secret: &str) -> (bool, Option<Credential>) {
		self.authenticator.authenticate(secret).await
	}
}
