use time::OffsetDateTime;

use vgate_config::EmbeddingProviderConfig;
use vgate_domain::{credential::Credential, semantic::ScoredResult};
use vgate_providers::embedding;
use vgate_storage::{db::Db, models::AuditLogEntry, qdrant::QdrantStore, queries};

use crate::{
	AuditRecord, AuditSink, BoxFuture, CredentialStore, EmbeddingProvider, Error, Result,
	SearchArgs, SearchBackend,
};

/// Embeddings through the configured OpenAI-compatible endpoint.
pub struct HttpEmbedding;
impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

impl SearchBackend for QdrantStore {
	fn collection_exists<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move { Ok(QdrantStore::collection_exists(self, collection).await?) })
	}

	fn search<'a>(&'a self, args: SearchArgs<'a>) -> BoxFuture<'a, Result<Vec<ScoredResult>>> {
		Box::pin(async move {
			let SearchArgs { collection, vector, filter, limit, with_vectors } = args;

			Ok(QdrantStore::search(self, collection, vector, filter, limit, with_vectors).await?)
		})
	}
}

/// Credential and audit storage backed by Postgres.
pub struct PostgresStore {
	db: Db,
}
impl PostgresStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl CredentialStore for PostgresStore {
	fn fetch_active_credentials<'a>(
		&'a self,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Vec<Credential>>> {
		Box::pin(async move {
			let rows = queries::fetch_active_tokens(&self.db, now).await?;
			let mut credentials = Vec::with_capacity(rows.len());

			for row in rows {
				let token_id = row.id;

				match row.into_credential() {
					Ok(credential) => credentials.push(credential),
					Err(err) => {
						tracing::warn!(token_id, error = %err, "Skipping credential with malformed rules.");
					},
				}
			}

			Ok(credentials)
		})
	}
}
impl AuditSink for PostgresStore {
	fn persist<'a>(&'a self, record: &'a AuditRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let entry = audit_entry(record)?;

			queries::insert_audit_log(&self.db, &entry).await?;

			Ok(())
		})
	}
}

fn audit_entry(record: &AuditRecord) -> Result<AuditLogEntry> {
	let filter_data = record
		.filter
		.as_ref()
		.map(serde_json::to_value)
		.transpose()
		.map_err(|err| Error::InvalidRequest { message: format!("Unserializable filter: {err}") })?;

	Ok(AuditLogEntry {
		token_id: record.credential_id,
		collection_name: record.collection_name.clone(),
		query_text: record.query_text.clone(),
		rule_snapshot: record.rule_snapshot.clone(),
		filter_data,
		result_count: i32::try_from(record.result_count).unwrap_or(i32::MAX),
		response_data: record.response_snapshot.clone(),
		execution_time_ms: record.execution_time_ms,
		created_at: record.created_at,
	})
}
