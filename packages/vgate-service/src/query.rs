use std::{future::Future, time::Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use vgate_domain::{
	credential::{Credential, SemanticTopic},
	filter::{self, FilterExpression},
	rules,
	semantic::{self, ScoredResult},
};

use crate::{
	Error, GateService, Result, SearchArgs,
	audit::{AuditArgs, AuditRecord},
};

const CONTENT_KEY: &str = "content";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
	pub query: String,
	#[serde(default)]
	pub top_k: Option<u32>,
	#[serde(default)]
	pub filter: Option<FilterExpression>,
	/// Request attributes checked against the credential's structural rules.
	#[serde(default)]
	pub context: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryItem {
	pub score: f32,
	#[serde(rename = "type")]
	pub kind: String,
	/// `{"pageContent": ...}` encoded as a JSON string.
	pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
	pub items: Vec<QueryItem>,
}

enum SearchOutcome {
	ContextDenied,
	MissingCollection,
	Failed { filter: Option<FilterExpression> },
	Completed { filter: FilterExpression, results: Vec<ScoredResult> },
}
impl SearchOutcome {
	fn into_parts(self) -> (Option<FilterExpression>, Vec<ScoredResult>) {
		match self {
			Self::ContextDenied | Self::MissingCollection => (None, Vec::new()),
			Self::Failed { filter } => (filter, Vec::new()),
			Self::Completed { filter, results } => (Some(filter), results),
		}
	}

	fn label(&self) -> &'static str {
		match self {
			Self::ContextDenied => "context_denied",
			Self::MissingCollection => "missing_collection",
			Self::Failed { .. } => "failed",
			Self::Completed { .. } => "completed",
		}
	}
}

impl GateService {
	/// Runs one query for an authenticated credential and audits it.
	///
	/// Every failure after authentication degrades to an empty result. The audit write happens
	/// exactly once and its failure never reaches the caller.
	pub async fn process_query(
		&self,
		collection: &str,
		request: &QueryRequest,
		credential: &Credential,
	) -> QueryResponse {
		let started = Instant::now();
		let outcome = self.run_search(collection, request, credential).await;
		let label = outcome.label();
		let (filter, results) = outcome.into_parts();
		let response = format_response(&results);
		let execution_time_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

		tracing::info!(
			credential_id = credential.id,
			collection,
			outcome = label,
			result_count = response.items.len(),
			execution_time_ms,
			"Query processed."
		);

		let record = AuditRecord::from_args(AuditArgs {
			credential,
			collection_name: collection,
			query_text: &request.query,
			filter,
			result_count: response.items.len(),
			response_snapshot: serde_json::to_value(&response).unwrap_or(Value::Null),
			execution_time_ms,
			created_at: OffsetDateTime::now_utc(),
		});

		if let Err(err) = self.backends.audit.persist(&record).await {
			tracing::error!(credential_id = credential.id, error = %err, "Audit write failed.");
		}

		response
	}

	/// Resolved result count: the configured default when absent, capped at the maximum.
	pub fn resolve_top_k(&self, requested: Option<u32>) -> u32 {
		let search = &self.cfg.search;

		requested.unwrap_or(search.default_top_k).clamp(1, search.max_top_k)
	}

	async fn run_search(
		&self,
		collection: &str,
		request: &QueryRequest,
		credential: &Credential,
	) -> SearchOutcome {
		if let Some(context) = request.context.as_ref()
			&& !rules::authorize(context, &credential.allow_rules, &credential.deny_rules)
		{
			tracing::info!(credential_id = credential.id, "Structural rules denied the request context.");

			return SearchOutcome::ContextDenied;
		}

		match self.timed("collection check", self.backends.search.collection_exists(collection)).await
		{
			Ok(true) => {},
			Ok(false) => {
				tracing::warn!(collection, "Collection does not exist.");

				return SearchOutcome::MissingCollection;
			},
			Err(err) => {
				tracing::warn!(collection, error = %err, "Collection check failed.");

				return SearchOutcome::Failed { filter: None };
			},
		}

		let vector = self.embed_query(&request.query).await;
		let filter = filter::compile(
			request.filter.as_ref(),
			&credential.sensitivity,
			&credential.allow_tags(),
			&credential.deny_tags(),
		);
		let search = self.backends.search.search(SearchArgs {
			collection,
			vector: &vector,
			filter: &filter,
			limit: self.resolve_top_k(request.top_k),
			with_vectors: self.cfg.search.with_vectors,
		});
		let mut results = match self.timed("search", search).await {
			Ok(results) => results,
			Err(err) => {
				tracing::warn!(collection, error = %err, "Search failed.");

				return SearchOutcome::Failed { filter: Some(filter) };
			},
		};

		if results.is_empty() {
			return SearchOutcome::Completed { filter, results };
		}

		let deny = self.topic_embeddings("deny", &credential.semantic_deny).await;
		let allow = self.topic_embeddings("allow", &credential.semantic_allow).await;
		let semantic_cfg = &self.cfg.semantic;

		semantic::apply(
			&mut results,
			&deny,
			&allow,
			semantic_cfg.similarity_threshold,
			semantic_cfg.boost_factor,
		);

		SearchOutcome::Completed { filter, results }
	}

	/// Embeds the query text. A failed or timed out call yields a zero vector.
	async fn embed_query(&self, query: &str) -> Vec<f32> {
		let cfg = &self.cfg.providers.embedding;
		let texts = [query.to_string()];
		let embedded = self
			.timed("embedding", self.backends.embedding.embed(cfg, &texts))
			.await
			.and_then(|vectors| {
				vectors.into_iter().next().ok_or_else(|| Error::Provider {
					message: "Embedding provider returned no vectors.".to_string(),
				})
			});

		match embedded {
			Ok(vector) => vector,
			Err(err) => {
				tracing::warn!(error = %err, "Query embedding failed; using a zero vector.");

				vec![0.0; cfg.dimensions as usize]
			},
		}
	}

	/// Stored topic embeddings plus one batch call for topics stored without one. Topics whose
	/// embedding cannot be computed are skipped, so `pass` runs without them.
	async fn topic_embeddings(
		&self,
		pass: &'static str,
		topics: &[SemanticTopic],
	) -> Vec<Vec<f32>> {
		let mut embeddings = Vec::with_capacity(topics.len());
		let mut pending = Vec::new();

		for topic in topics {
			match topic.embedding.as_ref() {
				Some(embedding) => embeddings.push(embedding.clone()),
				None => pending.push(topic.topic.clone()),
			}
		}

		if pending.is_empty() {
			return embeddings;
		}

		let cfg = &self.cfg.providers.embedding;

		match self.timed("topic embedding", self.backends.embedding.embed(cfg, &pending)).await {
			Ok(vectors) => embeddings.extend(vectors),
			Err(err) => {
				tracing::warn!(
					pass,
					skipped_topics = pending.len(),
					error = %err,
					"Semantic topic embedding failed; skipping those topics."
				);
			},
		}

		embeddings
	}

	async fn timed<T>(&self, stage: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
		let timeout_ms = self.cfg.search.stage_timeout_ms;

		match tokio::time::timeout(std::time::Duration::from_millis(timeout_ms), fut).await {
			Ok(result) => result,
			Err(_) => Err(Error::Timeout { stage, timeout_ms }),
		}
	}
}

fn format_response(results: &[ScoredResult]) -> QueryResponse {
	let items = results
		.iter()
		.map(|result| QueryItem {
			score: result.score,
			kind: "text".to_string(),
			text: serde_json::json!({ "pageContent": page_content(&result.payload) }).to_string(),
		})
		.collect();

	QueryResponse { items }
}

fn page_content(payload: &Map<String, Value>) -> String {
	match payload.get(CONTENT_KEY) {
		Some(Value::String(text)) => text.clone(),
		None | Some(Value::Null) => String::new(),
		Some(other) => other.to_string(),
	}
}
