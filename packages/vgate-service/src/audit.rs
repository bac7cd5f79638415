use serde_json::Value;
use time::OffsetDateTime;

use vgate_domain::{credential::Credential, filter::FilterExpression};

/// One append-only record per query attempt by an authenticated credential.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
	pub credential_id: i64,
	pub collection_name: String,
	pub query_text: String,
	pub rule_snapshot: String,
	/// The filter sent to the backend, absent when the query never reached filter compilation.
	pub filter: Option<FilterExpression>,
	pub result_count: usize,
	pub response_snapshot: Value,
	pub execution_time_ms: i64,
	pub created_at: OffsetDateTime,
}

pub(crate) struct AuditArgs<'a> {
	pub credential: &'a Credential,
	pub collection_name: &'a str,
	pub query_text: &'a str,
	pub filter: Option<FilterExpression>,
	pub result_count: usize,
	pub response_snapshot: Value,
	pub execution_time_ms: i64,
	pub created_at: OffsetDateTime,
}

impl AuditRecord {
	pub(crate) fn from_args(args: AuditArgs<'_>) -> Self {
		let AuditArgs {
			credential,
			collection_name,
			query_text,
			filter,
			result_count,
			response_snapshot,
			execution_time_ms,
			created_at,
		} = args;

		Self {
			credential_id: credential.id,
			collection_name: collection_name.to_string(),
			query_text: query_text.to_string(),
			rule_snapshot: credential.rule_snapshot(),
			filter,
			result_count,
			response_snapshot,
			execution_time_ms,
			created_at,
		}
	}
}
