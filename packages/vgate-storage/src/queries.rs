use time::OffsetDateTime;

use crate::{
	Result,
	db::Db,
	models::{AuditLogEntry, TokenRow},
};

/// Active, unexpired tokens in storage order.
pub async fn fetch_active_tokens(db: &Db, now: OffsetDateTime) -> Result<Vec<TokenRow>> {
	let rows = sqlx::query_as::<_, TokenRow>(
		"\
SELECT
	id,
	name,
	description,
	hashed_token,
	sensitivity,
	is_active,
	owner_email,
	expiry,
	allow_rules,
	deny_rules,
	semantic_allow_rules,
	semantic_deny_rules,
	created_at
FROM tokens
WHERE is_active
	AND (expiry IS NULL OR expiry > $1)
ORDER BY id",
	)
	.bind(now)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn insert_audit_log(db: &Db, entry: &AuditLogEntry) -> Result<i64> {
	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO audit_logs (
	token_id,
	collection_name,
	query_text,
	rule_snapshot,
	filter_data,
	result_count,
	response_data,
	execution_time_ms,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
RETURNING id",
	)
	.bind(entry.token_id)
	.bind(entry.collection_name.as_str())
	.bind(entry.query_text.as_str())
	.bind(entry.rule_snapshot.as_str())
	.bind(entry.filter_data.clone())
	.bind(entry.result_count)
	.bind(&entry.response_data)
	.bind(entry.execution_time_ms)
	.bind(entry.created_at)
	.fetch_one(&db.pool)
	.await?;

	Ok(id)
}
