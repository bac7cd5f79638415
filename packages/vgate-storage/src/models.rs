use serde::de::DeserializeOwned;
use serde_json::Value;
use time::OffsetDateTime;

use vgate_domain::credential::Credential;

use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
pub struct TokenRow {
	pub id: i64,
	pub name: String,
	pub description: Option<String>,
	pub hashed_token: String,
	pub sensitivity: String,
	pub is_active: bool,
	pub owner_email: String,
	pub expiry: Option<OffsetDateTime>,
	pub allow_rules: Option<Value>,
	pub deny_rules: Option<Value>,
	pub semantic_allow_rules: Option<Value>,
	pub semantic_deny_rules: Option<Value>,
	pub created_at: OffsetDateTime,
}
impl TokenRow {
	pub fn into_credential(self) -> Result<Credential> {
		let id = self.id;

		Ok(Credential {
			id,
			allow_rules: decode_rules(id, "allow_rules", self.allow_rules)?,
			deny_rules: decode_rules(id, "deny_rules", self.deny_rules)?,
			semantic_allow: decode_rules(id, "semantic_allow_rules", self.semantic_allow_rules)?,
			semantic_deny: decode_rules(id, "semantic_deny_rules", self.semantic_deny_rules)?,
			name: self.name,
			owner_email: self.owner_email,
			hashed_secret: self.hashed_token,
			sensitivity: self.sensitivity,
			is_active: self.is_active,
			expiry: self.expiry,
		})
	}
}

#[derive(Debug)]
pub struct AuditLogEntry {
	pub token_id: i64,
	pub collection_name: String,
	pub query_text: String,
	pub rule_snapshot: String,
	pub filter_data: Option<Value>,
	pub result_count: i32,
	pub response_data: Value,
	pub execution_time_ms: i64,
	pub created_at: OffsetDateTime,
}

fn decode_rules<T>(id: i64, column: &str, raw: Option<Value>) -> Result<Vec<T>>
where
	T: DeserializeOwned,
{
	match raw {
		None | Some(Value::Null) => Ok(Vec::new()),
		Some(value) => serde_json::from_value(value)
			.map_err(|err| Error::InvalidRow(format!("tokens.{column} for token {id}: {err}"))),
	}
}
