use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Structural rule field whose values feed the payload tag filter.
pub const TAG_RULE_FIELD: &str = "tags";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralRule {
	#[serde(default)]
	pub field: String,
	#[serde(default)]
	pub values: Vec<String>,
}

/// A semantic allow or deny topic. Topics stored without an embedding are embedded at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticTopic {
	pub topic: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
	pub id: i64,
	pub name: String,
	pub owner_email: String,
	pub hashed_secret: String,
	pub sensitivity: String,
	pub is_active: bool,
	pub expiry: Option<OffsetDateTime>,
	pub allow_rules: Vec<StructuralRule>,
	pub deny_rules: Vec<StructuralRule>,
	pub semantic_allow: Vec<SemanticTopic>,
	pub semantic_deny: Vec<SemanticTopic>,
}
impl Credential {
	/// Active and not past its expiry.
	pub fn is_usable(&self, now: OffsetDateTime) -> bool {
		self.is_active && self.expiry.map(|expiry| now < expiry).unwrap_or(true)
	}

	pub fn allow_tags(&self) -> Vec<String> {
		rule_tags(&self.allow_rules)
	}

	pub fn deny_tags(&self) -> Vec<String> {
		rule_tags(&self.deny_rules)
	}

	/// Serialized view of the policy in force, recorded with every audit entry.
	pub fn rule_snapshot(&self) -> String {
		let topics = |topics: &[SemanticTopic]| -> Vec<String> {
			topics.iter().map(|topic| topic.topic.clone()).collect()
		};

		serde_json::json!({
			"sensitivity": self.sensitivity,
			"allow_rules": self.allow_rules,
			"deny_rules": self.deny_rules,
			"semantic_allow": topics(&self.semantic_allow),
			"semantic_deny": topics(&self.semantic_deny),
		})
		.to_string()
	}
}

fn rule_tags(rules: &[StructuralRule]) -> Vec<String> {
	let mut tags: Vec<String> = Vec::new();

	for rule in rules.iter().filter(|rule| rule.field == TAG_RULE_FIELD) {
		for value in &rule.values {
			if !tags.contains(value) {
				tags.push(value.clone());
			}
		}
	}

	tags
}
