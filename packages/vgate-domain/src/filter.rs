use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload path holding a point's sensitivity tier.
pub const SENSITIVITY_KEY: &str = "metadata.sensitivity";
/// Payload path holding a point's tags.
pub const TAG_KEY: &str = "metadata.tags";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchValue {
	pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gt: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gte: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lt: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lte: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
	pub key: String,
	#[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
	pub matches: Option<MatchValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub range: Option<RangeBounds>,
}
impl Condition {
	pub fn matches(key: impl Into<String>, value: impl Into<Value>) -> Self {
		Self { key: key.into(), matches: Some(MatchValue { value: value.into() }), range: None }
	}

	pub fn range(key: impl Into<String>, range: RangeBounds) -> Self {
		Self { key: key.into(), matches: None, range: Some(range) }
	}
}

/// AND (`must`), OR (`should`) and NOT-AND (`must_not`) groups. An absent group is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub must: Option<Vec<Condition>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub should: Option<Vec<Condition>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub must_not: Option<Vec<Condition>>,
}
impl FilterExpression {
	pub fn is_empty(&self) -> bool {
		self.must.is_none() && self.should.is_none() && self.must_not.is_none()
	}
}

/// Builds the backend filter for one query.
///
/// The sensitivity condition is always the first `must` entry. Every allow tag becomes its own
/// `must` condition, so two distinct allow tags can never both hold on a single-valued tag field.
/// Caller `must` conditions are appended; caller `should` and `must_not` replace whatever the
/// policy produced for that group.
pub fn compile(
	caller: Option<&FilterExpression>,
	sensitivity: &str,
	allow_tags: &[String],
	deny_tags: &[String],
) -> FilterExpression {
	let mut must = vec![Condition::matches(SENSITIVITY_KEY, sensitivity)];
	let mut should: Vec<Condition> = Vec::new();
	let mut must_not: Vec<Condition> = Vec::new();

	for tag in allow_tags {
		must.push(Condition::matches(TAG_KEY, tag.as_str()));
	}
	for tag in deny_tags {
		must_not.push(Condition::matches(TAG_KEY, tag.as_str()));
	}

	if let Some(caller) = caller {
		if let Some(extra) = caller.must.as_ref() {
			must.extend(extra.iter().cloned());
		}
		if let Some(replacement) = caller.should.as_ref() {
			should = replacement.clone();
		}
		if let Some(replacement) = caller.must_not.as_ref() {
			must_not = replacement.clone();
		}
	}

	FilterExpression { must: non_empty(must), should: non_empty(should), must_not: non_empty(must_not) }
}

fn non_empty(conditions: Vec<Condition>) -> Option<Vec<Condition>> {
	if conditions.is_empty() { None } else { Some(conditions) }
}
