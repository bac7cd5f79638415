use serde_json::{Map, Value};

use crate::credential::StructuralRule;

/// Decides whether `context` passes the structural policy.
///
/// No rules at all denies. A matching deny rule always denies. With no allow rules, anything that
/// escaped the deny rules is allowed; otherwise at least one allow rule must match.
pub fn authorize(
	context: &Map<String, Value>,
	allow: &[StructuralRule],
	deny: &[StructuralRule],
) -> bool {
	if allow.is_empty() && deny.is_empty() {
		return false;
	}
	if matches_any(context, deny) {
		return false;
	}
	if allow.is_empty() {
		return true;
	}

	matches_any(context, allow)
}

pub fn matches_any(context: &Map<String, Value>, rules: &[StructuralRule]) -> bool {
	rules.iter().any(|rule| matches_rule(context, rule))
}

pub fn matches_rule(context: &Map<String, Value>, rule: &StructuralRule) -> bool {
	if rule.field.is_empty() || rule.values.is_empty() {
		return false;
	}

	let Some(value) = context.get(rule.field.as_str()) else {
		return false;
	};

	match value {
		Value::Array(items) => items.iter().any(|item| value_in(item, &rule.values)),
		scalar => value_in(scalar, &rule.values),
	}
}

// Rule values are strings; non-string context values never match.
fn value_in(value: &Value, values: &[String]) -> bool {
	value.as_str().is_some_and(|text| values.iter().any(|candidate| candidate == text))
}
