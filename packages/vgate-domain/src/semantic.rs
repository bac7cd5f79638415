use std::cmp::Ordering;

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
	pub score: f32,
	pub payload: Map<String, Value>,
	pub vector: Option<Vec<f32>>,
}

pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return None;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return None;
	}

	Some((dot / (lhs_norm.sqrt() * rhs_norm.sqrt())).clamp(-1.0, 1.0))
}

/// Drops every result whose vector is closer than `threshold` to any deny embedding.
///
/// Results without a vector always survive. Survivors keep their relative order.
pub fn remove_denied(results: &mut Vec<ScoredResult>, deny: &[Vec<f32>], threshold: f32) {
	if deny.is_empty() {
		return;
	}

	results.retain(|result| {
		let Some(vector) = result.vector.as_deref() else {
			return true;
		};

		!deny
			.iter()
			.filter_map(|embedding| cosine_similarity(vector, embedding))
			.any(|similarity| similarity > threshold)
	});
}

/// Boosts results whose best similarity to an allow embedding exceeds `threshold`, then re-sorts
/// the whole list by score, highest first.
///
/// Results without a comparable vector are never boosted, whatever the threshold.
pub fn boost_allowed(
	results: &mut [ScoredResult],
	allow: &[Vec<f32>],
	threshold: f32,
	boost_factor: f32,
) {
	if allow.is_empty() {
		return;
	}

	for result in results.iter_mut() {
		let Some(vector) = result.vector.as_deref() else {
			continue;
		};

		if max_similarity(vector, allow).is_some_and(|similarity| similarity > threshold) {
			result.score *= boost_factor;
		}
	}

	results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Runs the deny pass and then the allow pass. The order is fixed.
pub fn apply(
	results: &mut Vec<ScoredResult>,
	deny: &[Vec<f32>],
	allow: &[Vec<f32>],
	threshold: f32,
	boost_factor: f32,
) {
	remove_denied(results, deny, threshold);
	boost_allowed(results, allow, threshold, boost_factor);
}

fn max_similarity(vector: &[f32], embeddings: &[Vec<f32>]) -> Option<f32> {
	embeddings
		.iter()
		.filter_map(|embedding| cosine_similarity(vector, embedding))
		.reduce(f32::max)
}
