use std::collections::HashMap;

use qdrant_client::qdrant::{
	Condition, Filter, Query, QueryPointsBuilder, Range, ScoredPoint, Value, value::Kind,
	vectors_output::VectorsOptions,
};
use serde_json::{Map, Number, Value as JsonValue};

use vgate_domain::{
	filter::{self, FilterExpression},
	semantic::ScoredResult,
};

use crate::{Error, Result};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub vector_name: Option<String>,
}
impl QdrantStore {
	pub fn new(cfg: &vgate_config::Qdrant) -> Result<Self> {
		let client =
			qdrant_client::Qdrant::from_url(&cfg.url).api_key(cfg.api_key.clone()).build()?;

		Ok(Self { client, vector_name: cfg.vector_name.clone() })
	}

	pub async fn collection_exists(&self, collection: &str) -> Result<bool> {
		let response = self.client.list_collections().await?;

		Ok(response.collections.iter().any(|description| description.name == collection))
	}

	pub async fn search(
		&self,
		collection: &str,
		vector: &[f32],
		filter: &FilterExpression,
		limit: u32,
		with_vectors: bool,
	) -> Result<Vec<ScoredResult>> {
		let mut search = QueryPointsBuilder::new(collection)
			.query(Query::new_nearest(vector.to_vec()))
			.limit(limit as u64)
			.with_payload(true)
			.with_vectors(with_vectors);

		if !filter.is_empty() {
			search = search.filter(to_qdrant_filter(filter)?);
		}
		if let Some(name) = self.vector_name.as_deref() {
			search = search.using(name);
		}

		let response = self.client.query(search).await?;

		Ok(response
			.result
			.iter()
			.map(|point| ScoredResult {
				score: point.score,
				payload: payload_to_json(&point.payload),
				vector: point_vector(point, self.vector_name.as_deref()),
			})
			.collect())
	}
}

pub fn to_qdrant_filter(expr: &FilterExpression) -> Result<Filter> {
	Ok(Filter {
		must: convert_group(expr.must.as_deref())?,
		should: convert_group(expr.should.as_deref())?,
		must_not: convert_group(expr.must_not.as_deref())?,
		min_should: None,
	})
}

fn convert_group(conditions: Option<&[filter::Condition]>) -> Result<Vec<Condition>> {
	conditions.unwrap_or_default().iter().map(convert_condition).collect()
}

fn convert_condition(condition: &filter::Condition) -> Result<Condition> {
	let key = condition.key.clone();

	if let Some(matches) = condition.matches.as_ref() {
		return match &matches.value {
			JsonValue::String(text) => Ok(Condition::matches(key, text.clone())),
			JsonValue::Bool(flag) => Ok(Condition::matches(key, *flag)),
			JsonValue::Number(number) => match number.as_i64() {
				Some(integer) => Ok(Condition::matches(key, integer)),
				None => Err(Error::InvalidArgument(format!(
					"Match on {key:?} must be an integer; use a range for fractional values."
				))),
			},
			JsonValue::Array(items) => convert_any_of(key, items),
			other => Err(Error::InvalidArgument(format!(
				"Unsupported match value for {key:?}: {other}."
			))),
		};
	}
	if let Some(range) = condition.range.as_ref() {
		return Ok(Condition::range(
			key,
			Range { lt: range.lt, gt: range.gt, gte: range.gte, lte: range.lte },
		));
	}

	Err(Error::InvalidArgument(format!("Condition on {key:?} has neither match nor range.")))
}

fn convert_any_of(key: String, items: &[JsonValue]) -> Result<Condition> {
	if let Some(keywords) =
		items.iter().map(|item| item.as_str().map(str::to_string)).collect::<Option<Vec<_>>>()
	{
		return Ok(Condition::matches(key, keywords));
	}
	if let Some(integers) = items.iter().map(JsonValue::as_i64).collect::<Option<Vec<i64>>>() {
		return Ok(Condition::matches(key, integers));
	}

	Err(Error::InvalidArgument(format!(
		"Match list on {key:?} must hold only strings or only integers."
	)))
}

fn point_vector(point: &ScoredPoint, vector_name: Option<&str>) -> Option<Vec<f32>> {
	let options = point.vectors.as_ref()?.vectors_options.as_ref()?;
	let output = match (options, vector_name) {
		(VectorsOptions::Vector(output), _) => output,
		(VectorsOptions::Vectors(named), Some(name)) => named.vectors.get(name)?,
		(VectorsOptions::Vectors(_), None) => return None,
	};
	#[allow(deprecated)]
	let data = output.data.clone();

	if data.is_empty() { None } else { Some(data) }
}

pub fn payload_to_json(payload: &HashMap<String, Value>) -> Map<String, JsonValue> {
	payload.iter().map(|(key, value)| (key.clone(), value_to_json(value))).collect()
}

fn value_to_json(value: &Value) -> JsonValue {
	match &value.kind {
		None | Some(Kind::NullValue(_)) => JsonValue::Null,
		Some(Kind::BoolValue(flag)) => JsonValue::Bool(*flag),
		Some(Kind::IntegerValue(integer)) => JsonValue::from(*integer),
		Some(Kind::DoubleValue(double)) =>
			Number::from_f64(*double).map(JsonValue::Number).unwrap_or(JsonValue::Null),
		Some(Kind::StringValue(text)) => JsonValue::String(text.clone()),
		Some(Kind::ListValue(list)) => JsonValue::Array(list.values.iter().map(value_to_json).collect()),
		Some(Kind::StructValue(object)) => JsonValue::Object(payload_to_json(&object.fields)),
	}
}
