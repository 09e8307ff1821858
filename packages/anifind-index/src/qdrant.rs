use std::{collections::HashMap, time::Duration};

use qdrant_client::qdrant::{
	PointId, Query, QueryPointsBuilder, ScoredPoint, Value, point_id::PointIdOptions, value::Kind,
};
use serde_json::{Map, Number};

use crate::{IndexHit, IndexQueryResult, Result};

pub struct QdrantIndex {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_name: Option<String>,
}
impl QdrantIndex {
	pub fn new(cfg: &anifind_config::Qdrant, timeout_ms: u64) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url)
			.api_key(cfg.api_key.clone())
			.timeout(Duration::from_millis(timeout_ms))
			.build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_name: cfg.vector_name.clone(),
		})
	}

	pub async fn query(&self, vector: &[f32], top_k: u32) -> Result<IndexQueryResult> {
		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.with_payload(true)
			.limit(top_k as u64);

		if let Some(name) = self.vector_name.as_ref() {
			search = search.using(name.clone());
		}

		let response = self.client.query(search).await?;

		Ok(IndexQueryResult {
			hits: response.result.into_iter().map(hit_from_point).collect(),
			namespace: Some(self.collection.clone()),
		})
	}
}

fn hit_from_point(point: ScoredPoint) -> IndexHit {
	IndexHit {
		id: point.id.as_ref().map(point_id_to_string).unwrap_or_default(),
		score: point.score,
		metadata: payload_to_json(point.payload),
	}
}

fn point_id_to_string(point_id: &PointId) -> String {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => id.clone(),
		Some(PointIdOptions::Num(id)) => id.to_string(),
		None => String::new(),
	}
}

fn payload_to_json(payload: HashMap<String, Value>) -> Map<String, serde_json::Value> {
	payload.into_iter().map(|(key, value)| (key, value_to_json(value))).collect()
}

fn value_to_json(value: Value) -> serde_json::Value {
	match value.kind {
		Some(Kind::BoolValue(value)) => serde_json::Value::Bool(value),
		Some(Kind::IntegerValue(value)) => serde_json::Value::from(value),
		Some(Kind::DoubleValue(value)) =>
			Number::from_f64(value).map(serde_json::Value::Number).unwrap_or_default(),
		Some(Kind::StringValue(value)) => serde_json::Value::String(value),
		Some(Kind::ListValue(list)) =>
			serde_json::Value::Array(list.values.into_iter().map(value_to_json).collect()),
		Some(Kind::StructValue(object)) => serde_json::Value::Object(payload_to_json(object.fields)),
		Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
	}
}
