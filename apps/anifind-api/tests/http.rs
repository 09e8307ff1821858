use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use serde_json::{Map, Value};
use tower::util::ServiceExt;

use anifind_api::{routes, state::AppState};
use anifind_config::{
	Config, EmbeddingProviderConfig, Index, LlmProviderConfig, Qdrant, Ranking, Service, Synopses,
};
use anifind_index::{IndexHit, IndexQueryResult};
use anifind_service::{
	AnifindService, BoxFuture, ChatProvider, EmbeddingProvider, Providers, SynopsisStore,
	VectorIndex,
};

const DIMS: usize = 8;

struct Probe {
	calls: Arc<AtomicUsize>,
}
impl Probe {
	fn new() -> Self {
		Self { calls: Arc::new(AtomicUsize::new(0)) }
	}

	fn hit(&self) {
		self.calls.fetch_add(1, Ordering::SeqCst);
	}
}

struct StubEmbedding {
	probe: Probe,
	fail: bool,
}
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, anifind_providers::Result<Vec<Vec<f32>>>> {
		self.probe.hit();

		let result = if self.fail {
			Err(anifind_providers::Error::Status {
				status: 500,
				body: "embedding backend exploded".to_string(),
			})
		} else {
			Ok(vec![vec![0.25; DIMS]; texts.len()])
		};

		Box::pin(async move { result })
	}
}

struct StubIndex {
	probe: Probe,
}
impl VectorIndex for StubIndex {
	fn search<'a>(
		&'a self,
		_vector: &'a [f32],
		_top_k: u32,
	) -> BoxFuture<'a, anifind_index::Result<IndexQueryResult>> {
		self.probe.hit();

		let hits = [("10", "Gundam", 0.91), ("11", "Evangelion", 0.87), ("12", "Macross", 0.8)]
			.into_iter()
			.map(|(id, name, score)| {
				let mut metadata = Map::new();

				metadata.insert("name".to_string(), Value::String(name.to_string()));
				metadata.insert("genres".to_string(), Value::String("Mecha, Sci-Fi".to_string()));

				IndexHit { id: id.to_string(), score, metadata }
			})
			.collect();

		Box::pin(async move { Ok(IndexQueryResult { hits, namespace: Some("testmal".to_string()) }) })
	}
}

struct StubChat {
	probe: Probe,
	reply: String,
}
impl ChatProvider for StubChat {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_prompt: &'a str,
	) -> BoxFuture<'a, anifind_providers::Result<String>> {
		self.probe.hit();

		let reply = self.reply.clone();

		Box::pin(async move { Ok(reply) })
	}
}

struct Harness {
	app: Router,
	embedding_calls: Arc<AtomicUsize>,
	index_calls: Arc<AtomicUsize>,
	chat_calls: Arc<AtomicUsize>,
}

fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			cors_allow_any_origin: true,
		},
		providers: anifind_config::Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				api_key_env: None,
				path: "/".to_string(),
				model: "test".to_string(),
				dimensions: DIMS as u32,
				normalized: true,
				embedding_type: "float".to_string(),
				timeout_ms: 1_000,
				max_retries: 0,
				default_headers: Map::new(),
			},
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				api_key_env: None,
				path: "/".to_string(),
				model: "test".to_string(),
				temperature: 0.1,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		index: Index {
			backend: "qdrant".to_string(),
			top_k: 5,
			timeout_ms: 1_000,
			max_retries: 0,
			qdrant: Some(Qdrant {
				url: "http://127.0.0.1:1".to_string(),
				collection: "testmal".to_string(),
				vector_name: None,
				api_key: None,
				api_key_env: None,
			}),
			pinecone: None,
		},
		synopses: Synopses {
			path: "unused.csv".into(),
			name_column: "Name".to_string(),
			synopsis_column: "Sypnopsis".to_string(),
		},
		ranking: Ranking { enabled: true, fallback_on_error: true },
	}
}

fn harness(reply: &str, embedding_fails: bool) -> Harness {
	let embedding = StubEmbedding { probe: Probe::new(), fail: embedding_fails };
	let index = StubIndex { probe: Probe::new() };
	let chat = StubChat { probe: Probe::new(), reply: reply.to_string() };
	let embedding_calls = embedding.probe.calls.clone();
	let index_calls = index.probe.calls.clone();
	let chat_calls = chat.probe.calls.clone();
	let synopses = SynopsisStore::from_rows([
		("Gundam", "A story about giant robots."),
		("Evangelion", "Teenagers pilot biomechanical units."),
	]);
	let service = AnifindService::with_providers(
		test_config(),
		Providers::new(Arc::new(embedding), Arc::new(index), Arc::new(chat)),
		synopses,
	);

	Harness {
		app: routes::router(AppState::from_service(service)),
		embedding_calls,
		index_calls,
		chat_calls,
	}
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.expect("Failed to build request.")
}

async fn read_json(response: axum::response::Response) -> Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

#[tokio::test]
async fn health_ok() {
	let harness = harness("Gundam :- Robots.", false);
	let response = harness
		.app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn query_returns_selected_candidate_first() {
	let harness = harness(
		"Here is my pick.\n\nEvangelion :- Teenagers pilot biomechanical units.",
		false,
	);
	let response = harness
		.app
		.oneshot(post_json("/query", r#"{"text":"mecha anime with giant robots"}"#))
		.await
		.expect("Failed to call /query.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(
		json,
		serde_json::json!([
			["Evangelion", ["Teenagers pilot biomechanical units.", 0.87, ["Mecha", "Sci-Fi"]]],
			["Gundam", ["A story about giant robots.", 0.91, ["Mecha", "Sci-Fi"]]],
			["Macross", ["Synopsis not available", 0.8, ["Mecha", "Sci-Fi"]]]
		])
	);
	assert_eq!(harness.chat_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_text_is_bad_request_without_provider_calls() {
	for body in [r#"{"text":""}"#, r#"{"text":"   "}"#, r#"{}"#, r#"{"text":null}"#] {
		let harness = harness("Gundam :- Robots.", false);
		let response =
			harness.app.oneshot(post_json("/query", body)).await.expect("Failed to call /query.");

		assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");

		let json = read_json(response).await;

		assert_eq!(json["error_code"], "INVALID_REQUEST");
		assert_eq!(json["fields"][0], "$.text");
		assert_eq!(harness.embedding_calls.load(Ordering::SeqCst), 0);
		assert_eq!(harness.index_calls.load(Ordering::SeqCst), 0);
		assert_eq!(harness.chat_calls.load(Ordering::SeqCst), 0);
	}
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
	let harness = harness("Gundam :- Robots.", false);
	let response = harness
		.app
		.oneshot(post_json("/query", r#"{"text": 42"#))
		.await
		.expect("Failed to call /query.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(read_json(response).await["error_code"], "INVALID_REQUEST");
	assert_eq!(harness.embedding_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn embedding_failure_is_internal_error() {
	let harness = harness("Gundam :- Robots.", true);
	let response = harness
		.app
		.oneshot(post_json("/query", r#"{"text":"mecha"}"#))
		.await
		.expect("Failed to call /query.");

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let json = read_json(response).await;

	assert_eq!(json["error_code"], "EMBEDDING_FAILED");
	assert_eq!(json["message"], "Failed to get embedding.");
	assert_eq!(harness.index_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn matches_returns_enriched_hits_and_namespace() {
	let harness = harness("Gundam :- Robots.", false);
	let response = harness
		.app
		.oneshot(post_json("/matches", r#"{"text":"mecha"}"#))
		.await
		.expect("Failed to call /matches.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["namespace"], "testmal");
	assert_eq!(json["matches"][0]["id"], "10");
	assert_eq!(json["matches"][0]["metadata"]["name"], "Gundam");
	assert_eq!(json["matches"][0]["metadata"]["genres"], "Mecha, Sci-Fi");
	assert_eq!(json["matches"][0]["synopsis"], "A story about giant robots.");
	assert_eq!(json["matches"][2]["synopsis"], "Synopsis not available");
	assert_eq!(harness.chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
	let harness = harness("Gundam :- Robots.", false);
	let response = harness
		.app
		.oneshot(
			Request::builder()
				.method("OPTIONS")
				.uri("/query")
				.header(header::ORIGIN, "http://localhost:3000")
				.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
				.body(Body::empty())
				.expect("request"),
		)
		.await
		.expect("Failed to send preflight.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).expect("Missing CORS header."),
		"*"
	);
}
