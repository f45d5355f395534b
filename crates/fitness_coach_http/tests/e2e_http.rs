use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fitness_coach::Coach;
use fitness_coach::coach::REFUSAL;
use fitness_coach::http_client::ReqwestGeminiClient;
use fitness_coach::profile_store::{JsonFileProfileStore, MemoryProfileStore, ProfileRepository};
use fitness_coach_http::middleware::{LoggingMiddleware, REQUEST_ID_HEADER};
use fitness_coach_http::{AppState, build_router};
use metrics_exporter_prometheus::PrometheusBuilder;
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

async fn spawn_app(upstream: &MockServer, profiles: Arc<dyn ProfileRepository>) -> SocketAddr {
    let client = ReqwestGeminiClient::new(
        &upstream.uri(),
        "gemini-2.5-flash",
        SecretString::new("tok".into()),
        Duration::from_secs(5),
    );
    let coach = Coach::new(Arc::new(LoggingMiddleware::new(client)));
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = build_router(AppState::new(coach, profiles, handle), 64 * 1024);

    // bind to ephemeral port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::serve(listener, app.into_make_service());
    tokio::spawn(async move {
        server.await.ok();
    });
    addr
}

async fn upstream_replying(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn candidate(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    }))
}

#[tokio::test]
async fn health_and_request_id() {
    let upstream = MockServer::start().await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;

    let res = Client::new()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(REQUEST_ID_HEADER));
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn workout_question_is_answered() {
    let upstream = upstream_replying(candidate("## Push Day")).await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;

    let res = Client::new()
        .post(format!("http://{addr}/api/workout"))
        .json(&json!({
            "userInput": "Give me a push workout",
            "workoutType": "push-pull-legs",
            "location": "gym",
            "difficulty": "Intermediate"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"response": "## Push Day"}));
    assert_eq!(upstream.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn off_topic_is_refused_without_upstream_call() {
    let upstream = upstream_replying(candidate("unused")).await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;

    let res = Client::new()
        .post(format!("http://{addr}/api/workout"))
        .json(&json!({"userInput": "What's the weather in Paris?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["response"], REFUSAL);
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upstream_quota_maps_to_429() {
    let upstream =
        upstream_replying(ResponseTemplate::new(429).set_body_string("quota exceeded")).await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;

    let res = Client::new()
        .post(format!("http://{addr}/api/workout"))
        .json(&json!({"userInput": "best protein sources"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Rate limit exceeded");
    assert_eq!(body["status"], 429);
    assert_eq!(body["details"], fitness_coach::RATE_LIMIT_DETAILS);
}

#[tokio::test]
async fn upstream_server_error_is_mirrored() {
    let upstream = upstream_replying(ResponseTemplate::new(502).set_body_string("gateway")).await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;

    let res = Client::new()
        .post(format!("http://{addr}/api/workout"))
        .json(&json!({"userInput": "cardio tips"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Failed to generate response");
    assert_eq!(body["details"], "gateway");
}

#[tokio::test]
async fn empty_candidates_is_500() {
    let upstream =
        upstream_replying(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;

    let res = Client::new()
        .post(format!("http://{addr}/api/workout"))
        .json(&json!({"userInput": "stretching routine"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "No response generated"}));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let upstream = MockServer::start().await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;

    let res = Client::new()
        .post(format!("http://{addr}/api/workout"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn canned_endpoint() {
    let upstream = MockServer::start().await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;
    let http = Client::new();

    let body: Value = http
        .post(format!("http://{addr}/api/test"))
        .json(&json!({"userInput": "home workout please"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        body["response"]
            .as_str()
            .unwrap()
            .starts_with("## Home Full-Body Workout Plan")
    );

    let body: Value = http
        .post(format!("http://{addr}/api/test"))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["response"], fitness_coach::canned::HINT);
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn metrics_calculation_and_validation() {
    let upstream = MockServer::start().await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;
    let http = Client::new();

    let res = http
        .post(format!("http://{addr}/api/metrics"))
        .json(&json!({"userDetails": {
            "weight": 70, "weightUnit": "kg", "heightCm": 175, "heightUnit": "cm",
            "age": 25, "sex": "male", "activityLevel": "Sedentary", "goal": "cut"
        }}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["maintenanceCalories"], 2009);
    assert_eq!(body["goalCalories"], json!({"min": 1607, "max": 1808}));
    assert_eq!(body["protein"], json!({"min": 112, "max": 154}));

    let res = http
        .post(format!("http://{addr}/api/metrics"))
        .json(&json!({"userDetails": {"weight": "", "age": 130, "heightUnit": "cm"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"]["weight"], "Weight is required");
    assert_eq!(body["errors"]["age"], "Please enter a valid age (1-120)");
    assert_eq!(body["errors"]["heightCm"], "Height is required");
}

#[tokio::test]
async fn profile_lifecycle() {
    let upstream = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileProfileStore::new(dir.path().join("profile.json")));
    let addr = spawn_app(&upstream, store).await;
    let http = Client::new();
    let url = format!("http://{addr}/api/profile");

    let res = http.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // nothing to update yet
    let res = http.patch(&url).json(&json!({"goal": "bulk"})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = http
        .put(&url)
        .json(&json!({
            "name": "Ana", "email": "ana@example.com", "password": "secret",
            "weight": 58, "weightUnit": "kg", "heightCm": 160, "heightUnit": "cm",
            "age": 27, "sex": "female", "activityLevel": "Very Active", "goal": "maintain"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let saved: Value = res.json().await.unwrap();
    assert!(saved.get("password").is_none());

    let res = http.patch(&url).json(&json!({"goal": "bulk"})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["goal"], "bulk");
    assert_eq!(updated["name"], "Ana");

    let fetched: Value = http.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, updated);

    let res = http.patch(&url).json(&json!({"sex": "other"})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
    let fetched: Value = http.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched["sex"], "female");

    let res = http.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = http.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let upstream = MockServer::start().await;
    let addr = spawn_app(&upstream, Arc::new(MemoryProfileStore::new())).await;

    let big = "a".repeat(128 * 1024);
    let res = Client::new()
        .post(format!("http://{addr}/api/test"))
        .json(&json!({"userInput": big}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
