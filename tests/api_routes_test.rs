mod support;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use hostel_desk::api::router;
use hostel_desk::db::MemorySessionStorage;
use hostel_desk::remote::HostelApi;
use hostel_desk::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use support::{FakeBackend, PASSWORD};
use tower::ServiceExt;

struct TestApp {
    backend: Arc<FakeBackend>,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let backend = FakeBackend::shared();
        let state = AppState::new(
            HostelApi::new(backend.clone()),
            Arc::new(MemorySessionStorage::new()),
            20,
            Duration::from_millis(200),
        );
        state.spawn_exit_reset();
        Self {
            backend,
            app: router(state),
        }
    }

    async fn logged_in() -> Self {
        let app = Self::new();
        let (status, _) = app
            .call("POST", "/session/login", Some(json!({ "email": "asha@hostel.test", "password": PASSWORD })))
            .await;
        assert_eq!(status, StatusCode::OK);
        app
    }

    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response is not JSON")
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_health_reports_session_and_cache() {
    let app = TestApp::new();

    let (status, body) = app.call("GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["cache"], "empty");
}

#[tokio::test]
async fn test_login_failure_maps_to_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app
        .call("POST", "/session/login", Some(json!({ "email": "asha@hostel.test", "password": "no" })))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (_, toasts) = app.call("GET", "/toasts", None).await;
    assert_eq!(toasts[0]["level"], "error");
}

#[tokio::test]
async fn test_login_then_browse_cached_collections() {
    let app = TestApp::logged_in().await;

    let (status, session) = app.call("GET", "/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["authenticated"], true);
    assert_eq!(session["identity"]["roomNo"], "B-204");

    let (status, stats) = app.call("POST", "/cache/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["issues"], 2);

    let (_, issues) = app.call("GET", "/issues", None).await;
    assert_eq!(issues.as_array().map(Vec::len), Some(2));
    assert_eq!(issues[1]["status"], "In Progress");

    let (_, cache) = app.call("GET", "/cache", None).await;
    assert_eq!(cache["phase"], "populated");
    assert_eq!(cache["messItems"][0]["day"], "Monday");
}

#[tokio::test]
async fn test_issue_mutations_go_through_the_cache() {
    let app = TestApp::logged_in().await;
    app.call("POST", "/cache/refresh", None).await;
    app.backend.reset_log();

    let (status, _) = app.call("POST", "/issues/1/vote", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.backend.count(Method::POST, "/api/issues/1/upvote"), 1);
    assert_eq!(app.backend.refreshes(), 1);

    let (status, _) = app
        .call("POST", "/issues/2/status", Some(json!({ "status": "Resolved" })))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, candidates) = app.call("GET", "/issues/1/candidates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(candidates[0]["id"], 11);

    let (status, _) = app.call("GET", "/issues/999/candidates", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upstream_rejection_keeps_status_and_message() {
    let app = TestApp::logged_in().await;
    app.backend.fail(
        Method::POST,
        "/api/notices",
        403,
        json!({ "error": "Admin only" }),
    );

    let (status, body) = app
        .call("POST", "/notices", Some(json!({ "title": "t", "content": "c" })))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin only");
}

#[tokio::test]
async fn test_exit_poll_lifecycle() {
    let app = TestApp::logged_in().await;

    let (status, _) = app.call("POST", "/hostel-exit/poll", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let (_, mine) = app.call("GET", "/hostel-exit/mine", None).await;
    assert_eq!(mine[0]["risk_level"], "low");

    let (status, _) = app.call("DELETE", "/hostel-exit/poll", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("DELETE", "/hostel-exit/poll", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call("POST", "/hostel-exit", Some(json!({ "description": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exit_poll_refused_for_anonymous_user() {
    let app = TestApp::new();

    let (status, _) = app.call("POST", "/hostel-exit/poll", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_timetable_falls_back_to_builtin_routes() {
    let app = TestApp::new();

    let (status, routes) = app.call("GET", "/timetable", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(routes.as_array().map(Vec::len), Some(2));
    assert!(routes[0]["times"].as_array().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_blank_nearby_shop_query_is_rejected() {
    let app = TestApp::logged_in().await;
    app.backend.reset_log();

    let (status, _) = app
        .call("POST", "/nearby-shops", Some(json!({ "query": "   " })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.backend.requests().is_empty());
}

#[tokio::test]
async fn test_logout_clears_session_view() {
    let app = TestApp::logged_in().await;

    let (status, _) = app.call("POST", "/session/logout", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, session) = app.call("GET", "/session", None).await;
    assert_eq!(session["authenticated"], false);
    assert!(session["identity"].is_null());
}

#[tokio::test]
async fn test_logout_empties_exit_board() {
    let app = TestApp::logged_in().await;
    let (status, _) = app.call("POST", "/hostel-exit/poll", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (_, mine) = app.call("GET", "/hostel-exit/mine", None).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let (status, _) = app.call("POST", "/session/logout", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, mine) = app.call("GET", "/hostel-exit/mine", None).await;
    assert_eq!(mine, json!([]));
    let (status, _) = app.call("DELETE", "/hostel-exit/poll", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_session_stops_exit_poll_and_empties_board() {
    let app = TestApp::logged_in().await;
    app.call("POST", "/hostel-exit/poll", None).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (_, mine) = app.call("GET", "/hostel-exit/mine", None).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    app.backend.fail(
        Method::GET,
        "/api/categories",
        401,
        json!({ "msg": "Token has expired" }),
    );
    let (status, _) = app.call("POST", "/cache/refresh", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let (_, mine) = app.call("GET", "/hostel-exit/mine", None).await;
    assert_eq!(mine, json!([]));
    let (status, _) = app.call("DELETE", "/hostel-exit/poll", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No further polls once the session is gone.
    let polls = app.backend.count(Method::GET, "/api/hostel-exit/my");
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(app.backend.count(Method::GET, "/api/hostel-exit/my"), polls);
}
