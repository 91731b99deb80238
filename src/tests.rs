//! Integration tests for the academy backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::client::{
    ClientError, ContactSubmissionsHook, CoursesHook, Notification, NotificationLog, QueryCache,
    RemoteClient, Resource, Severity,
};
use crate::config::{Config, LogFormat};
use crate::models::{ContactSubmission, Course};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_session_ttl(24 * 60 * 60).await
    }

    async fn with_session_ttl(session_ttl_secs: u64) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = Config {
            db_path: temp_dir.path().join("test.sqlite"),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Pretty,
            admin_username: "admin".to_string(),
            admin_initial_password: "admin123".to_string(),
            session_ttl_secs,
            seed_catalogue: true,
        };

        let state = AppState::initialize(config)
            .await
            .expect("Failed to init state");
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login_with(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/admin/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Log in as the default admin and return the session token.
    async fn login(&self) -> String {
        self.token_for("admin123").await
    }

    async fn token_for(&self, password: &str) -> String {
        let resp = self.login_with("admin", password).await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    fn put(&self, path: &str, token: &str, body: Value) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(&body)
    }

    fn delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    async fn remote(&self) -> RemoteClient {
        let mut remote = RemoteClient::new(&self.base_url).unwrap();
        remote.login("admin", "admin123").await.unwrap();
        remote
    }
}

async fn json_of(resp: reqwest::Response) -> Value {
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_public_courses_list_catalogue_newest_first() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/courses"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body = json_of(resp).await;
    assert_eq!(body["success"], true);
    let courses = body["data"].as_array().unwrap();
    assert_eq!(courses.len(), 5);
    assert_eq!(courses[0]["title"], "Buy High Sell High - ABCD");
    assert_eq!(courses[4]["title"], "50MA & SMC Basics");
    assert_eq!(courses[0]["icon_name"], "TrendingUp");
    assert_eq!(courses[0]["features"].as_array().unwrap().len(), 4);
    assert!(body["revision_id"].is_number());
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/courses"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body = json_of(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = fixture
        .get("/api/admin/courses", "forged-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_login_grants_dashboard_access() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let resp = fixture
        .get("/api/admin/session", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_of(resp).await;
    assert_eq!(body["data"]["username"], "admin");

    // The session header works as well as a bearer token
    let resp = fixture
        .client
        .get(fixture.url("/api/admin/overview"))
        .header("x-admin-session", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_login_failures_are_generic() {
    let fixture = TestFixture::new().await;

    let mut messages = Vec::new();
    for (username, password) in [
        ("admin", "wrong"),
        ("Admin", "admin123"),
        ("admin", "ADMIN123"),
        ("someone", "admin123"),
    ] {
        let resp = fixture.login_with(username, password).await;
        assert_eq!(resp.status(), 401);
        let body = json_of(resp).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert!(body.get("data").is_none());
        messages.push(body["error"]["message"].as_str().unwrap().to_string());
    }

    assert!(messages.iter().all(|m| m == &messages[0]));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .get("/api/admin/session", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_session_expires_after_window() {
    let fixture = TestFixture::with_session_ttl(1).await;
    let token = fixture.login().await;

    let resp = fixture
        .get("/api/admin/session", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    tokio::time::sleep(tokio::time::Duration::from_millis(2100)).await;

    let resp = fixture
        .get("/api/admin/session", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body = json_of(resp).await;
    assert_eq!(body["error"]["code"], "SESSION_EXPIRED");

    // The expired session was cleared, not just rejected
    let resp = fixture
        .get("/api/admin/session", &token)
        .send()
        .await
        .unwrap();
    let body = json_of(resp).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_password_change_rules() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let cases = [
        json!({ "current_password": "admin123", "new_password": "abc", "confirm_password": "abc" }),
        json!({ "current_password": "admin123", "new_password": "abcdef", "confirm_password": "abcdeg" }),
        json!({ "current_password": "not-it", "new_password": "abcdef", "confirm_password": "abcdef" }),
    ];
    for case in cases {
        let resp = fixture
            .put("/api/admin/password", &token, case)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body = json_of(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    // Nothing changed yet
    let resp = fixture.login_with("admin", "admin123").await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_password_change_takes_effect_on_next_login() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;
    let other = fixture.login().await;

    let resp = fixture
        .put(
            "/api/admin/password",
            &token,
            json!({
                "current_password": "admin123",
                "new_password": "s3cure!",
                "confirm_password": "s3cure!"
            }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture.login_with("admin", "admin123").await;
    assert_eq!(resp.status(), 401);
    fixture.token_for("s3cure!").await;

    // The caller keeps its session; other sessions are revoked
    let resp = fixture
        .get("/api/admin/session", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp = fixture
        .get("/api/admin/session", &other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_course_crud() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    // Create course
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/courses"))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Options Basics",
            "duration": "2 Weeks",
            "level": "Beginner",
            "price": "₹5,000",
            "features": ["Calls and Puts", "Option Greeks"],
            "icon_name": "Target"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_of(resp).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["version"], 1);

    // Newest course lists first
    let body = json_of(fixture.get("/api/admin/courses", &token).send().await.unwrap()).await;
    assert_eq!(body["data"][0]["id"], id.as_str());
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    // Deactivate, then reactivate
    let path = format!("/api/admin/courses/{}", id);
    let body = json_of(
        fixture
            .put(&path, &token, json!({ "is_active": false }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"]["is_active"], false);
    assert_eq!(body["data"]["title"], "Options Basics");
    assert_eq!(body["data"]["version"], 2);

    let public = json_of(
        fixture
            .client
            .get(fixture.url("/api/courses"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert!(public["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["id"] != id.as_str()));

    let body = json_of(
        fixture
            .put(&path, &token, json!({ "is_active": true }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"]["is_active"], true);

    // Delete
    let resp = fixture.delete(&path, &token).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture.get(&path, &token).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body = json_of(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let resp = fixture.delete(&path, &token).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_course_title_required() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/courses"))
        .bearer_auth(&token)
        .json(&json!({ "title": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_optimistic_concurrency_conflict() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let body = json_of(fixture.get("/api/admin/courses", &token).send().await.unwrap()).await;
    let id = body["data"][0]["id"].as_str().unwrap().to_string();
    let path = format!("/api/admin/courses/{}", id);

    let resp = fixture
        .put(&path, &token, json!({ "price": "₹14,000", "expected_version": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // A second writer still holding version 1 loses
    let resp = fixture
        .put(&path, &token, json!({ "price": "₹9,000", "expected_version": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body = json_of(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VERSION_MISMATCH");
    assert_eq!(body["error"]["details"]["current_version"], 2);

    let body = json_of(fixture.get(&path, &token).send().await.unwrap()).await;
    assert_eq!(body["data"]["price"], "₹14,000");
}

#[tokio::test]
async fn test_contact_submission_flow() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "phone": "+91 98765 43210",
            "message": "When does the next ABCD batch start?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_of(resp).await;
    assert_eq!(body["data"]["status"], "new");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Submissions are not public
    let resp = fixture
        .client
        .get(fixture.url("/api/admin/contact-submissions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let token = fixture.login().await;
    let body = json_of(
        fixture
            .get("/api/admin/contact-submissions", &token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"][0]["id"], id.as_str());

    // Any status may follow any status
    let path = format!("/api/admin/contact-submissions/{}", id);
    for status in ["archived", "new", "replied", "custom"] {
        let body = json_of(
            fixture
                .put(&path, &token, json!({ "status": status }))
                .send()
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["data"]["status"], status);
    }

    let resp = fixture.delete(&path, &token).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_of(
        fixture
            .get("/api/admin/contact-submissions", &token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_contact_validation_errors() {
    let fixture = TestFixture::new().await;

    for payload in [
        json!({ "name": "", "email": "a@b.c", "message": "hi" }),
        json!({ "name": "A", "email": "nope", "message": "hi" }),
        json!({ "name": "A", "email": "a@b.c", "message": "  " }),
    ] {
        let resp = fixture
            .client
            .post(fixture.url("/api/contact"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body = json_of(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_page_copy_editing() {
    let fixture = TestFixture::new().await;

    let body = json_of(
        fixture
            .client
            .get(fixture.url("/api/pages/mission"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"]["title"], "Our Mission");

    let body = json_of(
        fixture
            .client
            .get(fixture.url("/api/pages"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    // Editing requires a session
    let resp = fixture
        .client
        .put(fixture.url("/api/admin/pages/home"))
        .json(&json!({ "title": "New headline" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let token = fixture.login().await;
    let resp = fixture
        .put(
            "/api/admin/pages/home",
            &token,
            json!({ "title": "New headline", "expected_version": 1 }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body = json_of(
        fixture
            .client
            .get(fixture.url("/api/pages/home"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"]["title"], "New headline");
    assert_eq!(body["data"]["version"], 2);

    let resp = fixture
        .client
        .get(fixture.url("/api/pages/pricing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_overview_counts() {
    let fixture = TestFixture::new().await;

    fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({ "name": "Meera", "email": "meera@example.com", "message": "Hello" }))
        .send()
        .await
        .unwrap();

    let token = fixture.login().await;
    let body = json_of(fixture.get("/api/admin/courses", &token).send().await.unwrap()).await;
    let id = body["data"][0]["id"].as_str().unwrap().to_string();
    fixture
        .put(
            &format!("/api/admin/courses/{}", id),
            &token,
            json!({ "is_active": false }),
        )
        .send()
        .await
        .unwrap();

    let body = json_of(fixture.get("/api/admin/overview", &token).send().await.unwrap()).await;
    assert_eq!(body["data"]["total_courses"], 5);
    assert_eq!(body["data"]["active_courses"], 4);
    assert_eq!(body["data"]["total_submissions"], 1);
    assert_eq!(body["data"]["new_submissions"], 1);
}

#[tokio::test]
async fn test_revision_increments_on_writes() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let body = json_of(
        fixture
            .client
            .get(fixture.url("/api/revision"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let initial = body["data"]["revision_id"].as_i64().unwrap();

    let body = json_of(fixture.get("/api/admin/courses", &token).send().await.unwrap()).await;
    let id = body["data"][0]["id"].as_str().unwrap().to_string();
    let path = format!("/api/admin/courses/{}", id);

    let body = json_of(
        fixture
            .put(&path, &token, json!({ "level": "Expert" }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["revision_id"].as_i64().unwrap(), initial + 1);

    let body = json_of(fixture.delete(&path, &token).send().await.unwrap()).await;
    assert_eq!(body["revision_id"].as_i64().unwrap(), initial + 2);
}

#[tokio::test]
async fn test_courses_hook_against_backend() {
    let fixture = TestFixture::new().await;
    let remote = fixture.remote().await;

    let log = Arc::new(NotificationLog::new());
    let cache = QueryCache::new();
    let courses = CoursesHook::new(Arc::new(remote), cache.clone(), log.clone());

    let state = courses.list().await;
    assert!(!state.is_error());
    assert_eq!(state.items.len(), 5);
    let id = state.items[1].id.clone();

    courses.set_active(&id, false).await.unwrap();
    assert!(!cache.is_fresh(Course::KEY));
    let state = courses.list().await;
    let course = state.items.iter().find(|c| c.id == id).unwrap();
    assert_eq!(course.is_active, Some(false));

    courses.set_active(&id, true).await.unwrap();
    let state = courses.list().await;
    let course = state.items.iter().find(|c| c.id == id).unwrap();
    assert_eq!(course.is_active, Some(true));

    courses.delete(&id).await.unwrap();
    let state = courses.list().await;
    assert_eq!(state.items.len(), 4);
    assert!(state.items.iter().all(|c| c.id != id));

    let notes = log.drain();
    assert_eq!(notes.len(), 3);
    assert_eq!(notes[2], Notification::success("Course deleted successfully"));
}

#[tokio::test]
async fn test_submissions_hook_failure_leaves_cache() {
    let fixture = TestFixture::new().await;
    fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({ "name": "Kiran", "email": "kiran@example.com", "message": "Fees?" }))
        .send()
        .await
        .unwrap();

    let remote = fixture.remote().await;
    let log = Arc::new(NotificationLog::new());
    let cache = QueryCache::new();
    let submissions = ContactSubmissionsHook::new(Arc::new(remote), cache.clone(), log.clone());

    let state = submissions.list().await;
    assert_eq!(state.items.len(), 1);
    let before = cache.get::<ContactSubmission>(ContactSubmission::KEY).unwrap();

    let err = submissions
        .update_status("missing-id", "read")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Remote { status: 404, .. }));
    assert_eq!(
        cache.get::<ContactSubmission>(ContactSubmission::KEY).unwrap(),
        before
    );

    let id = before[0].id.clone();
    let updated = submissions.update_status(&id, "read").await.unwrap();
    assert_eq!(updated.status.as_deref(), Some("read"));
    let state = submissions.list().await;
    assert_eq!(state.items[0].status.as_deref(), Some("read"));

    let notes = log.drain();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].severity, Severity::Destructive);
    assert_eq!(notes[0].description, "Failed to update status");
    assert_eq!(notes[1].description, "Status updated successfully");
}

#[tokio::test]
async fn test_hook_without_session_shows_error_state() {
    let fixture = TestFixture::new().await;
    let remote = RemoteClient::new(&fixture.base_url).unwrap();

    let courses = CoursesHook::new(
        Arc::new(remote),
        QueryCache::new(),
        Arc::new(NotificationLog::new()),
    );
    let state = courses.list().await;
    assert!(state.items.is_empty());
    assert!(state.error.unwrap().is_unauthorized());
}

#[tokio::test]
async fn test_remote_conflict_is_reported() {
    let fixture = TestFixture::new().await;
    let remote = fixture.remote().await;
    let log = Arc::new(NotificationLog::new());
    let courses = CoursesHook::new(Arc::new(remote), QueryCache::new(), log.clone());

    let id = courses.list().await.items[0].id.clone();
    let stale = crate::models::UpdateCourseRequest {
        price: Some("₹1".to_string()),
        expected_version: Some(42),
        ..Default::default()
    };
    let err = courses.update(&id, &stale).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(
        log.drain(),
        vec![Notification::failure("Failed to update course")]
    );
}

#[tokio::test]
async fn test_remote_client_logout_drops_token() {
    let fixture = TestFixture::new().await;
    let mut remote = fixture.remote().await;
    let token = remote.token().unwrap().to_string();

    // A second client reusing the token shares the session
    let shared = RemoteClient::new(&fixture.base_url)
        .unwrap()
        .with_token(token.clone());
    let courses: Vec<Course> = shared.get(Course::ADMIN_PATH).await.unwrap();
    assert_eq!(courses.len(), 5);

    remote.logout().await.unwrap();
    assert!(remote.token().is_none());

    let err = shared.get::<Vec<Course>>(Course::ADMIN_PATH).await.unwrap_err();
    assert!(err.is_unauthorized());
}
