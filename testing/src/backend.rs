//! Mock of the waste-classification backend for harness tests
//!
//! Each method mounts the responses for one endpoint. Authenticated
//! endpoints only answer 2xx when the expected bearer token is presented and
//! fall back to 401 otherwise.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{header, method, path},
};

pub const TOKEN: &str = "test-session-token";

const HEALTH: &str = "/health";
const REGISTER: &str = "/api/auth/register";
const LOGIN: &str = "/api/auth/login";
const PROFILE: &str = "/api/auth/profile";
const DASHBOARD: &str = "/api/user/dashboard";
const CLASSIFICATION: &str = "/api/classification";
const ARTICLES: &str = "/api/education/articles";
const COMMUNITY_POSTS: &str = "/api/community/posts";
const MAP_LOCATIONS: &str = "/api/waste-map/bank-sampah";

pub struct MockBackend {
    server: MockServer,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Every endpoint answers successfully and login issues [`TOKEN`].
    pub async fn happy() -> Self {
        let backend = Self::start().await;
        backend.healthy().await;
        backend.registers().await;
        backend.logs_in(TOKEN).await;
        backend.profile(TOKEN).await;
        backend.dashboard(TOKEN).await;
        backend
            .accepts_classification(TOKEN)
            .await;
        backend.public_lists().await;
        backend
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub async fn respond(
        &self,
        verb: &str,
        route: &str,
        status: u16,
        body: Value,
    ) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn healthy(&self) {
        self.respond("GET", HEALTH, 200, json!({"message": "Server is running"}))
            .await;
    }

    pub async fn slow_health(
        &self,
        delay: Duration,
    ) {
        Mock::given(method("GET"))
            .and(path(HEALTH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Server is running"}))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn registers(&self) {
        self.respond(
            "POST",
            REGISTER,
            201,
            json!({"message": "User registered successfully"}),
        )
        .await;
    }

    pub async fn register_conflict(&self) {
        self.respond(
            "POST",
            REGISTER,
            400,
            json!({"message": "User already exists"}),
        )
        .await;
    }

    pub async fn logs_in(
        &self,
        token: &str,
    ) {
        self.respond(
            "POST",
            LOGIN,
            200,
            json!({"message": "Login successful", "token": token}),
        )
        .await;
    }

    pub async fn login_fails(&self) {
        self.respond(
            "POST",
            LOGIN,
            401,
            json!({"message": "Invalid credentials"}),
        )
        .await;
    }

    async fn authenticated(
        &self,
        verb: &str,
        route: &str,
        token: &str,
        status: u16,
        body: Value,
    ) {
        Mock::given(method(verb))
            .and(path(route))
            .and(header("Authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .with_priority(1)
            .mount(&self.server)
            .await;

        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "No token provided"})))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    pub async fn profile(
        &self,
        token: &str,
    ) {
        self.authenticated(
            "GET",
            PROFILE,
            token,
            200,
            json!({"data": {"fullName": "Test User", "email": "test@example.com"}}),
        )
        .await;
    }

    pub async fn dashboard(
        &self,
        token: &str,
    ) {
        self.authenticated(
            "GET",
            DASHBOARD,
            token,
            200,
            json!({"data": {"stats": {"totalClassifications": 3, "points": 30}}}),
        )
        .await;
    }

    pub async fn dashboard_without_stats(
        &self,
        token: &str,
    ) {
        self.authenticated(
            "GET",
            DASHBOARD,
            token,
            200,
            json!({"data": {"recent": []}}),
        )
        .await;
    }

    pub async fn accepts_classification(
        &self,
        token: &str,
    ) {
        self.authenticated(
            "POST",
            CLASSIFICATION,
            token,
            201,
            json!({"message": "Classification saved", "data": {"_id": "c1"}}),
        )
        .await;
    }

    pub async fn rejects_classification(
        &self,
        token: &str,
    ) {
        self.authenticated(
            "POST",
            CLASSIFICATION,
            token,
            400,
            json!({
                "message": "Validation failed",
                "errors": [{"path": "confidence", "msg": "Confidence must be between 0 and 1"}]
            }),
        )
        .await;
    }

    pub async fn classification_crashes(
        &self,
        token: &str,
    ) {
        self.authenticated(
            "POST",
            CLASSIFICATION,
            token,
            500,
            json!({"message": "Internal server error"}),
        )
        .await;
    }

    pub async fn public_lists(&self) {
        self.respond(
            "GET",
            ARTICLES,
            200,
            json!({"data": {"articles": [{"title": "Sorting 101"}, {"title": "Composting"}]}}),
        )
        .await;
        self.respond(
            "GET",
            COMMUNITY_POSTS,
            200,
            json!({"data": {"posts": [{"content": "hello"}]}}),
        )
        .await;
        self.respond(
            "GET",
            MAP_LOCATIONS,
            200,
            json!({"data": [{"name": "Bank Sampah Melati"}, {"name": "Bank Sampah Mawar"}, {"name": "Bank Sampah Kenanga"}]}),
        )
        .await;
    }

    /// Every request the backend has seen, in arrival order.
    pub async fn requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
    }

    pub async fn hits(
        &self,
        route: &str,
    ) -> usize {
        self.requests()
            .await
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }

    /// Paths in arrival order.
    pub async fn paths(&self) -> Vec<String> {
        self.requests()
            .await
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}
