#![allow(clippy::result_large_err)]

mod error;
pub mod models;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::Value;
use validator::Validate;

pub use error::{ApiError, CallError, FieldError, TransportKind};
pub use models::{ClassificationSubmission, Credentials, Location, LoginRequest, RegisterRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const REGISTER: &str = "/api/auth/register";
    pub const LOGIN: &str = "/api/auth/login";
    pub const PROFILE: &str = "/api/auth/profile";
    pub const DASHBOARD: &str = "/api/user/dashboard";
    pub const CLASSIFICATION: &str = "/api/classification";
    pub const ARTICLES: &str = "/api/education/articles";
    pub const COMMUNITY_POSTS: &str = "/api/community/posts";
    pub const MAP_LOCATIONS: &str = "/api/waste-map/bank-sampah";
}

/// Bearer credential returned by login.
#[derive(Debug, Clone)]
pub struct SessionToken(secrecy::SecretString);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(secrecy::SecretString::from(token.into()))
    }

    fn header_value(&self) -> Result<reqwest::header::HeaderValue, CallError> {
        let mut value: reqwest::header::HeaderValue =
            format!("Bearer {}", self.0.expose_secret()).parse()?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// A 2xx response. Bodies that are not JSON are kept as a string value so
/// that shape checks can still report what came back.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: reqwest::StatusCode,
    pub body: Value,
}

impl Reply {
    fn from_bytes(
        status: reqwest::StatusCode,
        body: &[u8],
    ) -> Self {
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).to_string()))
        };

        Self { status, body }
    }

    pub fn message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
    }

    /// The session token from a login reply, at `token` or `data.token`.
    pub fn token(&self) -> Option<SessionToken> {
        self.body
            .get("token")
            .or_else(|| self.body.pointer("/data/token"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(SessionToken::new)
    }
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: url::Url,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, CallError> {
        let mut base_url = url::Url::parse(base_url)?;
        // endpoint paths are joined under the base path, never over it
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    pub fn url(
        &self,
        path: &str,
    ) -> Result<url::Url, CallError> {
        Ok(self
            .base_url
            .join(path.trim_start_matches('/'))?)
    }

    fn get(
        &self,
        path: &str,
    ) -> Result<reqwest::Request, CallError> {
        Ok(reqwest::Request::new(
            reqwest::Method::GET,
            self.url(path)?,
        ))
    }

    fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Request, CallError> {
        let mut request = reqwest::Request::new(reqwest::Method::POST, self.url(path)?);

        *request.body_mut() = Some(reqwest::Body::from(serde_json::to_vec(body)?));

        request.headers_mut().insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        Ok(request)
    }

    pub async fn perform(
        &self,
        req: reqwest::Request,
    ) -> Result<Reply, CallError> {
        tracing::debug!(method = %req.method(), url = %req.url(), "sending request");

        let resp = self.client.execute(req).await?;

        let status = resp.status();
        let body: bytes::Bytes = resp.bytes().await?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "received response");

        if status.is_success() {
            Ok(Reply::from_bytes(status, &body))
        } else {
            Err(CallError::Application {
                status,
                error: ApiError::from_body(&body),
            })
        }
    }

    pub async fn perform_authenticated(
        &self,
        req: reqwest::Request,
        token: &SessionToken,
    ) -> Result<Reply, CallError> {
        let mut req = req;

        req.headers_mut()
            .insert(reqwest::header::AUTHORIZATION, token.header_value()?);

        self.perform(req).await
    }

    pub async fn health(&self) -> Result<Reply, CallError> {
        self.perform(self.get(paths::HEALTH)?)
            .await
    }

    pub async fn register(
        &self,
        credentials: &Credentials,
    ) -> Result<Reply, CallError> {
        let request = self.post_json(paths::REGISTER, &RegisterRequest::from(credentials))?;
        self.perform(request).await
    }

    pub async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<Reply, CallError> {
        let request = self.post_json(paths::LOGIN, &LoginRequest::from(credentials))?;
        self.perform(request).await
    }

    pub async fn profile(
        &self,
        token: &SessionToken,
    ) -> Result<Reply, CallError> {
        self.perform_authenticated(self.get(paths::PROFILE)?, token)
            .await
    }

    pub async fn dashboard(
        &self,
        token: &SessionToken,
    ) -> Result<Reply, CallError> {
        self.perform_authenticated(self.get(paths::DASHBOARD)?, token)
            .await
    }

    /// Submissions are validated locally first; an invalid one never
    /// reaches the network.
    pub async fn submit_classification(
        &self,
        token: &SessionToken,
        submission: &ClassificationSubmission,
    ) -> Result<Reply, CallError> {
        submission.validate()?;

        let request = self.post_json(paths::CLASSIFICATION, submission)?;
        self.perform_authenticated(request, token)
            .await
    }

    /// Unauthenticated GET against any list endpoint.
    pub async fn list(
        &self,
        path: &str,
    ) -> Result<Reply, CallError> {
        self.perform(self.get(path)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case::test_case("http://localhost:5000" ; "bare host")]
    #[test_case::test_case("http://localhost:5000/" ; "trailing slash")]
    fn endpoints_at_root(base: &str) {
        let client = ApiClient::new(base, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.url(paths::HEALTH).unwrap().as_str(),
            "http://localhost:5000/health"
        );
    }

    #[test_case::test_case("http://backend.example/ecosort" ; "no trailing slash")]
    #[test_case::test_case("http://backend.example/ecosort/" ; "trailing slash")]
    fn endpoints_stay_under_base_path(base: &str) {
        let client = ApiClient::new(base, DEFAULT_TIMEOUT).unwrap();

        assert_eq!(
            client.url(paths::HEALTH).unwrap().as_str(),
            "http://backend.example/ecosort/health"
        );
        assert_eq!(
            client.url(paths::LOGIN).unwrap().as_str(),
            "http://backend.example/ecosort/api/auth/login"
        );
        assert_eq!(client.base_url().as_str(), "http://backend.example/ecosort/");
    }
}
