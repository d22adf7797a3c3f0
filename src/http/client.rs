//! HTTP client wrapper around the portal backend.
//!
//! Every request goes through [`ApiClient::execute`], which plays the role of
//! the request and response interceptors: it attaches the bearer token on the
//! way out, and on the way back turns a 401 into a cleared session plus a
//! redirect to the login route before the caller ever sees the error.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::ApiConfig;
use crate::error::{server_message, ApiError};
use crate::navigation::{Navigator, LOGIN_ROUTE};
use crate::session::SessionStore;
use crate::utils::log_throttle::LogThrottle;

const UNAUTHORIZED_LOG_WINDOW: Duration = Duration::from_secs(30);
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Which bearer credential a request carries.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Credential<'a> {
    /// Whatever the session store holds at send time, if anything.
    Session,
    /// A token not yet committed to the session (the profile fetch during login).
    Token(&'a str),
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    unauthorized_log: LogThrottle,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder().default_headers(default_headers);
        if let Some(timeout_in_ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(timeout_in_ms));
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(ApiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
            unauthorized_log: LogThrottle::new(UNAUTHORIZED_LOG_WINDOW),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(path, self.http.get(self.url(path)), Credential::Session)
            .await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.http.get(self.url(path)).query(query);
        self.execute(path, request, Credential::Session).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        self.execute(path, request, Credential::Session).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.put(self.url(path)).json(body);
        self.execute(path, request, Credential::Session).await
    }

    /// GET authenticated with an explicit token instead of the session's.
    pub(crate) async fn get_with_token<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        self.execute(path, self.http.get(self.url(path)), Credential::Token(token))
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
        credential: Credential<'_>,
    ) -> Result<T, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = request.header(REQUEST_ID_HEADER, &request_id);

        let token = match credential {
            Credential::Session => self.session.token(),
            Credential::Token(token) => Some(token.to_string()),
        };
        let authenticated = token.is_some();
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        debug!(path, request_id = %request_id, authenticated, "sending request");

        let response = request.send().await.map_err(|e| {
            warn!(path, request_id = %request_id, "request failed: {}", e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            let message = server_message(status, &body);
            self.on_unauthorized(path, &request_id).await;
            return Err(ApiError::Unauthorized { message });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = server_message(status, &body);
            debug!(path, request_id = %request_id, status = status.as_u16(), %message, "request rejected");
            return Err(ApiError::Rejected { status, message });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!(path, request_id = %request_id, status = status.as_u16(), "request succeeded");
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }

    /// The global authorization-failure handler. Runs for every call site, so the
    /// session is gone and the redirect issued even if the caller drops the error.
    async fn on_unauthorized(&self, path: &str, request_id: &str) {
        if let Err(e) = self.session.clear().await {
            error!("Failed to clear session after 401: {}", e);
        }
        self.navigator.navigate(LOGIN_ROUTE);

        if let Some(suppressed_count) = self.unauthorized_log.should_emit("http.unauthorized") {
            warn!(
                event_name = "http.unauthorized",
                event_domain = "http",
                path,
                request_id,
                suppressed_count,
                "authorization failure, session cleared and login required"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoleName, User};
    use crate::navigation::RecordingNavigator;
    use crate::storage::{MemoryStorage, Storage, TOKEN_KEY, USER_KEY};
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};

    struct Fixture {
        client: ApiClient,
        storage: Arc<MemoryStorage>,
        session: Arc<SessionStore>,
        navigator: Arc<RecordingNavigator>,
    }

    async fn fixture(url: String, logged_in: bool) -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let session = Arc::new(SessionStore::new(storage.clone()));
        if logged_in {
            session
                .commit(
                    "session-token".into(),
                    User::new(1, "123456789012", RoleName::Citizen),
                )
                .await
                .unwrap();
        }
        let navigator = Arc::new(RecordingNavigator::new());
        let config = ApiConfig {
            base_url: url,
            timeout_in_ms: None,
        };
        let client = ApiClient::new(&config, session.clone(), navigator.clone()).unwrap();
        Fixture {
            client,
            storage,
            session,
            navigator,
        }
    }

    #[tokio::test]
    async fn test_bearer_attached_when_session_present() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/citizen/profile")
            .match_header("authorization", "Bearer session-token")
            .match_header(REQUEST_ID_HEADER, Matcher::Any)
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let fx = fixture(server.url(), true).await;
        let body: Value = fx.client.get("/citizen/profile").await.unwrap();

        m.assert_async().await;
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_no_bearer_without_session() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/login")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(json!({"aadhar": "123456789012"})))
            .with_status(200)
            .with_body(r#"{"otp_id": "abc", "message": "sent", "expires_in": 300}"#)
            .create_async()
            .await;

        let fx = fixture(server.url(), false).await;
        let _: Value = fx
            .client
            .post("/auth/login", &json!({"aadhar": "123456789012"}))
            .await
            .unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session_and_redirects() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/appointments/my-appointments")
            .with_status(401)
            .with_body(r#"{"detail": "Token expired"}"#)
            .create_async()
            .await;

        let fx = fixture(server.url(), true).await;
        // The caller ignores the error entirely; the side effects still happen.
        let _ = fx
            .client
            .get::<Value>("/appointments/my-appointments")
            .await;

        assert!(!fx.session.is_authenticated());
        assert_eq!(fx.storage.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(fx.storage.get(USER_KEY).await.unwrap(), None);
        assert_eq!(fx.navigator.last().as_deref(), Some(LOGIN_ROUTE));
    }

    #[tokio::test]
    async fn test_unauthorized_error_carries_server_message() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/admin/onboarding-requests")
            .with_status(401)
            .with_body(r#"{"detail": "Token expired"}"#)
            .create_async()
            .await;

        let fx = fixture(server.url(), true).await;
        let err = fx
            .client
            .get::<Value>("/admin/onboarding-requests")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { message } if message == "Token expired"));
    }

    #[tokio::test]
    async fn test_other_failures_keep_the_session() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/mkisan/products")
            .with_status(403)
            .with_body(r#"{"detail": "Forbidden for role"}"#)
            .create_async()
            .await;

        let fx = fixture(server.url(), true).await;
        let err = fx.client.get::<Value>("/mkisan/products").await.unwrap_err();

        assert!(matches!(
            err,
            ApiError::Rejected { status, ref message }
                if status == StatusCode::FORBIDDEN && message == "Forbidden for role"
        ));
        assert!(fx.session.is_authenticated());
        assert!(fx.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_token_overrides_session() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/auth/me")
            .match_header("authorization", "Bearer fresh-token")
            .with_status(200)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let fx = fixture(server.url(), false).await;
        let _: Value = fx.client.get_with_token("/auth/me", "fresh-token").await.unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_network_error() {
        // Port 9 (discard) on localhost is not expected to accept connections.
        let fx = fixture("http://127.0.0.1:9".to_string(), false).await;
        let err = fx.client.get::<Value>("/auth/me").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/citizen/profile")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let fx = fixture(server.url(), true).await;
        let err = fx.client.get::<Value>("/citizen/profile").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
