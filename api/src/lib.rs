//! HTTP client for the lock service.
//!
//! # Architecture
//!
//! [`LockApi`] binds a base URL and a [`UserId`] to a tuned [`reqwest::Client`]
//! and speaks the service's small JSON protocol:
//!
//! | Method | Path            | Purpose                          |
//! |--------|-----------------|----------------------------------|
//! | GET    | `/api/get_name` | Display name for this user       |
//! | POST   | `/api/set_name` | Register a new display name      |
//! | GET    | `/api/status`   | Reported bolt position           |
//! | POST   | `/api/open`     | Actuate the lock open            |
//! | POST   | `/api/close`    | Actuate the lock closed          |
//!
//! Every request carries the user's opaque identifier in the `User-Id`
//! header. Responses are tiny envelopes with a `success` flag; a `false`
//! flag on a well-formed 2xx response is a refusal for the caller to
//! classify, not an [`ApiError`].
//!
//! # Error Handling
//!
//! Each call makes exactly one attempt. Retry cadence, if any, belongs to
//! the caller; the panel deliberately has none.

use std::sync::OnceLock;
use std::time::Duration;

use latch_types::{CommandKind, UserId};
use serde::Deserialize;
use thiserror::Error;

/// Header naming the registered user on every request.
pub const USER_ID_HEADER: &str = "User-Id";

const CONNECT_TIMEOUT_SECS: u64 = 30;

// TCP keepalive idle time; interval/retries use platform defaults.
const TCP_KEEPALIVE_SECS: u64 = 60;

// Connection pool settings. The panel talks to exactly one host.
const POOL_MAX_IDLE_PER_HOST: usize = 4;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build tuned HTTP client: {e}. Attempting minimal fallback.");
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Minimal HTTP client must build; cannot reach the lock service without one")
        })
    })
}

// The service is typically a plain-HTTP host on the local network, so no
// https_only here. Redirects are refused: the panel expects to talk to the
// service directly, and a redirect means the base URL is wrong.
fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

pub fn http_client_with_timeout(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Reads an error response body, capped so a misbehaving server cannot
/// balloon memory.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

// ============================================================================
// Errors
// ============================================================================

/// Failure of a single call to the lock service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Server answered outside the 2xx range.
    #[error("server returned {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },
    /// The request never completed (DNS, connect, timeout, mid-body IO).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// 2xx response whose body is not the expected envelope.
    #[error("malformed response: {0}")]
    Malformed(String),
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
struct NameBody {
    success: bool,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckBody {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    success: bool,
    #[serde(default)]
    locked: Option<bool>,
}

/// Outcome of a status read that produced a well-formed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReading {
    /// The server reported the bolt position.
    Reported { locked: bool },
    /// The server answered but declined to report.
    Refused,
}

// ============================================================================
// Client
// ============================================================================

/// Client for one lock service instance, bound to one user.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct LockApi {
    client: reqwest::Client,
    base_url: String,
    user_id: UserId,
}

impl LockApi {
    /// Client backed by the process-wide pool, with no overall request
    /// timeout (connect timeout still applies).
    #[must_use]
    pub fn new(base_url: impl Into<String>, user_id: UserId) -> Self {
        Self::with_client(http_client().clone(), base_url, user_id)
    }

    /// Client with an overall per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        user_id: UserId,
        timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            http_client_with_timeout(timeout_secs)?,
            base_url,
            user_id,
        ))
    }

    fn with_client(client: reqwest::Client, base_url: impl Into<String>, user_id: UserId) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client,
            base_url,
            user_id,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Looks up the display name registered for this user.
    ///
    /// `Ok(None)` means the server answered but has no usable name on file,
    /// which the caller treats as "not registered".
    pub async fn get_name(&self) -> Result<Option<String>, ApiError> {
        let body: NameBody = self.send_get("/api/get_name").await?;
        if !body.success {
            return Ok(None);
        }
        Ok(body.name.filter(|name| !name.trim().is_empty()))
    }

    /// Registers a new display name for this user. `Ok(false)` is a refusal.
    pub async fn set_name(&self, name: &str) -> Result<bool, ApiError> {
        let payload = serde_json::json!({ "name": name });
        let body: AckBody = self.send_post("/api/set_name", Some(&payload)).await?;
        Ok(body.success)
    }

    /// Reads the reported bolt position.
    pub async fn status(&self) -> Result<StatusReading, ApiError> {
        let body: StatusBody = self.send_get("/api/status").await?;
        match (body.success, body.locked) {
            (true, Some(locked)) => Ok(StatusReading::Reported { locked }),
            (true, None) => Err(ApiError::Malformed(
                "status response is missing the locked field".to_string(),
            )),
            (false, _) => Ok(StatusReading::Refused),
        }
    }

    /// Sends an open or close actuation. `Ok(false)` is a refusal.
    pub async fn command(&self, kind: CommandKind) -> Result<bool, ApiError> {
        let path = match kind {
            CommandKind::Open => "/api/open",
            CommandKind::Close => "/api/close",
        };
        let body: AckBody = self.send_post(path, None).await?;
        Ok(body.success)
    }

    async fn send_get<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(self.endpoint(path))
            .header(USER_ID_HEADER, self.user_id.as_str())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn send_post<T>(
        &self,
        path: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut request = self
            .client
            .post(self.endpoint(path))
            .header(USER_ID_HEADER, self.user_id.as_str());
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T>(response: reqwest::Response) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(ApiError::Http { status, body });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}
