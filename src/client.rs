//! Scratch API client.
//!
//! Low-level HTTP client that handles request headers, session credentials,
//! and raw requests. Higher-level operations are implemented on the model
//! types and through the [`Get`](crate::Get) and [`List`](crate::List) traits.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, COOKIE, REFERER};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, Endpoints};
use crate::error::{Result, ScratchError};
use crate::session::Session;

const USER_AGENT: &str = concat!("scratchapi/", env!("CARGO_PKG_VERSION"));

/// Body the platform sends instead of a 429 status on some hosts.
const TOO_MANY_REQUESTS: &str = "Too many requests";

/// Low-level Scratch API client.
///
/// Holds the configuration, the connection pool, and an optional [`Session`].
/// Records created through a client keep a clone of it; clones share the
/// connection pool and the session.
///
/// # Example
///
/// ```no_run
/// use scratchapi::{ClientConfig, ScratchClient, Session};
///
/// # fn example() -> scratchapi::Result<()> {
/// // Read-only access
/// let client = ScratchClient::anonymous()?;
///
/// // Logged in
/// let session = Session::new("username", "session-id", "csrf-token");
/// let client = ScratchClient::new(ClientConfig::default())?.with_session(session)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ScratchClient {
    http: Client,
    config: Arc<ClientConfig>,
    endpoints: Arc<Endpoints>,
    session: Option<Arc<Session>>,
    headers: Arc<HeaderMap>,
    anonymous_headers: Arc<HeaderMap>,
}

impl std::fmt::Debug for ScratchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchClient")
            .field("api_url", &self.endpoints.api.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ScratchClient {
    /// Create an anonymous client for the public platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn anonymous() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Create a client from environment variables.
    ///
    /// Base URLs come from [`ClientConfig::from_env`]. A session is attached
    /// when `SCRATCH_SESSION_ID` is set, see [`Session::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if a session is partially configured or a URL is invalid.
    pub fn from_env() -> Result<Self> {
        let client = Self::new(ClientConfig::from_env())?;
        if std::env::var("SCRATCH_SESSION_ID").is_ok() {
            client.with_session(Session::from_env()?)
        } else {
            Ok(client)
        }
    }

    /// Create an anonymous client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let endpoints = Endpoints::parse(&config)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .build()
            .map_err(ScratchError::HttpError)?;

        let anonymous_headers = Arc::new(header_template(&endpoints, None)?);

        Ok(Self {
            http,
            config: Arc::new(config),
            endpoints: Arc::new(endpoints),
            session: None,
            headers: anonymous_headers.clone(),
            anonymous_headers,
        })
    }

    /// Return a client that acts as `session`.
    ///
    /// Records created by `self` keep their original session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session values cannot be sent as headers.
    pub fn with_session(&self, session: Session) -> Result<Self> {
        let headers = header_template(&self.endpoints, Some(&session))?;
        Ok(Self {
            session: Some(Arc::new(session)),
            headers: Arc::new(headers),
            ..self.clone()
        })
    }

    /// The attached session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The REST API base URL.
    pub fn api_base(&self) -> &Url {
        &self.endpoints.api
    }

    /// Fail with [`ScratchError::Unauthenticated`] unless a session is attached.
    pub fn require_session(&self) -> Result<&Session> {
        self.session().ok_or(ScratchError::Unauthenticated)
    }

    /// Require a session whose user is `owner`.
    ///
    /// # Errors
    ///
    /// [`ScratchError::Unauthenticated`] without a session,
    /// [`ScratchError::Unauthorized`] if the session user is someone else.
    pub fn require_owner(&self, owner: &str, action: &'static str) -> Result<&Session> {
        let session = self.require_session()?;
        if session.is_owner(owner) {
            Ok(session)
        } else {
            Err(ScratchError::Unauthorized { action })
        }
    }

    pub(crate) fn api_url(&self, path: &str) -> Result<Url> {
        Ok(self.endpoints.api.join(path)?)
    }

    pub(crate) fn site_url(&self, path: &str) -> Result<Url> {
        Ok(self.endpoints.site.join(path)?)
    }

    pub(crate) fn projects_url(&self, path: &str) -> Result<Url> {
        Ok(self.endpoints.projects.join(path)?)
    }

    pub(crate) fn scratchdb_url(&self, path: &str) -> Result<Url> {
        Ok(self.endpoints.scratchdb.join(path)?)
    }

    pub(crate) fn nfe_url(&self, path: &str) -> Result<Url> {
        Ok(self.endpoints.nfe.join(path)?)
    }

    /// Start a request carrying this client's header template.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .headers(self.headers.as_ref().clone())
    }

    /// Start a request carrying the anonymous header template, even when a
    /// session is attached.
    pub fn request_anonymous(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .headers(self.anonymous_headers.as_ref().clone())
    }

    /// Send a request and convert error statuses.
    #[tracing::instrument(skip_all)]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(ScratchError::HttpError)?;
        tracing::debug!(status = %response.status(), url = %response.url(), "response");
        Self::check_response(response).await
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, url: Url) -> Result<Response> {
        self.send(self.request(Method::GET, url)).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        url: Url,
        query: &Q,
    ) -> Result<Response> {
        self.send(self.request(Method::GET, url).query(query)).await
    }

    /// Make a PUT request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn put<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<Response> {
        self.send(
            self.request(Method::PUT, url)
                .header(ACCEPT, "application/json")
                .json(body),
        )
        .await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<Response> {
        self.send(
            self.request(Method::POST, url)
                .header(ACCEPT, "application/json")
                .json(body),
        )
        .await
    }

    /// Make a DELETE request.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, url: Url) -> Result<Response> {
        self.send(self.request(Method::DELETE, url)).await
    }

    /// Decode a JSON response body.
    ///
    /// Bodies that report rate limiting or carry an error `code` are
    /// converted to [`ScratchError::RateLimited`] and
    /// [`ScratchError::NotAccessible`] even when the status was 200.
    pub async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await.map_err(ScratchError::HttpError)?;
        let value: Value = serde_json::from_str(&body)?;
        if let Some(err) = body_error(&value) {
            return Err(err);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ScratchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => {
                return Err(ScratchError::ApiError {
                    message: format!("HTTP {status}"),
                    status_code: Some(status.as_u16()),
                })
            }
        };

        let json = serde_json::from_str::<Value>(&body).ok();
        if let Some(err) = json.as_ref().and_then(body_error) {
            return Err(err);
        }

        Err(ScratchError::ApiError {
            message: json
                .as_ref()
                .and_then(extract_error_message)
                .unwrap_or(body),
            status_code: Some(status.as_u16()),
        })
    }
}

/// Error signalled by a JSON body rather than by the status code.
fn body_error(json: &Value) -> Option<ScratchError> {
    let obj = json.as_object()?;

    if obj.get("response").and_then(Value::as_str) == Some(TOO_MANY_REQUESTS) {
        return Some(ScratchError::RateLimited {
            retry_after_secs: None,
        });
    }

    let code = obj.get("code")?;
    Some(ScratchError::NotAccessible {
        code: match code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        message: obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn extract_error_message(json: &Value) -> Option<String> {
    json.get("message")
        .or_else(|| json.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Headers sent with every request of a client.
fn header_template(endpoints: &Endpoints, session: Option<&Session>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers.insert(REFERER, header_value(endpoints.site.as_str())?);

    match session {
        Some(session) => {
            headers.insert(
                HeaderName::from_static("x-csrftoken"),
                header_value(session.csrf_token())?,
            );
            headers.insert(COOKIE, header_value(&session.cookie())?);
            if let Some(token) = session.x_token() {
                headers.insert(HeaderName::from_static("x-token"), header_value(token)?);
            }
        }
        None => {
            headers.insert(
                HeaderName::from_static("x-csrftoken"),
                HeaderValue::from_static("a"),
            );
            headers.insert(
                COOKIE,
                HeaderValue::from_static("scratchcsrftoken=a;scratchlanguage=en;"),
            );
        }
    }

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| ScratchError::InvalidInput(format!("invalid header value '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug_hides_secrets() {
        let client = ScratchClient::anonymous()
            .unwrap()
            .with_session(Session::new("user", "secret-sid", "secret-csrf"))
            .unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("ScratchClient"));
        assert!(debug.contains("api_url"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_with_session_leaves_original_anonymous() {
        let anonymous = ScratchClient::anonymous().unwrap();
        let logged_in = anonymous
            .with_session(Session::new("user", "sid", "csrf"))
            .unwrap();

        assert!(anonymous.session().is_none());
        assert_eq!(logged_in.session().unwrap().username(), "user");
        assert!(matches!(
            anonymous.require_session(),
            Err(ScratchError::Unauthenticated)
        ));
    }

    #[test]
    fn test_require_owner() {
        let client = ScratchClient::anonymous()
            .unwrap()
            .with_session(Session::new("alice", "sid", "csrf"))
            .unwrap();

        assert!(client.require_owner("Alice", "share").is_ok());
        assert!(matches!(
            client.require_owner("bob", "share"),
            Err(ScratchError::Unauthorized { action: "share" })
        ));
    }

    #[test]
    fn test_session_headers() {
        let endpoints = Endpoints::parse(&ClientConfig::default()).unwrap();
        let session = Session::new("user", "sid", "csrf").with_x_token("tok");
        let headers = header_template(&endpoints, Some(&session)).unwrap();

        assert_eq!(headers["x-csrftoken"], "csrf");
        assert_eq!(headers["x-token"], "tok");
        assert!(headers[COOKIE].to_str().unwrap().contains("scratchsessionsid"));

        let anonymous = header_template(&endpoints, None).unwrap();
        assert_eq!(anonymous["x-csrftoken"], "a");
        assert!(anonymous.get("x-token").is_none());
    }

    #[test]
    fn test_invalid_session_value_rejected() {
        let client = ScratchClient::anonymous().unwrap();
        let result = client.with_session(Session::new("user", "bad\nsid", "csrf"));
        assert!(matches!(result, Err(ScratchError::InvalidInput(_))));
    }

    #[test]
    fn test_body_error_detection() {
        let limited = serde_json::json!({"response": "Too many requests"});
        assert!(body_error(&limited).unwrap().is_rate_limited());

        let missing = serde_json::json!({"code": "NotFound", "message": ""});
        match body_error(&missing) {
            Some(ScratchError::NotAccessible { code, .. }) => assert_eq!(code, "NotFound"),
            other => panic!("unexpected: {:?}", other),
        }

        let ok = serde_json::json!({"id": 1, "title": "x"});
        assert!(body_error(&ok).is_none());
        assert!(body_error(&serde_json::json!([])).is_none());
    }
}
