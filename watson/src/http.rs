//! HTTP client shared by all Watson services.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT},
    Client as ReqwestClient, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::Authenticator;
use crate::error::{Error, Result};

/// Response header carrying the request's global transaction ID.
pub const TRANSACTION_ID_HEADER: &str = "X-Global-Transaction-Id";

/// HTTP client for Watson services.
///
/// Holds the authenticator and headers common to every request. Service
/// specific parts (URL, version date) live in [`ServiceEndpoint`].
pub struct HttpClient {
    client: ReqwestClient,
    authenticator: Arc<dyn Authenticator>,
    user_agent: String,
    default_headers: HeaderMap,
}

/// Base URL and API version of one service.
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    /// Service URL without trailing slash.
    pub url: String,
    /// API version date sent as the `version` query parameter, if the
    /// service requires one.
    pub version: Option<String>,
}

impl ServiceEndpoint {
    /// Creates an endpoint, stripping any trailing slash from `url`.
    pub fn new(url: impl Into<String>, version: Option<String>) -> Self {
        let url = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            version,
        }
    }

    /// Joins `path` onto the service URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    /// Returns the WebSocket URL for `path` (`https` → `wss`, `http` → `ws`).
    pub fn ws_url_for(&self, path: &str) -> String {
        let url = self.url_for(path);
        if let Some(rest) = url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            url
        }
    }
}

impl HttpClient {
    /// Creates a new HTTP client.
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        user_agent: String,
        default_headers: HeaderMap,
        timeout: Duration,
        disable_ssl_verification: bool,
    ) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(disable_ssl_verification)
            .build()?;

        Ok(Self {
            client,
            authenticator,
            user_agent,
            default_headers,
        })
    }

    /// Returns the authenticator.
    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Starts a request against `endpoint`, appending its version parameter.
    pub fn request(&self, method: Method, endpoint: &ServiceEndpoint, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, endpoint.url_for(path));
        if let Some(ref version) = endpoint.version {
            request = request.query(&[("version", version.as_str())]);
        }
        request
    }

    /// Sends a request and decodes the JSON response body.
    pub async fn send_json<R>(&self, request: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(request.header(ACCEPT, "application/json")).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(Error::from)
    }

    /// Sends a request with a JSON body and decodes the JSON response.
    pub async fn post_json<T, R>(&self, request: RequestBuilder, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(request.json(body)).await
    }

    /// Sends a request and returns the raw response body.
    pub async fn send_bytes(&self, request: RequestBuilder) -> Result<Bytes> {
        let response = self.send(request).await?;
        Ok(response.bytes().await?)
    }

    /// Sends a request with authentication and default headers applied.
    ///
    /// Non-2xx responses are converted to [`Error::Api`].
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let headers = self.headers().await?;
        let request = request.headers(headers).build()?;
        debug!(
            "{} {} (auth={})",
            request.method(),
            request.url(),
            self.authenticator.auth_type()
        );

        let response = self.client.execute(request).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }

    /// Returns the headers for a request: defaults, user agent, credentials.
    pub async fn headers(&self) -> Result<HeaderMap> {
        let mut headers = self.default_headers.clone();
        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| Error::Config(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, user_agent);
        self.authenticator.authenticate(&mut headers).await?;
        Ok(headers)
    }
}

/// Converts an error response into [`Error::Api`].
async fn error_from_response(response: Response) -> Error {
    let status = response.status().as_u16();
    let transaction_id = response
        .headers()
        .get(TRANSACTION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"));

    match response.bytes().await {
        Ok(body) => parse_error(&body, is_json, status, transaction_id),
        Err(e) => Error::Http(e),
    }
}

/// Builds an API error from a response body.
///
/// The services disagree on where they put the message, so the known
/// locations are tried in order: `errors[0].message`, `error`, `message`,
/// `errorMessage`.
pub(crate) fn parse_error(body: &[u8], is_json: bool, status: u16, transaction_id: String) -> Error {
    let mut message = None;
    let mut code = None;

    if is_json || body.first() == Some(&b'{') {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
            message = value
                .get("errors")
                .and_then(|e| e.get(0))
                .and_then(|e| e.get("message"))
                .or_else(|| value.get("error"))
                .or_else(|| value.get("message"))
                .or_else(|| value.get("errorMessage"))
                .and_then(|m| m.as_str())
                .map(str::to_string);
            code = value
                .get("code")
                .or_else(|| value.get("errors").and_then(|e| e.get(0)).and_then(|e| e.get("code")))
                .map(|c| match c {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
        }
    }

    let message = message.unwrap_or_else(|| {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            format!("request failed with status {}", status)
        } else {
            text
        }
    });

    Error::Api {
        status,
        message,
        code,
        transaction_id,
    }
}

/// Parses `name: value` pairs into a header map.
pub fn header_map<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Config(format!("invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("invalid header value: {}", e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_of(err: Error) -> (String, Option<String>) {
        match err {
            Error::Api { message, code, .. } => (message, code),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_error_shapes() {
        let (msg, code) = message_of(parse_error(
            br#"{"errors":[{"code":"missing_field","message":"text is required"}]}"#,
            true,
            400,
            String::new(),
        ));
        assert_eq!(msg, "text is required");
        assert_eq!(code.as_deref(), Some("missing_field"));

        let (msg, code) = message_of(parse_error(
            br#"{"error":"Model not found","code":404}"#,
            true,
            404,
            String::new(),
        ));
        assert_eq!(msg, "Model not found");
        assert_eq!(code.as_deref(), Some("404"));

        let (msg, _) = message_of(parse_error(br#"{"message":"nope"}"#, true, 400, String::new()));
        assert_eq!(msg, "nope");

        let (msg, _) = message_of(parse_error(
            br#"{"errorMessage":"quota"}"#,
            true,
            429,
            String::new(),
        ));
        assert_eq!(msg, "quota");
    }

    #[test]
    fn test_parse_error_plain_body() {
        let (msg, code) = message_of(parse_error(b"Bad Gateway", false, 502, String::new()));
        assert_eq!(msg, "Bad Gateway");
        assert!(code.is_none());

        let (msg, _) = message_of(parse_error(b"", false, 500, String::new()));
        assert_eq!(msg, "request failed with status 500");
    }

    #[test]
    fn test_ws_url_for() {
        let endpoint = ServiceEndpoint::new("https://api.example.com/instances/abc/", None);
        assert_eq!(
            endpoint.ws_url_for("/v1/recognize"),
            "wss://api.example.com/instances/abc/v1/recognize"
        );
        let local = ServiceEndpoint::new("http://127.0.0.1:9000", None);
        assert_eq!(local.ws_url_for("/v1/recognize"), "ws://127.0.0.1:9000/v1/recognize");
    }

    #[test]
    fn test_header_map() {
        let headers = header_map([("X-Watson-Learning-Opt-Out", "true")]).unwrap();
        assert_eq!(headers.get("x-watson-learning-opt-out").unwrap(), "true");
        assert!(header_map([("bad header", "x")]).is_err());
    }
}
