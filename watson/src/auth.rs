//! Request authentication.
//!
//! Credentials are an opaque capability: an [`Authenticator`] is handed the
//! outgoing request headers and attaches whatever it needs. Token exchange
//! and refresh live outside this crate; plug them in by implementing the
//! trait.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::{Error, Result};

/// Attaches credentials to outgoing HTTP and WebSocket requests.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Adds authentication headers to `headers`.
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()>;

    /// Short name of the scheme, used in logs.
    fn auth_type(&self) -> &'static str;
}

/// Authenticator that adds nothing.
#[derive(Debug, Clone, Default)]
pub struct NoAuthAuthenticator;

#[async_trait]
impl Authenticator for NoAuthAuthenticator {
    async fn authenticate(&self, _headers: &mut HeaderMap) -> Result<()> {
        Ok(())
    }

    fn auth_type(&self) -> &'static str {
        "noAuth"
    }
}

/// HTTP basic authentication.
#[derive(Debug, Clone)]
pub struct BasicAuthenticator {
    username: String,
    password: String,
}

impl BasicAuthenticator {
    /// Creates a basic authenticator.
    ///
    /// Both values must be non-empty and must not be wrapped in braces or
    /// quotes, which usually means a template placeholder was left in.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        validate_credential("username", &username)?;
        validate_credential("password", &password)?;
        Ok(Self { username, password })
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        let encoded = BASE64.encode(format!("{}:{}", self.username, self.password));
        let value = HeaderValue::from_str(&format!("Basic {}", encoded))
            .map_err(|e| Error::Config(format!("invalid basic credentials: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    fn auth_type(&self) -> &'static str {
        "basic"
    }
}

/// Bearer token authentication with a caller-managed token.
#[derive(Debug, Clone)]
pub struct BearerTokenAuthenticator {
    token: String,
}

impl BearerTokenAuthenticator {
    /// Creates a bearer token authenticator.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        validate_credential("bearer token", &token)?;
        Ok(Self { token })
    }
}

#[async_trait]
impl Authenticator for BearerTokenAuthenticator {
    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| Error::Config(format!("invalid bearer token: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    fn auth_type(&self) -> &'static str {
        "bearerToken"
    }
}

fn validate_credential(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Config(format!("{} must be non-empty", name)));
    }
    let wrapped = |open: char, close: char| value.starts_with(open) && value.ends_with(close);
    if wrapped('{', '}') || wrapped('"', '"') {
        return Err(Error::Config(format!(
            "{} must not start or end with curly brackets or quotes",
            name
        )));
    }
    Ok(())
}
