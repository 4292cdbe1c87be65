//! Watson services client.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    assistant::AssistantService,
    auth::Authenticator,
    error::{Error, Result},
    http::{header_map, HttpClient, ServiceEndpoint},
    nlu::NaturalLanguageUnderstandingService,
    stt::SpeechToTextService,
    translator::LanguageTranslatorService,
    tts::TextToSpeechService,
};

/// Default Speech to Text service URL.
pub const DEFAULT_SPEECH_TO_TEXT_URL: &str =
    "https://api.us-south.speech-to-text.watson.cloud.ibm.com";

/// Default Text to Speech service URL.
pub const DEFAULT_TEXT_TO_SPEECH_URL: &str =
    "https://api.us-south.text-to-speech.watson.cloud.ibm.com";

/// Default Language Translator service URL.
pub const DEFAULT_LANGUAGE_TRANSLATOR_URL: &str =
    "https://api.us-south.language-translator.watson.cloud.ibm.com";

/// Default Natural Language Understanding service URL.
pub const DEFAULT_NATURAL_LANGUAGE_UNDERSTANDING_URL: &str =
    "https://api.us-south.natural-language-understanding.watson.cloud.ibm.com";

/// Default Assistant service URL.
pub const DEFAULT_ASSISTANT_URL: &str = "https://api.us-south.assistant.watson.cloud.ibm.com";

// API version dates used when the caller does not pin one.

/// Language Translator v3 version date.
pub const VERSION_LANGUAGE_TRANSLATOR: &str = "2018-05-01";
/// Natural Language Understanding v1 version date.
pub const VERSION_NATURAL_LANGUAGE_UNDERSTANDING: &str = "2022-04-07";
/// Assistant v1 version date.
pub const VERSION_ASSISTANT: &str = "2021-06-14";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("cogkit-watson-rust/", env!("CARGO_PKG_VERSION"));

/// Watson services client.
///
/// One client holds the credentials and transport settings; each service is
/// reached through an accessor that shares the same HTTP client.
///
/// # Example
///
/// ```rust,no_run
/// use cogkit_watson::{BearerTokenAuthenticator, Client};
///
/// # async fn example() -> cogkit_watson::Result<()> {
/// let client = Client::builder(BearerTokenAuthenticator::new("token")?)
///     .speech_to_text_url("https://api.eu-de.speech-to-text.watson.cloud.ibm.com")
///     .build()?;
///
/// let models = client.speech_to_text().list_models().await?;
/// println!("{} models", models.models.len());
/// # Ok(())
/// # }
/// ```
pub struct Client {
    http: Arc<HttpClient>,
    config: Arc<ClientConfig>,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub(crate) struct ClientConfig {
    pub(crate) speech_to_text: ServiceEndpoint,
    pub(crate) text_to_speech: ServiceEndpoint,
    pub(crate) language_translator: ServiceEndpoint,
    pub(crate) natural_language_understanding: ServiceEndpoint,
    pub(crate) assistant: ServiceEndpoint,
}

impl Client {
    /// Creates a new client builder.
    pub fn builder(authenticator: impl Authenticator + 'static) -> ClientBuilder {
        ClientBuilder::new(Arc::new(authenticator))
    }

    /// Returns the Speech to Text service.
    pub fn speech_to_text(&self) -> SpeechToTextService {
        SpeechToTextService::new(self.http.clone(), self.config.speech_to_text.clone())
    }

    /// Returns the Text to Speech service.
    pub fn text_to_speech(&self) -> TextToSpeechService {
        TextToSpeechService::new(self.http.clone(), self.config.text_to_speech.clone())
    }

    /// Returns the Language Translator service.
    pub fn language_translator(&self) -> LanguageTranslatorService {
        LanguageTranslatorService::new(self.http.clone(), self.config.language_translator.clone())
    }

    /// Returns the Natural Language Understanding service.
    pub fn natural_language_understanding(&self) -> NaturalLanguageUnderstandingService {
        NaturalLanguageUnderstandingService::new(
            self.http.clone(),
            self.config.natural_language_understanding.clone(),
        )
    }

    /// Returns the Assistant service.
    pub fn assistant(&self) -> AssistantService {
        AssistantService::new(self.http.clone(), self.config.assistant.clone())
    }

    /// Returns a reference to the internal HTTP client.
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }
}

/// Builder for creating a Watson client.
pub struct ClientBuilder {
    authenticator: Arc<dyn Authenticator>,
    speech_to_text_url: String,
    text_to_speech_url: String,
    language_translator_url: String,
    natural_language_understanding_url: String,
    assistant_url: String,
    version: Option<String>,
    user_agent: String,
    timeout: Duration,
    disable_ssl_verification: bool,
    headers: Vec<(String, String)>,
}

impl ClientBuilder {
    /// Creates a new client builder.
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            speech_to_text_url: DEFAULT_SPEECH_TO_TEXT_URL.to_string(),
            text_to_speech_url: DEFAULT_TEXT_TO_SPEECH_URL.to_string(),
            language_translator_url: DEFAULT_LANGUAGE_TRANSLATOR_URL.to_string(),
            natural_language_understanding_url: DEFAULT_NATURAL_LANGUAGE_UNDERSTANDING_URL
                .to_string(),
            assistant_url: DEFAULT_ASSISTANT_URL.to_string(),
            version: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            disable_ssl_verification: false,
            headers: Vec::new(),
        }
    }

    /// Sets the Speech to Text service URL.
    pub fn speech_to_text_url(mut self, url: impl Into<String>) -> Self {
        self.speech_to_text_url = url.into();
        self
    }

    /// Sets the Text to Speech service URL.
    pub fn text_to_speech_url(mut self, url: impl Into<String>) -> Self {
        self.text_to_speech_url = url.into();
        self
    }

    /// Sets the Language Translator service URL.
    pub fn language_translator_url(mut self, url: impl Into<String>) -> Self {
        self.language_translator_url = url.into();
        self
    }

    /// Sets the Natural Language Understanding service URL.
    pub fn natural_language_understanding_url(mut self, url: impl Into<String>) -> Self {
        self.natural_language_understanding_url = url.into();
        self
    }

    /// Sets the Assistant service URL.
    pub fn assistant_url(mut self, url: impl Into<String>) -> Self {
        self.assistant_url = url.into();
        self
    }

    /// Points every service at the same base URL.
    ///
    /// Useful against a proxy or a local test server.
    pub fn service_url(self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.speech_to_text_url(url.clone())
            .text_to_speech_url(url.clone())
            .language_translator_url(url.clone())
            .natural_language_understanding_url(url.clone())
            .assistant_url(url)
    }

    /// Pins the API version date of the versioned services.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables TLS certificate verification.
    pub fn disable_ssl_verification(mut self, disable: bool) -> Self {
        self.disable_ssl_verification = disable;
        self
    }

    /// Adds a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client> {
        let urls = [
            &self.speech_to_text_url,
            &self.text_to_speech_url,
            &self.language_translator_url,
            &self.natural_language_understanding_url,
            &self.assistant_url,
        ];
        for url in urls {
            validate_service_url(url)?;
        }

        let default_headers =
            header_map(self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        let http = HttpClient::new(
            self.authenticator,
            self.user_agent,
            default_headers,
            self.timeout,
            self.disable_ssl_verification,
        )?;

        let version = |default: &str| Some(self.version.clone().unwrap_or_else(|| default.to_string()));

        let config = ClientConfig {
            speech_to_text: ServiceEndpoint::new(self.speech_to_text_url.clone(), None),
            text_to_speech: ServiceEndpoint::new(self.text_to_speech_url.clone(), None),
            language_translator: ServiceEndpoint::new(
                self.language_translator_url.clone(),
                version(VERSION_LANGUAGE_TRANSLATOR),
            ),
            natural_language_understanding: ServiceEndpoint::new(
                self.natural_language_understanding_url.clone(),
                version(VERSION_NATURAL_LANGUAGE_UNDERSTANDING),
            ),
            assistant: ServiceEndpoint::new(self.assistant_url.clone(), version(VERSION_ASSISTANT)),
        };

        Ok(Client {
            http: Arc::new(http),
            config: Arc::new(config),
        })
    }
}

fn validate_service_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::Config("service url must be non-empty".to_string()));
    }
    if url.starts_with('{') || url.ends_with('}') || url.starts_with('"') || url.ends_with('"') {
        return Err(Error::Config(format!(
            "service url {:?} must not start or end with curly brackets or quotes",
            url
        )));
    }
    url::Url::parse(url).map_err(|e| Error::Config(format!("invalid service url {:?}: {}", url, e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NoAuthAuthenticator;

    #[test]
    fn test_build_defaults() {
        let client = Client::builder(NoAuthAuthenticator).build().unwrap();
        assert_eq!(client.config.speech_to_text.url, DEFAULT_SPEECH_TO_TEXT_URL);
        assert_eq!(client.config.speech_to_text.version, None);
        assert_eq!(
            client.config.assistant.version.as_deref(),
            Some(VERSION_ASSISTANT)
        );
    }

    #[test]
    fn test_version_override() {
        let client = Client::builder(NoAuthAuthenticator)
            .version("2023-01-01")
            .build()
            .unwrap();
        assert_eq!(
            client.config.language_translator.version.as_deref(),
            Some("2023-01-01")
        );
        assert_eq!(client.config.text_to_speech.version, None);
    }

    #[test]
    fn test_service_url_applies_to_all() {
        let client = Client::builder(NoAuthAuthenticator)
            .service_url("http://127.0.0.1:8080/")
            .build()
            .unwrap();
        assert_eq!(client.config.natural_language_understanding.url, "http://127.0.0.1:8080");
        assert_eq!(client.config.assistant.url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(Client::builder(NoAuthAuthenticator)
            .speech_to_text_url("{url}")
            .build()
            .is_err());
        assert!(Client::builder(NoAuthAuthenticator)
            .assistant_url("not a url")
            .build()
            .is_err());
        assert!(Client::builder(NoAuthAuthenticator)
            .header("bad header", "v")
            .build()
            .is_err());
    }
}
