//! Speech to Text service.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use crate::{
    error::{Error, Result},
    http::{HttpClient, ServiceEndpoint},
    recognize::{
        RecognizeOptions, RecognizeSession, RecognizeSessionConfig, SpeechRecognitionResult,
        SpeakerLabel,
    },
};

/// Path of the recognition endpoint, HTTP and WebSocket alike.
const RECOGNIZE_PATH: &str = "/v1/recognize";

/// Request header that opts the request out of service-side logging.
const LEARNING_OPT_OUT_HEADER: &str = "X-Watson-Learning-Opt-Out";

/// Request header that tags the data with a customer ID.
const METADATA_HEADER: &str = "X-Watson-Metadata";

/// Speech to Text service.
pub struct SpeechToTextService {
    http: Arc<HttpClient>,
    endpoint: ServiceEndpoint,
}

impl SpeechToTextService {
    pub(crate) fn new(http: Arc<HttpClient>, endpoint: ServiceEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Lists the available recognition models.
    pub async fn list_models(&self) -> Result<SpeechModels> {
        let request = self.http.request(Method::GET, &self.endpoint, "/v1/models");
        self.http.send_json(request).await
    }

    /// Gets one recognition model.
    pub async fn get_model(&self, model_id: &str) -> Result<SpeechModel> {
        if model_id.is_empty() {
            return Err(Error::Config("model_id must be non-empty".to_string()));
        }
        let path = format!("/v1/models/{}", model_id);
        let request = self.http.request(Method::GET, &self.endpoint, &path);
        self.http.send_json(request).await
    }

    /// Recognizes a complete audio file in one HTTP request.
    pub async fn recognize(
        &self,
        audio: impl Into<Bytes>,
        options: &RecognizeOptions,
    ) -> Result<SpeechRecognitionResults> {
        let mut request = self
            .http
            .request(Method::POST, &self.endpoint, RECOGNIZE_PATH)
            .query(&options.request_query())
            .body(audio.into());

        if let Some(ref content_type) = options.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if let Some(opt_out) = options.learning_opt_out {
            request = request.header(LEARNING_OPT_OUT_HEADER, opt_out.to_string());
        }
        if let Some(ref customer_id) = options.customer_id {
            request = request.header(METADATA_HEADER, format!("customer_id={}", customer_id));
        }

        self.http.send_json(request).await
    }

    /// Prepares a streaming recognition session.
    ///
    /// Builds the WebSocket URL from the connection options and attaches the
    /// authentication headers. Call [`RecognizeSession::start`] to connect.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use cogkit_watson::{CallbackFns, Client, NoAuthAuthenticator, RecognizeOptions};
    ///
    /// # async fn example() -> cogkit_watson::Result<()> {
    /// let client = Client::builder(NoAuthAuthenticator).build()?;
    /// let audio = std::fs::read("speech.wav").unwrap();
    /// let session = client
    ///     .speech_to_text()
    ///     .recognize_using_websocket(audio, RecognizeOptions::new("audio/wav"), Default::default())
    ///     .await?;
    /// let handle = session.start(
    ///     CallbackFns::new().with_final_result(|text| println!("{}", text)),
    ///     &tokio::runtime::Handle::current(),
    /// );
    /// let summary = handle.join().await?;
    /// println!("{}", summary.transcript);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn recognize_using_websocket(
        &self,
        audio: impl Into<Bytes>,
        options: RecognizeOptions,
        config: RecognizeSessionConfig,
    ) -> Result<RecognizeSession> {
        let url = self.websocket_url(&options)?;

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| Error::Connection(format!("failed to build request: {}", e)))?;
        request.headers_mut().extend(self.http.headers().await?);

        Ok(RecognizeSession::new(request, options, audio.into(), config))
    }

    fn websocket_url(&self, options: &RecognizeOptions) -> Result<url::Url> {
        let base = self.endpoint.ws_url_for(RECOGNIZE_PATH);
        let query = options.connection_query();
        let url = if query.is_empty() {
            url::Url::parse(&base)
        } else {
            url::Url::parse_with_params(&base, query.iter().map(|(k, v)| (*k, v.as_str())))
        };
        url.map_err(|e| Error::Config(format!("invalid websocket url {:?}: {}", base, e)))
    }
}

/// Recognition models.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechModels {
    #[serde(default)]
    pub models: Vec<SpeechModel>,
}

/// A recognition model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechModel {
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub rate: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_features: Option<SupportedFeatures>,
    #[serde(default)]
    pub description: String,
}

/// Features a model supports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportedFeatures {
    #[serde(default)]
    pub custom_language_model: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_acoustic_model: Option<bool>,
    #[serde(default)]
    pub speaker_labels: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_latency: Option<bool>,
}

/// Response of a one-shot recognition request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechRecognitionResults {
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
    #[serde(default)]
    pub result_index: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_labels: Option<Vec<SpeakerLabel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SpeechRecognitionResults {
    /// Concatenates the top transcript of every final result.
    pub fn transcript(&self) -> String {
        self.results
            .iter()
            .filter(|r| r.is_final)
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::NoAuthAuthenticator, Client};

    fn service(url: &str) -> SpeechToTextService {
        Client::builder(NoAuthAuthenticator)
            .speech_to_text_url(url)
            .build()
            .unwrap()
            .speech_to_text()
    }

    #[test]
    fn test_websocket_url() {
        let stt = service("https://api.eu-de.speech-to-text.watson.cloud.ibm.com/instances/abc");
        let opts = RecognizeOptions::new("audio/wav").model("de-DE_Multimedia");
        let url = stt.websocket_url(&opts).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://api.eu-de.speech-to-text.watson.cloud.ibm.com/instances/abc/v1/recognize?model=de-DE_Multimedia"
        );
    }

    #[test]
    fn test_websocket_url_escapes_metadata() {
        let stt = service("http://127.0.0.1:9000");
        let opts = RecognizeOptions {
            customer_id: Some("a b".to_string()),
            ..Default::default()
        };
        let url = stt.websocket_url(&opts).unwrap();
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.query(), Some("x-watson-metadata=customer_id%3Da+b"));
    }

    #[tokio::test]
    async fn test_session_url_uses_wss() {
        let client = Client::builder(crate::auth::BearerTokenAuthenticator::new("tok").unwrap())
            .build()
            .unwrap();
        let session = client
            .speech_to_text()
            .recognize_using_websocket(Bytes::new(), RecognizeOptions::default(), Default::default())
            .await
            .unwrap();
        assert!(session.url().starts_with("wss://api.us-south.speech-to-text"));
    }

    #[test]
    fn test_results_transcript() {
        let json = r#"{"result_index":0,"results":[
            {"final":true,"alternatives":[{"transcript":"one "}]},
            {"final":false,"alternatives":[{"transcript":"tw"}]},
            {"final":true,"alternatives":[{"transcript":"three "}]}
        ],"processing_metrics":{}}"#;
        let results: SpeechRecognitionResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.transcript(), "one three ");
        assert!(results.extra.contains_key("processing_metrics"));
    }
}
