//! Text to Speech service.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    http::{HttpClient, ServiceEndpoint},
};

/// Default synthesis voice.
pub const DEFAULT_VOICE: &str = "en-US_MichaelV3Voice";

/// Default audio format of synthesized speech.
pub const DEFAULT_ACCEPT: &str = "audio/ogg;codecs=opus";

/// Text to Speech service.
pub struct TextToSpeechService {
    http: Arc<HttpClient>,
    endpoint: ServiceEndpoint,
}

impl TextToSpeechService {
    pub(crate) fn new(http: Arc<HttpClient>, endpoint: ServiceEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Lists the available voices.
    pub async fn list_voices(&self) -> Result<Voices> {
        let request = self.http.request(Method::GET, &self.endpoint, "/v1/voices");
        self.http.send_json(request).await
    }

    /// Gets one voice.
    pub async fn get_voice(&self, voice: &str) -> Result<Voice> {
        if voice.is_empty() {
            return Err(Error::Config("voice must be non-empty".to_string()));
        }
        let path = format!("/v1/voices/{}", voice);
        let request = self.http.request(Method::GET, &self.endpoint, &path);
        self.http.send_json(request).await
    }

    /// Synthesizes text and returns the audio.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use cogkit_watson::{Client, NoAuthAuthenticator, SynthesizeRequest};
    ///
    /// # async fn example() -> cogkit_watson::Result<()> {
    /// let client = Client::builder(NoAuthAuthenticator).build()?;
    /// let audio = client
    ///     .text_to_speech()
    ///     .synthesize(&SynthesizeRequest::new("Hello world").accept("audio/wav"))
    ///     .await?;
    /// std::fs::write("hello.wav", &audio).unwrap();
    /// # Ok(())
    /// # }
    /// ```
    pub async fn synthesize(&self, req: &SynthesizeRequest) -> Result<Bytes> {
        if req.text.is_empty() {
            return Err(Error::Config("text must be non-empty".to_string()));
        }

        let mut query = vec![(
            "voice",
            req.voice.clone().unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        )];
        if let Some(ref id) = req.customization_id {
            query.push(("customization_id", id.clone()));
        }
        if let Some(rate) = req.rate_percentage {
            query.push(("rate_percentage", rate.to_string()));
        }
        if let Some(pitch) = req.pitch_percentage {
            query.push(("pitch_percentage", pitch.to_string()));
        }

        let request = self
            .http
            .request(Method::POST, &self.endpoint, "/v1/synthesize")
            .query(&query)
            .header(ACCEPT, req.accept.as_deref().unwrap_or(DEFAULT_ACCEPT))
            .json(&SynthesizeBody { text: &req.text });

        self.http.send_bytes(request).await
    }
}

#[derive(Serialize)]
struct SynthesizeBody<'a> {
    text: &'a str,
}

/// Synthesis request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesizeRequest {
    /// Text to speak, plain or SSML.
    pub text: String,
    /// Voice name. Defaults to [`DEFAULT_VOICE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Audio MIME type. Defaults to [`DEFAULT_ACCEPT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization_id: Option<String>,
    /// Speaking rate change in percent, -100 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_percentage: Option<i32>,
    /// Pitch change in percent, -100 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_percentage: Option<i32>,
}

impl SynthesizeRequest {
    /// Creates a request for `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Sets the voice.
    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Sets the audio format.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

/// Voices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Voices {
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// A voice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub customizable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = SynthesizeRequest::new("hi").voice("en-GB_KateV3Voice").accept("audio/wav");
        assert_eq!(req.voice.as_deref(), Some("en-GB_KateV3Voice"));
        assert_eq!(req.accept.as_deref(), Some("audio/wav"));
        let body = serde_json::to_value(SynthesizeBody { text: &req.text }).unwrap();
        assert_eq!(body, serde_json::json!({"text": "hi"}));
    }

    #[test]
    fn test_voice_keeps_unknown_fields() {
        let voice: Voice = serde_json::from_str(
            r#"{"name":"en-US_AllisonV3Voice","language":"en-US","gender":"female",
                "description":"Allison","customizable":true,"supported_features":{}}"#,
        )
        .unwrap();
        assert_eq!(voice.gender, "female");
        assert!(voice.extra.contains_key("supported_features"));
    }
}
