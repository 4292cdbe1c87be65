//! Language Translator service.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    http::{HttpClient, ServiceEndpoint},
};

/// Language Translator service.
pub struct LanguageTranslatorService {
    http: Arc<HttpClient>,
    endpoint: ServiceEndpoint,
}

impl LanguageTranslatorService {
    pub(crate) fn new(http: Arc<HttpClient>, endpoint: ServiceEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Translates text.
    ///
    /// Either `model_id` or both `source` and `target` must be set; with only
    /// `target` the service detects the source language.
    pub async fn translate(&self, req: &TranslateRequest) -> Result<TranslationResult> {
        if req.text.is_empty() {
            return Err(Error::Config("text must be non-empty".to_string()));
        }
        if req.model_id.is_none() && req.target.is_none() {
            return Err(Error::Config("model_id or target must be set".to_string()));
        }
        let request = self.http.request(Method::POST, &self.endpoint, "/v3/translate");
        self.http.post_json(request, req).await
    }

    /// Identifies the language of `text`.
    pub async fn identify(&self, text: &str) -> Result<IdentifiedLanguages> {
        let request = self
            .http
            .request(Method::POST, &self.endpoint, "/v3/identify")
            .header(CONTENT_TYPE, "text/plain")
            .body(text.to_string());
        self.http.send_json(request).await
    }

    /// Lists the languages [`identify`](Self::identify) can detect.
    pub async fn list_identifiable_languages(&self) -> Result<IdentifiableLanguages> {
        let request = self
            .http
            .request(Method::GET, &self.endpoint, "/v3/identifiable_languages");
        self.http.send_json(request).await
    }

    /// Lists translation models, optionally filtered by language pair.
    pub async fn list_models(&self, source: Option<&str>, target: Option<&str>) -> Result<TranslationModels> {
        let mut request = self.http.request(Method::GET, &self.endpoint, "/v3/models");
        if let Some(source) = source {
            request = request.query(&[("source", source)]);
        }
        if let Some(target) = target {
            request = request.query(&[("target", target)]);
        }
        self.http.send_json(request).await
    }
}

/// Translation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslateRequest {
    /// Texts to translate.
    pub text: Vec<String>,
    /// Model to use, e.g. `en-de`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl TranslateRequest {
    /// Creates a request translating `text` into `target`.
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: vec![text.into()],
            target: Some(target.into()),
            ..Default::default()
        }
    }

    /// Sets the source language.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Translation result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationResult {
    #[serde(default)]
    pub word_count: i64,
    #[serde(default)]
    pub character_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language_confidence: Option<f64>,
    #[serde(default)]
    pub translations: Vec<Translation>,
}

/// One translated text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Translation {
    pub translation: String,
}

/// Languages detected in a text, most likely first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifiedLanguages {
    #[serde(default)]
    pub languages: Vec<IdentifiedLanguage>,
}

impl IdentifiedLanguages {
    /// Most likely language.
    pub fn best(&self) -> Option<&IdentifiedLanguage> {
        self.languages
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}

/// A detected language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifiedLanguage {
    pub language: String,
    pub confidence: f64,
}

/// Identifiable languages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifiableLanguages {
    #[serde(default)]
    pub languages: Vec<IdentifiableLanguage>,
}

/// An identifiable language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifiableLanguage {
    pub language: String,
    #[serde(default)]
    pub name: String,
}

/// Translation models.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationModels {
    #[serde(default)]
    pub models: Vec<TranslationModel>,
}

/// A translation model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationModel {
    pub model_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub base_model_id: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub customizable: bool,
    #[serde(default, rename = "default")]
    pub is_default: bool,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_request_json() {
        let req = TranslateRequest::new("Hello", "de").source("en");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"text": ["Hello"], "source": "en", "target": "de"})
        );
    }

    #[test]
    fn test_best_language() {
        let langs: IdentifiedLanguages = serde_json::from_str(
            r#"{"languages":[{"language":"nl","confidence":0.1},{"language":"en","confidence":0.8}]}"#,
        )
        .unwrap();
        assert_eq!(langs.best().unwrap().language, "en");
        assert!(IdentifiedLanguages::default().best().is_none());
    }
}
