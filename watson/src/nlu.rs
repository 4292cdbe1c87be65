//! Natural Language Understanding service.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    http::{HttpClient, ServiceEndpoint},
};

/// Natural Language Understanding service.
pub struct NaturalLanguageUnderstandingService {
    http: Arc<HttpClient>,
    endpoint: ServiceEndpoint,
}

impl NaturalLanguageUnderstandingService {
    pub(crate) fn new(http: Arc<HttpClient>, endpoint: ServiceEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Analyzes text, HTML or a public web page.
    pub async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalysisResults> {
        let inputs = [&req.text, &req.html, &req.url]
            .iter()
            .filter(|v| v.is_some())
            .count();
        if inputs != 1 {
            return Err(Error::Config(
                "exactly one of text, html or url must be set".to_string(),
            ));
        }
        if req.features.is_empty() {
            return Err(Error::Config("at least one feature must be requested".to_string()));
        }
        let request = self.http.request(Method::POST, &self.endpoint, "/v1/analyze");
        self.http.post_json(request, req).await
    }
}

/// Analysis request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub features: Features,
    /// ISO 639-1 code of the input language; detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_analyzed_text: Option<bool>,
}

impl AnalyzeRequest {
    /// Creates a request analyzing `text`.
    pub fn text(text: impl Into<String>, features: Features) -> Self {
        Self {
            text: Some(text.into()),
            features,
            ..Default::default()
        }
    }
}

/// Analysis features. Each set field enables the feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoriesOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepts: Option<LimitOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<TargetedOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<LimitOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<LimitOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<TargetedOptions>,
}

impl Features {
    /// Returns true when no feature is enabled.
    pub fn is_empty(&self) -> bool {
        self.categories.is_none()
            && self.concepts.is_none()
            && self.emotion.is_none()
            && self.entities.is_none()
            && self.keywords.is_none()
            && self.sentiment.is_none()
    }

    /// Parses a comma separated feature list such as `sentiment,keywords`.
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut features = Features::default();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name {
                "categories" => features.categories = Some(Default::default()),
                "concepts" => features.concepts = Some(Default::default()),
                "emotion" => features.emotion = Some(Default::default()),
                "entities" => features.entities = Some(Default::default()),
                "keywords" => features.keywords = Some(Default::default()),
                "sentiment" => features.sentiment = Some(Default::default()),
                other => return Err(Error::Config(format!("unknown feature: {}", other))),
            }
        }
        Ok(features)
    }
}

/// Options of the categories feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoriesOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Options of features returning a ranked list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<bool>,
}

/// Options of features that can target phrases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetedOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

/// Analysis results.
///
/// Feature results are kept as JSON; the shape differs per feature and per
/// API version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(flatten)]
    pub features: Map<String, Value>,
}

impl AnalysisResults {
    /// Document sentiment label (`positive`, `neutral`, `negative`).
    pub fn sentiment_label(&self) -> Option<&str> {
        self.features
            .get("sentiment")?
            .get("document")?
            .get("label")?
            .as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_list() {
        let f = Features::parse_list("sentiment, keywords").unwrap();
        assert!(f.sentiment.is_some() && f.keywords.is_some());
        assert!(f.entities.is_none());
        assert!(Features::parse_list("syntax").is_err());
        assert!(Features::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_request_json() {
        let req = AnalyzeRequest::text("I love it", Features::parse_list("sentiment").unwrap());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"text": "I love it", "features": {"sentiment": {}}})
        );
    }

    #[test]
    fn test_sentiment_label() {
        let res: AnalysisResults = serde_json::from_str(
            r#"{"language":"en","sentiment":{"document":{"score":0.9,"label":"positive"}}}"#,
        )
        .unwrap();
        assert_eq!(res.language.as_deref(), Some("en"));
        assert_eq!(res.sentiment_label(), Some("positive"));
    }
}
