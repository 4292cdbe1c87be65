//! Recognition options.

use serde::{Deserialize, Serialize};

/// Default recognition model.
pub const DEFAULT_MODEL: &str = "en-US_BroadbandModel";

/// Options for a recognition request.
///
/// Connection-level options (model, customizations, learning opt-out) travel
/// in the request URL and are never serialized, though they are read from
/// request files; everything else is sent in the start message of a
/// streaming session or as query parameters of a one-shot request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizeOptions {
    /// Audio MIME type, e.g. `audio/l16;rate=16000` or `audio/flac`.
    #[serde(rename = "content-type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Recognition model identifier.
    #[serde(default, skip_serializing)]
    pub model: Option<String>,
    /// Custom language model to use.
    #[serde(default, skip_serializing)]
    pub language_customization_id: Option<String>,
    /// Custom acoustic model to use.
    #[serde(default, skip_serializing)]
    pub acoustic_customization_id: Option<String>,
    /// Version of the base model the customizations were trained on.
    #[serde(default, skip_serializing)]
    pub base_model_version: Option<String>,
    /// Relative weight of the custom language model, 0.0 to 1.0.
    #[serde(default, skip_serializing)]
    pub customization_weight: Option<f64>,
    /// Opt out of request logging by the service.
    #[serde(default, skip_serializing)]
    pub learning_opt_out: Option<bool>,
    /// Customer ID to associate with the data.
    #[serde(default, skip_serializing)]
    pub customer_id: Option<String>,

    /// Seconds of silence after which the service closes the connection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactivity_timeout: Option<i32>,
    /// Send hypotheses before results are final.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interim_results: Option<bool>,
    /// Keywords to spot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// Minimum confidence for a keyword match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords_threshold: Option<f64>,
    /// Maximum number of alternatives per result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_alternatives: Option<i32>,
    /// Minimum confidence for word alternatives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_alternatives_threshold: Option<f64>,
    /// Include per-word confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_confidence: Option<bool>,
    /// Include per-word timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,
    /// Censor profanity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profanity_filter: Option<bool>,
    /// Format dates, times, numbers and so on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_formatting: Option<bool>,
    /// Identify speakers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_labels: Option<bool>,
    /// Grammar of the custom language model to apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar_name: Option<String>,
    /// Redact numeric data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redaction: Option<bool>,
    /// Include processing metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_metrics: Option<bool>,
    /// Interval in seconds between processing metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_metrics_interval: Option<f64>,
    /// Include audio metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_metrics: Option<bool>,
    /// Pause in seconds that ends a phrase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_of_phrase_silence_time: Option<f64>,
    /// Split the transcript into multiple results at phrase ends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_transcript_at_phrase_end: Option<bool>,
    /// Sensitivity of speech activity detection, 0.0 to 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_detector_sensitivity: Option<f64>,
    /// Level of background audio suppression, 0.0 to 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_audio_suppression: Option<f64>,
    /// Trade accuracy for lower latency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_latency: Option<bool>,
    /// Bias towards shorter or longer strings, -1.0 to 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_insertion_bias: Option<f64>,
}

impl RecognizeOptions {
    /// Creates options for the given content type.
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }

    /// Sets the model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Enables or disables interim results.
    pub fn interim_results(mut self, enabled: bool) -> Self {
        self.interim_results = Some(enabled);
        self
    }

    /// Query parameters that go into the WebSocket URL.
    pub fn connection_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push(&mut query, "model", self.model.as_ref());
        push(&mut query, "language_customization_id", self.language_customization_id.as_ref());
        push(&mut query, "acoustic_customization_id", self.acoustic_customization_id.as_ref());
        push(&mut query, "base_model_version", self.base_model_version.as_ref());
        push(&mut query, "customization_weight", self.customization_weight.as_ref());
        push(&mut query, "x-watson-learning-opt-out", self.learning_opt_out.as_ref());
        if let Some(ref customer_id) = self.customer_id {
            query.push(("x-watson-metadata", format!("customer_id={}", customer_id)));
        }
        query
    }

    /// Query parameters for a one-shot HTTP recognition request.
    ///
    /// The content type goes in the request header and the learning opt-out
    /// and customer id in their own headers, so none of them appear here.
    pub fn request_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push(&mut query, "model", self.model.as_ref());
        push(&mut query, "language_customization_id", self.language_customization_id.as_ref());
        push(&mut query, "acoustic_customization_id", self.acoustic_customization_id.as_ref());
        push(&mut query, "base_model_version", self.base_model_version.as_ref());
        push(&mut query, "customization_weight", self.customization_weight.as_ref());
        push(&mut query, "inactivity_timeout", self.inactivity_timeout.as_ref());
        if let Some(ref keywords) = self.keywords {
            query.push(("keywords", keywords.join(",")));
        }
        push(&mut query, "keywords_threshold", self.keywords_threshold.as_ref());
        push(&mut query, "max_alternatives", self.max_alternatives.as_ref());
        push(&mut query, "word_alternatives_threshold", self.word_alternatives_threshold.as_ref());
        push(&mut query, "word_confidence", self.word_confidence.as_ref());
        push(&mut query, "timestamps", self.timestamps.as_ref());
        push(&mut query, "profanity_filter", self.profanity_filter.as_ref());
        push(&mut query, "smart_formatting", self.smart_formatting.as_ref());
        push(&mut query, "speaker_labels", self.speaker_labels.as_ref());
        push(&mut query, "grammar_name", self.grammar_name.as_ref());
        push(&mut query, "redaction", self.redaction.as_ref());
        push(&mut query, "audio_metrics", self.audio_metrics.as_ref());
        push(&mut query, "end_of_phrase_silence_time", self.end_of_phrase_silence_time.as_ref());
        push(&mut query, "split_transcript_at_phrase_end", self.split_transcript_at_phrase_end.as_ref());
        push(&mut query, "speech_detector_sensitivity", self.speech_detector_sensitivity.as_ref());
        push(&mut query, "background_audio_suppression", self.background_audio_suppression.as_ref());
        push(&mut query, "low_latency", self.low_latency.as_ref());
        push(&mut query, "character_insertion_bias", self.character_insertion_bias.as_ref());
        query
    }
}

fn push<T: ToString>(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&T>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}
