//! Wire messages of the streaming recognition protocol.
//!
//! Outbound: one JSON start message, binary audio frames, an empty binary
//! end-of-stream frame and a JSON stop message. Inbound: JSON text frames
//! decoded into [`ServerMessage`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::error::{Error, Result};
use crate::recognize::options::RecognizeOptions;

/// Action of the start control message.
pub const ACTION_START: &str = "start";
/// Action of the stop control message.
pub const ACTION_STOP: &str = "stop";
/// State reported by the service when it waits for audio.
pub const STATE_LISTENING: &str = "listening";

/// Client-to-server control message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ControlMessage {
    /// Opens a recognition request with the given options.
    Start(RecognizeOptions),
    /// Ends the recognition request.
    Stop,
}

impl ControlMessage {
    /// Encodes the message as a control frame.
    pub fn to_frame(&self) -> Result<Frame> {
        Ok(Frame::Control(serde_json::to_string(self)?))
    }
}

/// Outbound frame produced by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// JSON control message.
    Control(String),
    /// Audio chunk. An empty payload marks the end of the audio stream.
    Audio(Bytes),
}

impl Frame {
    /// Returns true for the empty end-of-stream frame.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Frame::Audio(data) if data.is_empty())
    }
}

impl From<Frame> for WsMessage {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Control(text) => WsMessage::Text(text.into()),
            Frame::Audio(data) => WsMessage::Binary(data),
        }
    }
}

/// Server-to-client message.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// The service rejected something; the stream may still be open.
    Error(ErrorMessage),
    /// Recognition results.
    Results(ResultsMessage),
    /// State notification, e.g. `listening`.
    State(StateMessage),
    /// Speaker diarization results.
    SpeakerLabels(SpeakerLabelsMessage),
    /// Any other JSON object.
    Unrecognized(Value),
}

impl ServerMessage {
    /// Decodes a text frame.
    ///
    /// The discriminant is the presence of a key, checked in the order
    /// `error`, `results`, `speaker_labels`, `state`. Invalid JSON is an
    /// error; valid JSON of another shape is [`ServerMessage::Unrecognized`].
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;

        let Some(object) = value.as_object() else {
            return Ok(ServerMessage::Unrecognized(value));
        };

        if let Some(error) = object.get("error") {
            return Ok(ServerMessage::Error(ErrorMessage {
                error: error_text(error),
                code: object.get("code").and_then(lenient_code),
                warnings: object.get("warnings").and_then(string_list),
            }));
        }
        if object.contains_key("results") {
            return Ok(ServerMessage::Results(serde_json::from_value(value)?));
        }
        if object.contains_key("speaker_labels") {
            return Ok(ServerMessage::SpeakerLabels(serde_json::from_value(value)?));
        }
        if let Some(state) = object.get("state") {
            let state = match state {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Ok(ServerMessage::State(StateMessage { state }));
        }
        Ok(ServerMessage::Unrecognized(value))
    }
}

/// Text of an `error` value. Objects contribute their `message` field.
fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    }
}

/// Accepts numeric codes sent either as numbers or as strings.
fn lenient_code(code: &Value) -> Option<i64> {
    match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Error message from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Error description.
    pub error: String,
    /// Error code, when the service sends one.
    #[serde(default)]
    pub code: Option<i64>,
    /// Warnings accompanying the error.
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

impl From<ErrorMessage> for Error {
    fn from(msg: ErrorMessage) -> Self {
        Error::Protocol {
            message: msg.error,
            code: msg.code,
        }
    }
}

/// State notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    /// The state, `listening` in practice.
    pub state: String,
}

impl StateMessage {
    /// Returns true for the `listening` state.
    pub fn is_listening(&self) -> bool {
        self.state == STATE_LISTENING
    }
}

/// Results message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsMessage {
    /// Results, the first one being the current segment.
    #[serde(default)]
    pub results: Vec<SpeechRecognitionResult>,
    /// Index of the first result within the session.
    #[serde(default)]
    pub result_index: i32,
    /// Warnings from the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

/// One recognition result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechRecognitionResult {
    /// Whether the service will revise this result further.
    #[serde(rename = "final", default)]
    pub is_final: bool,
    /// Hypotheses, best first.
    #[serde(default)]
    pub alternatives: Vec<SpeechRecognitionAlternative>,
    /// Keyword matches keyed by keyword.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords_result: Option<Value>,
    /// Word alternatives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_alternatives: Option<Vec<WordAlternativeResults>>,
    /// Why the result ended, when `split_transcript_at_phrase_end` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_utterance: Option<String>,
}

/// One transcription hypothesis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechRecognitionAlternative {
    /// Transcribed text.
    pub transcript: String,
    /// Confidence, 0.0 to 1.0. Only present on final results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// `[word, start, end]` triples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<(String, f64, f64)>>,
    /// `[word, confidence]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_confidence: Option<Vec<(String, f64)>>,
}

/// Word alternatives over a time span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordAlternativeResults {
    pub start_time: f64,
    pub end_time: f64,
    pub alternatives: Vec<WordAlternativeResult>,
}

/// One word alternative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordAlternativeResult {
    pub confidence: f64,
    pub word: String,
}

/// Speaker labels message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerLabelsMessage {
    pub speaker_labels: Vec<SpeakerLabel>,
}

/// Speaker of a time span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerLabel {
    pub from: f64,
    pub to: f64,
    pub speaker: i64,
    pub confidence: f64,
    #[serde(rename = "final", default)]
    pub is_final: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_message() {
        let msg = ControlMessage::Start(RecognizeOptions {
            content_type: Some("audio/l16;rate=16000".to_string()),
            interim_results: Some(true),
            model: Some("en-US_Multimedia".to_string()),
            ..Default::default()
        });
        let Frame::Control(text) = msg.to_frame().unwrap() else {
            panic!("start message must be a control frame");
        };
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["action"], "start");
        assert_eq!(value["content-type"], "audio/l16;rate=16000");
        assert_eq!(value["interim_results"], true);
        assert!(value.get("model").is_none());
    }

    #[test]
    fn test_stop_message() {
        let frame = ControlMessage::Stop.to_frame().unwrap();
        assert_eq!(frame, Frame::Control(r#"{"action":"stop"}"#.to_string()));
        assert_eq!(
            WsMessage::from(frame),
            WsMessage::Text(r#"{"action":"stop"}"#.into())
        );
    }

    #[test]
    fn test_decode_error() {
        let msg = ServerMessage::decode(r#"{"error": "bad audio format"}"#).unwrap();
        let ServerMessage::Error(err) = msg else {
            panic!("expected error message");
        };
        assert_eq!(err.error, "bad audio format");
        assert_eq!(err.code, None);
    }

    #[test]
    fn test_decode_error_shapes() {
        let msg = ServerMessage::decode(r#"{"error": {"message": "bad audio format"}}"#).unwrap();
        let ServerMessage::Error(err) = msg else {
            panic!("expected error message");
        };
        assert_eq!(err.error, "bad audio format");

        let msg = ServerMessage::decode(r#"{"error": "bad audio format", "code": "400"}"#).unwrap();
        let ServerMessage::Error(err) = msg else {
            panic!("expected error message");
        };
        assert_eq!(err.error, "bad audio format");
        assert_eq!(err.code, Some(400));

        let msg = ServerMessage::decode(r#"{"error": 42, "code": 1.5, "warnings": ["w", 1]}"#).unwrap();
        let ServerMessage::Error(err) = msg else {
            panic!("expected error message");
        };
        assert_eq!(err.error, "42");
        assert_eq!(err.code, None);
        assert_eq!(err.warnings, Some(vec!["w".to_string(), "1".to_string()]));
    }

    #[test]
    fn test_decode_non_string_state() {
        let msg = ServerMessage::decode(r#"{"state": 1}"#).unwrap();
        let ServerMessage::State(state) = msg else {
            panic!("expected state message");
        };
        assert_eq!(state.state, "1");
        assert!(!state.is_listening());
    }

    #[test]
    fn test_decode_state() {
        let msg = ServerMessage::decode(r#"{"state": "listening"}"#).unwrap();
        let ServerMessage::State(state) = msg else {
            panic!("expected state message");
        };
        assert!(state.is_listening());
    }

    #[test]
    fn test_decode_results() {
        let json = r#"{
            "result_index": 0,
            "results": [{
                "final": true,
                "alternatives": [
                    {"transcript": "hello world ", "confidence": 0.92,
                     "timestamps": [["hello", 0.1, 0.4], ["world", 0.5, 0.9]]},
                    {"transcript": "yellow world "}
                ]
            }]
        }"#;
        let ServerMessage::Results(results) = ServerMessage::decode(json).unwrap() else {
            panic!("expected results message");
        };
        let first = &results.results[0];
        assert!(first.is_final);
        assert_eq!(first.alternatives.len(), 2);
        assert_eq!(first.alternatives[0].confidence, Some(0.92));
        assert_eq!(first.alternatives[0].timestamps.as_ref().unwrap()[1].0, "world");
        assert_eq!(first.alternatives[1].confidence, None);
    }

    #[test]
    fn test_decode_speaker_labels() {
        let json = r#"{"speaker_labels": [
            {"from": 0.0, "to": 1.5, "speaker": 0, "confidence": 0.8, "final": false}
        ]}"#;
        let ServerMessage::SpeakerLabels(labels) = ServerMessage::decode(json).unwrap() else {
            panic!("expected speaker labels");
        };
        assert_eq!(labels.speaker_labels[0].to, 1.5);
    }

    #[test]
    fn test_decode_unrecognized() {
        let msg = ServerMessage::decode(r#"{"processing_metrics": {}}"#).unwrap();
        assert!(matches!(msg, ServerMessage::Unrecognized(_)));
        let msg = ServerMessage::decode("[1, 2]").unwrap();
        assert!(matches!(msg, ServerMessage::Unrecognized(_)));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            ServerMessage::decode("{not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_frame_into_ws() {
        let eos = Frame::Audio(Bytes::new());
        assert!(eos.is_end_of_stream());
        assert_eq!(WsMessage::from(eos), WsMessage::Binary(Bytes::new()));
        assert!(!Frame::Audio(Bytes::from_static(b"abc")).is_end_of_stream());
    }
}
