//! Routes decoded server messages to the callback.

use tracing::debug;

use crate::error::Error;
use crate::recognize::callback::RecognizeCallback;
use crate::recognize::message::{ResultsMessage, ServerMessage};

/// Number of `state` messages after which the client closes the session.
///
/// The service acknowledges the start message with one `listening` state and
/// reports it again once the audio after the end-of-stream frame has been
/// processed.
pub const DEFAULT_LISTENING_THRESHOLD: u32 = 2;

/// What the session should do after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    /// The listening threshold was reached; start the close sequence.
    BeginClose,
}

/// Accumulates the transcript and counts listening acknowledgments.
#[derive(Debug)]
pub struct ResultDispatcher {
    transcript: String,
    listening: u32,
    threshold: u32,
}

impl Default for ResultDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_LISTENING_THRESHOLD)
    }
}

impl ResultDispatcher {
    /// Creates a dispatcher. A zero threshold is treated as 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            transcript: String::new(),
            listening: 0,
            threshold: threshold.max(1),
        }
    }

    /// Final transcripts received so far, concatenated in arrival order.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Number of `state` messages received.
    pub fn listening_count(&self) -> u32 {
        self.listening
    }

    /// Handles one message.
    ///
    /// Returns [`Dispatch::BeginClose`] exactly once, on the message that
    /// brings the listening count to the threshold.
    pub fn dispatch(&mut self, msg: ServerMessage, callback: &mut dyn RecognizeCallback) -> Dispatch {
        match msg {
            ServerMessage::Error(err) => {
                callback.on_error(&Error::from(err));
            }
            ServerMessage::Results(results) => {
                callback.on_data(&results);
                self.handle_results(&results, callback);
            }
            ServerMessage::State(state) => {
                self.listening += 1;
                debug!(
                    "state {:?} ({}/{})",
                    state.state, self.listening, self.threshold
                );
                if state.is_listening() {
                    callback.on_listening();
                }
                if self.listening == self.threshold {
                    return Dispatch::BeginClose;
                }
            }
            ServerMessage::SpeakerLabels(labels) => {
                callback.on_speaker_labels(&labels);
            }
            ServerMessage::Unrecognized(value) => {
                debug!("ignoring unrecognized message: {}", value);
            }
        }
        Dispatch::Continue
    }

    fn handle_results(&mut self, results: &ResultsMessage, callback: &mut dyn RecognizeCallback) {
        let Some(first) = results.results.first() else {
            return;
        };

        if first.is_final {
            let transcript = first
                .alternatives
                .first()
                .map(|alt| alt.transcript.as_str())
                .unwrap_or_default();
            self.transcript.push_str(transcript);
            callback.on_final_result(transcript);
        } else {
            callback.on_interim_result(&first.alternatives);
        }
    }
}
