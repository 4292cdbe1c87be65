//! Callback interface of a streaming recognition session.

use crate::error::Error;
use crate::recognize::message::{ResultsMessage, SpeakerLabelsMessage, SpeechRecognitionAlternative};
use crate::recognize::state::CloseOutcome;

/// Handlers invoked by a recognition session.
///
/// All methods run on the session task, in the order the events happen.
/// Every method has a no-op default so implementors pick what they need.
pub trait RecognizeCallback: Send {
    /// The WebSocket is open; the start message is about to be sent.
    fn on_connected(&mut self) {}

    /// Transport failure, service error message or undecodable frame.
    fn on_error(&mut self, _error: &Error) {}

    /// A hypothesis the service may still revise.
    fn on_interim_result(&mut self, _alternatives: &[SpeechRecognitionAlternative]) {}

    /// Transcript of a segment the service will not revise.
    fn on_final_result(&mut self, _transcript: &str) {}

    /// The session reached its terminal state. Called exactly once.
    fn on_close(&mut self, _outcome: &CloseOutcome) {}

    /// The service reported it is listening for audio.
    fn on_listening(&mut self) {}

    /// Every results message, before interim/final dispatch.
    fn on_data(&mut self, _results: &ResultsMessage) {}

    /// Speaker diarization results.
    fn on_speaker_labels(&mut self, _labels: &SpeakerLabelsMessage) {}
}

type ConnectedFn = Box<dyn FnMut() + Send>;
type ErrorFn = Box<dyn FnMut(&Error) + Send>;
type InterimFn = Box<dyn FnMut(&[SpeechRecognitionAlternative]) + Send>;
type FinalFn = Box<dyn FnMut(&str) + Send>;
type CloseFn = Box<dyn FnMut(&CloseOutcome) + Send>;

/// [`RecognizeCallback`] assembled from closures.
///
/// ```rust
/// use cogkit_watson::CallbackFns;
///
/// let callback = CallbackFns::new()
///     .with_final_result(|text| println!("{}", text))
///     .with_error(|err| eprintln!("error: {}", err));
/// ```
#[derive(Default)]
pub struct CallbackFns {
    connected: Option<ConnectedFn>,
    error: Option<ErrorFn>,
    interim: Option<InterimFn>,
    final_result: Option<FinalFn>,
    close: Option<CloseFn>,
}

impl CallbackFns {
    /// Creates a callback with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connected handler.
    pub fn with_connected(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.connected = Some(Box::new(f));
        self
    }

    /// Sets the error handler.
    pub fn with_error(mut self, f: impl FnMut(&Error) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    /// Sets the interim result handler.
    pub fn with_interim_result(
        mut self,
        f: impl FnMut(&[SpeechRecognitionAlternative]) + Send + 'static,
    ) -> Self {
        self.interim = Some(Box::new(f));
        self
    }

    /// Sets the final result handler.
    pub fn with_final_result(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.final_result = Some(Box::new(f));
        self
    }

    /// Sets the close handler.
    pub fn with_close(mut self, f: impl FnMut(&CloseOutcome) + Send + 'static) -> Self {
        self.close = Some(Box::new(f));
        self
    }
}

impl RecognizeCallback for CallbackFns {
    fn on_connected(&mut self) {
        if let Some(f) = self.connected.as_mut() {
            f();
        }
    }

    fn on_error(&mut self, error: &Error) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }

    fn on_interim_result(&mut self, alternatives: &[SpeechRecognitionAlternative]) {
        if let Some(f) = self.interim.as_mut() {
            f(alternatives);
        }
    }

    fn on_final_result(&mut self, transcript: &str) {
        if let Some(f) = self.final_result.as_mut() {
            f(transcript);
        }
    }

    fn on_close(&mut self, outcome: &CloseOutcome) {
        if let Some(f) = self.close.as_mut() {
            f(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closures_receive_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (s1, s2, s3) = (seen.clone(), seen.clone(), seen.clone());
        let mut cb = CallbackFns::new()
            .with_connected(move || s1.lock().unwrap().push("connected".to_string()))
            .with_final_result(move |t| s2.lock().unwrap().push(format!("final:{}", t)))
            .with_close(move |o| s3.lock().unwrap().push(format!("close:{:?}", o.code)));

        cb.on_connected();
        cb.on_listening();
        cb.on_final_result("hello");
        cb.on_close(&CloseOutcome::new(Some(1000), ""));

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["connected", "final:hello", "close:Some(1000)"]
        );
    }
}
