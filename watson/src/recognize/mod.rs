//! Streaming speech recognition over WebSocket.
//!
//! A session opens the socket, sends one start message with the options,
//! streams the audio in paced binary frames followed by an empty
//! end-of-stream frame, dispatches results to a [`RecognizeCallback`] and
//! closes once the service has acknowledged the end of the audio.

pub mod callback;
pub mod dispatch;
pub mod message;
pub mod options;
pub mod pacer;
pub mod session;
pub mod state;

pub use callback::{CallbackFns, RecognizeCallback};
pub use dispatch::{Dispatch, ResultDispatcher, DEFAULT_LISTENING_THRESHOLD};
pub use message::{
    ControlMessage, ErrorMessage, Frame, ResultsMessage, ServerMessage, SpeakerLabel,
    SpeakerLabelsMessage, SpeechRecognitionAlternative, SpeechRecognitionResult, StateMessage,
    WordAlternativeResult, WordAlternativeResults,
};
pub use options::{RecognizeOptions, DEFAULT_MODEL};
pub use pacer::{AudioPacer, PacerControl, DEFAULT_CHUNK_SIZE, DEFAULT_SEND_INTERVAL};
pub use session::{
    RecognizeSession, RecognizeSessionConfig, SessionHandle, SessionSummary, StopHandle,
    DEFAULT_CLOSE_TIMEOUT,
};
pub use state::{CloseOutcome, SessionProtocol, SessionState, CLOSE_INVALID_PAYLOAD, CLOSE_NORMAL};
