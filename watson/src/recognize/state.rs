//! Lifecycle of a streaming recognition session.

use std::fmt;

/// Close code of a normal closure.
pub const CLOSE_NORMAL: u16 = 1000;
/// Close code sent when an inbound frame cannot be decoded.
pub const CLOSE_INVALID_PAYLOAD: u16 = 1007;

/// Session state.
///
/// Transitions only move forward:
/// `NotStarted -> Open -> Streaming -> Closing -> Closed`. `Closed` may
/// also be reached from any earlier state when the transport fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    NotStarted,
    Open,
    Streaming,
    Closing,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::NotStarted => "not_started",
            SessionState::Open => "open",
            SessionState::Streaming => "streaming",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOutcome {
    /// Close code, `None` when the connection dropped without one.
    pub code: Option<u16>,
    /// Close reason.
    pub reason: String,
}

impl CloseOutcome {
    /// Creates an outcome.
    pub fn new(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Returns true for a normal closure (code 1000).
    pub fn is_success(&self) -> bool {
        self.code == Some(CLOSE_NORMAL)
    }
}

impl fmt::Display for CloseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) if self.reason.is_empty() => write!(f, "{}", code),
            Some(code) => write!(f, "{} {}", code, self.reason),
            None if self.reason.is_empty() => f.write_str("abnormal closure"),
            None => write!(f, "abnormal closure: {}", self.reason),
        }
    }
}

/// Session state machine.
///
/// Guards the ordering rules of the protocol: audio only flows while
/// `Streaming`, the close sequence starts at most once, and the terminal
/// outcome is produced at most once.
#[derive(Debug)]
pub struct SessionProtocol {
    state: SessionState,
}

impl Default for SessionProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProtocol {
    /// Creates a machine in `NotStarted`.
    pub fn new() -> Self {
        Self {
            state: SessionState::NotStarted,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The connection is open.
    pub fn connected(&mut self) {
        if self.state == SessionState::NotStarted {
            self.state = SessionState::Open;
        }
    }

    /// The start message has been sent.
    pub fn options_sent(&mut self) {
        if self.state == SessionState::Open {
            self.state = SessionState::Streaming;
        }
    }

    /// Returns true while audio frames may be sent.
    pub fn can_send_audio(&self) -> bool {
        self.state == SessionState::Streaming
    }

    /// Enters `Closing`. Returns true only on the first call made before
    /// the session is closed, i.e. exactly when the caller should send the
    /// stop message and the close frame.
    pub fn begin_close(&mut self) -> bool {
        match self.state {
            SessionState::Closing | SessionState::Closed => false,
            _ => {
                self.state = SessionState::Closing;
                true
            }
        }
    }

    /// Returns true once `Closing` or `Closed`.
    pub fn is_closing(&self) -> bool {
        self.state >= SessionState::Closing
    }

    /// Enters `Closed`. Returns the outcome on the first call only.
    pub fn closed(&mut self, code: Option<u16>, reason: impl Into<String>) -> Option<CloseOutcome> {
        if self.state == SessionState::Closed {
            return None;
        }
        self.state = SessionState::Closed;
        Some(CloseOutcome::new(code, reason))
    }

    /// Returns true once `Closed`.
    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut p = SessionProtocol::new();
        assert!(!p.can_send_audio());
        p.connected();
        assert_eq!(p.state(), SessionState::Open);
        assert!(!p.can_send_audio());
        p.options_sent();
        assert!(p.can_send_audio());
        assert!(p.begin_close());
        assert!(!p.can_send_audio());
        let outcome = p.closed(Some(CLOSE_NORMAL), "").unwrap();
        assert!(outcome.is_success());
        assert!(p.is_closed());
    }

    #[test]
    fn test_begin_close_once() {
        let mut p = SessionProtocol::new();
        p.connected();
        p.options_sent();
        assert!(p.begin_close());
        assert!(!p.begin_close());
        p.closed(Some(CLOSE_NORMAL), "");
        assert!(!p.begin_close());
    }

    #[test]
    fn test_closed_once() {
        let mut p = SessionProtocol::new();
        assert!(p.closed(None, "connect failed").is_some());
        assert!(p.closed(Some(CLOSE_NORMAL), "").is_none());
    }

    #[test]
    fn test_no_backwards_transition() {
        let mut p = SessionProtocol::new();
        p.connected();
        p.options_sent();
        p.begin_close();
        p.connected();
        p.options_sent();
        assert_eq!(p.state(), SessionState::Closing);
    }

    #[test]
    fn test_outcome() {
        assert!(!CloseOutcome::new(Some(1011), "server error").is_success());
        assert!(!CloseOutcome::new(None, "").is_success());
        assert_eq!(CloseOutcome::new(Some(1000), "").to_string(), "1000");
        assert_eq!(
            CloseOutcome::new(None, "reset").to_string(),
            "abnormal closure: reset"
        );
    }
}
