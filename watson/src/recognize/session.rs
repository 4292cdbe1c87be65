//! Streaming recognition session over a WebSocket.

use std::time::Duration;

use bytes::Bytes;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::recognize::callback::RecognizeCallback;
use crate::recognize::dispatch::{Dispatch, ResultDispatcher, DEFAULT_LISTENING_THRESHOLD};
use crate::recognize::message::{ControlMessage, Frame, ServerMessage};
use crate::recognize::options::RecognizeOptions;
use crate::recognize::pacer::{AudioPacer, PacerControl, DEFAULT_CHUNK_SIZE, DEFAULT_SEND_INTERVAL};
use crate::recognize::state::{CloseOutcome, SessionProtocol, CLOSE_INVALID_PAYLOAD, CLOSE_NORMAL};

/// Default time to wait for the peer to acknowledge a close frame.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tuning of a streaming session.
#[derive(Debug, Clone)]
pub struct RecognizeSessionConfig {
    /// Audio frame size in bytes.
    pub chunk_size: usize,
    /// Delay between audio frames.
    pub send_interval: Duration,
    /// Number of `state` messages after which the client closes.
    pub listening_threshold: u32,
    /// Time to wait for the close acknowledgment. `None` waits forever.
    pub close_timeout: Option<Duration>,
}

impl Default for RecognizeSessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            send_interval: DEFAULT_SEND_INTERVAL,
            listening_threshold: DEFAULT_LISTENING_THRESHOLD,
            close_timeout: Some(DEFAULT_CLOSE_TIMEOUT),
        }
    }
}

/// A prepared streaming recognition request.
///
/// Created by [`SpeechToTextService::recognize_using_websocket`](crate::SpeechToTextService::recognize_using_websocket).
/// Nothing touches the network until [`start`](Self::start).
pub struct RecognizeSession {
    request: http::Request<()>,
    options: RecognizeOptions,
    audio: Bytes,
    config: RecognizeSessionConfig,
}

/// Result of a finished session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Final transcripts concatenated in arrival order.
    pub transcript: String,
    /// How the connection ended.
    pub outcome: CloseOutcome,
    /// Non-empty audio frames sent.
    pub audio_frames_sent: usize,
}

impl RecognizeSession {
    /// Creates a session from an upgrade request carrying the URL and
    /// authentication headers.
    pub fn new(
        request: http::Request<()>,
        options: RecognizeOptions,
        audio: Bytes,
        config: RecognizeSessionConfig,
    ) -> Self {
        Self {
            request,
            options,
            audio,
            config,
        }
    }

    /// WebSocket URL the session connects to.
    pub fn url(&self) -> String {
        self.request.uri().to_string()
    }

    /// Options sent in the start message.
    pub fn options(&self) -> &RecognizeOptions {
        &self.options
    }

    /// Spawns the session on `runtime`.
    ///
    /// The callback is moved into the session task. `on_close` is called
    /// exactly once, also when the connection cannot be established.
    pub fn start(self, callback: impl RecognizeCallback + 'static, runtime: &Handle) -> SessionHandle {
        let cancel = CancellationToken::new();
        let (pacer, paused) = PacerControl::new();
        let task = runtime.spawn(self.run(Box::new(callback), cancel.clone(), paused));
        SessionHandle {
            cancel,
            pacer,
            task,
        }
    }

    async fn run(
        self,
        mut callback: Box<dyn RecognizeCallback>,
        cancel: CancellationToken,
        paused: watch::Receiver<bool>,
    ) -> SessionSummary {
        let mut protocol = SessionProtocol::new();
        debug!("Connecting to: {}", self.request.uri());

        let connected = tokio::select! {
            _ = cancel.cancelled() => Err(None),
            res = connect_async(self.request) => res.map_err(Some),
        };

        let ws = match connected {
            Ok((ws, _response)) => ws,
            Err(err) => {
                let reason = match err {
                    Some(e) => {
                        let err = Error::Connection(format!("failed to connect: {}", e));
                        error!("{}", err);
                        callback.on_error(&err);
                        err.to_string()
                    }
                    None => "stopped before connecting".to_string(),
                };
                let outcome = protocol
                    .closed(None, reason)
                    .unwrap_or_else(|| CloseOutcome::new(None, ""));
                callback.on_close(&outcome);
                return SessionSummary {
                    transcript: String::new(),
                    outcome,
                    audio_frames_sent: 0,
                };
            }
        };

        let driver = Driver {
            ws,
            protocol,
            pacer: AudioPacer::new(self.audio, self.config.chunk_size, self.config.send_interval),
            dispatcher: ResultDispatcher::new(self.config.listening_threshold),
            callback: callback.as_mut(),
            cancel,
            paused,
            paused_live: true,
            close_timeout: self.config.close_timeout,
            close_deadline: None,
            outcome: None,
            audio_frames_sent: 0,
        };
        driver.drive(self.options).await
    }
}

/// Handle to a running session.
pub struct SessionHandle {
    cancel: CancellationToken,
    pacer: PacerControl,
    task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    /// Asks the session to finish: the end-of-stream frame is sent if still
    /// pending, followed by the stop message and a normal close.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns a cloneable handle that stops the session, usable while
    /// [`SessionHandle::join`] is being awaited.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Pause/resume switch of the audio pacer.
    pub fn pacer(&self) -> &PacerControl {
        &self.pacer
    }

    /// Returns true once the session task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the session to end.
    pub async fn join(self) -> Result<SessionSummary> {
        self.task
            .await
            .map_err(|e| Error::Other(format!("session task failed: {}", e)))
    }
}

/// Stops a session from outside its [`SessionHandle`].
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
}

impl StopHandle {
    /// Same as [`SessionHandle::stop`].
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// Owns the socket and runs the session loop.
struct Driver<'a, S> {
    ws: S,
    protocol: SessionProtocol,
    pacer: AudioPacer,
    dispatcher: ResultDispatcher,
    callback: &'a mut dyn RecognizeCallback,
    cancel: CancellationToken,
    paused: watch::Receiver<bool>,
    paused_live: bool,
    close_timeout: Option<Duration>,
    close_deadline: Option<Instant>,
    outcome: Option<CloseOutcome>,
    audio_frames_sent: usize,
}

impl<S> Driver<'_, S>
where
    S: Sink<WsMessage, Error = WsError> + Stream<Item = std::result::Result<WsMessage, WsError>> + Unpin,
{
    async fn drive(mut self, options: RecognizeOptions) -> SessionSummary {
        self.protocol.connected();
        self.callback.on_connected();

        match self.send_start(options).await {
            Ok(()) => self.run_loop().await,
            Err(e) => self.fail(e),
        }

        let outcome = self
            .outcome
            .take()
            .unwrap_or_else(|| CloseOutcome::new(None, ""));
        debug!("Session closed: {}", outcome);
        self.callback.on_close(&outcome);

        SessionSummary {
            transcript: self.dispatcher.transcript().to_string(),
            outcome,
            audio_frames_sent: self.audio_frames_sent,
        }
    }

    async fn send_start(&mut self, options: RecognizeOptions) -> Result<()> {
        self.send(ControlMessage::Start(options).to_frame()?).await?;
        self.protocol.options_sent();
        Ok(())
    }

    async fn run_loop(&mut self) {
        let interval = self.pacer.interval();
        let mut next_send = Instant::now();

        while !self.protocol.is_closed() {
            let audio_ready =
                self.protocol.can_send_audio() && !self.pacer.is_finished() && !*self.paused.borrow();
            let close_deadline = self.close_deadline.unwrap_or_else(Instant::now);

            let result = tokio::select! {
                _ = self.cancel.cancelled(), if !self.protocol.is_closing() => {
                    debug!("Stop requested");
                    self.begin_close(true, CLOSE_NORMAL, "").await
                }
                changed = self.paused.changed(), if self.paused_live => {
                    match changed {
                        Ok(()) if !*self.paused.borrow() => next_send = Instant::now(),
                        Ok(()) => {}
                        Err(_) => self.paused_live = false,
                    }
                    Ok(())
                }
                msg = self.ws.next() => self.on_message(msg).await,
                _ = sleep_until(next_send), if audio_ready => {
                    next_send = Instant::now() + interval;
                    self.send_audio().await
                }
                _ = sleep_until(close_deadline), if self.close_deadline.is_some() => {
                    warn!("Close handshake timed out");
                    self.finish(None, "close handshake timed out");
                    Ok(())
                }
            };

            if let Err(e) = result {
                self.fail(e);
            }
        }
    }

    async fn on_message(&mut self, msg: Option<std::result::Result<WsMessage, WsError>>) -> Result<()> {
        match msg {
            Some(Ok(WsMessage::Text(text))) => {
                debug!("Received: {}", truncate_for_log(&text, 1000));
                match ServerMessage::decode(&text) {
                    Ok(msg) => {
                        if self.dispatcher.dispatch(msg, &mut *self.callback) == Dispatch::BeginClose {
                            self.begin_close(true, CLOSE_NORMAL, "").await?;
                        }
                    }
                    Err(e) => {
                        self.callback.on_error(&e);
                        self.begin_close(false, CLOSE_INVALID_PAYLOAD, "invalid JSON payload")
                            .await?;
                    }
                }
            }
            Some(Ok(WsMessage::Close(frame))) => {
                let (code, reason) = match frame {
                    Some(f) => (Some(u16::from(f.code)), f.reason.as_str().to_string()),
                    None => (None, String::new()),
                };
                debug!("WebSocket closed by server: {:?} {}", code, reason);
                // Flushes the close reply when the server closed first.
                let _ = self.ws.close().await;
                self.finish(code, reason);
            }
            Some(Ok(WsMessage::Binary(data))) => {
                debug!("Ignoring binary frame of {} bytes", data.len());
            }
            Some(Ok(_)) => {}
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                self.finish(None, "connection closed");
            }
            Some(Err(e)) => return Err(e.into()),
        }
        Ok(())
    }

    async fn send_audio(&mut self) -> Result<()> {
        let Some(chunk) = self.pacer.next_frame() else {
            return Ok(());
        };
        if chunk.is_empty() {
            debug!("Sending end of stream after {} frames", self.audio_frames_sent);
        } else {
            self.audio_frames_sent += 1;
        }
        self.send(Frame::Audio(chunk)).await
    }

    /// Starts the client side of the closing handshake, at most once.
    async fn begin_close(&mut self, send_stop: bool, code: u16, reason: &str) -> Result<()> {
        if !self.protocol.begin_close() {
            return Ok(());
        }
        if let Some(eos) = self.pacer.finish() {
            self.send(Frame::Audio(eos)).await?;
        }
        if send_stop {
            self.send(ControlMessage::Stop.to_frame()?).await?;
        }
        debug!("Closing with code {}", code);
        self.ws
            .send(WsMessage::Close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.to_string().into(),
            })))
            .await?;
        self.close_deadline = self.close_timeout.map(|t| Instant::now() + t);
        Ok(())
    }

    async fn send(&mut self, frame: Frame) -> Result<()> {
        if let Frame::Control(ref text) = frame {
            debug!("Sending: {}", truncate_for_log(text, 500));
        }
        self.ws.send(frame.into()).await?;
        Ok(())
    }

    fn fail(&mut self, err: Error) {
        error!("Session error: {}", err);
        self.callback.on_error(&err);
        self.finish(None, err.to_string());
    }

    fn finish(&mut self, code: Option<u16>, reason: impl Into<String>) {
        if let Some(outcome) = self.protocol.closed(code, reason) {
            self.outcome = Some(outcome);
        }
    }
}

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("hello", 10), "hello");
        assert_eq!(truncate_for_log("hello world", 5), "hello...");
        assert_eq!(truncate_for_log("héllo", 2), "h...");
    }

    #[test]
    fn test_default_config() {
        let config = RecognizeSessionConfig::default();
        assert_eq!(config.chunk_size, 2000);
        assert_eq!(config.send_interval, Duration::from_millis(10));
        assert_eq!(config.listening_threshold, 2);
    }

    #[tokio::test]
    async fn test_connect_failure_closes_once() {
        use std::sync::{Arc, Mutex};

        use tokio_tungstenite::tungstenite::client::IntoClientRequest;

        use crate::recognize::callback::CallbackFns;

        // Nothing listens on this port once the listener is dropped.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = format!("ws://{}/v1/recognize", addr)
            .into_client_request()
            .unwrap();
        let session = RecognizeSession::new(
            request,
            RecognizeOptions::new("audio/wav"),
            Bytes::from_static(b"RIFF"),
            RecognizeSessionConfig::default(),
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        let (e1, e2) = (events.clone(), events.clone());
        let callback = CallbackFns::new()
            .with_error(move |_| e1.lock().unwrap().push("error"))
            .with_close(move |_| e2.lock().unwrap().push("close"));

        let summary = session.start(callback, &Handle::current()).join().await.unwrap();
        assert!(!summary.outcome.is_success());
        assert_eq!(summary.audio_frames_sent, 0);
        assert_eq!(*events.lock().unwrap(), vec!["error", "close"]);
    }

    #[tokio::test]
    async fn test_stop_handle_ends_pending_connect() {
        use std::sync::{Arc, Mutex};

        use tokio_tungstenite::tungstenite::client::IntoClientRequest;

        use crate::recognize::callback::CallbackFns;

        // The listener never accepts, so the handshake hangs.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let request = format!("ws://{}/v1/recognize", addr)
            .into_client_request()
            .unwrap();
        let session = RecognizeSession::new(
            request,
            RecognizeOptions::new("audio/wav"),
            Bytes::from_static(b"RIFF"),
            RecognizeSessionConfig::default(),
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        let (e1, e2) = (events.clone(), events.clone());
        let callback = CallbackFns::new()
            .with_error(move |_| e1.lock().unwrap().push("error"))
            .with_close(move |_| e2.lock().unwrap().push("close"));

        let handle = session.start(callback, &Handle::current());
        let stopper = handle.stop_handle();
        let join = handle.join();
        tokio::pin!(join);

        let early = tokio::time::timeout(Duration::from_millis(50), &mut join).await;
        assert!(early.is_err());

        stopper.stop();
        let summary = tokio::time::timeout(Duration::from_secs(5), join)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.audio_frames_sent, 0);
        assert_eq!(summary.outcome.code, None);
        assert_eq!(summary.outcome.reason, "stopped before connecting");
        assert_eq!(*events.lock().unwrap(), vec!["close"]);
        drop(listener);
    }
}
