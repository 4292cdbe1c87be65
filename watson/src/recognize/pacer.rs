//! Paced slicing of an audio source into binary frames.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;

/// Default audio frame size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Default delay between two audio frames.
pub const DEFAULT_SEND_INTERVAL: Duration = Duration::from_millis(10);

/// Yields an audio source as fixed-size frames followed by one empty
/// end-of-stream frame.
///
/// For a source of `n` bytes and chunk size `c` the pacer yields
/// `ceil(n / c)` non-empty frames whose concatenation is the source, then
/// `Bytes::new()`, then nothing. Frames share the source buffer.
#[derive(Debug, Clone)]
pub struct AudioPacer {
    source: Bytes,
    offset: usize,
    chunk_size: usize,
    interval: Duration,
    terminated: bool,
}

impl AudioPacer {
    /// Creates a pacer. A zero `chunk_size` is treated as 1.
    pub fn new(source: Bytes, chunk_size: usize, interval: Duration) -> Self {
        Self {
            source,
            offset: 0,
            chunk_size: chunk_size.max(1),
            interval,
            terminated: false,
        }
    }

    /// Delay to wait after sending a frame.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.source.len() - self.offset
    }

    /// Returns true once the end-of-stream frame has been handed out.
    pub fn is_finished(&self) -> bool {
        self.terminated
    }

    /// Returns the next frame.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        if self.terminated {
            return None;
        }
        if self.offset == self.source.len() {
            self.terminated = true;
            return Some(Bytes::new());
        }
        let end = (self.offset + self.chunk_size).min(self.source.len());
        let chunk = self.source.slice(self.offset..end);
        self.offset = end;
        Some(chunk)
    }

    /// Drops the unsent audio and returns the end-of-stream frame, unless
    /// it has already been handed out.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.terminated {
            return None;
        }
        self.offset = self.source.len();
        self.terminated = true;
        Some(Bytes::new())
    }
}

impl Iterator for AudioPacer {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        self.next_frame()
    }
}

/// Pause/resume switch for a running pacer.
///
/// Pausing holds back audio frames without dropping position; inbound
/// messages keep flowing.
#[derive(Debug, Clone)]
pub struct PacerControl {
    paused: Arc<watch::Sender<bool>>,
}

impl PacerControl {
    /// Creates a control and the receiver the session watches.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { paused: Arc::new(tx) }, rx)
    }

    /// Holds back further audio frames.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Resumes sending audio frames.
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Returns true while paused.
    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(len: usize, chunk: usize) -> Vec<Bytes> {
        let source: Bytes = (0..len).map(|i| (i % 251) as u8).collect::<Vec<_>>().into();
        AudioPacer::new(source, chunk, DEFAULT_SEND_INTERVAL).collect()
    }

    #[test]
    fn test_5000_bytes_in_2000_chunks() {
        let frames = frames(5000, 2000);
        let sizes: Vec<usize> = frames.iter().map(|f| f.len()).collect();
        assert_eq!(sizes, vec![2000, 2000, 1000, 0]);
    }

    #[test]
    fn test_source_smaller_than_chunk() {
        for len in [1, 100, 1999] {
            let frames = frames(len, 2000);
            assert_eq!(frames.len(), 2, "len={len}");
            assert_eq!(frames[0].len(), len);
            assert!(frames[1].is_empty());
        }
    }

    #[test]
    fn test_frame_count_and_round_trip() {
        let cases = [(4000usize, 2000usize), (4001, 2000), (1, 1), (7919, 128), (2000, 2000)];
        for (len, chunk) in cases {
            let source: Bytes = (0..len).map(|i| (i * 7 % 256) as u8).collect::<Vec<_>>().into();
            let frames: Vec<Bytes> = AudioPacer::new(source.clone(), chunk, DEFAULT_SEND_INTERVAL).collect();

            let (last, audio) = frames.split_last().unwrap();
            assert!(last.is_empty());
            assert_eq!(audio.len(), len.div_ceil(chunk), "len={len} chunk={chunk}");
            assert!(audio.iter().all(|f| !f.is_empty() && f.len() <= chunk));
            assert_eq!(audio.concat(), source.to_vec());
        }
    }

    #[test]
    fn test_empty_source_only_terminates() {
        let frames = frames(0, 2000);
        assert_eq!(frames, vec![Bytes::new()]);
    }

    #[test]
    fn test_finished_after_terminator() {
        let mut pacer = AudioPacer::new(Bytes::from_static(b"abc"), 2, DEFAULT_SEND_INTERVAL);
        assert_eq!(pacer.remaining(), 3);
        assert_eq!(pacer.next_frame().unwrap(), Bytes::from_static(b"ab"));
        assert_eq!(pacer.next_frame().unwrap(), Bytes::from_static(b"c"));
        assert!(!pacer.is_finished());
        assert!(pacer.next_frame().unwrap().is_empty());
        assert!(pacer.is_finished());
        assert!(pacer.next_frame().is_none());
    }

    #[test]
    fn test_finish_terminates_once() {
        let mut pacer = AudioPacer::new(Bytes::from_static(b"abcdef"), 2, DEFAULT_SEND_INTERVAL);
        pacer.next_frame();
        assert_eq!(pacer.finish(), Some(Bytes::new()));
        assert_eq!(pacer.remaining(), 0);
        assert!(pacer.finish().is_none());
        assert!(pacer.next_frame().is_none());
    }

    #[test]
    fn test_zero_chunk_size() {
        let frames = frames(3, 0);
        assert_eq!(frames.len(), 4);
    }

    #[test]
    fn test_control_toggle() {
        let (control, rx) = PacerControl::new();
        assert!(!control.is_paused());
        control.pause();
        assert!(*rx.borrow());
        control.resume();
        assert!(!control.is_paused());
    }
}
