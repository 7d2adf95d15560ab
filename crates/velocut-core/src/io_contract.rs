// crates/velocut-core/src/io_contract.rs
//
// The contract the I/O collaborator (`velocut-io`) implements and the
// Player/Worker consume (§6). Design Note: the engine must not require an
// ambient async runtime — an `IoHandle<T>` wraps a bounded
// `crossbeam_channel::Receiver<T>` behind a poll-style API instead of
// `Future`/`async fn`, matching the teacher's own crossbeam-channel-based
// worker result passing (`velocut-media::worker::MediaWorker`).

use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::error::{Error, Result};
use crate::image::Image;
use crate::media::AudioInfo;
use crate::time::{RationalTime, TimeRange};

/// Outcome of polling an `IoHandle`.
#[derive(Debug)]
pub enum Poll<T> {
    Pending,
    Ready(T),
    /// The request failed or was cancelled; the caller should fall back to
    /// "hold last good frame" (§7) rather than treat this as fatal.
    Cancelled,
}

/// A pollable handle to a single in-flight I/O request. Not a `Future` —
/// deliberately so, per the Design Note that no ambient async runtime is
/// required. `poll()` never blocks; `wait()` blocks with a timeout for
/// callers (tests, the CLI's synchronous path) that want to.
pub struct IoHandle<T> {
    rx: Receiver<T>,
}

impl<T> IoHandle<T> {
    pub fn new(rx: Receiver<T>) -> Self {
        Self { rx }
    }

    pub fn poll(&self) -> Poll<T> {
        match self.rx.try_recv() {
            Ok(v) => Poll::Ready(v),
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => Poll::Cancelled,
        }
    }

    pub fn wait(&self, timeout: Duration) -> Poll<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(v) => Poll::Ready(v),
            Err(RecvTimeoutError::Timeout) => Poll::Pending,
            Err(RecvTimeoutError::Disconnected) => Poll::Cancelled,
        }
    }
}

/// Static information about a media source, returned once by `probe`.
#[derive(Clone, Debug)]
pub struct MediaInfo {
    pub video_range: Option<TimeRange>,
    pub video_rate: f64,
    pub audio: Option<AudioInfo>,
}

/// The I/O collaborator contract (§6). Implementors own the decode threads;
/// every method returns immediately with a handle the caller polls.
pub trait IoPlugin: Send + Sync {
    fn probe(&self, path: &Path) -> Result<MediaInfo>;

    /// Request a single decoded video frame at `time`. `id` is an opaque
    /// request id the plugin echoes back for cancellation bookkeeping
    /// (tlRender's per-layer request-id groups, carried into `Worker`).
    fn request_video(&self, path: &Path, time: RationalTime, id: u64) -> Result<IoHandle<Image>>;

    /// Request one second of decoded audio starting at `second_index`.
    fn request_audio(
        &self,
        path: &Path,
        second_index: i64,
        id: u64,
    ) -> Result<IoHandle<(i64, Vec<u8>)>>;

    /// Cancel all outstanding requests whose ids are in `ids`. Best-effort:
    /// a request that already completed is a no-op.
    fn cancel_requests(&self, ids: &[u64]);
}

/// Helper converting a disconnected channel outcome into an `Error` at call
/// sites that must treat a cancelled handle as a hard failure rather than
/// falling back silently (probe, for instance, has no "last good" to hold).
pub fn poll_to_result<T>(p: Poll<T>) -> Result<Option<T>> {
    match p {
        Poll::Ready(v) => Ok(Some(v)),
        Poll::Pending => Ok(None),
        Poll::Cancelled => Err(Error::Io("request cancelled".into())),
    }
}
