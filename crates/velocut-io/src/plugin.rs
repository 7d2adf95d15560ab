// crates/velocut-io/src/plugin.rs
//
// FfmpegIoPlugin: the `velocut_core::io_contract::IoPlugin` implementation
// backed by `ffmpeg-the-third`. One background thread drains a job queue and
// keeps a small cache of per-path `LiveDecoder`s alive across requests so a
// sequential playback scan doesn't pay a seek+reopen per frame — mirroring
// the teacher's single-worker-thread, latest-request-wins shape
// (`velocut-media::worker::MediaWorker`) without the UI-facing result enum.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

use velocut_core::error::{Error, Result};
use velocut_core::io_contract::{IoHandle, IoPlugin, MediaInfo};
use velocut_core::image::Image;
use velocut_core::media::{AudioInfo, SampleType};
use velocut_core::time::{RationalTime, TimeRange};

use crate::live::LiveDecoder;

enum Job {
    Video {
        path: PathBuf,
        time: RationalTime,
        id: u64,
        tx: Sender<Image>,
    },
    Audio {
        path: PathBuf,
        second_index: i64,
        id: u64,
        tx: Sender<(i64, Vec<u8>)>,
    },
}

/// Tolerance below which a requested time is treated as "next frame in
/// sequence" rather than a seek — avoids reopening the decoder for the
/// small forward jumps normal playback produces between cache requests.
const SEQUENTIAL_TOLERANCE_SECS: f64 = 0.25;

pub struct FfmpegIoPlugin {
    tx: Sender<Job>,
    cancelled: Arc<Mutex<std::collections::HashSet<u64>>>,
}

impl Default for FfmpegIoPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegIoPlugin {
    pub fn new() -> Self {
        let (tx, rx): (Sender<Job>, Receiver<Job>) = unbounded();
        let cancelled = Arc::new(Mutex::new(std::collections::HashSet::new()));
        let worker_cancelled = cancelled.clone();

        thread::Builder::new()
            .name("velocut-io-decode".into())
            .spawn(move || run_worker(rx, worker_cancelled))
            .expect("spawn velocut-io decode thread");

        Self { tx, cancelled }
    }
}

impl IoPlugin for FfmpegIoPlugin {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let ictx = input(path).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;

        let video_range = ictx.streams().best(Type::Video).map(|stream| {
            let tb = stream.time_base();
            let rate = tb.denominator() as f64 / tb.numerator() as f64;
            let frames = stream.duration().max(0) as f64;
            TimeRange::new(RationalTime::zero(rate), RationalTime::new(frames, rate))
        });

        let video_rate = ictx
            .streams()
            .best(Type::Video)
            .map(|s| {
                let r = s.rate();
                r.numerator() as f64 / r.denominator().max(1) as f64
            })
            .unwrap_or(24.0);

        let audio = ictx.streams().best(Type::Audio).and_then(|stream| {
            let params = stream.parameters();
            let codec_ctx = ffmpeg::codec::context::Context::from_parameters(params).ok()?;
            let decoder = codec_ctx.decoder().audio().ok()?;
            Some(AudioInfo {
                channel_count: decoder.channels().max(1),
                sample_rate: decoder.rate(),
                sample_type: SampleType::I16,
            })
        });

        if video_range.is_none() && audio.is_none() {
            return Err(Error::Io(format!("{}: no audio or video stream", path.display())));
        }

        Ok(MediaInfo { video_range, video_rate, audio })
    }

    fn request_video(&self, path: &Path, time: RationalTime, id: u64) -> Result<IoHandle<Image>> {
        let (res_tx, res_rx) = unbounded();
        self.tx
            .send(Job::Video { path: path.to_path_buf(), time, id, tx: res_tx })
            .map_err(|_| Error::Io("decode thread gone".into()))?;
        Ok(IoHandle::new(res_rx))
    }

    fn request_audio(
        &self,
        path: &Path,
        second_index: i64,
        id: u64,
    ) -> Result<IoHandle<(i64, Vec<u8>)>> {
        let (res_tx, res_rx) = unbounded();
        self.tx
            .send(Job::Audio { path: path.to_path_buf(), second_index, id, tx: res_tx })
            .map_err(|_| Error::Io("decode thread gone".into()))?;
        Ok(IoHandle::new(res_rx))
    }

    fn cancel_requests(&self, ids: &[u64]) {
        let mut cancelled = self.cancelled.lock();
        cancelled.extend(ids.iter().copied());
    }
}

fn run_worker(rx: Receiver<Job>, cancelled: Arc<Mutex<std::collections::HashSet<u64>>>) {
    let mut decoders: HashMap<PathBuf, LiveDecoder> = HashMap::new();

    for job in rx.iter() {
        let id = match &job {
            Job::Video { id, .. } | Job::Audio { id, .. } => *id,
        };
        if cancelled.lock().remove(&id) {
            continue;
        }

        match job {
            Job::Video { path, time, tx, .. } => {
                let frame = decode_video(&mut decoders, &path, time);
                if let Some(image) = frame {
                    let _ = tx.send(image);
                }
                // Dropping `tx` without sending signals Cancelled to the
                // caller — the "hold last good frame" path handles this.
            }
            Job::Audio { path, second_index, tx, .. } => {
                if let Ok(samples) = crate::audio::decode_one_second(&path, second_index) {
                    let _ = tx.send((second_index, samples));
                }
            }
        }
    }
}

fn decode_video(
    decoders: &mut HashMap<PathBuf, LiveDecoder>,
    path: &Path,
    time: RationalTime,
) -> Option<Image> {
    let needs_reopen = match decoders.get(path) {
        Some(dec) => {
            let cur = dec.current_time().seconds();
            let target = time.seconds();
            target < cur || target - cur > SEQUENTIAL_TOLERANCE_SECS
        }
        None => true,
    };

    if needs_reopen {
        match LiveDecoder::open(path, time) {
            Ok(mut dec) => {
                dec.burn_to_target();
                decoders.insert(path.to_path_buf(), dec);
            }
            Err(e) => {
                log::warn!("velocut_io: open {} failed: {e}", path.display());
                return None;
            }
        }
    }

    let dec = decoders.get_mut(path)?;
    match dec.next_frame() {
        Some(image) => Some(image),
        None => {
            // EOF or decode error — drop the cached decoder so the next
            // request reopens from scratch; caller holds its last good frame.
            decoders.remove(path);
            None
        }
    }
}
