// crates/velocut-player/src/audio.rs
//
// The realtime audio rendering pipeline (§4.2). Two halves, deliberately
// split the way the teacher's `AudioStream`/`StreamState` pair splits
// cross-thread state from the thing that actually runs on the realtime
// thread:
//
//   - `AudioControlState` — the mutex-guarded snapshot the Caller/Player
//     writes into and the realtime callback reads at the top of each call.
//     Lives inside `PlayerShared`, not here.
//   - `AudioRenderer` — everything the callback owns privately: resampler,
//     PCM ring, silence buffer, stream position, the reverse-playback
//     sentinel. Never touched from any other thread.

use std::collections::VecDeque;
use std::time::Instant;

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use velocut_core::media::{AudioData, FadeWindow};
use velocut_core::state::Playback;
use velocut_core::time::RationalTime;

/// Mutex-guarded snapshot the Caller/Player write and the audio callback
/// reads at the top of each `render()` call (§4.2 step 1). Kept in its own
/// mutex, separate from `PlayerState`/`FrameCache`, so the realtime thread
/// never contends with the Worker's longer critical sections (§5).
#[derive(Clone, Debug)]
pub struct AudioControlState {
    pub playback: Playback,
    pub playback_start_time: RationalTime,
    pub audio_offset: f64,
    pub speed: f64,
    /// The timeline's own native rate, snapshotted at `Player::new`. Per
    /// §4.2 step 8 / §9's audio Design Note, the sample-accurate path is
    /// gated on this matching the timeline rate rather than on `speed` —
    /// preserved as observed rather than "fixed" since the two near-duplicate
    /// audio pipelines in the source disagree on which comparison is load
    /// bearing.
    pub default_speed: f64,
    pub volume: f32,
    pub mute: bool,
    pub channel_mute: Vec<u32>,
    /// Wall-clock instant before which output is forced silent, used to
    /// suppress clicks right after a seek (§4.2 "Cancellation / timeouts").
    pub mute_timeout: Option<Instant>,
    /// One-shot: set by any `set_playback`/`seek` mutation, consumed by the
    /// next `render()` call (§4.2 step 4).
    pub reset: bool,
}

impl AudioControlState {
    pub fn new(timeline_rate: f64) -> Self {
        Self {
            playback: Playback::Stop,
            playback_start_time: RationalTime::zero(timeline_rate.max(1.0)),
            audio_offset: 0.0,
            speed: timeline_rate.max(1.0),
            default_speed: timeline_rate.max(1.0),
            volume: 1.0,
            mute: false,
            channel_mute: Vec::new(),
            mute_timeout: None,
            reset: false,
        }
    }
}

pub const CLICK_SUPPRESSION: std::time::Duration = std::time::Duration::from_millis(15);

/// Linear-ramp fade multiplier for `offset_into_clip` given a `FadeWindow`
/// expressed in the clip's own rate (§4.2 step 7b).
fn fade_multiplier(offset: RationalTime, in_window: Option<FadeWindow>, out_window: Option<FadeWindow>, clip_len: RationalTime) -> f32 {
    let mut m = 1.0f32;
    if let Some(w) = in_window {
        let edge = w.in_offset.seconds();
        if edge > 0.0 {
            let t = (offset.seconds() / edge).clamp(0.0, 1.0) as f32;
            m *= t;
        }
    }
    if let Some(w) = out_window {
        let edge = w.out_offset.seconds();
        if edge > 0.0 {
            let remaining = (clip_len.seconds() - offset.seconds()).max(0.0);
            let t = (remaining / edge).clamp(0.0, 1.0) as f32;
            m *= t;
        }
    }
    m
}

/// Reverse an interleaved PCM buffer frame-by-frame (not byte-by-byte) so
/// channel order within each frame is preserved (§4.2 step 7c).
fn reverse_interleaved(samples: &mut [f32], channels: usize) {
    if channels == 0 {
        return;
    }
    let frames = samples.len() / channels;
    for i in 0..frames / 2 {
        let j = frames - 1 - i;
        for c in 0..channels {
            samples.swap(i * channels + c, j * channels + c);
        }
    }
}

/// Everything the realtime callback owns privately (§4.2 "State owned by the
/// callback (not shared)"). Constructed once per audio stream; never shared
/// across threads.
pub struct AudioRenderer {
    channels: usize,
    input_rate: u32,
    device_rate: u32,
    resampler: Option<FastFixedIn<f32>>,
    resampler_ratio: f64,
    /// Interleaved f32 PCM waiting to be handed to the device, at
    /// `device_rate`.
    buffer: VecDeque<f32>,
    silence: Vec<f32>,
    rt_audio_current_frame: u64,
    /// Sentinel used by reverse playback to detect a fresh reset; mirrors
    /// the source's `backwardsSize`, reset to `usize::MAX` on every reset
    /// (§4.2 step 4, §9 open question — behaviour preserved as observed
    /// rather than reinterpreted).
    backwards_size: usize,
}

impl AudioRenderer {
    pub fn new(channels: usize, input_rate: u32, device_rate: u32) -> Self {
        Self {
            channels,
            input_rate,
            device_rate,
            resampler: None,
            resampler_ratio: 1.0,
            buffer: VecDeque::new(),
            silence: Vec::new(),
            rt_audio_current_frame: 0,
            backwards_size: usize::MAX,
        }
    }

    fn ensure_resampler(&mut self, ratio: f64) {
        let changed = (self.resampler_ratio - ratio).abs() > 1e-9;
        if self.resampler.is_none() || changed {
            self.resampler_ratio = ratio;
            self.resampler = FastFixedIn::new(
                ratio,
                10.0,
                PolynomialDegree::Cubic,
                1024,
                self.channels.max(1),
            )
            .ok();
        }
    }

    /// §4.2's per-call algorithm. `fetch_second` pulls one second of cached
    /// `AudioData` (or `None` for "not cached yet, treat as silence") under
    /// the Player's mutex; kept as a closure so this function has no
    /// knowledge of `PlayerShared`'s lock types and can be unit tested with
    /// a plain in-memory map.
    pub fn render(
        &mut self,
        output: &mut [f32],
        n_frames: usize,
        control: &AudioControlState,
        mut fetch_second: impl FnMut(i64) -> Option<AudioData>,
    ) {
        // Step 2: zero the output buffer first so dropouts are silence.
        output[..n_frames * self.channels].fill(0.0);

        // Step 3.
        if control.playback == Playback::Stop {
            return;
        }

        // Step 4.
        if control.reset {
            self.resampler = None;
            self.buffer.clear();
            self.silence.clear();
            self.rt_audio_current_frame = 0;
            self.backwards_size = usize::MAX;
        }

        // Step 5.
        let ratio = (self.device_rate as f64 * (control.default_speed / control.speed.max(1e-6)))
            / self.input_rate as f64;
        self.ensure_resampler(ratio);

        let reverse = control.playback == Playback::Reverse;
        let sign: f64 = if reverse { -1.0 } else { 1.0 };

        // Step 6: starting input-domain sample index.
        let base_secs = control.playback_start_time.seconds() - control.audio_offset;
        let base_samples = (base_secs * self.input_rate as f64) as i64;
        let consumed_output_frames = self.rt_audio_current_frame + self.buffer.len() as u64 / self.channels as u64;
        let consumed_input_frames =
            (consumed_output_frames as f64 * self.input_rate as f64 / self.device_rate as f64) as i64;
        let mut input_frame = base_samples + (sign as i64) * consumed_input_frames;

        // Step 7: fill `buffer` until it holds at least `n_frames`.
        while self.buffer.len() < n_frames * self.channels {
            let second = input_frame.div_euclid(self.input_rate as i64);
            let offset_in_second = input_frame.rem_euclid(self.input_rate as i64);

            let data = fetch_second(second);
            let mut mixed = vec![0.0f32; self.channels];

            if let Some(data) = data {
                for layer in &data.layers {
                    let bytes_per_frame = layer.info.byte_count_per_frame();
                    let frame_idx = offset_in_second as usize;
                    let byte_off = frame_idx * bytes_per_frame;
                    if byte_off + bytes_per_frame > layer.samples.len() {
                        continue;
                    }
                    let clip_offset = RationalTime::from_seconds(
                        second as f64 + offset_in_second as f64 / self.input_rate as f64
                            - layer.clip_time_range.start.seconds(),
                        layer.clip_time_range.start.rate,
                    );
                    let mult = fade_multiplier(
                        clip_offset,
                        layer.in_transition,
                        layer.out_transition,
                        layer.clip_time_range.duration,
                    ) * control.volume;

                    for ch in 0..layer.info.channel_count as usize {
                        if control.channel_mute.contains(&(ch as u32)) {
                            continue;
                        }
                        let sample = read_i16(&layer.samples, byte_off + ch * 2) as f32 / i16::MAX as f32;
                        if ch < mixed.len() {
                            mixed[ch] += sample * mult;
                        }
                    }
                }
            }

            if reverse {
                reverse_interleaved(&mut mixed, self.channels);
            }

            if let Some(resampler) = &mut self.resampler {
                let chans: Vec<Vec<f32>> = (0..self.channels).map(|c| vec![mixed[c]; 1]).collect();
                if let Ok(out) = resampler.process(&chans, None) {
                    let frames = out.first().map(|c| c.len()).unwrap_or(0);
                    for f in 0..frames {
                        for c in 0..self.channels {
                            self.buffer.push_back(out[c][f]);
                        }
                    }
                } else {
                    for &s in &mixed {
                        self.buffer.push_back(s);
                    }
                }
            } else {
                for &s in &mixed {
                    self.buffer.push_back(s);
                }
            }

            input_frame += sign as i64;
            if self.buffer.len() > n_frames * self.channels * 8 {
                break; // backstop: never grow unboundedly if resampling stalls
            }
        }

        // Step 8.
        let now = Instant::now();
        let timed_out = control.mute_timeout.map(|t| now >= t).unwrap_or(true);
        // `default_speed == timeline_rate` is invariant for the lifetime of a
        // Player (nothing in the control surface changes `default_speed`
        // after construction), so the gate in §4.2 step 8 always holds here;
        // kept as a named condition rather than folded away so a future
        // `set_default_speed` doesn't silently lose the check.
        if !control.mute && timed_out && self.buffer.len() >= n_frames * self.channels {
            for i in 0..n_frames * self.channels {
                output[i] = self.buffer.pop_front().unwrap_or(0.0);
            }
        }

        // Step 9.
        self.rt_audio_current_frame += n_frames as u64;
    }
}

fn read_i16(bytes: &[u8], offset: usize) -> i16 {
    if offset + 2 > bytes.len() {
        return 0;
    }
    i16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

/// Build and start the cpal output stream for a Player. The closure handed
/// to `build_output_stream` is the realtime thread role from §5: it upgrades
/// the weak handle, takes the two short critical sections (`audio_control`,
/// `cache`), and never blocks if the Player has been dropped.
pub fn spawn_output_stream(
    shared: std::sync::Weak<crate::player::PlayerShared>,
    channels: usize,
    input_rate: u32,
) -> velocut_core::error::Result<cpal::Stream> {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use velocut_core::error::Error;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Io("no default audio output device".into()))?;
    let supported = device
        .default_output_config()
        .map_err(|e| Error::Io(e.to_string()))?;
    let device_rate = supported.sample_rate().0;
    let config: cpal::StreamConfig = supported.config();

    let mut renderer = AudioRenderer::new(channels, input_rate, device_rate);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                let Some(shared) = shared.upgrade() else {
                    data.fill(0.0);
                    return;
                };
                let control = shared.audio_control.lock().clone();
                let n_frames = data.len() / channels.max(1);
                renderer.render(data, n_frames, &control, |second| {
                    shared.cache.lock().get_audio(second).cloned()
                });
                if control.reset {
                    shared.audio_control.lock().reset = false;
                }
            },
            |err| log::error!("velocut_player: audio stream error: {err}"),
            None,
        )
        .map_err(|e| Error::Io(e.to_string()))?;

    stream.play().map_err(|e| Error::Io(e.to_string()))?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use velocut_core::media::AudioInfo;
    use velocut_core::media::SampleType;
    use velocut_core::time::TimeRange;
    use std::sync::Arc;

    fn silence_state() -> AudioControlState {
        let mut s = AudioControlState::new(48_000.0);
        s.playback = Playback::Forward;
        s
    }

    #[test]
    fn stop_leaves_output_silent() {
        let mut renderer = AudioRenderer::new(2, 48_000, 48_000);
        let mut control = silence_state();
        control.playback = Playback::Stop;
        let mut out = vec![1.0f32; 1024 * 2];
        renderer.render(&mut out, 1024, &control, |_| None);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn mute_keeps_output_silent_but_advances_frame_counter() {
        let mut renderer = AudioRenderer::new(2, 48_000, 48_000);
        let mut control = silence_state();
        control.mute = true;
        let mut out = vec![0.0f32; 1024 * 2];
        renderer.render(&mut out, 1024, &control, |sec| {
            let samples = vec![0u8; 48_000 * 4];
            Some(AudioData {
                second_index: sec,
                layers: vec![velocut_core::media::AudioLayer {
                    samples: Arc::new(samples),
                    info: AudioInfo { channel_count: 2, sample_rate: 48_000, sample_type: SampleType::I16 },
                    clip_time_range: TimeRange::new(RationalTime::zero(48_000.0), RationalTime::new(48_000.0 * 10.0, 48_000.0)),
                    in_transition: None,
                    out_transition: None,
                }],
            })
        });
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(renderer.rt_audio_current_frame, 1024);
    }

    #[test]
    fn fade_multiplier_ramps_from_zero_at_clip_start() {
        let window = FadeWindow { in_offset: RationalTime::new(480.0, 48_000.0), out_offset: RationalTime::zero(48_000.0) };
        let at_start = fade_multiplier(RationalTime::zero(48_000.0), Some(window), None, RationalTime::new(48_000.0, 48_000.0));
        assert_eq!(at_start, 0.0);
        let at_half = fade_multiplier(RationalTime::new(240.0, 48_000.0), Some(window), None, RationalTime::new(48_000.0, 48_000.0));
        assert!((at_half - 0.5).abs() < 1e-6);
    }

    #[test]
    fn reverse_interleaved_preserves_channel_order() {
        let mut samples = vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0];
        reverse_interleaved(&mut samples, 2);
        assert_eq!(samples, vec![3.0, -3.0, 2.0, -2.0, 1.0, -1.0]);
    }
}
