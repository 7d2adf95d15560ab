// crates/velocut-player/src/player.rs
//
// Player: the time-authoritative state machine (§4.1). An `Arc`-shared
// handle around `PlayerShared`; the Worker thread and the Audio renderer
// each hold only a `Weak` reference so neither can keep the Player alive
// past the Caller dropping its handle (§9 — break the observer cycle the
// way the teacher's own callback plumbing does with channels, generalized
// to an explicit weak-handle split since this isn't a GUI callback graph).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use velocut_core::io_contract::IoPlugin;
use velocut_core::media::{AudioData, VideoData};
use velocut_core::options::CacheInfo;
use velocut_core::state::{CacheDirection, Loop, Playback, PlayerState};
use velocut_core::time::{RationalTime, TimeRange};
use velocut_core::timeline::Timeline;

use crate::audio::AudioControlState;
use crate::cache::FrameCache;
use crate::worker;

/// A single-value stream: the latest value plus nothing else. Observers
/// poll `get()`; there is no push/subscribe callback list because nothing
/// in this engine's consumers (Caller tick loop, renderer, CLI HUD) needs
/// one — matching §4.1's "each a value-stream an external consumer can
/// subscribe to" without inventing a pub/sub bus the spec doesn't ask for.
pub struct Observable<T> {
    value: Mutex<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        Self { value: Mutex::new(value) }
    }

    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.value.lock() = value;
    }
}

/// Default read-ahead/read-behind window, matching a generous few seconds
/// of 24fps playback — wide enough that scrub/seek has frames ready, small
/// enough that memory use stays bounded for a single-clip timeline.
pub const DEFAULT_READ_AHEAD_SECS: f64 = 2.0;
pub const DEFAULT_READ_BEHIND_SECS: f64 = 1.0;

pub struct PlayerShared {
    pub timeline: Timeline,
    pub io: Arc<dyn IoPlugin>,
    pub state: Mutex<PlayerState>,
    pub cache: Mutex<FrameCache>,
    pub audio_control: Mutex<AudioControlState>,
    pub read_ahead: RationalTime,
    pub read_behind: RationalTime,
    pub current_time_obs: Observable<RationalTime>,
    pub playback_obs: Observable<Playback>,
    pub cache_info_obs: Observable<CacheInfo>,
    pub current_video_obs: Observable<VideoData>,
    pub current_audio_obs: Observable<AudioData>,
    pub wake: Condvar,
    pub wake_mutex: Mutex<()>,
    pub next_request_id: AtomicU64,
    pub shutdown: AtomicBool,
}

impl PlayerShared {
    pub fn notify_worker(&self) {
        let _guard = self.wake_mutex.lock();
        self.wake.notify_one();
    }

    pub fn next_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }
}

pub struct Player {
    shared: Arc<PlayerShared>,
    worker_thread: Option<JoinHandle<()>>,
}

impl Player {
    pub fn new(timeline: Timeline, io: Arc<dyn IoPlugin>) -> Self {
        Self::with_read_window(
            timeline,
            io,
            RationalTime::from_seconds(DEFAULT_READ_AHEAD_SECS, 1.0),
            RationalTime::from_seconds(DEFAULT_READ_BEHIND_SECS, 1.0),
        )
    }

    pub fn with_read_window(
        timeline: Timeline,
        io: Arc<dyn IoPlugin>,
        read_ahead: RationalTime,
        read_behind: RationalTime,
    ) -> Self {
        let range = timeline.global_range();
        let rate = timeline.rate.max(1.0);
        let state = PlayerState::new(range);

        let shared = Arc::new(PlayerShared {
            timeline,
            io,
            state: Mutex::new(state.clone()),
            cache: Mutex::new(FrameCache::new(rate)),
            audio_control: Mutex::new(AudioControlState::new(rate)),
            read_ahead,
            read_behind,
            current_time_obs: Observable::new(state.current_time),
            playback_obs: Observable::new(state.playback),
            cache_info_obs: Observable::new(CacheInfo::default()),
            current_video_obs: Observable::new(VideoData::default()),
            current_audio_obs: Observable::new(AudioData::default()),
            wake: Condvar::new(),
            wake_mutex: Mutex::new(()),
            next_request_id: AtomicU64::new(1),
            shutdown: AtomicBool::new(false),
        });

        let worker_weak: Weak<PlayerShared> = Arc::downgrade(&shared);
        let worker_thread = std::thread::Builder::new()
            .name("velocut-player-worker".into())
            .spawn(move || worker::run(worker_weak))
            .expect("spawn velocut-player worker thread");

        Self { shared, worker_thread: Some(worker_thread) }
    }

    /// A weak handle suitable for the Audio renderer or an observer to hold
    /// without keeping the Player alive.
    pub fn downgrade(&self) -> Weak<PlayerShared> {
        Arc::downgrade(&self.shared)
    }

    pub fn set_playback(&self, playback: Playback) {
        let mut state = self.shared.state.lock();
        state.playback = playback;
        if playback == Playback::Stop {
            state.clear_requests = true;
        } else {
            let mut audio = self.shared.audio_control.lock();
            audio.reset = true;
            audio.playback = playback;
            audio.playback_start_time = state.current_time;
        }
        self.shared.playback_obs.set(playback);
        self.shared.notify_worker();
    }

    pub fn seek(&self, time: RationalTime) {
        let mut state = self.shared.state.lock();
        let global = self.shared.timeline.global_range();
        let clamped = global.clamp(time.rescaled_to(state.current_time.rate).floored());
        state.current_time = clamped;
        state.playback_start_time = clamped;
        state.clear_requests = true;
        self.shared.current_time_obs.set(clamped);
        let mut audio = self.shared.audio_control.lock();
        audio.reset = true;
        audio.playback_start_time = clamped;
        audio.mute_timeout = Some(std::time::Instant::now() + crate::audio::CLICK_SUPPRESSION);
        drop(audio);
        drop(state);
        self.shared.notify_worker();
    }

    pub fn set_in_out_range(&self, range: TimeRange) {
        let mut state = self.shared.state.lock();
        let global = self.shared.timeline.global_range();
        let start = global.clamp(range.start);
        // §3: `in_out_range ⊆ timeline_range`. Clamping only `start` can still
        // let the exclusive end run past `global`'s; clamp `duration` too so
        // the whole range stays inside the timeline.
        let max_duration = global.end_time_exclusive() - start;
        let duration = if range.duration.seconds() > max_duration.seconds() {
            max_duration
        } else {
            range.duration
        };
        let new_range = TimeRange::new(start, duration);
        state.in_out_range = new_range;
        state.current_time = new_range.clamp(state.current_time);
        self.shared.current_time_obs.set(state.current_time);
        self.shared.notify_worker();
    }

    pub fn set_loop(&self, mode: Loop) {
        self.shared.state.lock().loop_mode = mode;
    }

    pub fn set_speed(&self, speed: f64) {
        self.shared.audio_control.lock().speed = speed;
    }

    pub fn set_volume(&self, volume: f32) {
        self.shared.audio_control.lock().volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_mute(&self, mute: bool) {
        self.shared.audio_control.lock().mute = mute;
    }

    pub fn set_channel_mute(&self, channels: Vec<u32>) {
        self.shared.audio_control.lock().channel_mute = channels;
    }

    pub fn set_audio_offset(&self, seconds: f64) {
        self.shared.audio_control.lock().audio_offset = seconds;
    }

    /// Advance `current_time` by `elapsed_secs * sign * speed`, then apply
    /// the loop state machine (§4.1). Called by the Caller at display rate.
    pub fn tick(&self, elapsed_secs: f64) {
        let speed = self.shared.audio_control.lock().speed;
        let mut state = self.shared.state.lock();
        let sign = match state.playback {
            Playback::Forward => 1.0,
            Playback::Reverse => -1.0,
            Playback::Stop => return,
        };
        let rate = state.current_time.rate;
        let advance = RationalTime::from_seconds(elapsed_secs * sign * speed, rate);
        let candidate = state.current_time + advance;
        let (resolved, reset_audio) = state.apply_loop(candidate);
        state.current_time = resolved;
        self.shared.current_time_obs.set(resolved);
        self.shared.playback_obs.set(state.playback);
        let clear = state.clear_requests;
        state.clear_requests = false;
        drop(state);

        if reset_audio {
            let mut audio = self.shared.audio_control.lock();
            audio.reset = true;
            audio.playback_start_time = resolved;
        }
        if clear {
            self.shared.notify_worker();
        }
    }

    pub fn current_time(&self) -> RationalTime {
        self.shared.current_time_obs.get()
    }

    pub fn playback(&self) -> Playback {
        self.shared.playback_obs.get()
    }

    pub fn cache_direction(&self) -> CacheDirection {
        self.shared.state.lock().cache_direction
    }

    pub fn cache_info(&self) -> CacheInfo {
        self.shared.cache_info_obs.get()
    }

    pub fn current_video(&self) -> VideoData {
        self.shared.current_video_obs.get()
    }

    pub fn current_audio(&self) -> AudioData {
        self.shared.current_audio_obs.get()
    }

    pub fn timeline_range(&self) -> TimeRange {
        self.shared.timeline.global_range()
    }

    /// Refresh `current_video`/`current_audio` observers from whatever the
    /// Worker has reaped so far for the current time. Called by the Caller
    /// after `tick()`; kept separate so a caller driving the renderer
    /// directly can poll the cache without forcing a time advance.
    pub fn refresh_current(&self) {
        let time = self.current_time();
        let cache = self.shared.cache.lock();
        if let Some(v) = cache.get_video(time) {
            self.shared.current_video_obs.set(v.clone());
        }
        let second = time.seconds().floor() as i64;
        if let Some(a) = cache.get_audio(second) {
            self.shared.current_audio_obs.set(a.clone());
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        self.shared.notify_worker();
        if let Some(handle) = self.worker_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Default for Playback {
    fn default() -> Self {
        Playback::Stop
    }
}
