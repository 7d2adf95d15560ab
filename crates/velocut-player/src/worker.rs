// crates/velocut-player/src/worker.rs
//
// The Worker thread (§4.1 "Worker thread loop"): the only thread that
// issues I/O requests, reaps them into the Frame Cache, evicts stale
// entries, and publishes `CacheInfo`. One dedicated long-lived thread per
// Player; blocks on a condvar with a short timeout (§5).

use std::collections::HashMap;
use std::sync::Weak;
use std::time::{Duration, Instant};

use velocut_core::io_contract::{IoHandle, Poll};
use velocut_core::media::{AudioData, AudioLayer, FadeWindow, VideoData, VideoLayer};
use velocut_core::state::CacheDirection;
use velocut_core::time::{RationalTime, TimeRange};
use velocut_core::timeline::{Clip, Timeline};

use crate::player::PlayerShared;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CACHE_INFO_INTERVAL: Duration = Duration::from_millis(500);
const BOUNDARY_PRIME_SECS: f64 = 0.5;

/// Oriented cache window: `read_ahead` extends in the direction of travel,
/// `read_behind` extends opposite it (§4.1 step 2).
pub fn oriented_window(
    current: RationalTime,
    direction: CacheDirection,
    read_ahead: RationalTime,
    read_behind: RationalTime,
) -> TimeRange {
    let (behind, ahead) = match direction {
        CacheDirection::Forward => (read_behind, read_ahead),
        CacheDirection::Reverse => (read_ahead, read_behind),
    };
    TimeRange::new(current, RationalTime::zero(current.rate)).expanded(behind, ahead)
}

/// A small extra window at the opposite loop boundary so the wrap point has
/// frames ready the instant playback crosses it (§4.1 step 2, "when
/// looping, a second window at the opposite end is appended").
fn boundary_priming_window(bound: TimeRange, direction: CacheDirection) -> TimeRange {
    let rate = bound.start.rate;
    let prime = RationalTime::from_seconds(BOUNDARY_PRIME_SECS, rate);
    match direction {
        CacheDirection::Forward => TimeRange::new(bound.start, prime),
        CacheDirection::Reverse => {
            let start = bound.end_time_inclusive() - prime;
            TimeRange::new(start, prime)
        }
    }
}

/// Frame keys to request, in scan order matching `direction` (§4.1 step 5).
fn scan_keys(window: TimeRange, rate: f64, direction: CacheDirection) -> Vec<i64> {
    let start = (window.start.rescaled_to(rate).value).floor() as i64;
    let end = (window.end_time_inclusive().rescaled_to(rate).value).ceil() as i64;
    let mut keys: Vec<i64> = (start..=end).collect();
    if direction == CacheDirection::Reverse {
        keys.reverse();
    }
    keys
}

fn source_time_for(clip: &Clip, timeline_time: RationalTime) -> RationalTime {
    let offset = timeline_time - clip.timeline_range.start;
    clip.source_start + offset
}

fn fade_window_for(timeline: &Timeline, clip_index: usize, entering: bool) -> Option<FadeWindow> {
    let boundary = if entering {
        clip_index.checked_sub(1)
    } else {
        Some(clip_index)
    }?;
    let transition = timeline.transition_after(boundary)?;
    if entering {
        Some(FadeWindow { in_offset: transition.duration, out_offset: RationalTime::zero(transition.duration.rate) })
    } else {
        Some(FadeWindow { in_offset: RationalTime::zero(transition.duration.rate), out_offset: transition.duration })
    }
}

struct PendingVideo {
    id: u64,
    handle: IoHandle<velocut_core::image::Image>,
}

struct PendingAudio {
    id: u64,
    handle: IoHandle<(i64, Vec<u8>)>,
}

pub fn run(weak: Weak<PlayerShared>) {
    let mut pending_video: HashMap<i64, PendingVideo> = HashMap::new();
    let mut pending_audio: HashMap<i64, PendingAudio> = HashMap::new();
    let mut audio_info_cache: HashMap<std::path::PathBuf, velocut_core::media::AudioInfo> = HashMap::new();
    let mut last_cache_info = Instant::now() - CACHE_INFO_INTERVAL;

    loop {
        let Some(shared) = weak.upgrade() else { return };
        if shared.shutdown.load(std::sync::atomic::Ordering::Relaxed) {
            return;
        }

        let state = shared.state.lock().clone();
        let audio_offset = shared.audio_control.lock().audio_offset;
        let rate = shared.timeline.rate.max(1.0);

        // Step 2: compute windows.
        let video_window = oriented_window(state.current_time, state.cache_direction, shared.read_ahead, shared.read_behind);
        let mut video_windows = vec![video_window];
        if state.loop_mode == velocut_core::state::Loop::Loop {
            video_windows.push(boundary_priming_window(state.in_out_range, state.cache_direction));
        }

        // Step 3: audio window = video window expanded by |audio_offset|.
        let offset_rt = RationalTime::from_seconds(audio_offset.abs(), rate);
        let audio_windows: Vec<TimeRange> = video_windows
            .iter()
            .map(|w| w.expanded(offset_rt, offset_rt))
            .collect();

        // Handle an explicit clear-requests: cancel in-flight I/O so stale
        // results don't land after a seek/stop (§4.1 step 5 id bookkeeping).
        if state.clear_requests {
            let ids: Vec<u64> = pending_video
                .values()
                .map(|p| p.id)
                .chain(pending_audio.values().map(|p| p.id))
                .collect();
            shared.io.cancel_requests(&ids);
            pending_video.clear();
            pending_audio.clear();
        }

        // Step 4: evict.
        {
            let mut cache = shared.cache.lock();
            cache.evict_video_outside(&video_windows);
            cache.evict_audio_outside(&audio_windows);
        }
        pending_video.retain(|&key, _| {
            let t = RationalTime::new(key as f64, rate);
            video_windows.iter().any(|w| w.contains(t) || t == w.end_time_inclusive())
        });
        pending_audio.retain(|&sec, _| {
            audio_windows.iter().any(|w| {
                let s = w.start.seconds().floor() as i64;
                let e = w.end_time_inclusive().seconds().ceil() as i64;
                sec >= s && sec <= e
            })
        });

        // Step 5: request missing frames/seconds in scan order.
        for window in &video_windows {
            for key in scan_keys(*window, rate, state.cache_direction) {
                let time = RationalTime::new(key as f64, rate);
                let already = {
                    let cache = shared.cache.lock();
                    cache.has_video(time)
                };
                if already || pending_video.contains_key(&key) {
                    continue;
                }
                let Some(clip) = shared.timeline.clip_at(time) else { continue };
                let id = shared.next_id();
                if let Ok(handle) = shared.io.request_video(&clip.media_path, source_time_for(clip, time), id) {
                    pending_video.insert(key, PendingVideo { id, handle });
                }
            }
        }
        for window in &audio_windows {
            let start_sec = window.start.seconds().floor() as i64;
            let end_sec = window.end_time_inclusive().seconds().ceil() as i64;
            let mut secs: Vec<i64> = (start_sec..=end_sec).collect();
            if state.cache_direction == CacheDirection::Reverse {
                secs.reverse();
            }
            for sec in secs {
                let already = {
                    let cache = shared.cache.lock();
                    cache.has_audio(sec)
                };
                if already || pending_audio.contains_key(&sec) {
                    continue;
                }
                let time = RationalTime::new(sec as f64, rate);
                let Some(clip) = shared.timeline.clip_at(time) else { continue };
                let source_sec = (sec - clip.timeline_range.start.seconds().floor() as i64)
                    + clip.source_start.seconds().floor() as i64;
                let id = shared.next_id();
                if let Ok(handle) = shared.io.request_audio(&clip.media_path, source_sec, id) {
                    pending_audio.insert(sec, PendingAudio { id, handle });
                }
            }
        }

        // Step 6: reap.
        let mut done_video = Vec::new();
        for (&key, pending) in pending_video.iter() {
            match pending.handle.poll() {
                Poll::Ready(image) => done_video.push((key, Some(image))),
                Poll::Cancelled => done_video.push((key, None)),
                Poll::Pending => {}
            }
        }
        for (key, image) in done_video {
            pending_video.remove(&key);
            let time = RationalTime::new(key as f64, rate);
            if video_windows.iter().all(|w| !w.contains(time) && time != w.end_time_inclusive()) {
                continue; // stale: no longer in-window
            }
            if let Some(image) = image {
                let data = build_video_data(&shared.timeline, time, image);
                shared.cache.lock().insert_video(time, data);
            }
        }

        let mut done_audio = Vec::new();
        for (&sec, pending) in pending_audio.iter() {
            match pending.handle.poll() {
                Poll::Ready((returned_sec, bytes)) => done_audio.push((sec, Some((returned_sec, bytes)))),
                Poll::Cancelled => done_audio.push((sec, None)),
                Poll::Pending => {}
            }
        }
        for (sec, result) in done_audio {
            pending_audio.remove(&sec);
            let in_window = audio_windows.iter().any(|w| {
                let s = w.start.seconds().floor() as i64;
                let e = w.end_time_inclusive().seconds().ceil() as i64;
                sec >= s && sec <= e
            });
            if !in_window {
                continue;
            }
            if let Some((_, bytes)) = result {
                let time = RationalTime::new(sec as f64, rate);
                if let Some(clip) = shared.timeline.clip_at(time) {
                    let info = *audio_info_cache.entry(clip.media_path.clone()).or_insert_with(|| {
                        shared
                            .io
                            .probe(&clip.media_path)
                            .ok()
                            .and_then(|i| i.audio)
                            .unwrap_or(velocut_core::media::AudioInfo {
                                channel_count: 2,
                                sample_rate: 48_000,
                                sample_type: velocut_core::media::SampleType::I16,
                            })
                    });
                    let clip_index = shared.timeline.clips.iter().position(|c| c.id == clip.id).unwrap_or(0);
                    let layer = AudioLayer {
                        samples: std::sync::Arc::new(bytes),
                        info,
                        clip_time_range: clip.timeline_range,
                        in_transition: fade_window_for(&shared.timeline, clip_index, true),
                        out_transition: fade_window_for(&shared.timeline, clip_index, false),
                    };
                    shared.cache.lock().insert_audio(AudioData { second_index: sec, layers: vec![layer] });
                }
            }
        }

        // Step 7: publish cache info at <= 2Hz.
        if last_cache_info.elapsed() >= CACHE_INFO_INTERVAL {
            last_cache_info = Instant::now();
            let info = shared.cache.lock().cache_info(shared.read_ahead);
            shared.cache_info_obs.set(info);
        }

        // Reset the one-shot clear flag now that the Worker has acted on it.
        if state.clear_requests {
            shared.state.lock().clear_requests = false;
        }

        // Step 8: sleep on the condvar with a short timeout.
        let mut guard = shared.wake_mutex.lock();
        shared.wake.wait_for(&mut guard, POLL_INTERVAL);
    }
}

fn build_video_data(timeline: &Timeline, time: RationalTime, image: velocut_core::image::Image) -> VideoData {
    let mut data = VideoData::at(time);
    let transition = timeline.clip_at(time).and_then(|clip| {
        let idx = timeline.clips.iter().position(|c| c.id == clip.id)?;
        let boundary_after = timeline.transition_after(idx)?;
        let boundary_time = clip.timeline_range.end_time_exclusive();
        let half = RationalTime::from_seconds(boundary_after.duration.seconds() / 2.0, boundary_after.duration.rate);
        let window = TimeRange::new(boundary_time - half, boundary_after.duration);
        if window.contains(time) {
            let progress = ((time - window.start).seconds() / window.duration.seconds().max(1e-9)) as f32;
            Some((boundary_after.kind, progress.clamp(0.0, 1.0)))
        } else {
            None
        }
    });
    data.layers.push(VideoLayer { image, transition });
    data
}
