// crates/velocut-core/src/state.rs
//
// Player-visible playback state — the fields the Caller thread reads and
// mutates, and the fields the Worker/audio threads publish back (§3, §4.1).
// No ffmpeg, no GPU handles, no UI widgets: pure data plus the loop state
// machine's pure transition function.

use serde::{Deserialize, Serialize};

use crate::time::{loop_time, RationalTime, TimeRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Playback {
    Stop,
    Forward,
    Reverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Loop {
    Loop,
    Once,
    PingPong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheDirection {
    Forward,
    Reverse,
}

/// Convenience aspect ratios for the CLI's `-windowSize` flag (§6). Not
/// load-bearing for any playback algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AspectRatio {
    SixteenNine,
    NineSixteen,
    FourThree,
    OneOne,
}

impl AspectRatio {
    pub fn ratio(self) -> f32 {
        match self {
            AspectRatio::SixteenNine => 16.0 / 9.0,
            AspectRatio::NineSixteen => 9.0 / 16.0,
            AspectRatio::FourThree => 4.0 / 3.0,
            AspectRatio::OneOne => 1.0,
        }
    }
}

/// Shared state published by the Player/Worker pair and read by the Caller
/// and renderer. Mirrors the two-mutex split in tlRender's
/// `PlayerPrivate`: video/transport state here, audio-only snapshot state
/// carried separately by the audio renderer (`velocut_player::audio`) so the
/// realtime callback never contends with Worker/Caller locking.
#[derive(Clone, Debug)]
pub struct PlayerState {
    pub playback: Playback,
    pub loop_mode: Loop,
    pub cache_direction: CacheDirection,
    pub current_time: RationalTime,
    pub in_out_range: TimeRange,
    pub playback_start_time: RationalTime,
    /// Set by `apply_loop` when a loop/ping-pong wrap or a stop-at-bound
    /// transition requires the Worker to drop and reissue its in-flight
    /// requests (tlRender's `clearRequests`).
    pub clear_requests: bool,
}

impl PlayerState {
    pub fn new(in_out_range: TimeRange) -> Self {
        Self {
            playback: Playback::Stop,
            loop_mode: Loop::Loop,
            cache_direction: CacheDirection::Forward,
            current_time: in_out_range.start,
            in_out_range,
            playback_start_time: in_out_range.start,
            clear_requests: false,
        }
    }

    /// Apply the loop state machine to a candidate time value, mutating
    /// `self` exactly as tlRender's `loopPlayback` mutates `Player::Private`
    /// — state fields are updated before the caller resets the audio clock,
    /// and a PingPong bound-crossing always flips `cache_direction` together
    /// with `playback`. Returns the (possibly clamped/wrapped) time and
    /// whether the audio clock must be reset.
    pub fn apply_loop(&mut self, time: RationalTime) -> (RationalTime, bool) {
        let range = self.in_out_range;
        match self.loop_mode {
            Loop::Loop => {
                let mut looped = false;
                let out = loop_time(time, range, &mut looped);
                if looped {
                    self.playback_start_time = out;
                }
                (out, looped)
            }
            Loop::Once => {
                if time < range.start && self.playback == Playback::Reverse {
                    self.playback = Playback::Stop;
                    self.clear_requests = true;
                    (range.start, false)
                } else if time > range.end_time_inclusive() && self.playback == Playback::Forward
                {
                    self.playback = Playback::Stop;
                    self.clear_requests = true;
                    (range.end_time_inclusive(), false)
                } else {
                    (time, false)
                }
            }
            Loop::PingPong => {
                if time < range.start && self.playback == Playback::Reverse {
                    let out = range.start;
                    self.playback = Playback::Forward;
                    self.playback_start_time = out;
                    self.clear_requests = true;
                    self.cache_direction = CacheDirection::Forward;
                    (out, true)
                } else if time > range.end_time_inclusive() && self.playback == Playback::Forward
                {
                    let out = range.end_time_inclusive();
                    self.playback = Playback::Reverse;
                    self.playback_start_time = out;
                    self.clear_requests = true;
                    self.cache_direction = CacheDirection::Reverse;
                    (out, true)
                } else {
                    (time, false)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> TimeRange {
        TimeRange::new(RationalTime::zero(24.0), RationalTime::new(240.0, 24.0))
    }

    #[test]
    fn loop_mode_wraps_past_end() {
        let mut st = PlayerState::new(range());
        st.playback = Playback::Forward;
        let (out, reset) = st.apply_loop(RationalTime::new(241.0, 24.0));
        assert!(reset);
        assert_eq!(out.value, 1.0);
        assert_eq!(st.playback_start_time.value, 1.0);
    }

    #[test]
    fn once_mode_stops_at_end_and_requests_clear() {
        let mut st = PlayerState::new(range());
        st.loop_mode = Loop::Once;
        st.playback = Playback::Forward;
        let (out, reset) = st.apply_loop(RationalTime::new(241.0, 24.0));
        assert!(!reset);
        assert_eq!(out, range().end_time_inclusive());
        assert_eq!(st.playback, Playback::Stop);
        assert!(st.clear_requests);
    }

    #[test]
    fn ping_pong_flips_direction_and_cache_direction_together() {
        let mut st = PlayerState::new(range());
        st.loop_mode = Loop::PingPong;
        st.playback = Playback::Forward;
        let (out, reset) = st.apply_loop(RationalTime::new(241.0, 24.0));
        assert!(reset);
        assert_eq!(out, range().end_time_inclusive());
        assert_eq!(st.playback, Playback::Reverse);
        assert_eq!(st.cache_direction, CacheDirection::Reverse);
        assert!(st.clear_requests);
    }

    #[test]
    fn ping_pong_reverse_past_start_flips_to_forward() {
        let mut st = PlayerState::new(range());
        st.loop_mode = Loop::PingPong;
        st.playback = Playback::Reverse;
        let (out, reset) = st.apply_loop(RationalTime::new(-1.0, 24.0));
        assert!(reset);
        assert_eq!(out, range().start);
        assert_eq!(st.playback, Playback::Forward);
        assert_eq!(st.cache_direction, CacheDirection::Forward);
    }
}
