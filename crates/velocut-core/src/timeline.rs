// crates/velocut-core/src/timeline.rs
//
// Read-only input data describing what the Player plays: an ordered list of
// clips plus the transitions between adjacent boundaries. Construction-time
// only — no editing API is exposed here (Non-goal: timeline editing, full
// OpenTimelineIO parsing). A real host loads this from whatever project
// format it owns and hands the Player a `Timeline`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{RationalTime, TimeRange};
use crate::transitions::TransitionKind;

/// One source clip occupying a contiguous span of the timeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Clip {
    pub id: Uuid,
    pub media_path: PathBuf,
    /// This clip's span on the timeline's own clock.
    pub timeline_range: TimeRange,
    /// The offset into the source media where this clip's content starts.
    pub source_start: RationalTime,
    /// 0 = primary video/audio track, 1 = secondary compare track, etc.
    pub track: u32,
}

/// A transition spanning the boundary between `clips[index]` and
/// `clips[index + 1]`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TimelineTransition {
    pub clip_index: usize,
    pub kind: TransitionKind,
    pub duration: RationalTime,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Timeline {
    pub rate: f64,
    pub clips: Vec<Clip>,
    pub transitions: Vec<TimelineTransition>,
}

impl Timeline {
    pub fn duration(&self) -> RationalTime {
        self.clips
            .iter()
            .map(|c| c.timeline_range.end_time_exclusive())
            .max_by(|a, b| a.seconds().partial_cmp(&b.seconds()).unwrap())
            .unwrap_or_else(|| RationalTime::zero(self.rate.max(1.0)))
    }

    pub fn global_range(&self) -> TimeRange {
        TimeRange::new(RationalTime::zero(self.rate.max(1.0)), self.duration())
    }

    /// Clip whose `timeline_range` contains `time`, if any.
    pub fn clip_at(&self, time: RationalTime) -> Option<&Clip> {
        self.clips.iter().find(|c| c.timeline_range.contains(time))
    }

    /// Transition registered at the boundary after `clip_index`, if any.
    pub fn transition_after(&self, clip_index: usize) -> Option<&TimelineTransition> {
        self.transitions.iter().find(|t| t.clip_index == clip_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(id: u8, start: f64, dur: f64) -> Clip {
        Clip {
            id: Uuid::from_u128(id as u128),
            media_path: PathBuf::from(format!("clip{id}.mov")),
            timeline_range: TimeRange::new(
                RationalTime::new(start * 24.0, 24.0),
                RationalTime::new(dur * 24.0, 24.0),
            ),
            source_start: RationalTime::zero(24.0),
            track: 0,
        }
    }

    #[test]
    fn duration_is_end_of_last_clip() {
        let tl = Timeline {
            rate: 24.0,
            clips: vec![clip(0, 0.0, 5.0), clip(1, 5.0, 3.0)],
            transitions: vec![],
        };
        assert_eq!(tl.duration().seconds(), 8.0);
    }

    #[test]
    fn clip_at_finds_containing_clip() {
        let tl = Timeline {
            rate: 24.0,
            clips: vec![clip(0, 0.0, 5.0), clip(1, 5.0, 3.0)],
            transitions: vec![],
        };
        let found = tl.clip_at(RationalTime::new(6.0 * 24.0, 24.0)).unwrap();
        assert_eq!(found.id, Uuid::from_u128(1));
    }
}
