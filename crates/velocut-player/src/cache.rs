// crates/velocut-player/src/cache.rs
//
// FrameCache: the two maps owned exclusively by the Player (§2, §3) —
// `video_by_time` keyed by a quantized frame index at the timeline rate,
// `audio_by_second` keyed by integer second offset from `timeline_range.start`.

use std::collections::BTreeMap;

use velocut_core::media::{AudioData, VideoData};
use velocut_core::options::CacheInfo;
use velocut_core::time::{RationalTime, TimeRange};

pub struct FrameCache {
    rate: f64,
    video_by_time: BTreeMap<i64, VideoData>,
    audio_by_second: BTreeMap<i64, AudioData>,
}

impl FrameCache {
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            video_by_time: BTreeMap::new(),
            audio_by_second: BTreeMap::new(),
        }
    }

    /// Quantize `time` to a frame-index key at the timeline's own rate —
    /// the cache invariant in §3 ("a cached key is an offset in whole
    /// frames/seconds").
    pub fn video_key(&self, time: RationalTime) -> i64 {
        time.rescaled_to(self.rate).rounded().value as i64
    }

    pub fn insert_video(&mut self, time: RationalTime, data: VideoData) {
        self.video_by_time.insert(self.video_key(time), data);
    }

    pub fn get_video(&self, time: RationalTime) -> Option<&VideoData> {
        self.video_by_time.get(&self.video_key(time))
    }

    pub fn has_video(&self, time: RationalTime) -> bool {
        self.video_by_time.contains_key(&self.video_key(time))
    }

    pub fn insert_audio(&mut self, data: AudioData) {
        self.audio_by_second.insert(data.second_index, data);
    }

    pub fn get_audio(&self, second_index: i64) -> Option<&AudioData> {
        self.audio_by_second.get(&second_index)
    }

    pub fn has_audio(&self, second_index: i64) -> bool {
        self.audio_by_second.contains_key(&second_index)
    }

    /// Drop every entry whose key falls outside every window in `windows`.
    pub fn evict_video_outside(&mut self, windows: &[TimeRange]) {
        let rate = self.rate;
        self.video_by_time.retain(|&key, _| {
            let t = RationalTime::new(key as f64, rate);
            windows.iter().any(|w| w.contains(t) || t == w.end_time_inclusive())
        });
    }

    pub fn evict_audio_outside(&mut self, windows: &[TimeRange]) {
        self.audio_by_second.retain(|&sec, _| {
            windows.iter().any(|w| {
                let start_sec = w.start.seconds().floor() as i64;
                let end_sec = w.end_time_inclusive().seconds().ceil() as i64;
                sec >= start_sec && sec <= end_sec
            })
        });
    }

    pub fn clear(&mut self) {
        self.video_by_time.clear();
        self.audio_by_second.clear();
    }

    /// Contiguous cached video ranges, coalescing adjacent frame keys. Used
    /// by `CacheInfo` and by §8 scenario 1's "cache spans" assertion.
    pub fn video_ranges(&self) -> Vec<TimeRange> {
        coalesce_keys(self.video_by_time.keys().copied(), self.rate)
    }

    pub fn audio_ranges(&self) -> Vec<TimeRange> {
        coalesce_keys(self.audio_by_second.keys().copied(), 1.0)
    }

    pub fn cache_info(&self, video_window: RationalTime) -> CacheInfo {
        let video_ranges = self.video_ranges();
        let covered: f64 = video_ranges.iter().map(|r| r.duration.seconds()).sum();
        let video_percent = if video_window.seconds() > 0.0 {
            (((covered / video_window.seconds()) * 100.0).clamp(0.0, 100.0)) as f32
        } else {
            0.0f32
        };
        CacheInfo {
            video_percent,
            video_ranges,
            audio_ranges: self.audio_ranges(),
        }
    }
}

fn coalesce_keys(keys: impl Iterator<Item = i64>, rate: f64) -> Vec<TimeRange> {
    let mut sorted: Vec<i64> = keys.collect();
    sorted.sort_unstable();
    let mut ranges = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else { return ranges };
    let (mut start, mut end) = (first, first);
    for k in iter {
        if k == end + 1 {
            end = k;
        } else {
            ranges.push(key_range(start, end, rate));
            start = k;
            end = k;
        }
    }
    ranges.push(key_range(start, end, rate));
    ranges
}

fn key_range(start: i64, end: i64, rate: f64) -> TimeRange {
    let start_t = RationalTime::new(start as f64, rate);
    let duration = RationalTime::new((end - start + 1) as f64, rate);
    TimeRange::new(start_t, duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use velocut_core::image::Image;
    use velocut_core::media::VideoLayer;

    fn video_at(t: RationalTime) -> VideoData {
        let mut v = VideoData::at(t);
        v.layers.push(VideoLayer { image: Image::empty(), transition: None });
        v
    }

    #[test]
    fn coalesces_contiguous_frame_keys_into_one_range() {
        let mut cache = FrameCache::new(24.0);
        for n in 0..5 {
            let t = RationalTime::new(n as f64, 24.0);
            cache.insert_video(t, video_at(t));
        }
        let ranges = cache.video_ranges();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].duration.value, 5.0);
    }

    #[test]
    fn eviction_drops_keys_outside_window() {
        let mut cache = FrameCache::new(24.0);
        for n in 0..10 {
            let t = RationalTime::new(n as f64, 24.0);
            cache.insert_video(t, video_at(t));
        }
        let keep = TimeRange::new(RationalTime::new(5.0, 24.0), RationalTime::new(5.0, 24.0));
        cache.evict_video_outside(&[keep]);
        assert!(!cache.has_video(RationalTime::new(0.0, 24.0)));
        assert!(cache.has_video(RationalTime::new(5.0, 24.0)));
    }
}
