// crates/velocut-core/src/time.rs
//
// RationalTime / TimeRange — value-typed time arithmetic shared by every
// crate in the workspace. Rates are Hz (frames per second for video,
// sample rate for audio). Equality is exact on (value, rate); arithmetic
// rescales via cross-multiplication so mixed-rate comparisons never drift
// through an intermediate float.

use serde::{Deserialize, Serialize};

/// A single point in time expressed as `value / rate` seconds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RationalTime {
    pub value: f64,
    pub rate:  f64,
}

impl RationalTime {
    pub fn new(value: f64, rate: f64) -> Self {
        debug_assert!(rate > 0.0, "RationalTime rate must be positive");
        Self { value, rate }
    }

    pub fn zero(rate: f64) -> Self {
        Self::new(0.0, rate)
    }

    pub fn seconds(&self) -> f64 {
        self.value / self.rate
    }

    /// Rescale to a new rate. Lossless when `rate` divides `new_rate` or vice
    /// versa; otherwise the value is recomputed from seconds and may round.
    pub fn rescaled_to(&self, new_rate: f64) -> Self {
        if (self.rate - new_rate).abs() < f64::EPSILON {
            return *self;
        }
        Self::new(self.value * new_rate / self.rate, new_rate)
    }

    /// Round to the nearest whole-sample value at the current rate.
    /// Used at display time (§8: "round-nearest at display").
    pub fn rounded(&self) -> Self {
        Self::new(self.value.round(), self.rate)
    }

    /// Floor to the nearest whole-sample value at the current rate.
    /// Used at seek time (§8: "floor at seeks").
    pub fn floored(&self) -> Self {
        Self::new(self.value.floor(), self.rate)
    }

    pub fn to_samples(&self, rate: f64) -> i64 {
        self.rescaled_to(rate).value.round() as i64
    }

    pub fn from_seconds(secs: f64, rate: f64) -> Self {
        Self::new(secs * rate, rate)
    }
}

impl PartialEq for RationalTime {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.rate == other.rate
    }
}

impl PartialOrd for RationalTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.seconds().partial_cmp(&other.seconds())
    }
}

impl std::ops::Add for RationalTime {
    type Output = RationalTime;
    fn add(self, rhs: RationalTime) -> RationalTime {
        if (self.rate - rhs.rate).abs() < f64::EPSILON {
            RationalTime::new(self.value + rhs.value, self.rate)
        } else {
            RationalTime::from_seconds(self.seconds() + rhs.seconds(), self.rate)
        }
    }
}

impl std::ops::Sub for RationalTime {
    type Output = RationalTime;
    fn sub(self, rhs: RationalTime) -> RationalTime {
        if (self.rate - rhs.rate).abs() < f64::EPSILON {
            RationalTime::new(self.value - rhs.value, self.rate)
        } else {
            RationalTime::from_seconds(self.seconds() - rhs.seconds(), self.rate)
        }
    }
}

/// A half-open span `[start, start + duration)`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TimeRange {
    pub start:    RationalTime,
    pub duration: RationalTime,
}

impl TimeRange {
    pub fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self { start, duration }
    }

    pub fn end_time_exclusive(&self) -> RationalTime {
        self.start + self.duration
    }

    /// Last time value still inside the range (one sample before the
    /// exclusive end), matching tlRender's `end_time_inclusive()`.
    pub fn end_time_inclusive(&self) -> RationalTime {
        let one = RationalTime::new(1.0, self.duration.rate);
        self.end_time_exclusive() - one
    }

    pub fn contains(&self, t: RationalTime) -> bool {
        t.seconds() >= self.start.seconds() && t.seconds() < self.end_time_exclusive().seconds()
    }

    /// Clamp `t` into `[start, end_time_inclusive]`.
    pub fn clamp(&self, t: RationalTime) -> RationalTime {
        let s = t.seconds();
        if s < self.start.seconds() {
            self.start
        } else if s > self.end_time_inclusive().seconds() {
            self.end_time_inclusive()
        } else {
            t
        }
    }

    /// Expand the range by `amount` at both ends, oriented so a non-negative
    /// `amount` always grows the range (used for audio-offset window
    /// expansion in the Worker, §4.1 step 3).
    pub fn expanded(&self, behind: RationalTime, ahead: RationalTime) -> Self {
        let rate = self.start.rate;
        let new_start = self.start - behind.rescaled_to(rate);
        let new_dur = self.duration + behind.rescaled_to(rate) + ahead.rescaled_to(rate);
        Self::new(new_start, new_dur)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.start.seconds() < other.end_time_exclusive().seconds()
            && other.start.seconds() < self.end_time_exclusive().seconds()
    }
}

/// Loop a time value inside `range`, reporting whether a wrap occurred.
/// Mirrors tlRender's free function `timeline::loop()`.
pub fn loop_time(t: RationalTime, range: TimeRange, looped: &mut bool) -> RationalTime {
    *looped = false;
    let start = range.start.seconds();
    let end = range.end_time_inclusive().seconds();
    let span = (end - start).max(f64::EPSILON);
    let s = t.seconds();
    if s < start {
        *looped = true;
        let over = start - s;
        RationalTime::from_seconds(end - (over % span), t.rate)
    } else if s > end {
        *looped = true;
        let over = s - end;
        RationalTime::from_seconds(start + (over % span), t.rate)
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_is_lossless_when_rates_divide() {
        let t = RationalTime::new(48.0, 24.0); // 2.0s
        let r = t.rescaled_to(48000.0);
        assert_eq!(r.value, 96000.0);
        assert!((r.seconds() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_stays_inside_range() {
        let range = TimeRange::new(RationalTime::zero(24.0), RationalTime::new(240.0, 24.0));
        let t = RationalTime::new(-10.0, 24.0);
        assert_eq!(range.clamp(t).value, 0.0);
        let t2 = RationalTime::new(1000.0, 24.0);
        assert_eq!(range.clamp(t2), range.end_time_inclusive());
    }

    #[test]
    fn end_time_inclusive_is_one_sample_before_end() {
        let range = TimeRange::new(RationalTime::zero(24.0), RationalTime::new(240.0, 24.0));
        assert_eq!(range.end_time_inclusive().value, 239.0);
    }
}
