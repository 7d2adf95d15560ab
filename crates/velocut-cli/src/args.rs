// crates/velocut-cli/src/args.rs
//
// CLI surface (§6): the minimal playback host. Flag names are idiomatic
// clap kebab-case rather than the single-dash spelling of the example host
// this surface is modeled on — see DESIGN.md.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use velocut_core::options::LUTOrder;
use velocut_core::state::Playback;
use velocut_core::time::{RationalTime, TimeRange};

#[derive(Parser, Debug)]
#[command(name = "velocut-cli", about = "Timeline playback engine CLI", disable_help_flag = true)]
pub struct Cli {
    /// Path to a timeline JSON file.
    pub input_timeline: PathBuf,

    /// A second timeline to render side-by-side via a compare mode.
    #[arg(long = "compare")]
    pub compare: Option<PathBuf>,

    /// "WxH", e.g. "1920x1080".
    #[arg(long = "window-size", default_value = "1920x1080")]
    pub window_size: String,

    #[arg(long = "fullscreen", default_value_t = false)]
    pub fullscreen: bool,

    #[arg(long = "hud", default_value_t = 0)]
    pub hud: u8,

    #[arg(long = "playback", value_enum, default_value_t = PlaybackArg::Stop)]
    pub playback: PlaybackArg,

    /// `value/rate`, e.g. "96/24", or plain seconds, e.g. "4.5".
    #[arg(long = "seek")]
    pub seek: Option<String>,

    /// `start,end` in seconds, e.g. "1.0,4.5".
    #[arg(long = "in-out-range")]
    pub in_out_range: Option<String>,

    #[arg(long = "color-config")]
    pub color_config: Option<PathBuf>,

    #[arg(long = "color-input")]
    pub color_input: Option<String>,

    #[arg(long = "color-display")]
    pub color_display: Option<String>,

    #[arg(long = "color-view")]
    pub color_view: Option<String>,

    #[arg(long = "lut")]
    pub lut: Option<PathBuf>,

    #[arg(long = "lut-order", value_enum)]
    pub lut_order: Option<LUTOrderArg>,

    /// Verbose logging (otherwise only warnings and errors).
    #[arg(long = "log", default_value_t = false)]
    pub log: bool,

    #[arg(long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PlaybackArg {
    Stop,
    Forward,
    Reverse,
}

impl From<PlaybackArg> for Playback {
    fn from(p: PlaybackArg) -> Self {
        match p {
            PlaybackArg::Stop => Playback::Stop,
            PlaybackArg::Forward => Playback::Forward,
            PlaybackArg::Reverse => Playback::Reverse,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LUTOrderArg {
    PreColorConfig,
    PostColorConfig,
}

impl From<LUTOrderArg> for LUTOrder {
    fn from(o: LUTOrderArg) -> Self {
        match o {
            LUTOrderArg::PreColorConfig => LUTOrder::PreColorConfig,
            LUTOrderArg::PostColorConfig => LUTOrder::PostColorConfig,
        }
    }
}

/// Parse "WxH" into (width, height).
pub fn parse_window_size(s: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = s
        .split_once('x')
        .or_else(|| s.split_once('X'))
        .ok_or_else(|| anyhow::anyhow!("invalid window size '{s}', expected WxH"))?;
    Ok((w.trim().parse()?, h.trim().parse()?))
}

/// Parse `-seek`'s `value/rate` or plain-seconds form, falling back to
/// `fallback_rate` (the timeline's own rate) for the plain-seconds case.
pub fn parse_rational_time(s: &str, fallback_rate: f64) -> anyhow::Result<RationalTime> {
    if let Some((value, rate)) = s.split_once('/') {
        let value: f64 = value.trim().parse()?;
        let rate: f64 = rate.trim().parse()?;
        Ok(RationalTime::new(value, rate))
    } else {
        let secs: f64 = s.trim().parse()?;
        Ok(RationalTime::from_seconds(secs, fallback_rate))
    }
}

/// Parse `-in-out-range`'s `start,end` seconds form at `rate`.
pub fn parse_in_out_range(s: &str, rate: f64) -> anyhow::Result<TimeRange> {
    let (start, end) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("invalid range '{s}', expected start,end"))?;
    let start: f64 = start.trim().parse()?;
    let end: f64 = end.trim().parse()?;
    let start_t = RationalTime::from_seconds(start, rate);
    let duration = RationalTime::from_seconds((end - start).max(0.0), rate);
    Ok(TimeRange::new(start_t, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_window_size() {
        assert_eq!(parse_window_size("1920x1080").unwrap(), (1920, 1080));
    }

    #[test]
    fn parses_rational_time_fraction_form() {
        let t = parse_rational_time("96/24", 30.0).unwrap();
        assert_eq!(t.value, 96.0);
        assert_eq!(t.rate, 24.0);
    }

    #[test]
    fn parses_rational_time_seconds_form_at_fallback_rate() {
        let t = parse_rational_time("4.5", 24.0).unwrap();
        assert!((t.seconds() - 4.5).abs() < 1e-9);
        assert_eq!(t.rate, 24.0);
    }

    #[test]
    fn parses_in_out_range() {
        let r = parse_in_out_range("1.0,4.5", 24.0).unwrap();
        assert!((r.start.seconds() - 1.0).abs() < 1e-9);
        assert!((r.duration.seconds() - 3.5).abs() < 1e-9);
    }
}
