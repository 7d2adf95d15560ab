// crates/velocut-io/src/synthetic.rs
//
// SyntheticIoPlugin: a no-FFmpeg `IoPlugin` that paints a solid colour card
// per requested time and a sine-wave tone for audio. Used by tests that
// shouldn't depend on a real media file being present, and by the CLI's
// `-compare` demo path.

use std::path::Path;

use crossbeam_channel::unbounded;

use velocut_core::error::{Error, Result};
use velocut_core::image::{Image, Size};
use velocut_core::io_contract::{IoHandle, IoPlugin, MediaInfo};
use velocut_core::media::{AudioInfo, SampleType};
use velocut_core::pixel::PixelType;
use velocut_core::time::{RationalTime, TimeRange};

#[derive(Clone, Copy, Debug)]
pub struct SyntheticSource {
    pub width: u32,
    pub height: u32,
    pub rate: f64,
    pub duration_secs: f64,
    pub tone_hz: f64,
    pub sample_rate: u32,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            rate: 24.0,
            duration_secs: 10.0,
            tone_hz: 440.0,
            sample_rate: 48_000,
        }
    }
}

pub struct SyntheticIoPlugin {
    source: SyntheticSource,
}

impl Default for SyntheticIoPlugin {
    fn default() -> Self {
        Self::new(SyntheticSource::default())
    }
}

impl SyntheticIoPlugin {
    pub fn new(source: SyntheticSource) -> Self {
        Self { source }
    }

    /// Solid colour derived from the path so A/B compare demos render two
    /// visibly distinct cards without any real decode.
    fn color_for(path: &Path) -> (u8, u8, u8) {
        let name = path.to_string_lossy();
        let hash: u32 = name.bytes().fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
        (
            (hash & 0xFF) as u8,
            ((hash >> 8) & 0xFF) as u8,
            ((hash >> 16) & 0xFF) as u8,
        )
    }
}

impl IoPlugin for SyntheticIoPlugin {
    fn probe(&self, _path: &Path) -> Result<MediaInfo> {
        let s = self.source;
        Ok(MediaInfo {
            video_range: Some(TimeRange::new(
                RationalTime::zero(s.rate),
                RationalTime::from_seconds(s.duration_secs, s.rate),
            )),
            video_rate: s.rate,
            audio: Some(AudioInfo {
                channel_count: 2,
                sample_rate: s.sample_rate,
                sample_type: SampleType::I16,
            }),
        })
    }

    fn request_video(&self, path: &Path, time: RationalTime, _id: u64) -> Result<IoHandle<Image>> {
        let s = self.source;
        let (r, g, b) = Self::color_for(path);
        // Modulate brightness with time so a sequence of frames is visibly
        // distinct under a frame-diff test, not a static card.
        let t = (time.seconds() % s.duration_secs).max(0.0);
        let scale = 0.5 + 0.5 * (t / s.duration_secs.max(1e-6));
        let rgba: Vec<u8> = (0..(s.width as usize * s.height as usize))
            .flat_map(|_| {
                [
                    (r as f32 * scale) as u8,
                    (g as f32 * scale) as u8,
                    (b as f32 * scale) as u8,
                    255,
                ]
            })
            .collect();

        let image = Image::new(Size::new(s.width, s.height), PixelType::RgbaU8, rgba);
        let (tx, rx) = unbounded();
        let _ = tx.send(image);
        Ok(IoHandle::new(rx))
    }

    fn request_audio(
        &self,
        _path: &Path,
        second_index: i64,
        _id: u64,
    ) -> Result<IoHandle<(i64, Vec<u8>)>> {
        let s = self.source;
        let frames = s.sample_rate as usize;
        let mut samples = Vec::with_capacity(frames * 2 * 2);
        for n in 0..frames {
            let t = second_index as f64 + n as f64 / s.sample_rate as f64;
            let v = (2.0 * std::f64::consts::PI * s.tone_hz * t).sin();
            let sample = (v * i16::MAX as f64 * 0.25) as i16;
            samples.extend_from_slice(&sample.to_le_bytes());
            samples.extend_from_slice(&sample.to_le_bytes());
        }
        let (tx, rx) = unbounded();
        let _ = tx.send((second_index, samples));
        Ok(IoHandle::new(rx))
    }

    fn cancel_requests(&self, _ids: &[u64]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn probe_reports_configured_rate_and_duration() {
        let plugin = SyntheticIoPlugin::default();
        let info = plugin.probe(Path::new("card.mov")).unwrap();
        assert_eq!(info.video_rate, 24.0);
        assert!(info.audio.is_some());
    }

    #[test]
    fn request_video_resolves_immediately() {
        let plugin = SyntheticIoPlugin::default();
        let handle = plugin
            .request_video(Path::new("a.mov"), RationalTime::zero(24.0), 1)
            .unwrap();
        match handle.wait(Duration::from_millis(10)) {
            velocut_core::io_contract::Poll::Ready(image) => {
                assert_eq!(image.pixel_type, PixelType::RgbaU8);
                assert!(!image.is_empty());
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn different_paths_yield_different_colors() {
        let plugin = SyntheticIoPlugin::default();
        let a = plugin
            .request_video(Path::new("a.mov"), RationalTime::zero(24.0), 1)
            .unwrap()
            .wait(Duration::from_millis(10));
        let b = plugin
            .request_video(Path::new("b.mov"), RationalTime::zero(24.0), 2)
            .unwrap()
            .wait(Duration::from_millis(10));
        let (velocut_core::io_contract::Poll::Ready(img_a), velocut_core::io_contract::Poll::Ready(img_b)) = (a, b) else {
            panic!("expected both Ready");
        };
        assert_ne!(img_a.data, img_b.data);
    }
}
