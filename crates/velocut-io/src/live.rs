// crates/velocut-io/src/live.rs
//
// LiveDecoder: stateful per-clip decoder that avoids a re-open/seek per
// frame. Used by `FfmpegIoPlugin`'s decode thread, one instance per path
// currently in flight.
//
// Produces `Image`s in `PixelType::Yuv420pU8` rather than RGBA so the
// renderer's multi-plane/texture-count path is actually exercised by a
// real decode source, not just by the synthetic plugin.

use std::path::{Path, PathBuf};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use velocut_core::error::{Error, Result};
use velocut_core::image::{Image, Size};
use velocut_core::pixel::PixelType;
use velocut_core::time::RationalTime;

use crate::helpers::{seek, yuv};

pub struct LiveDecoder {
    pub path: PathBuf,
    ictx: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::video::Video,
    video_idx: usize,
    last_pts: i64,
    tb_num: i32,
    tb_den: i32,
    out_w: u32,
    out_h: u32,
    scaler: SwsContext,
    /// If non-zero, `next_frame` decodes-but-doesn't-scale every frame whose
    /// PTS is below this threshold, then clears the field. Burns through the
    /// GOP after a keyframe-aligned seek without paying for the scaler+alloc
    /// on frames the caller doesn't want.
    skip_until_pts: i64,
}

impl LiveDecoder {
    pub fn open(path: &Path, start: RationalTime) -> Result<Self> {
        let mut ictx =
            input(path).map_err(|e| Error::Decode(format!("open {}: {e}", path.display())))?;
        let video_idx = ictx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| Error::Decode(format!("{}: no video stream", path.display())))?
            .index();

        let (tb_num, tb_den, raw_w, raw_h) = {
            let stream = ictx.stream(video_idx).unwrap();
            let tb = stream.time_base();
            let (w, h) = unsafe {
                let p = stream.parameters().as_ptr();
                ((*p).width as u32, (*p).height as u32)
            };
            (tb.numerator(), tb.denominator(), w, h)
        };

        let target_secs = start.seconds();
        seek::seek_to_secs(&mut ictx, target_secs, "LiveDecoder::open");

        // Second context for decoder construction — avoids a borrow conflict
        // between the decoder's parameters and the just-seeked `ictx`.
        let ictx2 =
            input(path).map_err(|e| Error::Decode(format!("reopen {}: {e}", path.display())))?;
        let stream2 = ictx2.stream(video_idx).unwrap();
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())
            .map_err(|e| Error::Decode(e.to_string()))?;
        let decoder = dec_ctx
            .decoder()
            .video()
            .map_err(|e| Error::Decode(e.to_string()))?;

        let out_w = raw_w.max(2) & !1;
        let out_h = raw_h.max(2) & !1;

        let scaler = SwsContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::YUV420P,
            out_w,
            out_h,
            Flags::BILINEAR,
        )
        .map_err(|e| Error::Decode(e.to_string()))?;

        let seek_ts = (target_secs * tb_den as f64 / tb_num as f64) as i64;

        Ok(Self {
            path: path.to_path_buf(),
            ictx,
            decoder,
            video_idx,
            // seek_ts is where we asked to land, not where the demuxer
            // actually lands (the nearest keyframe, which can be seconds
            // earlier). Initialising to seek_ts - 1 makes the `pts >=
            // target` check in burn_to_pts fire correctly even when called
            // with target == seek_ts.
            last_pts: seek_ts.saturating_sub(1),
            tb_num,
            tb_den,
            out_w,
            out_h,
            scaler,
            skip_until_pts: seek_ts,
        })
    }

    fn pts_to_time(&self, pts: i64) -> RationalTime {
        let secs = pts as f64 * self.tb_num as f64 / self.tb_den as f64;
        RationalTime::from_seconds(secs, self.tb_den as f64 / self.tb_num as f64)
    }

    /// Decode the next frame in sequence, honouring `skip_until_pts`.
    pub fn next_frame(&mut self) -> Option<Image> {
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                if self.skip_until_pts > 0 && pts < self.skip_until_pts {
                    continue;
                }
                self.skip_until_pts = 0;

                let mut scaled = ffmpeg::util::frame::video::Video::empty();
                if self.scaler.run(&decoded, &mut scaled).is_err() {
                    return None;
                }
                let raw = yuv::extract_yuv420p(&scaled, self.out_w as usize, self.out_h as usize);
                return Some(Image::new(
                    Size::new(self.out_w, self.out_h),
                    PixelType::Yuv420pU8,
                    raw,
                ));
            }
        }
        None
    }

    /// Decode-only (no scale/alloc) until `last_pts >= target`, run
    /// synchronously right after `open` so the first frame handed back by
    /// `next_frame` lands at the requested time.
    pub fn burn_to_target(&mut self) {
        let target = self.skip_until_pts;
        if target <= 0 || target <= self.last_pts {
            return;
        }
        'outer: for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                if pts >= target {
                    break 'outer;
                }
            }
        }
    }

    pub fn current_time(&self) -> RationalTime {
        self.pts_to_time(self.last_pts)
    }
}
