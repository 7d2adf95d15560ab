// crates/velocut-io/src/audio.rs
//
// One-shot per-second audio decode. Each call opens its own input context
// and seeks — simpler than keeping a stateful decoder like `LiveDecoder`,
// and audio requests are far less frequent than video ones (one per second
// of timeline vs. one per displayed frame), so the reopen cost is a
// non-issue in practice.
//
// Output is always interleaved 16-bit signed PCM at the source's own rate
// and channel count, matching the `AudioInfo` `probe` reports.

use std::path::Path;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, sample::Sample};
use ffmpeg::media::Type;
use ffmpeg::software::resampling::context::Context as SwrContext;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::format::sample::Type as SampleForm;

use velocut_core::error::{Error, Result};

use crate::helpers::seek;

pub fn decode_one_second(path: &Path, second_index: i64) -> Result<Vec<u8>> {
    let mut ictx = input(path).map_err(|e| Error::Decode(format!("{}: {e}", path.display())))?;
    let audio_idx = ictx
        .streams()
        .best(Type::Audio)
        .ok_or_else(|| Error::Decode(format!("{}: no audio stream", path.display())))?
        .index();

    seek::seek_to_secs(&mut ictx, second_index as f64, "audio::decode_one_second");

    let ictx2 = input(path).map_err(|e| Error::Decode(e.to_string()))?;
    let stream2 = ictx2.stream(audio_idx).unwrap();
    let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())
        .map_err(|e| Error::Decode(e.to_string()))?;
    let mut decoder = dec_ctx
        .decoder()
        .audio()
        .map_err(|e| Error::Decode(e.to_string()))?;

    let rate = decoder.rate();
    let channels = decoder.channels().max(1);
    let channel_layout = ChannelLayout::default(channels as i32);

    let mut resampler = SwrContext::get(
        decoder.format(),
        decoder.channel_layout(),
        rate,
        Sample::I16(SampleForm::Packed),
        channel_layout,
        rate,
    )
    .map_err(|e| Error::Decode(e.to_string()))?;

    let wanted_frames = rate as usize;
    let bytes_per_frame = channels as usize * 2;
    let mut out = Vec::with_capacity(wanted_frames * bytes_per_frame);
    let target_pts_secs = (second_index + 1) as f64;
    let tb = ictx.stream(audio_idx).unwrap().time_base();

    'outer: for (stream, packet) in ictx.packets().flatten() {
        if stream.index() != audio_idx {
            continue;
        }
        if decoder.send_packet(&packet).is_err() {
            continue;
        }
        let mut decoded = ffmpeg::util::frame::audio::Audio::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            let mut resampled = ffmpeg::util::frame::audio::Audio::empty();
            if resampler.run(&decoded, &mut resampled).is_err() {
                continue;
            }
            let samples = resampled.samples();
            let raw = resampled.data(0);
            let take = samples.min(wanted_frames.saturating_sub(out.len() / bytes_per_frame));
            out.extend_from_slice(&raw[..take * bytes_per_frame]);

            if out.len() >= wanted_frames * bytes_per_frame {
                break 'outer;
            }
            if let Some(pts) = decoded.pts() {
                let secs = pts as f64 * tb.numerator() as f64 / tb.denominator() as f64;
                if secs > target_pts_secs {
                    break 'outer;
                }
            }
        }
    }

    out.resize(wanted_frames * bytes_per_frame, 0);
    Ok(out)
}
