// crates/velocut-io/src/helpers/seek.rs
//
// Seek helper wrapping ffmpeg's avformat seek with consistent soft-fail
// behaviour: a failed seek falls back to decoding from wherever the demuxer
// currently sits, and the caller's PTS filter skips the pre-roll.
//
// Backward seek (`..=seek_ts`) lands on the keyframe at or before the
// target rather than the one at or after it — landing after would leave a
// gap of real source frames between the seek point and the first decoded
// frame, which the caller would otherwise have to paper over by repeating
// frames.

use ffmpeg_the_third as ffmpeg;

pub fn seek_to_secs(
    ictx: &mut ffmpeg::format::context::Input,
    target_secs: f64,
    label: &str,
) -> bool {
    if target_secs <= 0.0 {
        return true;
    }

    let seek_ts = (target_secs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
    match ictx.seek(seek_ts, ..=seek_ts) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("velocut_io: seek soft-fail in {label} at {target_secs:.3}s: {e}");
            false
        }
    }
}
