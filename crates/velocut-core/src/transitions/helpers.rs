// crates/velocut-core/src/transitions/helpers.rs
//
// Byte-layout math shared by anything that walks a packed `Image` buffer
// plane by plane — the renderer's YUV texture upload, the audio fade
// envelope. Operates on plain integers, no decoder types, no GPU handles.

use crate::pixel::PixelType;

/// One plane's byte span within a packed `Image` buffer: byte offset, pixel
/// dimensions, and bytes per pixel (channels * bytes_per_channel). Derived
/// from `PixelType::planes()` so callers work across any pixel format
/// instead of assuming a fixed YUV420P layout.
#[derive(Clone, Copy, Debug)]
pub struct PlaneSpan {
    pub offset: usize,
    pub width:  u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
}

pub fn plane_spans(pixel_type: PixelType, width: u32, height: u32) -> Vec<PlaneSpan> {
    let mut offset = 0usize;
    pixel_type
        .planes()
        .into_iter()
        .map(|p| {
            let pw = (width / p.width_div).max(1);
            let ph = (height / p.height_div).max(1);
            let bpp = p.channels * p.bytes_per_channel;
            let span = PlaneSpan { offset, width: pw, height: ph, bytes_per_pixel: bpp };
            offset += (pw * ph * bpp) as usize;
            span
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_spans_yuv420p_matches_expected_sizes() {
        let spans = plane_spans(PixelType::Yuv420pU8, 4, 2);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].width, 4);
        assert_eq!(spans[0].height, 2);
        assert_eq!(spans[1].width, 2);
        assert_eq!(spans[1].height, 1);
        assert_eq!(spans[1].offset, 8);
    }

    #[test]
    fn plane_spans_rgba_is_single_interleaved_plane() {
        let spans = plane_spans(PixelType::RgbaU8, 4, 2);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].bytes_per_pixel, 4);
    }
}
