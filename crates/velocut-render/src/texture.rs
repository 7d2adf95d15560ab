// crates/velocut-render/src/texture.rs
//
// Plane/texture allocation derived from `PixelType` (§4.3 "YUV sampling",
// §8's `textures_for(P).len() == k` invariant). Pure sizing math; the
// `wgpu::Texture` creation itself lives in `renderer.rs`.

use velocut_core::image::Size;
use velocut_core::pixel::PixelType;

/// One texture's format and pixel dimensions, derived from a `PlaneLayout`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneTexture {
    pub size: Size,
    pub format: wgpu::TextureFormat,
}

/// Texture descriptors to allocate for an image of `pixel_type` at `size`.
/// Non-YUV types return one interleaved-RGBA-ish texture; YUV types return
/// one texture per plane, chroma-subsampled per `PixelType::planes()`.
pub fn textures_for(pixel_type: PixelType, size: Size) -> Vec<PlaneTexture> {
    pixel_type
        .planes()
        .into_iter()
        .map(|plane| {
            let w = (size.w / plane.width_div).max(1);
            let h = (size.h / plane.height_div).max(1);
            let format = plane_format(pixel_type, plane.channels, plane.bytes_per_channel);
            PlaneTexture { size: Size::new(w, h), format }
        })
        .collect()
}

fn plane_format(pixel_type: PixelType, channels: u32, bytes_per_channel: u32) -> wgpu::TextureFormat {
    use wgpu::TextureFormat::*;

    if pixel_type.is_yuv() {
        return if bytes_per_channel >= 2 { R16Uint } else { R8Unorm };
    }

    match (channels, bytes_per_channel) {
        (1, 1) => R8Unorm,
        (1, 2) => R16Uint,
        (1, 4) => R32Float,
        (2, 1) => Rg8Unorm,
        (2, 2) => Rg16Uint,
        (2, 4) => Rg32Float,
        (3, _) | (4, 1) => Rgba8Unorm,
        (4, 2) => Rgba16Float,
        (4, 4) => Rgba32Float,
        _ => Rgba8Unorm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuv422p_u16_gives_three_planes_with_halved_chroma_width() {
        let planes = textures_for(PixelType::Yuv422pU16, Size::new(1920, 1080));
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].size, Size::new(1920, 1080));
        assert_eq!(planes[1].size, Size::new(960, 1080));
        assert_eq!(planes[2].size, Size::new(960, 1080));
    }

    #[test]
    fn rgba_u8_is_a_single_texture() {
        let planes = textures_for(PixelType::RgbaU8, Size::new(640, 480));
        assert_eq!(planes.len(), 1);
        assert_eq!(planes[0].format, wgpu::TextureFormat::Rgba8Unorm);
    }
}
