// crates/velocut-core/src/pixel.rs
//
// Wire-stable pixel type enum (§6) plus the plane/channel layout derived
// from it. Discriminant order must never change — it is part of the I/O
// collaborator contract.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PixelType {
    None = 0,
    LU8,
    LU16,
    LU32,
    LF16,
    LF32,
    LaU8,
    LaU16,
    LaU32,
    LaF16,
    LaF32,
    RgbU8,
    RgbU10,
    RgbU16,
    RgbU32,
    RgbF16,
    RgbF32,
    RgbaU8,
    RgbaU16,
    RgbaU32,
    RgbaF16,
    RgbaF32,
    Yuv420pU8,
    Yuv422pU8,
    Yuv444pU8,
    Yuv420pU16,
    Yuv422pU16,
    Yuv444pU16,
}

/// Endianness of a pixel type's storage. All current variants are
/// native-endian on decode (the I/O plugin is responsible for byte-swapping
/// wire formats before handing an `Image` to the cache); the field exists so
/// a future big-endian source format doesn't require an API break.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
    Native,
    Big,
    Little,
}

/// Per-plane byte layout derived from a `PixelType`. YUV formats report one
/// entry per plane with subsampled chroma dimensions; everything else is a
/// single interleaved plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneLayout {
    /// Divisor applied to the image width/height for this plane.
    pub width_div:  u32,
    pub height_div: u32,
    pub channels:   u32,
    pub bytes_per_channel: u32,
}

impl PixelType {
    pub fn is_yuv(self) -> bool {
        matches!(
            self,
            PixelType::Yuv420pU8
                | PixelType::Yuv422pU8
                | PixelType::Yuv444pU8
                | PixelType::Yuv420pU16
                | PixelType::Yuv422pU16
                | PixelType::Yuv444pU16
        )
    }

    pub fn bit_depth(self) -> u32 {
        use PixelType::*;
        match self {
            None => 0,
            LU8 | LaU8 | RgbU8 | RgbaU8 | Yuv420pU8 | Yuv422pU8 | Yuv444pU8 => 8,
            RgbU10 => 10,
            LU16 | LaU16 | RgbU16 | RgbaU16 | Yuv420pU16 | Yuv422pU16 | Yuv444pU16 => 16,
            LU32 | LaU32 | RgbU32 | RgbaU32 => 32,
            LF16 | LaF16 | RgbF16 | RgbaF16 => 16,
            LF32 | LaF32 | RgbF32 | RgbaF32 => 32,
        }
    }

    /// Plane layout list. Non-YUV types return a single packed plane;
    /// YUV types return one luma plane plus two (subsampled) chroma planes.
    /// `textures_for(P).len()` is the invariant checked in §8.
    pub fn planes(self) -> Vec<PlaneLayout> {
        use PixelType::*;
        let bpc = match self.bit_depth() {
            0 => return vec![],
            d if d <= 8 => 1,
            d if d <= 16 => 2,
            _ => 4,
        };
        match self {
            LU8 | LU16 | LU32 | LF16 | LF32 => vec![PlaneLayout {
                width_div: 1, height_div: 1, channels: 1, bytes_per_channel: bpc,
            }],
            LaU8 | LaU16 | LaU32 | LaF16 | LaF32 => vec![PlaneLayout {
                width_div: 1, height_div: 1, channels: 2, bytes_per_channel: bpc,
            }],
            RgbU8 | RgbU10 | RgbU16 | RgbU32 | RgbF16 | RgbF32 => vec![PlaneLayout {
                width_div: 1, height_div: 1, channels: 3, bytes_per_channel: bpc,
            }],
            RgbaU8 | RgbaU16 | RgbaU32 | RgbaF16 | RgbaF32 => vec![PlaneLayout {
                width_div: 1, height_div: 1, channels: 4, bytes_per_channel: bpc,
            }],
            Yuv420pU8 | Yuv420pU16 => vec![
                PlaneLayout { width_div: 1, height_div: 1, channels: 1, bytes_per_channel: bpc },
                PlaneLayout { width_div: 2, height_div: 2, channels: 1, bytes_per_channel: bpc },
                PlaneLayout { width_div: 2, height_div: 2, channels: 1, bytes_per_channel: bpc },
            ],
            Yuv422pU8 | Yuv422pU16 => vec![
                PlaneLayout { width_div: 1, height_div: 1, channels: 1, bytes_per_channel: bpc },
                PlaneLayout { width_div: 2, height_div: 1, channels: 1, bytes_per_channel: bpc },
                PlaneLayout { width_div: 2, height_div: 1, channels: 1, bytes_per_channel: bpc },
            ],
            Yuv444pU8 | Yuv444pU16 => vec![
                PlaneLayout { width_div: 1, height_div: 1, channels: 1, bytes_per_channel: bpc },
                PlaneLayout { width_div: 1, height_div: 1, channels: 1, bytes_per_channel: bpc },
                PlaneLayout { width_div: 1, height_div: 1, channels: 1, bytes_per_channel: bpc },
            ],
            None => vec![],
        }
    }

    pub fn texture_count(self) -> usize {
        self.planes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuv422p_u16_has_three_planes() {
        assert_eq!(PixelType::Yuv422pU16.texture_count(), 3);
        let planes = PixelType::Yuv422pU16.planes();
        assert_eq!(planes[0].width_div, 1);
        assert_eq!(planes[1].width_div, 2);
        assert_eq!(planes[1].height_div, 1);
    }

    #[test]
    fn rgba_is_single_plane() {
        assert_eq!(PixelType::RgbaU8.texture_count(), 1);
    }
}
