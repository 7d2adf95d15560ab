// crates/velocut-core/src/image.rs
//
// Decoded image data. Shared by decoder -> cache -> renderer; immutable
// after decode (§3). Cheaply cloned via Arc so the cache and the renderer
// can hold the same buffer without a copy.

use std::collections::HashMap;
use std::sync::Arc;

use crate::pixel::PixelType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

#[derive(Clone, Debug)]
pub struct Image {
    pub size:       Size,
    pub pixel_type: PixelType,
    /// True when row 0 of `data` is the bottom row of the image.
    pub y_mirror:   bool,
    pub data:       Arc<Vec<u8>>,
    pub tags:       HashMap<String, String>,
}

impl Image {
    pub fn new(size: Size, pixel_type: PixelType, data: Vec<u8>) -> Self {
        Self {
            size,
            pixel_type,
            y_mirror: false,
            data: Arc::new(data),
            tags: HashMap::new(),
        }
    }

    /// An empty placeholder image — the "no decoded frame available" /
    /// "hold last good frame" sentinel used throughout §7.
    pub fn empty() -> Self {
        Self {
            size: Size::new(0, 0),
            pixel_type: PixelType::None,
            y_mirror: false,
            data: Arc::new(Vec::new()),
            tags: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty() || self.pixel_type == PixelType::None
    }
}
