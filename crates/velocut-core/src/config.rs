// crates/velocut-core/src/config.rs
//
// Persisted host-owned state (§6). The Player holds none of this itself —
// `velocut-cli` reads/writes it as JSON next to the session and feeds the
// relevant bits (window size, per-item playback options) back in through
// the Player's public control API.

use serde::{Deserialize, Serialize};

use crate::options::{CompareOptions, HDROptions, LUTOptions, OCIOOptions};
use crate::state::AspectRatio;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowOptions {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: AspectRatio,
    pub full_screen: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            aspect_ratio: AspectRatio::SixteenNine,
            full_screen: false,
        }
    }
}

/// Per-loaded-item playback options, keyed by the host to whatever item
/// identity it owns (file path, project clip id, ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemOptions {
    pub compare: CompareOptions,
    pub ocio: OCIOOptions,
    pub lut: LUTOptions,
    pub hdr: HDROptions,
    pub volume: f32,
    pub muted: bool,
}

impl Default for ItemOptions {
    fn default() -> Self {
        Self {
            compare: CompareOptions::default(),
            ocio: OCIOOptions::default(),
            lut: LUTOptions::default(),
            hdr: HDROptions::default(),
            volume: 1.0,
            muted: false,
        }
    }
}
