// crates/velocut-core/src/options.rs
//
// Value-typed configuration for compare geometry, the color pipeline, and
// the periodically-published cache statistics (§3).

use serde::{Deserialize, Serialize};

use crate::time::TimeRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareMode {
    A,
    B,
    Wipe,
    Overlay,
    Difference,
    Horizontal,
    Vertical,
    Tile,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompareOptions {
    pub mode: CompareMode,
    /// Normalized [0,1] wipe center.
    pub wipe_center:   (f32, f32),
    /// Degrees.
    pub wipe_rotation: f32,
    /// Overlay opacity in [0,1].
    pub overlay: f32,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            mode: CompareMode::A,
            wipe_center: (0.5, 0.5),
            wipe_rotation: 0.0,
            overlay: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct OCIOOptions {
    pub config_path: Option<String>,
    pub input_name:  Option<String>,
    pub display_name: Option<String>,
    pub view_name:    Option<String>,
    pub look_name:    Option<String>,
}

impl OCIOOptions {
    pub fn is_enabled(&self) -> bool {
        self.config_path.is_some() && self.input_name.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LUTOrder {
    PreColorConfig,
    PostColorConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct LUTOptions {
    pub file_name: Option<String>,
    pub order: Option<LUTOrder>,
}

impl LUTOptions {
    pub fn is_enabled(&self) -> bool {
        self.file_name.is_some()
    }

    pub fn order(&self) -> LUTOrder {
        self.order.unwrap_or(LUTOrder::PostColorConfig)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HDROptions {
    pub tonemap_enabled: bool,
    pub min_luminance: f32,
    pub max_luminance: f32,
    pub max_cll: f32,
    pub max_fall: f32,
}

impl Default for HDROptions {
    fn default() -> Self {
        Self {
            tonemap_enabled: false,
            min_luminance: 0.0,
            max_luminance: 1000.0,
            max_cll: 1000.0,
            max_fall: 400.0,
        }
    }
}

/// Percentage fill + contiguous cached ranges, recomputed <= 2 Hz by the
/// Worker (§3, §4.1 step 7).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CacheInfo {
    pub video_percent: f32,
    pub video_ranges: Vec<TimeRange>,
    pub audio_ranges: Vec<TimeRange>,
}
