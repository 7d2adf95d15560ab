// crates/velocut-render/src/color.rs
//
// Color pipeline (§4.3): input color space transform, user LUT, display
// transform, HDR tone-map, and the final video-levels rescale, assembled
// into one display shader by string substitution into a fixed template
// (§9 "string-templated shader assembly"). No real OCIO/LUT backend is
// linked in this workspace, so the OCIO/LUT stages emit the WGSL a real
// backend's generated function would occupy but pass the color through
// unchanged — see DESIGN.md.

use velocut_core::options::{HDROptions, LUTOptions, LUTOrder, OCIOOptions};

const TEMPLATE: &str = include_str!("shaders/display.wgsl.tmpl");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YuvCoefficients {
    Bt601,
    Bt709,
    Bt2020,
}

impl YuvCoefficients {
    pub fn as_u32(self) -> u32 {
        match self {
            YuvCoefficients::Bt601 => 0,
            YuvCoefficients::Bt709 => 1,
            YuvCoefficients::Bt2020 => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoLevels {
    Full,
    Legal,
}

/// The set of options that determine the shader's text (§4.3: "regenerated
/// and recompiled whenever any of {OCIOOptions, LUTOptions, HDROptions.tonemap}
/// changes").
#[derive(Clone, Debug, PartialEq)]
struct ShaderKey {
    ocio: OCIOOptions,
    lut: LUTOptions,
    tonemap_enabled: bool,
    hdr: HDROptions,
}

/// Builds and caches the display fragment shader source, rebuilding only
/// when the relevant options actually change.
pub struct ColorPipeline {
    key: Option<ShaderKey>,
    source: String,
}

impl ColorPipeline {
    pub fn new() -> Self {
        Self { key: None, source: String::new() }
    }

    /// Current shader source for `(ocio, lut, hdr)`, rebuilding it first if
    /// these options differ from the last build.
    pub fn shader_source(&mut self, ocio: &OCIOOptions, lut: &LUTOptions, hdr: &HDROptions) -> &str {
        let key = ShaderKey { ocio: ocio.clone(), lut: lut.clone(), tonemap_enabled: hdr.tonemap_enabled, hdr: *hdr };
        if self.key.as_ref() != Some(&key) {
            self.source = build_shader(ocio, lut, hdr);
            self.key = Some(key);
        }
        &self.source
    }
}

impl Default for ColorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn build_shader(ocio: &OCIOOptions, lut: &LUTOptions, hdr: &HDROptions) -> String {
    let ocio_input = if ocio.is_enabled() {
        format!(
            "    // OCIO ICS: {} -> scene-linear\n    // (no OCIO backend linked; passthrough)",
            ocio.input_name.as_deref().unwrap_or("unknown")
        )
    } else {
        "    // OCIO disabled".to_string()
    };

    let ocio_display = if ocio.is_enabled() {
        format!(
            "    // OCIO DisplayView: scene-linear -> {}/{}\n    // (no OCIO backend linked; passthrough)",
            ocio.display_name.as_deref().unwrap_or("default"),
            ocio.view_name.as_deref().unwrap_or("default"),
        )
    } else {
        "    // OCIO display transform disabled".to_string()
    };

    let lut_sample = if lut.is_enabled() {
        "    // user LUT applied (no LUT texture bound in this build; passthrough)".to_string()
    } else {
        "    // LUT disabled".to_string()
    };

    let (lut_pre, lut_post) = if lut.is_enabled() {
        match lut.order() {
            LUTOrder::PreColorConfig => ("    rgb = apply_lut(rgb);".to_string(), String::new()),
            LUTOrder::PostColorConfig => (String::new(), "    rgb = apply_lut(rgb);".to_string()),
        }
    } else {
        (String::new(), String::new())
    };

    let hdr_tonemap = if hdr.tonemap_enabled {
        format!(
            "    let min_lum = {:.6};\n    let max_lum = {:.6};\n    let max_cll = {:.6};\n    let l = max(max(c.r, c.g), c.b);\n    let scaled = clamp((l - min_lum) / max(max_lum - min_lum, 1e-6), 0.0, 1.0);\n    let mapped = scaled / (1.0 + scaled);\n    let gain = select(1.0, mapped / max(l, 1e-6), l > 1.0);\n    return c * gain;",
            hdr.min_luminance, hdr.max_luminance, hdr.max_cll,
        )
    } else {
        "    // HDR tone-map disabled (§9: non-tonemap path kept as a supported mode here)".to_string()
    };

    let output_levels = "    // video-levels rescale: legal-range clamp to (64..940)/1023\n    rgb = clamp((rgb * 1023.0 - 64.0) / 876.0, vec3<f32>(0.0), vec3<f32>(1.0));".to_string();

    let video_levels_decode =
        "    if (display.video_levels == 1u) {\n        y = clamp((y * 255.0 - 16.0) / 219.0, 0.0, 1.0);\n    }".to_string();

    TEMPLATE
        .replace("{OCIO_INPUT_TRANSFORM}", &ocio_input)
        .replace("{OCIO_DISPLAY_TRANSFORM}", &ocio_display)
        .replace("{LUT_SAMPLE}", &lut_sample)
        .replace("{LUT_PRE}", &lut_pre)
        .replace("{LUT_POST}", &lut_post)
        .replace("{HDR_TONEMAP}", &hdr_tonemap)
        .replace("{OUTPUT_LEVELS}", &output_levels)
        .replace("{VIDEO_LEVELS}", &video_levels_decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuilds_only_when_options_change() {
        let mut pipeline = ColorPipeline::new();
        let ocio = OCIOOptions::default();
        let lut = LUTOptions::default();
        let hdr = HDROptions::default();

        let first = pipeline.shader_source(&ocio, &lut, &hdr).to_string();
        let second = pipeline.shader_source(&ocio, &lut, &hdr).to_string();
        assert_eq!(first, second);

        let mut hdr_on = hdr;
        hdr_on.tonemap_enabled = true;
        let third = pipeline.shader_source(&ocio, &lut, &hdr_on).to_string();
        assert_ne!(first, third);
        assert!(third.contains("max_cll"));
    }

    #[test]
    fn disabled_ocio_and_lut_emit_passthrough_markers() {
        let mut pipeline = ColorPipeline::new();
        let source = pipeline.shader_source(&OCIOOptions::default(), &LUTOptions::default(), &HDROptions::default());
        assert!(source.contains("OCIO disabled"));
        assert!(source.contains("LUT disabled"));
    }
}
