// crates/velocut-render/src/lib.rs
//
// The GPU compositing renderer (§4.3): compare-mode geometry, the color
// pipeline's shader assembly, YUV-aware texture allocation, and the
// begin/draw_*/end render contract. Consumed by `velocut-cli`.

pub mod color;
pub mod compare;
pub mod renderer;
pub mod texture;

pub use compare::{arity, get_boxes, render_size, Box2D};
pub use renderer::{
    BackgroundOptions, Color, DisplayOptions, Frame, GlyphQuad, ImageOptions, Mesh, Renderer,
    VideoLevelsOpt, YuvCoefficientsOpt,
};
