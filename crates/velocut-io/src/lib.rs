// crates/velocut-io/src/lib.rs
//
// The concrete I/O collaborator (§6): an `ffmpeg-the-third`-backed
// `IoPlugin` plus an in-memory synthetic one for tests and the CLI's
// `-compare` demo path.

mod audio;
mod helpers;
pub mod live;
pub mod plugin;
pub mod synthetic;

pub use plugin::FfmpegIoPlugin;
pub use synthetic::{SyntheticIoPlugin, SyntheticSource};
