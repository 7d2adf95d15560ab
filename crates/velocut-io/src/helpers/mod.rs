// crates/velocut-io/src/helpers/mod.rs
//
// Internal FFmpeg plumbing shared by `live` and `probe`. Not re-exported.

pub mod seek;
pub mod yuv;
