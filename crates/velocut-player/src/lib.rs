// crates/velocut-player/src/lib.rs
//
// The Player (§4.1), the Frame Cache (§3), the Worker thread (§4.1), and
// the realtime audio rendering pipeline (§4.2). `velocut-render` and
// `velocut-cli` are the only other crates that depend on this one.

pub mod audio;
pub mod cache;
pub mod player;
pub mod worker;

pub use audio::{AudioControlState, AudioRenderer};
pub use cache::FrameCache;
pub use player::{Player, PlayerShared};
