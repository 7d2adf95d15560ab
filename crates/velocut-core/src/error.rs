// crates/velocut-core/src/error.rs
//
// Crate-wide error type. Leaf `thiserror` enum; `anyhow` takes over at the
// CLI boundary (`velocut-cli::main`) the way the teacher's binary crates do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
