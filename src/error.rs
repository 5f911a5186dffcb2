//! Error kinds returned by the core library.
//!
//! All variants are recoverable at the boundary that receives them. `Full` and `ShortRead`
//! are ordinary variants like the rest; callers that want the "not a hard error" treatment
//! (recording a saturation stat, logging and continuing) match on them explicitly at the one
//! or two call sites where that routing happens rather than the type privileging them.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad input: {0}")]
    BadInput(String),

    #[error("position {pos} out of bounds of sparsetable")]
    OutOfBounds { pos: u64 },

    #[error("sparsetable full for position {pos}")]
    Full { pos: u64 },

    #[error("short read for position {pos}: expected {expected} bytes, got {got}")]
    ShortRead {
        pos: u64,
        expected: usize,
        got: usize,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("fatal: {0}")]
    Fatal(String),
}
