//! Error types for the emulator core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmuError {
    #[error("ROM too large: {words} words > {capacity} words")]
    RomOverflow { words: usize, capacity: usize },

    #[error("cannot decode instruction {word:#05x} at address {address:#05x}")]
    Decode { address: u32, word: u32 },

    #[error("address {address:#06x} is out of range")]
    OutOfRange { address: u32 },
}

pub type Result<T> = std::result::Result<T, EmuError>;
