//! Disassembler errors

use r2m2_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisassemblerError {
    #[error("Empty byte window")]
    Empty,

    #[error("Truncated instruction: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("Invalid instruction encoding: {0}")]
    InvalidEncoding(String),

    #[error("Resolution fault: {0}")]
    Core(#[from] CoreError),
}

impl DisassemblerError {
    /// Check if the grammar rejected the bytes, as opposed to a fault while
    /// resolving an instruction it accepted
    pub fn is_decode_failure(&self) -> bool {
        !matches!(self, DisassemblerError::Core(_))
    }
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
