//! Assembler errors

use r2m2_core::{CoreError, Overflow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("Syntax error at column {column}: {message}")]
    SyntaxError { column: usize, message: String },

    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),

    #[error("Invalid register: {0}")]
    InvalidRegister(String),

    #[error("Invalid immediate value: {0}")]
    InvalidImmediate(String),

    #[error("Invalid operands for {mnemonic}: {message}")]
    InvalidOperands { mnemonic: String, message: String },

    #[error("Destination {target:#x} out of range for {mnemonic}")]
    OutOfRange { mnemonic: String, target: u64 },

    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("Assembled instruction is too long: {0}")]
    TooLong(#[from] Overflow),

    #[error("Line {line}: {source}")]
    AtLine {
        line: usize,
        source: Box<AssemblerError>,
    },

    #[error("Location error: {0}")]
    Core(#[from] CoreError),
}

impl AssemblerError {
    /// Innermost error, skipping line context
    pub fn root(&self) -> &AssemblerError {
        match self {
            AssemblerError::AtLine { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
