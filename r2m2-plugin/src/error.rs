//! Plugin error types

use r2m2_assembler::AssemblerError;
use r2m2_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Machine selection failed: {0}")]
    Context(#[from] CoreError),

    #[error("Assembly failed: {0}")]
    Assemble(#[from] AssemblerError),

    #[error("Invalid hex input: {0}")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_error_display() {
        let err = PluginError::from(CoreError::NoArchSelected {
            available: "x86_16, x86_32".to_string(),
        });
        assert!(err.to_string().starts_with("Machine selection failed: "));
        assert!(err.to_string().contains("x86_16, x86_32"));
    }

    #[test]
    fn test_invalid_hex_display() {
        let err = PluginError::InvalidHex("odd number of digits".to_string());
        assert_eq!(err.to_string(), "Invalid hex input: odd number of digits");
    }
}
