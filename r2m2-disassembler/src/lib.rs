//! # r2m2 Disassembler
//!
//! Decode x86 bytes into canonical assembly text for a disassembly host.
//!
//! [`disassemble_op`] is the per-instruction bridge a host calls: it resolves
//! relative branch/call destinations into absolute addresses and always hands
//! back bounded output, falling back to a fixed text for unknown bytes.
//!
//! ## Example
//!
//! ```rust
//! use r2m2_core::{Arch, ArchitectureContext};
//! use r2m2_disassembler::disassemble_op;
//!
//! let ctx = ArchitectureContext::new(Arch::X86_32);
//! let op = disassemble_op(Some(&ctx), 0x1000, &[0xEB, 0x03]).unwrap();
//! assert_eq!(op.buf_asm.as_str(), "JMP 0x1005");
//! assert_eq!(op.size, 2);
//! ```

pub mod error;
pub mod decoder;
pub mod formatter;
pub mod disassembler;

pub use error::{DisassemblerError, Result};
pub use disassembler::{decode_at, disassemble_block, disassemble_op, DisasmOp, DisasmStatus};
pub use decoder::decode;
pub use formatter::{format, format_hex};

#[cfg(test)]
mod tests {
    use super::*;
    use r2m2_core::{CoreError, LocKey, Mode};

    #[test]
    fn test_public_exports() {
        let _ = DisassemblerError::UnknownOpcode(0xFF);
        let _ = DisasmOp::default();
    }

    #[test]
    fn test_error_classification() {
        assert!(DisassemblerError::UnknownOpcode(0x06).is_decode_failure());
        assert!(DisassemblerError::Truncated {
            needed: 2,
            available: 1
        }
        .is_decode_failure());
        assert!(!DisassemblerError::Core(CoreError::UnknownLocation(LocKey::new(0)))
            .is_decode_failure());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DisassemblerError::UnknownOpcode(0x06).to_string(),
            "Unknown opcode: 0x06"
        );
        assert_eq!(
            DisassemblerError::Truncated {
                needed: 5,
                available: 1
            }
            .to_string(),
            "Truncated instruction: need 5 bytes, have 1"
        );
    }

    #[test]
    fn test_decode_function() {
        let instr = decode(&[0xF4], Mode::Bits16).unwrap();
        assert_eq!(format(&instr), "HLT");
    }
}
