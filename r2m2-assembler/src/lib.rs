//! r2m2 Assembler
//!
//! Assemble x86 text into machine code for a disassembly host.
//!
//! ## Example
//!
//! ```rust
//! use r2m2_core::{Arch, ArchitectureContext};
//! use r2m2_assembler::assemble_op;
//!
//! let ctx = ArchitectureContext::new(Arch::X86_32);
//! let op = assemble_op(Some(&ctx), 0x1000, "jmp 0x1005").unwrap().unwrap();
//! assert_eq!(op.bytes(), &[0xEB, 0x03]);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod encoder;
pub mod assembler;

pub use error::{AssemblerError, Result};
pub use assembler::{assemble_block, assemble_op, normalize, AsmOp};
pub use parser::{parse_instruction, parse_register};
pub use encoder::encode_candidates;
