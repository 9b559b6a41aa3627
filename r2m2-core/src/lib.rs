//! # r2m2 Core
//!
//! Shared model for the r2m2 disassembly/assembly bridge.
//!
//! ## Key Pieces
//! - Machine registry and the resolved [`ArchitectureContext`]
//! - [`Instruction`] / [`Operand`] model with destination resolution
//! - [`LocationDb`], the per-call location resolver
//! - Fixed-capacity output slots handed to the host layer

pub mod arch;
pub mod register;
pub mod operand;
pub mod instruction;
pub mod location;
pub mod encoding;
pub mod buffer;
pub mod error;

pub use arch::{available_machines, Arch, ArchitectureContext, Mode};
pub use register::{Register, NUM_REGISTERS};
pub use operand::Operand;
pub use instruction::{Cond, Instruction, Mnemonic};
pub use location::{LocKey, LocationDb};
pub use buffer::{
    AsmBytes, AsmText, FixedBuf, FixedStr, HexText, NameText, Overflow, ASM_BUF_SIZE,
    CANNOT_DISASSEMBLE, DECODE_FALLBACK_SIZE, NAME_BUF_SIZE, NAME_TOO_LONG, TEXT_TOO_LONG,
};
pub use error::CoreError;

/// Environment variable naming the machine to use
pub const ARCH_ENV_VAR: &str = "R2M2_ARCH";
