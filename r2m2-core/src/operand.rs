//! Instruction operands

use crate::encoding::width_mask;
use crate::location::LocKey;
use crate::register::Register;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single operand.
///
/// `LocationRef` only exists while a bridge is resolving destinations; no
/// emitted instruction carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Integer value, always masked to `bits`
    Immediate { value: u64, bits: u8 },
    /// Symbolic location awaiting an offset
    LocationRef(LocKey),
    /// General-purpose register
    Register(Register),
}

impl Operand {
    /// Immediate masked to its width
    #[inline]
    pub fn imm(value: u64, bits: u8) -> Self {
        Operand::Immediate {
            value: value & width_mask(bits),
            bits,
        }
    }

    /// Width of an immediate operand, `None` for anything else
    #[inline]
    pub fn immediate_bits(&self) -> Option<u8> {
        match self {
            Operand::Immediate { bits, .. } => Some(*bits),
            _ => None,
        }
    }

    /// Value of an immediate operand
    #[inline]
    pub fn immediate_value(&self) -> Option<u64> {
        match self {
            Operand::Immediate { value, .. } => Some(*value),
            _ => None,
        }
    }

    #[inline]
    pub fn is_location(&self) -> bool {
        matches!(self, Operand::LocationRef(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Immediate { value, .. } => write!(f, "{:#x}", value),
            Operand::LocationRef(key) => write!(f, "{}", key),
            Operand::Register(reg) => write!(f, "{}", reg),
        }
    }
}
