//! General-purpose register definitions for the x86 machines

use crate::arch::Mode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of general-purpose registers encodable in an opcode's low 3 bits
pub const NUM_REGISTERS: usize = 8;

/// Register (16- and 32-bit views of the eight GPRs)
///
/// The discriminant's low 3 bits are the hardware register number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Register {
    Ax = 0x00,
    Cx = 0x01,
    Dx = 0x02,
    Bx = 0x03,
    Sp = 0x04,
    Bp = 0x05,
    Si = 0x06,
    Di = 0x07,
    Eax = 0x10,
    Ecx = 0x11,
    Edx = 0x12,
    Ebx = 0x13,
    Esp = 0x14,
    Ebp = 0x15,
    Esi = 0x16,
    Edi = 0x17,
}

const REGS_16: [Register; NUM_REGISTERS] = [
    Register::Ax,
    Register::Cx,
    Register::Dx,
    Register::Bx,
    Register::Sp,
    Register::Bp,
    Register::Si,
    Register::Di,
];

const REGS_32: [Register; NUM_REGISTERS] = [
    Register::Eax,
    Register::Ecx,
    Register::Edx,
    Register::Ebx,
    Register::Esp,
    Register::Ebp,
    Register::Esi,
    Register::Edi,
];

impl Register {
    /// Register with hardware number `index` at the operand size of `mode`
    #[inline]
    pub fn from_index(index: usize, mode: Mode) -> Option<Self> {
        let table = match mode {
            Mode::Bits16 => &REGS_16,
            Mode::Bits32 => &REGS_32,
        };
        table.get(index).copied()
    }

    /// Parse an upper-case register name
    pub fn from_name(name: &str) -> Option<Self> {
        REGS_16
            .iter()
            .chain(REGS_32.iter())
            .copied()
            .find(|reg| reg.name() == name)
    }

    /// Hardware register number (0-7)
    #[inline]
    pub fn index(self) -> usize {
        (self as u8 & 0x07) as usize
    }

    /// Width in bits
    #[inline]
    pub fn size(self) -> u8 {
        if (self as u8) & 0x10 != 0 {
            32
        } else {
            16
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ax => "AX",
            Self::Cx => "CX",
            Self::Dx => "DX",
            Self::Bx => "BX",
            Self::Sp => "SP",
            Self::Bp => "BP",
            Self::Si => "SI",
            Self::Di => "DI",
            Self::Eax => "EAX",
            Self::Ecx => "ECX",
            Self::Edx => "EDX",
            Self::Ebx => "EBX",
            Self::Esp => "ESP",
            Self::Ebp => "EBP",
            Self::Esi => "ESI",
            Self::Edi => "EDI",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
