//! Instruction model for the x86 machines
//!
//! An [`Instruction`] is produced by a decode or a parse and owned by the call
//! that produced it. Destination-bearing instructions (jumps, calls, loops)
//! carry their target as operand 0.

use crate::arch::Mode;
use crate::encoding::{width_mask, CC_MASK};
use crate::error::{CoreError, Result};
use crate::location::LocationDb;
use crate::operand::Operand;
use serde::{Deserialize, Serialize};

/// Jcc condition code, in encoding order
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cond {
    O = 0x0,
    No = 0x1,
    B = 0x2,
    Ae = 0x3,
    Z = 0x4,
    Nz = 0x5,
    Be = 0x6,
    A = 0x7,
    S = 0x8,
    Ns = 0x9,
    Pe = 0xA,
    Np = 0xB,
    L = 0xC,
    Ge = 0xD,
    Le = 0xE,
    G = 0xF,
}

impl Cond {
    pub const ALL: [Cond; 16] = [
        Cond::O,
        Cond::No,
        Cond::B,
        Cond::Ae,
        Cond::Z,
        Cond::Nz,
        Cond::Be,
        Cond::A,
        Cond::S,
        Cond::Ns,
        Cond::Pe,
        Cond::Np,
        Cond::L,
        Cond::Ge,
        Cond::Le,
        Cond::G,
    ];

    /// Condition for the low nibble of a Jcc opcode
    #[inline]
    pub fn from_code(code: u8) -> Self {
        Self::ALL[(code & CC_MASK) as usize]
    }

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Full jump mnemonic
    pub const fn jump_name(self) -> &'static str {
        match self {
            Cond::O => "JO",
            Cond::No => "JNO",
            Cond::B => "JB",
            Cond::Ae => "JAE",
            Cond::Z => "JZ",
            Cond::Nz => "JNZ",
            Cond::Be => "JBE",
            Cond::A => "JA",
            Cond::S => "JS",
            Cond::Ns => "JNS",
            Cond::Pe => "JPE",
            Cond::Np => "JNP",
            Cond::L => "JL",
            Cond::Ge => "JGE",
            Cond::Le => "JLE",
            Cond::G => "JG",
        }
    }
}

/// Instruction mnemonic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mnemonic {
    // ========== No operand ==========
    Nop,
    Ret,
    Leave,
    Int3,
    Hlt,
    Clc,
    Stc,
    Cli,
    Sti,
    Cld,
    Std,

    // ========== Immediate ==========
    /// RET imm16 (pop extra bytes)
    RetImm,
    /// INT imm8
    Int,

    // ========== Register / immediate ==========
    Inc,
    Dec,
    Push,
    Pop,
    Mov,

    // ========== Control flow ==========
    Jmp,
    Call,
    Jcc(Cond),
    Loop,
    /// JCXZ in 16-bit mode, JECXZ in 32-bit mode
    Jcxz,
}

const SIMPLE: [(Mnemonic, &str); 11] = [
    (Mnemonic::Nop, "NOP"),
    (Mnemonic::Ret, "RET"),
    (Mnemonic::Leave, "LEAVE"),
    (Mnemonic::Int3, "INT3"),
    (Mnemonic::Hlt, "HLT"),
    (Mnemonic::Clc, "CLC"),
    (Mnemonic::Stc, "STC"),
    (Mnemonic::Cli, "CLI"),
    (Mnemonic::Sti, "STI"),
    (Mnemonic::Cld, "CLD"),
    (Mnemonic::Std, "STD"),
];

impl Mnemonic {
    /// Printed name in `mode`
    pub fn name(self, mode: Mode) -> &'static str {
        match self {
            Mnemonic::RetImm => "RET",
            Mnemonic::Int => "INT",
            Mnemonic::Inc => "INC",
            Mnemonic::Dec => "DEC",
            Mnemonic::Push => "PUSH",
            Mnemonic::Pop => "POP",
            Mnemonic::Mov => "MOV",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Call => "CALL",
            Mnemonic::Jcc(cond) => cond.jump_name(),
            Mnemonic::Loop => "LOOP",
            Mnemonic::Jcxz => match mode {
                Mode::Bits16 => "JCXZ",
                Mode::Bits32 => "JECXZ",
            },
            simple => SIMPLE
                .iter()
                .find(|(m, _)| *m == simple)
                .map_or("???", |(_, name)| *name),
        }
    }

    /// Look up a canonical upper-case name.
    ///
    /// `RET` maps to the operand-less form; the parser promotes it to
    /// [`Mnemonic::RetImm`] when an operand follows.
    pub fn from_name(name: &str, mode: Mode) -> Option<Self> {
        if let Some((mnemonic, _)) = SIMPLE.iter().find(|(_, n)| *n == name) {
            return Some(*mnemonic);
        }
        if let Some(cond) = Cond::ALL.into_iter().find(|c| c.jump_name() == name) {
            return Some(Mnemonic::Jcc(cond));
        }
        match name {
            "INT" => Some(Mnemonic::Int),
            "INC" => Some(Mnemonic::Inc),
            "DEC" => Some(Mnemonic::Dec),
            "PUSH" => Some(Mnemonic::Push),
            "POP" => Some(Mnemonic::Pop),
            "MOV" => Some(Mnemonic::Mov),
            "JMP" => Some(Mnemonic::Jmp),
            "CALL" => Some(Mnemonic::Call),
            "LOOP" => Some(Mnemonic::Loop),
            "JCXZ" if mode == Mode::Bits16 => Some(Mnemonic::Jcxz),
            "JECXZ" if mode == Mode::Bits32 => Some(Mnemonic::Jcxz),
            _ => None,
        }
    }

    /// Check if operand 0 is a branch/call destination
    #[inline]
    pub fn is_control_flow(self) -> bool {
        matches!(
            self,
            Mnemonic::Jmp | Mnemonic::Call | Mnemonic::Jcc(_) | Mnemonic::Loop | Mnemonic::Jcxz
        )
    }
}

/// A decoded or parsed instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub operands: Vec<Operand>,
    /// Address of the first byte
    pub offset: u64,
    /// Encoded length in bytes (0 until decoded or encoded)
    pub len: usize,
    pub mode: Mode,
}

impl Instruction {
    pub fn new(mnemonic: Mnemonic, operands: Vec<Operand>, mode: Mode) -> Self {
        Self {
            mnemonic,
            operands,
            offset: 0,
            len: 0,
            mode,
        }
    }

    /// Printed mnemonic
    #[inline]
    pub fn name(&self) -> &'static str {
        self.mnemonic.name(self.mode)
    }

    /// Check if this instruction carries a destination
    #[inline]
    pub fn dstflow(&self) -> bool {
        self.mnemonic.is_control_flow()
    }

    /// Replace start-relative destination immediates with locations at the
    /// absolute target `offset + value`.
    pub fn dstflow_to_locations(&mut self, loc_db: &mut LocationDb) {
        if !self.dstflow() {
            return;
        }
        let mask = self.mode.mask();
        let offset = self.offset;
        if let Some(operand) = self.operands.first_mut() {
            if let Operand::Immediate { value, .. } = *operand {
                let target = offset.wrapping_add(value) & mask;
                *operand = Operand::LocationRef(loc_db.get_or_create_offset_location(target));
            }
        }
    }

    /// Re-express an absolute destination immediate relative to the start of
    /// this instruction. Inverse of [`Instruction::dstflow_to_locations`].
    pub fn fix_dst_offset(&mut self) {
        if !self.dstflow() {
            return;
        }
        let offset = self.offset;
        if let Some(operand) = self.operands.first_mut() {
            if let Operand::Immediate { value, bits } = *operand {
                *operand = Operand::Immediate {
                    value: value.wrapping_sub(offset) & width_mask(bits),
                    bits,
                };
            }
        }
    }

    /// Replace every location with an immediate of the mode's address width
    pub fn resolve_locations(&mut self, loc_db: &LocationDb) -> Result<()> {
        let bits = self.mode.bits();
        for operand in &mut self.operands {
            if let Operand::LocationRef(key) = *operand {
                let target = loc_db
                    .location_offset(key)
                    .ok_or(CoreError::UnknownLocation(key))?;
                *operand = Operand::imm(target, bits);
            }
        }
        Ok(())
    }

    /// Check that no operand is still symbolic
    pub fn is_resolved(&self) -> bool {
        !self.operands.iter().any(Operand::is_location)
    }
}
