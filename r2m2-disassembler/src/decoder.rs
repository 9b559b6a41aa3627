//! Instruction decoder

use r2m2_core::encoding::*;
use r2m2_core::{Cond, Instruction, Mnemonic, Mode, Operand, Register};
use crate::error::{DisassemblerError, Result};

/// Decode the instruction at the start of `bytes`.
///
/// The returned instruction has `len` set and `offset` 0. Destination
/// operands hold the displacement measured from the start of the
/// instruction, at the mode's address width.
pub fn decode(bytes: &[u8], mode: Mode) -> Result<Instruction> {
    let opcode = *bytes.first().ok_or(DisassemblerError::Empty)?;

    match opcode {
        OP_NOP => Ok(simple(Mnemonic::Nop, mode)),
        OP_RET => Ok(simple(Mnemonic::Ret, mode)),
        OP_LEAVE => Ok(simple(Mnemonic::Leave, mode)),
        OP_INT3 => Ok(simple(Mnemonic::Int3, mode)),
        OP_HLT => Ok(simple(Mnemonic::Hlt, mode)),
        OP_CLC => Ok(simple(Mnemonic::Clc, mode)),
        OP_STC => Ok(simple(Mnemonic::Stc, mode)),
        OP_CLI => Ok(simple(Mnemonic::Cli, mode)),
        OP_STI => Ok(simple(Mnemonic::Sti, mode)),
        OP_CLD => Ok(simple(Mnemonic::Cld, mode)),
        OP_STD => Ok(simple(Mnemonic::Std, mode)),

        OP_RET_IMM => decode_imm(bytes, Mnemonic::RetImm, 2, mode),
        OP_INT => decode_imm(bytes, Mnemonic::Int, 1, mode),

        0x40..=0x47 => decode_reg(opcode, Mnemonic::Inc, mode),
        0x48..=0x4F => decode_reg(opcode, Mnemonic::Dec, mode),
        0x50..=0x57 => decode_reg(opcode, Mnemonic::Push, mode),
        0x58..=0x5F => decode_reg(opcode, Mnemonic::Pop, mode),
        0xB8..=0xBF => decode_mov_imm(bytes, mode),

        OP_PUSH_IMM8 => decode_push_imm8(bytes, mode),
        OP_PUSH_IMM => decode_imm(bytes, Mnemonic::Push, mode.bytes(), mode),

        0x70..=0x7F => decode_rel(bytes, Mnemonic::Jcc(Cond::from_code(opcode)), 1, 1, mode),
        OP_TWO_BYTE => decode_two_byte(bytes, mode),
        OP_LOOP => decode_rel(bytes, Mnemonic::Loop, 1, 1, mode),
        OP_JCXZ => decode_rel(bytes, Mnemonic::Jcxz, 1, 1, mode),
        OP_JMP_SHORT => decode_rel(bytes, Mnemonic::Jmp, 1, 1, mode),
        OP_JMP_NEAR => decode_rel(bytes, Mnemonic::Jmp, 1, mode.bytes(), mode),
        OP_CALL_NEAR => decode_rel(bytes, Mnemonic::Call, 1, mode.bytes(), mode),

        _ => Err(DisassemblerError::UnknownOpcode(opcode)),
    }
}

fn simple(mnemonic: Mnemonic, mode: Mode) -> Instruction {
    finish(mnemonic, vec![], 1, mode)
}

fn finish(mnemonic: Mnemonic, operands: Vec<Operand>, len: usize, mode: Mode) -> Instruction {
    let mut instr = Instruction::new(mnemonic, operands, mode);
    instr.len = len;
    instr
}

/// Read a little-endian field of `size` bytes at `at`
fn field(bytes: &[u8], at: usize, size: usize) -> Result<u64> {
    bytes
        .get(at..)
        .and_then(|rest| read_le(rest, size))
        .ok_or(DisassemblerError::Truncated {
            needed: at + size,
            available: bytes.len(),
        })
}

fn decode_reg(opcode: u8, mnemonic: Mnemonic, mode: Mode) -> Result<Instruction> {
    let reg = decode_register(opcode, mode)?;
    Ok(finish(mnemonic, vec![Operand::Register(reg)], 1, mode))
}

fn decode_imm(bytes: &[u8], mnemonic: Mnemonic, size: usize, mode: Mode) -> Result<Instruction> {
    let value = field(bytes, 1, size)?;
    let operand = Operand::imm(value, (size * 8) as u8);
    Ok(finish(mnemonic, vec![operand], 1 + size, mode))
}

fn decode_mov_imm(bytes: &[u8], mode: Mode) -> Result<Instruction> {
    let reg = decode_register(bytes[0], mode)?;
    let size = mode.bytes();
    let value = field(bytes, 1, size)?;
    Ok(finish(
        Mnemonic::Mov,
        vec![Operand::Register(reg), Operand::imm(value, mode.bits())],
        1 + size,
        mode,
    ))
}

/// PUSH imm8 is sign-extended to the operand size
fn decode_push_imm8(bytes: &[u8], mode: Mode) -> Result<Instruction> {
    let value = sign_extend(field(bytes, 1, 1)?, 8);
    Ok(finish(
        Mnemonic::Push,
        vec![Operand::imm(value as u64, mode.bits())],
        2,
        mode,
    ))
}

fn decode_two_byte(bytes: &[u8], mode: Mode) -> Result<Instruction> {
    let second = field(bytes, 1, 1)? as u8;
    match second {
        0x80..=0x8F => decode_rel(
            bytes,
            Mnemonic::Jcc(Cond::from_code(second)),
            2,
            mode.bytes(),
            mode,
        ),
        _ => Err(DisassemblerError::InvalidEncoding(format!(
            "0F {:02X}",
            second
        ))),
    }
}

/// Decode a relative destination of `size` bytes following `opcode_len`
/// opcode bytes
fn decode_rel(
    bytes: &[u8],
    mnemonic: Mnemonic,
    opcode_len: usize,
    size: usize,
    mode: Mode,
) -> Result<Instruction> {
    let disp = sign_extend(field(bytes, opcode_len, size)?, (size * 8) as u8);
    let len = opcode_len + size;
    let from_start = disp.wrapping_add(len as i64) as u64;
    Ok(finish(
        mnemonic,
        vec![Operand::imm(from_start, mode.bits())],
        len,
        mode,
    ))
}

fn decode_register(opcode: u8, mode: Mode) -> Result<Register> {
    Register::from_index((opcode & REG_MASK) as usize, mode)
        .ok_or_else(|| DisassemblerError::InvalidEncoding(format!("{:02X}", opcode)))
}
