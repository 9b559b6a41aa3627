//! Instruction encoding
//!
//! An instruction may have several valid encodings (short and near branch
//! forms, sign-extended immediates). [`encode_candidates`] enumerates all of
//! them, shortest form first; callers pick the first.

use r2m2_core::encoding::*;
use r2m2_core::{Instruction, Mnemonic, Mode, Operand, Register};
use crate::error::{AssemblerError, Result};

/// Every encoding of a fully resolved instruction.
///
/// Destination operands must be relative to the start of the instruction
/// (see [`Instruction::fix_dst_offset`]).
pub fn encode_candidates(instr: &Instruction) -> Result<Vec<Vec<u8>>> {
    let mode = instr.mode;
    let operands = instr.operands.as_slice();
    let invalid = || AssemblerError::InvalidOperands {
        mnemonic: instr.name().to_string(),
        message: format!("cannot encode {:?}", operands),
    };

    let candidates = match (instr.mnemonic, operands) {
        (Mnemonic::Nop, []) => vec![vec![OP_NOP]],
        (Mnemonic::Ret, []) => vec![vec![OP_RET]],
        (Mnemonic::Leave, []) => vec![vec![OP_LEAVE]],
        (Mnemonic::Int3, []) => vec![vec![OP_INT3]],
        (Mnemonic::Hlt, []) => vec![vec![OP_HLT]],
        (Mnemonic::Clc, []) => vec![vec![OP_CLC]],
        (Mnemonic::Stc, []) => vec![vec![OP_STC]],
        (Mnemonic::Cli, []) => vec![vec![OP_CLI]],
        (Mnemonic::Sti, []) => vec![vec![OP_STI]],
        (Mnemonic::Cld, []) => vec![vec![OP_CLD]],
        (Mnemonic::Std, []) => vec![vec![OP_STD]],

        (Mnemonic::RetImm, [Operand::Immediate { value, .. }]) => {
            vec![with_field(&[OP_RET_IMM], *value, 2)]
        }
        (Mnemonic::Int, [Operand::Immediate { value, .. }]) => {
            vec![with_field(&[OP_INT], *value, 1)]
        }

        (Mnemonic::Inc, [Operand::Register(reg)]) => vec![vec![reg_opcode(OP_INC_REG, *reg, mode)?]],
        (Mnemonic::Dec, [Operand::Register(reg)]) => vec![vec![reg_opcode(OP_DEC_REG, *reg, mode)?]],
        (Mnemonic::Push, [Operand::Register(reg)]) => vec![vec![reg_opcode(OP_PUSH_REG, *reg, mode)?]],
        (Mnemonic::Pop, [Operand::Register(reg)]) => vec![vec![reg_opcode(OP_POP_REG, *reg, mode)?]],

        (Mnemonic::Push, [Operand::Immediate { value, .. }]) => {
            let mut candidates = Vec::new();
            let signed = sign_extend(*value, mode.bits());
            if fits_signed(signed, 8) {
                candidates.push(with_field(&[OP_PUSH_IMM8], signed as u64, 1));
            }
            candidates.push(with_field(&[OP_PUSH_IMM], *value, mode.bytes()));
            candidates
        }
        (Mnemonic::Mov, [Operand::Register(reg), Operand::Immediate { value, .. }]) => {
            let opcode = reg_opcode(OP_MOV_REG_IMM, *reg, mode)?;
            vec![with_field(&[opcode], *value, mode.bytes())]
        }

        (Mnemonic::Jmp, [Operand::Immediate { value, .. }]) => rel_candidates(
            *value,
            mode,
            &[(&[OP_JMP_SHORT][..], 1), (&[OP_JMP_NEAR][..], mode.bytes())],
        ),
        (Mnemonic::Call, [Operand::Immediate { value, .. }]) => {
            rel_candidates(*value, mode, &[(&[OP_CALL_NEAR][..], mode.bytes())])
        }
        (Mnemonic::Jcc(cond), [Operand::Immediate { value, .. }]) => rel_candidates(
            *value,
            mode,
            &[
                (&[OP_JCC_SHORT | cond.code()][..], 1),
                (&[OP_TWO_BYTE, OP_JCC_NEAR | cond.code()][..], mode.bytes()),
            ],
        ),
        (Mnemonic::Loop, [Operand::Immediate { value, .. }]) => {
            rel_candidates(*value, mode, &[(&[OP_LOOP][..], 1)])
        }
        (Mnemonic::Jcxz, [Operand::Immediate { value, .. }]) => {
            rel_candidates(*value, mode, &[(&[OP_JCXZ][..], 1)])
        }

        (_, ops) if ops.iter().any(Operand::is_location) => {
            return Err(AssemblerError::InvalidOperands {
                mnemonic: instr.name().to_string(),
                message: "destination is still symbolic".to_string(),
            })
        }
        _ => return Err(invalid()),
    };

    if candidates.is_empty() {
        let relative = operands
            .first()
            .and_then(Operand::immediate_value)
            .unwrap_or(0);
        return Err(AssemblerError::OutOfRange {
            mnemonic: instr.name().to_string(),
            target: instr.offset.wrapping_add(relative) & mode.mask(),
        });
    }
    Ok(candidates)
}

/// Opcode bytes followed by a little-endian field
fn with_field(opcode: &[u8], value: u64, size: usize) -> Vec<u8> {
    let mut bytes = opcode.to_vec();
    push_le(&mut bytes, value, size);
    bytes
}

fn reg_opcode(base: u8, reg: Register, mode: Mode) -> Result<u8> {
    if reg.size() != mode.bits() {
        return Err(AssemblerError::InvalidRegister(format!(
            "{} is not available in {} mode",
            reg, mode
        )));
    }
    Ok(base | reg.index() as u8)
}

/// Relative forms whose displacement can reach `from_start`.
///
/// Each form is `(opcode bytes, displacement size)`; the stored displacement
/// is measured from the end of that form.
fn rel_candidates(from_start: u64, mode: Mode, forms: &[(&[u8], usize)]) -> Vec<Vec<u8>> {
    forms
        .iter()
        .filter_map(|(opcode, size)| {
            let len = opcode.len() + size;
            let disp = sign_extend(from_start.wrapping_sub(len as u64) & mode.mask(), mode.bits());
            fits_signed(disp, (size * 8) as u8).then(|| with_field(opcode, disp as u64, *size))
        })
        .collect()
}
