//! # Instruction Encoding Constants and Helpers
//!
//! Opcode bytes and little-endian field helpers shared by the decoder and the
//! encoder.
//!
//! ```text
//! NOP          90
//! INC/DEC r    40+r / 48+r
//! PUSH/POP r   50+r / 58+r
//! MOV r, imm   B8+r iw/id
//! PUSH imm     6A ib | 68 iw/id
//! Jcc          70+cc cb | 0F 80+cc cw/cd
//! JMP          EB cb | E9 cw/cd
//! CALL         E8 cw/cd
//! LOOP, JECXZ  E2 cb, E3 cb
//! ```

// ============================================================================
// Opcode Bytes
// ============================================================================

pub const OP_NOP: u8 = 0x90;
pub const OP_RET: u8 = 0xC3;
pub const OP_RET_IMM: u8 = 0xC2;
pub const OP_LEAVE: u8 = 0xC9;
pub const OP_INT3: u8 = 0xCC;
pub const OP_INT: u8 = 0xCD;
pub const OP_HLT: u8 = 0xF4;
pub const OP_CLC: u8 = 0xF8;
pub const OP_STC: u8 = 0xF9;
pub const OP_CLI: u8 = 0xFA;
pub const OP_STI: u8 = 0xFB;
pub const OP_CLD: u8 = 0xFC;
pub const OP_STD: u8 = 0xFD;

/// Register-in-opcode families (low 3 bits select the register)
pub const OP_INC_REG: u8 = 0x40;
pub const OP_DEC_REG: u8 = 0x48;
pub const OP_PUSH_REG: u8 = 0x50;
pub const OP_POP_REG: u8 = 0x58;
pub const OP_MOV_REG_IMM: u8 = 0xB8;

pub const OP_PUSH_IMM8: u8 = 0x6A;
pub const OP_PUSH_IMM: u8 = 0x68;

pub const OP_JCC_SHORT: u8 = 0x70;
pub const OP_TWO_BYTE: u8 = 0x0F;
pub const OP_JCC_NEAR: u8 = 0x80;
pub const OP_LOOP: u8 = 0xE2;
pub const OP_JCXZ: u8 = 0xE3;
pub const OP_CALL_NEAR: u8 = 0xE8;
pub const OP_JMP_NEAR: u8 = 0xE9;
pub const OP_JMP_SHORT: u8 = 0xEB;

/// Register field mask for register-in-opcode forms
pub const REG_MASK: u8 = 0x07;

/// Condition code mask for Jcc forms
pub const CC_MASK: u8 = 0x0F;

// ============================================================================
// Width Helpers
// ============================================================================

/// All ones for `bits` (1-64)
#[inline]
pub const fn width_mask(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Sign-extend the low `bits` of `value`
#[inline]
pub const fn sign_extend(value: u64, bits: u8) -> i64 {
    let shift = 64 - bits as u32;
    ((value << shift) as i64) >> shift
}

/// Check that `value` is representable as a signed `bits`-wide integer
#[inline]
pub const fn fits_signed(value: i64, bits: u8) -> bool {
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    value >= min && value <= max
}

/// Read a little-endian field of `size` bytes
#[inline]
pub fn read_le(bytes: &[u8], size: usize) -> Option<u64> {
    let field = bytes.get(..size)?;
    Some(
        field
            .iter()
            .rev()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64),
    )
}

/// Append the low `size` bytes of `value` in little-endian order
#[inline]
pub fn push_le(buf: &mut Vec<u8>, value: u64, size: usize) {
    buf.extend_from_slice(&value.to_le_bytes()[..size]);
}
