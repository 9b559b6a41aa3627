//! Instruction formatting to canonical assembly text
//!
//! Mnemonics and registers are upper case, immediates are lower-case `0x`
//! hex of the masked value: `MOV EAX, 0x1`, `JMP 0x1005`.

use r2m2_core::{Instruction, Operand};
use std::fmt::Write;

/// Format instruction as assembly text
pub fn format(instr: &Instruction) -> String {
    let mut text = String::from(instr.name());
    for (i, operand) in instr.operands.iter().enumerate() {
        text.push_str(if i == 0 { " " } else { ", " });
        text.push_str(&format_operand(operand));
    }
    text
}

/// Format a single operand
pub fn format_operand(operand: &Operand) -> String {
    match operand {
        Operand::Immediate { value, .. } => format!("{:#x}", value),
        Operand::Register(reg) => reg.name().to_string(),
        // Only reachable when formatting mid-resolution
        Operand::LocationRef(key) => key.to_string(),
    }
}

/// Lower-case hex dump without separators
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{:02x}", byte);
            out
        })
}

/// One listing line: `0x00001000:  eb03          JMP 0x1005`
pub fn format_line(address: u64, hex: &str, text: &str) -> String {
    format!("0x{:08X}:  {:<12}  {}", address, hex, text)
}
