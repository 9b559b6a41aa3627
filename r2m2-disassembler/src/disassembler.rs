//! Host decode bridge
//!
//! Turns a byte window at an address into a bounded [`DisasmOp`]. Decoding
//! never fails towards the host: unrecognized bytes produce the
//! [`CANNOT_DISASSEMBLE`] text and a [`DECODE_FALLBACK_SIZE`] byte advance.

use r2m2_core::buffer::write_name;
use r2m2_core::{
    ArchitectureContext, AsmText, CoreError, HexText, Instruction, LocationDb, Mode, NameText,
    Operand, CANNOT_DISASSEMBLE, DECODE_FALLBACK_SIZE, TEXT_TOO_LONG,
};
use crate::decoder::decode;
use crate::error::Result;
use crate::formatter::{format, format_hex, format_line};

/// How a decode call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisasmStatus {
    /// Nothing to decode
    #[default]
    Empty,
    /// Instruction decoded and formatted
    Decoded,
    /// The grammar rejected the bytes
    Unrecognized,
    /// The grammar accepted the bytes but resolving them failed
    Fault,
}

/// Result of one decode call, sized for the host's output slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisasmOp {
    /// Bytes consumed
    pub size: usize,
    pub buf_asm: AsmText,
    pub buf_hex: HexText,
    /// Printed mnemonic, empty when nothing decoded
    pub name: NameText,
    pub status: DisasmStatus,
}

/// Decode one instruction at `address` with its destination resolved to an
/// absolute address
pub fn decode_at(bytes: &[u8], address: u64, mode: Mode) -> Result<Instruction> {
    let mut instr = decode(bytes, mode)?;
    instr.offset = address;
    if instr.dstflow() {
        resolve_destinations(&mut instr)?;
    }
    Ok(instr)
}

fn resolve_destinations(instr: &mut Instruction) -> Result<()> {
    // Only operands that started as immediates are turned back into them
    let sizes: Vec<Option<u8>> = instr.operands.iter().map(Operand::immediate_bits).collect();

    let mut loc_db = LocationDb::new();
    instr.dstflow_to_locations(&mut loc_db);

    for (operand, size) in instr.operands.iter_mut().zip(sizes) {
        let Some(bits) = size else { continue };
        if let Operand::LocationRef(key) = *operand {
            let target = loc_db
                .location_offset(key)
                .ok_or(CoreError::UnknownLocation(key))?;
            *operand = Operand::imm(target, bits);
        }
    }
    Ok(())
}

/// Decode the instruction at the start of `bytes`.
///
/// Returns `None` when no machine is selected; the host must then leave its
/// output untouched.
pub fn disassemble_op(
    ctx: Option<&ArchitectureContext>,
    address: u64,
    bytes: &[u8],
) -> Option<DisasmOp> {
    let ctx = ctx?;
    let mut op = DisasmOp::default();
    if bytes.is_empty() {
        return Some(op);
    }

    let (text, size, name, status) = match decode_at(bytes, address, ctx.mode()) {
        Ok(instr) => (format(&instr), instr.len, instr.name(), DisasmStatus::Decoded),
        Err(err) if err.is_decode_failure() => {
            tracing::debug!(address, error = %err, "cannot disassemble");
            (
                CANNOT_DISASSEMBLE.to_string(),
                DECODE_FALLBACK_SIZE,
                "",
                DisasmStatus::Unrecognized,
            )
        }
        Err(err) => {
            tracing::warn!(address, error = %err, "fault while resolving decoded instruction");
            (
                CANNOT_DISASSEMBLE.to_string(),
                DECODE_FALLBACK_SIZE,
                "",
                DisasmStatus::Fault,
            )
        }
    };

    op.size = size;
    op.status = status;
    if op.buf_asm.write_or_replace(&text, TEXT_TOO_LONG) {
        tracing::debug!(address, len = text.len(), "disassembled text too long");
    }
    op.buf_hex
        .write_truncated(&format_hex(&bytes[..size.min(bytes.len())]));
    write_name(&mut op.name, name);

    Some(op)
}

/// Disassemble a whole byte range into a listing, one op per line
pub fn disassemble_block(ctx: &ArchitectureContext, base: u64, bytes: &[u8]) -> String {
    let mut output = String::new();

    output.push_str("; r2m2 disassembly\n");
    output.push_str(&format!("; Machine: {}\n", ctx));
    output.push_str(&format!("; Base: 0x{:08X}\n", base));
    output.push_str(&format!("; Size: {} bytes\n", bytes.len()));
    output.push('\n');

    let mut pos = 0;
    while pos < bytes.len() {
        let address = base.wrapping_add(pos as u64);
        let Some(op) = disassemble_op(Some(ctx), address, &bytes[pos..]) else {
            break;
        };
        output.push_str(&format_line(address, op.buf_hex.as_str(), op.buf_asm.as_str()));
        output.push('\n');
        pos += op.size.max(1);
    }

    output
}
