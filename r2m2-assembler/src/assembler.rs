//! Host encode bridge
//!
//! [`assemble_op`] turns one line of assembly at an address into a bounded
//! [`AsmOp`]. [`assemble_block`] drives the same path over a whole source with
//! labels.

use r2m2_core::buffer::write_name;
use r2m2_core::{ArchitectureContext, AsmBytes, CoreError, Instruction, LocationDb, NameText};
use crate::encoder::encode_candidates;
use crate::error::{AssemblerError, Result};
use crate::parser::parse_instruction;

/// Result of one encode call, sized for the host's output slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AsmOp {
    /// Number of encoded bytes
    pub size: usize,
    pub buf: AsmBytes,
    pub name: NameText,
}

impl AsmOp {
    /// Build an op from an encoding, refusing encodings the slot cannot hold
    pub fn from_encoding(name: &str, bytes: &[u8]) -> Result<Self> {
        let mut op = AsmOp::default();
        op.buf.try_write(bytes)?;
        write_name(&mut op.name, name);
        op.size = bytes.len();
        Ok(op)
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')
}

/// Upper-case assembly text, keeping `0x` number prefixes lower case.
///
/// `mov eax, 0xff` becomes `MOV EAX, 0xFF`.
pub fn normalize(text: &str) -> String {
    let upper = text.to_uppercase();
    let mut out = String::with_capacity(upper.len());
    let mut prev: Option<char> = None;
    let mut chars = upper.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        let starts_number = c == '0' && !prev.is_some_and(is_identifier_char);
        if starts_number && chars.peek() == Some(&'X') {
            chars.next();
            out.push('x');
            prev = Some('x');
            continue;
        }
        prev = Some(c);
    }
    out
}

/// Resolve labels, place the instruction at `address` and pick its encoding
fn encode_at(mut instr: Instruction, address: u64, loc_db: &LocationDb) -> Result<AsmOp> {
    instr.resolve_locations(loc_db).map_err(|err| match err {
        CoreError::UnknownLocation(key) => AssemblerError::UndefinedLabel(
            loc_db
                .location_name(key)
                .map_or_else(|| key.to_string(), str::to_string),
        ),
        other => AssemblerError::Core(other),
    })?;

    instr.offset = address;
    instr.fix_dst_offset();

    let encoding = encode_candidates(&instr)?
        .into_iter()
        .next()
        .ok_or_else(|| AssemblerError::OutOfRange {
            mnemonic: instr.name().to_string(),
            target: address,
        })?;
    instr.len = encoding.len();

    AsmOp::from_encoding(instr.name(), &encoding)
}

/// Assemble one instruction at `address`.
///
/// Returns `Ok(None)` when no machine is selected; the host must then leave
/// its output untouched.
pub fn assemble_op(
    ctx: Option<&ArchitectureContext>,
    address: u64,
    text: &str,
) -> Result<Option<AsmOp>> {
    let Some(ctx) = ctx else {
        return Ok(None);
    };

    let text = normalize(text);
    let mut loc_db = LocationDb::new();
    let instr = parse_instruction(&text, ctx.mode(), &mut loc_db)?;
    let op = encode_at(instr, address, &loc_db)?;

    tracing::trace!(address, text = %text, size = op.size, "assembled");
    Ok(Some(op))
}

/// Split `LABEL: rest` into the label and the remainder
fn split_label(line: &str) -> (Option<&str>, &str) {
    match line.split_once(':') {
        Some((label, rest))
            if !label.is_empty()
                && !label.starts_with(|c: char| c.is_ascii_digit())
                && label.chars().all(is_identifier_char) =>
        {
            (Some(label), rest.trim())
        }
        _ => (None, line),
    }
}

fn strip_comment(line: &str) -> &str {
    line.find([';', '#']).map_or(line, |pos| &line[..pos])
}

/// Assemble a multi-line source starting at `base`.
///
/// Lines may carry `;` or `#` comments and a `LABEL:` prefix. Labels are
/// placed in a single pass, so a label must be defined before it is used.
pub fn assemble_block(ctx: &ArchitectureContext, base: u64, source: &str) -> Result<Vec<u8>> {
    let mut loc_db = LocationDb::new();
    let mut code = Vec::new();
    let mut address = base;

    for (line_num, line) in source.lines().enumerate() {
        let at_line = |err: AssemblerError| AssemblerError::AtLine {
            line: line_num + 1,
            source: Box::new(err),
        };

        let line = normalize(strip_comment(line).trim());
        let (label, text) = split_label(&line);

        if let Some(label) = label {
            let key = loc_db.get_or_create_name_location(label);
            if loc_db.location_offset(key).is_some() {
                return Err(at_line(AssemblerError::DuplicateLabel(label.to_string())));
            }
            loc_db
                .set_location_offset(key, address)
                .map_err(|err| at_line(err.into()))?;
        }

        if text.is_empty() {
            continue;
        }

        let op = parse_instruction(text, ctx.mode(), &mut loc_db)
            .and_then(|instr| encode_at(instr, address, &loc_db))
            .map_err(at_line)?;

        tracing::debug!(address, size = op.size, "{}", text);
        code.extend_from_slice(op.bytes());
        address = address.wrapping_add(op.size as u64) & ctx.mode().mask();
    }

    Ok(code)
}
