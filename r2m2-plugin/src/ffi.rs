//! C entry points for the disassembly host
//!
//! The host passes a caller-owned [`RAsmOp`] and raw input pointers. This is
//! the only module that dereferences them; everything past the pointer checks
//! runs through the safe [`store_disasm`] / [`store_asm`] copies.

use std::ffi::{c_char, c_int, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};

use r2m2_assembler::AsmOp;
use r2m2_core::{ASM_BUF_SIZE, NAME_BUF_SIZE};
use r2m2_disassembler::DisasmOp;
use crate::service::R2m2;

/// Host-side operation record.
///
/// Text slots are NUL-terminated; `buf` holds `buf_len` encoded bytes.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RAsmOp {
    pub size: c_int,
    pub buf_len: c_int,
    pub buf: [u8; ASM_BUF_SIZE],
    pub buf_asm: [u8; ASM_BUF_SIZE + 1],
    pub buf_hex: [u8; ASM_BUF_SIZE + 1],
    pub name: [u8; NAME_BUF_SIZE],
}

impl RAsmOp {
    pub const fn zeroed() -> Self {
        Self {
            size: 0,
            buf_len: 0,
            buf: [0; ASM_BUF_SIZE],
            buf_asm: [0; ASM_BUF_SIZE + 1],
            buf_hex: [0; ASM_BUF_SIZE + 1],
            name: [0; NAME_BUF_SIZE],
        }
    }

    pub fn asm_str(&self) -> &str {
        c_str(&self.buf_asm)
    }

    pub fn hex_str(&self) -> &str {
        c_str(&self.buf_hex)
    }

    pub fn name_str(&self) -> &str {
        c_str(&self.name)
    }

    pub fn bytes(&self) -> &[u8] {
        let len = usize::try_from(self.buf_len).unwrap_or(0).min(ASM_BUF_SIZE);
        &self.buf[..len]
    }
}

impl Default for RAsmOp {
    fn default() -> Self {
        Self::zeroed()
    }
}

fn c_str(slot: &[u8]) -> &str {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    std::str::from_utf8(&slot[..end]).unwrap_or("")
}

/// Copy `src` into `dst` with a terminating NUL
fn copy_c_str(dst: &mut [u8], src: &[u8]) {
    let Some(room) = dst.len().checked_sub(1) else {
        return;
    };
    let n = src.len().min(room);
    dst[..n].copy_from_slice(&src[..n]);
    dst[n] = 0;
}

fn to_c_int(size: usize) -> c_int {
    c_int::try_from(size).unwrap_or(c_int::MAX)
}

/// Copy a decode result into the host record. `buf` is left untouched.
pub fn store_disasm(out: &mut RAsmOp, op: &DisasmOp) {
    out.size = to_c_int(op.size);
    copy_c_str(&mut out.buf_asm, op.buf_asm.as_bytes());
    copy_c_str(&mut out.buf_hex, op.buf_hex.as_bytes());
    copy_c_str(&mut out.name, op.name.as_bytes());
}

/// Copy an encode result into the host record. Text slots other than the
/// name are left untouched.
pub fn store_asm(out: &mut RAsmOp, op: &AsmOp) {
    let bytes = op.bytes();
    out.buf[..bytes.len()].copy_from_slice(bytes);
    out.buf_len = to_c_int(bytes.len());
    out.size = to_c_int(op.size);
    copy_c_str(&mut out.name, op.name.as_bytes());
}

/// Decode through `service` into `out`.
///
/// Returns the consumed size, or 0 with `out` untouched when no machine is
/// selected.
pub fn disassemble_into(service: &R2m2, out: &mut RAsmOp, address: u64, bytes: &[u8]) -> c_int {
    match service.disassemble(address, bytes) {
        Some(op) => {
            store_disasm(out, &op);
            out.size
        }
        None => 0,
    }
}

/// Encode through `service` into `out`.
///
/// Returns the encoded size, 0 with `out` untouched when no machine is
/// selected, or -1 with `out` untouched when the text cannot be encoded.
pub fn assemble_into(service: &R2m2, out: &mut RAsmOp, address: u64, text: &str) -> c_int {
    match service.assemble(address, text) {
        Ok(Some(op)) => {
            store_asm(out, &op);
            out.size
        }
        Ok(None) => 0,
        Err(err) => {
            tracing::error!(address, text, error = %err, "cannot assemble");
            -1
        }
    }
}

static PLUGIN: R2m2 = R2m2::new();

/// Decode the instruction in `buffer[..length]` at `address` into `op`.
///
/// # Safety
///
/// `op` must be null or valid for writes of one [`RAsmOp`]. `buffer` must be
/// null or valid for reads of `length` bytes.
#[no_mangle]
pub unsafe extern "C" fn r2m2_dis(
    op: *mut RAsmOp,
    address: u64,
    buffer: *const u8,
    length: c_int,
) -> c_int {
    // SAFETY: the caller guarantees `op` is null or valid and unaliased
    let Some(out) = (unsafe { op.as_mut() }) else {
        return -1;
    };
    let bytes: &[u8] = match usize::try_from(length) {
        Ok(len) if len > 0 && !buffer.is_null() => {
            // SAFETY: the caller guarantees `buffer` holds `length` bytes
            unsafe { std::slice::from_raw_parts(buffer, len) }
        }
        _ => &[],
    };

    catch_unwind(AssertUnwindSafe(|| disassemble_into(&PLUGIN, out, address, bytes)))
        .unwrap_or(-1)
}

/// Encode the NUL-terminated `text` at `address` into `op`.
///
/// Returns the encoded size, 0 when no machine is selected, or -1 on error.
///
/// # Safety
///
/// `op` must be null or valid for writes of one [`RAsmOp`]. `text` must be
/// null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn r2m2_asm(op: *mut RAsmOp, address: u64, text: *const c_char) -> c_int {
    // SAFETY: the caller guarantees `op` is null or valid and unaliased
    let Some(out) = (unsafe { op.as_mut() }) else {
        return -1;
    };
    if text.is_null() {
        return -1;
    }
    // SAFETY: the caller guarantees `text` is NUL-terminated
    let Ok(text) = (unsafe { CStr::from_ptr(text) }).to_str() else {
        tracing::error!(address, "assembly text is not UTF-8");
        return -1;
    };

    catch_unwind(AssertUnwindSafe(|| assemble_into(&PLUGIN, out, address, text)))
        .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfig;
    use r2m2_core::NAME_TOO_LONG;

    fn service() -> R2m2 {
        R2m2::with_config(PluginConfig::default().with_arch("x86_32"))
    }

    #[test]
    fn test_copy_c_str_terminates() {
        let mut slot = [0xAAu8; 4];
        copy_c_str(&mut slot, b"abcdef");
        assert_eq!(&slot, b"abc\0");
    }

    #[test]
    fn test_disassemble_into() {
        let mut out = RAsmOp::zeroed();
        assert_eq!(disassemble_into(&service(), &mut out, 0x1000, &[0xEB, 0x03]), 2);
        assert_eq!(out.asm_str(), "JMP 0x1005");
        assert_eq!(out.hex_str(), "eb03");
        assert_eq!(out.name_str(), "JMP");
    }

    #[test]
    fn test_assemble_into() {
        let mut out = RAsmOp::zeroed();
        assert_eq!(assemble_into(&service(), &mut out, 0x1000, "jmp 0x1005"), 2);
        assert_eq!(out.bytes(), &[0xEB, 0x03]);
        assert_eq!(out.name_str(), "JMP");
    }

    #[test]
    fn test_failed_assemble_leaves_record() {
        let mut out = RAsmOp::zeroed();
        out.size = 7;
        assert_eq!(assemble_into(&service(), &mut out, 0, "bogus"), -1);
        assert_eq!(out.size, 7);
        assert_eq!(out.buf_len, 0);
    }

    #[test]
    fn test_store_disasm_long_name_slot() {
        let mut op = DisasmOp::default();
        r2m2_core::buffer::write_name(&mut op.name, &"X".repeat(40));
        let mut out = RAsmOp::zeroed();
        store_disasm(&mut out, &op);
        assert_eq!(out.name_str(), NAME_TOO_LONG);
        assert_eq!(out.name[NAME_TOO_LONG.len()], 0);
    }

    #[test]
    fn test_null_pointers() {
        unsafe {
            assert_eq!(r2m2_dis(std::ptr::null_mut(), 0, std::ptr::null(), 0), -1);
            assert_eq!(r2m2_asm(std::ptr::null_mut(), 0, std::ptr::null()), -1);
            let mut out = RAsmOp::zeroed();
            assert_eq!(r2m2_asm(&mut out, 0, std::ptr::null()), -1);
        }
    }
}
