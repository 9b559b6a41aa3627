//! Integration tests for the r2m2 disassembler
//!
//! Tests the complete host decode path including:
//! - Instruction decoding in both machines
//! - Destination resolution against the instruction address
//! - Fallback and bounded output for unknown bytes

use proptest::prelude::*;
use r2m2_assembler::assemble_op;
use r2m2_core::{
    Arch, ArchitectureContext, ASM_BUF_SIZE, CANNOT_DISASSEMBLE, DECODE_FALLBACK_SIZE,
    NAME_BUF_SIZE,
};
use r2m2_disassembler::{
    decode, disassemble_block, disassemble_op, format, DisasmOp, DisasmStatus, DisassemblerError,
};

fn ctx(arch: Arch) -> ArchitectureContext {
    ArchitectureContext::new(arch)
}

fn dis(arch: Arch, address: u64, bytes: &[u8]) -> DisasmOp {
    disassemble_op(Some(&ctx(arch)), address, bytes).unwrap()
}

// ============================================================================
// Decoding
// ============================================================================

#[test]
fn test_decode_32_bit_forms() {
    let cases: [(&[u8], &str); 8] = [
        (&[0x90], "NOP"),
        (&[0x55], "PUSH EBP"),
        (&[0x5F], "POP EDI"),
        (&[0x41], "INC ECX"),
        (&[0xB8, 0xEF, 0xBE, 0xAD, 0xDE], "MOV EAX, 0xdeadbeef"),
        (&[0xC2, 0x08, 0x00], "RET 0x8"),
        (&[0xCD, 0x80], "INT 0x80"),
        (&[0x6A, 0xFF], "PUSH 0xffffffff"),
    ];
    for (bytes, text) in cases {
        let op = dis(Arch::X86_32, 0, bytes);
        assert_eq!(op.buf_asm.as_str(), text);
        assert_eq!(op.size, bytes.len());
    }
}

#[test]
fn test_decode_16_bit_forms() {
    assert_eq!(dis(Arch::X86_16, 0, &[0x55]).buf_asm.as_str(), "PUSH BP");
    assert_eq!(
        dis(Arch::X86_16, 0, &[0xB9, 0x34, 0x12]).buf_asm.as_str(),
        "MOV CX, 0x1234"
    );
    assert_eq!(dis(Arch::X86_16, 0, &[0x6A, 0xFF]).buf_asm.as_str(), "PUSH 0xffff");
}

#[test]
fn test_same_bytes_differ_by_machine() {
    let bytes = [0xB8, 0x01, 0x00, 0x00, 0x00];
    let op32 = dis(Arch::X86_32, 0, &bytes);
    let op16 = dis(Arch::X86_16, 0, &bytes);
    assert_eq!(op32.size, 5);
    assert_eq!(op16.size, 3);
    assert_eq!(op16.buf_asm.as_str(), "MOV AX, 0x1");
}

// ============================================================================
// Destinations
// ============================================================================

#[test]
fn test_destination_is_absolute() {
    let op = dis(Arch::X86_32, 0x1000, &[0xEB, 0x03]);
    assert_eq!(op.buf_asm.as_str(), "JMP 0x1005");
    assert_eq!(op.name.as_str(), "JMP");

    let op = dis(Arch::X86_32, 0x2000, &[0xEB, 0x03]);
    assert_eq!(op.buf_asm.as_str(), "JMP 0x2005");
}

#[test]
fn test_near_call_and_jcc() {
    let op = dis(Arch::X86_32, 0x400000, &[0xE8, 0xFB, 0x0F, 0x00, 0x00]);
    assert_eq!(op.buf_asm.as_str(), "CALL 0x401000");

    let op = dis(Arch::X86_32, 0x100, &[0x0F, 0x84, 0xFA, 0xFF, 0xFF, 0xFF]);
    assert_eq!(op.buf_asm.as_str(), "JZ 0x100");
    assert_eq!(op.size, 6);
}

#[test]
fn test_16_bit_destination_wraps() {
    let op = dis(Arch::X86_16, 0xFFF0, &[0xE8, 0x0D, 0x00]);
    assert_eq!(op.buf_asm.as_str(), "CALL 0x0");

    let op = dis(Arch::X86_16, 0x0000, &[0xEB, 0xF0]);
    assert_eq!(op.buf_asm.as_str(), "JMP 0xfff2");
}

#[test]
fn test_jcxz_name_by_machine() {
    assert_eq!(dis(Arch::X86_16, 0, &[0xE3, 0x00]).buf_asm.as_str(), "JCXZ 0x2");
    assert_eq!(dis(Arch::X86_32, 0, &[0xE3, 0x00]).buf_asm.as_str(), "JECXZ 0x2");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_and_truncated_bytes() {
    for bytes in [&[0x0F, 0x05][..], &[0xE9, 0x00][..], &[0xFF, 0xFF][..]] {
        let op = dis(Arch::X86_32, 0, bytes);
        assert_eq!(op.buf_asm.as_str(), CANNOT_DISASSEMBLE);
        assert_eq!(op.size, DECODE_FALLBACK_SIZE);
        assert_eq!(op.status, DisasmStatus::Unrecognized);
    }
}

#[test]
fn test_decode_errors() {
    assert_eq!(
        decode(&[0xFF], r2m2_core::Mode::Bits32).unwrap_err(),
        DisassemblerError::UnknownOpcode(0xFF)
    );
    assert!(matches!(
        decode(&[0xCD], r2m2_core::Mode::Bits32),
        Err(DisassemblerError::Truncated { needed: 2, available: 1 })
    ));
    assert!(matches!(
        decode(&[], r2m2_core::Mode::Bits32),
        Err(DisassemblerError::Empty)
    ));
}

#[test]
fn test_no_context() {
    assert!(disassemble_op(None, 0, &[0x90]).is_none());
}

// ============================================================================
// Listings
// ============================================================================

#[test]
fn test_listing_recovers_after_garbage() {
    let listing = disassemble_block(&ctx(Arch::X86_32), 0, &[0x06, 0x07, 0x90]);
    let lines: Vec<&str> = listing.lines().filter(|l| l.starts_with("0x")).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(CANNOT_DISASSEMBLE));
    assert!(lines[1].starts_with("0x00000002:"));
    assert!(lines[1].ends_with("NOP"));
}

// ============================================================================
// Round Trip with the Assembler
// ============================================================================

#[test]
fn test_assembled_text_decodes_back() {
    let texts = [
        "NOP",
        "PUSH EBP",
        "MOV EBX, 0xdeadbeef",
        "RET 0x10",
        "INT 0x21",
        "JMP 0x1005",
        "JMP 0x8000",
        "JNZ 0x1000",
        "CALL 0x2000",
        "LOOP 0x1010",
    ];
    let ctx = ctx(Arch::X86_32);
    for text in texts {
        let asm = assemble_op(Some(&ctx), 0x1000, text).unwrap().unwrap();
        let op = disassemble_op(Some(&ctx), 0x1000, asm.bytes()).unwrap();
        assert_eq!(op.buf_asm.as_str(), text);
        assert_eq!(op.size, asm.size);
        assert_eq!(op.name, asm.name);
    }
}

#[test]
fn test_formatted_decode_matches_bridge() {
    let instr = decode(&[0x48], r2m2_core::Mode::Bits32).unwrap();
    assert_eq!(format(&instr), dis(Arch::X86_32, 0, &[0x48]).buf_asm.as_str());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_decode_never_panics_and_stays_bounded(
        address in any::<u32>(),
        bytes in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        for arch in Arch::ALL {
            let op = dis(arch, address as u64, &bytes);
            prop_assert!(op.buf_asm.len() <= ASM_BUF_SIZE);
            prop_assert!(op.buf_hex.len() <= ASM_BUF_SIZE);
            prop_assert!(op.name.len() < NAME_BUF_SIZE);
            if bytes.is_empty() {
                prop_assert_eq!(op.size, 0);
            } else {
                prop_assert!(op.size >= 1);
            }
        }
    }

    #[test]
    fn prop_decoded_jump_reassembles(address in 0u32..0x7FFF_0000, disp in any::<i8>()) {
        let ctx = ctx(Arch::X86_32);
        let bytes = [0xEB, disp as u8];
        let op = disassemble_op(Some(&ctx), address as u64, &bytes).unwrap();
        let asm = assemble_op(Some(&ctx), address as u64, op.buf_asm.as_str())
            .unwrap()
            .unwrap();
        prop_assert_eq!(asm.bytes(), &bytes[..]);
    }
}
