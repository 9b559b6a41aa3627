//! Tests for malformed input handling in the assembler
//!
//! Every rejected input must come back as an error, never a panic and never
//! a partially written op.

use proptest::prelude::*;
use r2m2_assembler::{assemble_block, assemble_op, AsmOp, AssemblerError};
use r2m2_core::{Arch, ArchitectureContext};

fn asm32(text: &str) -> Result<Option<AsmOp>, AssemblerError> {
    assemble_op(Some(&ArchitectureContext::new(Arch::X86_32)), 0x1000, text)
}

fn asm16(text: &str) -> Result<Option<AsmOp>, AssemblerError> {
    assemble_op(Some(&ArchitectureContext::new(Arch::X86_16)), 0x1000, text)
}

// ============================================================================
// Invalid Instructions
// ============================================================================

#[test]
fn test_unknown_instruction() {
    match asm32("foobar eax") {
        Err(AssemblerError::UnknownInstruction(name)) => assert_eq!(name, "FOOBAR"),
        other => panic!("Expected UnknownInstruction, got {:?}", other),
    }
}

#[test]
fn test_mode_specific_mnemonic() {
    assert!(matches!(
        asm32("jcxz 0x1000"),
        Err(AssemblerError::UnknownInstruction(_))
    ));
    assert!(matches!(
        asm16("jecxz 0x1000"),
        Err(AssemblerError::UnknownInstruction(_))
    ));
}

#[test]
fn test_empty_text() {
    assert!(matches!(asm32(""), Err(AssemblerError::SyntaxError { .. })));
    assert!(matches!(asm32("   "), Err(AssemblerError::SyntaxError { .. })));
}

#[test]
fn test_unexpected_character() {
    match asm32("mov eax, @1") {
        Err(AssemblerError::SyntaxError { column, .. }) => assert_eq!(column, 9),
        other => panic!("Expected SyntaxError, got {:?}", other),
    }
}

// ============================================================================
// Invalid Operands
// ============================================================================

#[test]
fn test_wrong_operand_count() {
    assert!(matches!(
        asm32("ret eax"),
        Err(AssemblerError::InvalidOperands { .. })
    ));
    assert!(matches!(
        asm32("mov eax"),
        Err(AssemblerError::InvalidOperands { .. })
    ));
    assert!(matches!(
        asm32("jmp"),
        Err(AssemblerError::InvalidOperands { .. })
    ));
}

#[test]
fn test_register_width_mismatch() {
    assert!(matches!(
        asm32("inc ax"),
        Err(AssemblerError::InvalidRegister(_))
    ));
    assert!(matches!(
        asm16("mov eax, 0x1"),
        Err(AssemblerError::InvalidRegister(_))
    ));
}

#[test]
fn test_immediate_out_of_range() {
    assert!(matches!(
        asm32("int 0x100"),
        Err(AssemblerError::InvalidImmediate(_))
    ));
    assert!(matches!(
        asm16("mov ax, 0x10000"),
        Err(AssemblerError::InvalidImmediate(_))
    ));
    assert!(matches!(
        asm32("ret 0x10000"),
        Err(AssemblerError::InvalidImmediate(_))
    ));
}

#[test]
fn test_short_only_branch_out_of_range() {
    match asm32("loop 0x2000") {
        Err(AssemblerError::OutOfRange { mnemonic, target }) => {
            assert_eq!(mnemonic, "LOOP");
            assert_eq!(target, 0x2000);
        }
        other => panic!("Expected OutOfRange, got {:?}", other),
    }
}

#[test]
fn test_undefined_label() {
    assert!(matches!(
        asm32("call somewhere"),
        Err(AssemblerError::UndefinedLabel(_))
    ));
}

// ============================================================================
// Block Errors
// ============================================================================

#[test]
fn test_block_error_reports_line() {
    let source = "nop\nnop\nmov eax\nnop";
    let err = assemble_block(&ArchitectureContext::new(Arch::X86_32), 0, source).unwrap_err();
    assert!(matches!(err, AssemblerError::AtLine { line: 3, .. }));
    assert!(err.to_string().starts_with("Line 3: "));
}

#[test]
fn test_block_duplicate_label() {
    let source = "top: nop\ntop: ret";
    let err = assemble_block(&ArchitectureContext::new(Arch::X86_32), 0, source).unwrap_err();
    match err.root() {
        AssemblerError::DuplicateLabel(name) => assert_eq!(name, "TOP"),
        other => panic!("Expected DuplicateLabel, got {:?}", other),
    }
}

// ============================================================================
// Fuzz
// ============================================================================

proptest! {
    #[test]
    fn prop_arbitrary_text_never_panics(text in "\\PC{0,64}") {
        let _ = asm32(&text);
        let _ = asm16(&text);
    }

    #[test]
    fn prop_successful_ops_are_bounded(text in "[a-z]{2,5} [a-z0-9x, ]{0,16}") {
        if let Ok(Some(op)) = asm32(&text) {
            prop_assert!(op.size >= 1);
            prop_assert_eq!(op.size, op.bytes().len());
            prop_assert!(op.name.len() < 32);
        }
    }
}
