//! Assembly parser
//!
//! Parses one normalized instruction into an [`Instruction`]. Destinations
//! given as numbers are absolute addresses; destinations given as names
//! become locations in the caller's [`LocationDb`].

use logos::Logos;
use r2m2_core::encoding::{fits_signed, width_mask};
use r2m2_core::{Instruction, LocationDb, Mnemonic, Mode, Operand, Register};
use crate::error::{AssemblerError, Result};
use crate::lexer::Token;

/// An operand as written, before it is checked against its instruction
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOperand {
    Register(Register),
    Number(i128),
    Name(String),
}

/// Condition-code spellings accepted on input, mapped to printed names
const JCC_ALIASES: [(&str, &str); 14] = [
    ("JE", "JZ"),
    ("JNE", "JNZ"),
    ("JC", "JB"),
    ("JNAE", "JB"),
    ("JNC", "JAE"),
    ("JNB", "JAE"),
    ("JNA", "JBE"),
    ("JNBE", "JA"),
    ("JP", "JPE"),
    ("JPO", "JNP"),
    ("JNGE", "JL"),
    ("JNL", "JGE"),
    ("JNG", "JLE"),
    ("JNLE", "JG"),
];

fn canonical_name(name: &str) -> &str {
    JCC_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, canonical)| *canonical)
}

/// Split a line into tokens with their starting columns
pub fn tokenize(text: &str) -> Result<Vec<(Token, usize)>> {
    let mut lex = Token::lexer(text);
    let mut tokens = Vec::new();
    while let Some(token) = lex.next() {
        let column = lex.span().start;
        match token {
            Ok(token) => tokens.push((token, column)),
            Err(()) => {
                return Err(AssemblerError::SyntaxError {
                    column,
                    message: format!("unexpected '{}'", lex.slice()),
                })
            }
        }
    }
    Ok(tokens)
}

/// Parse a single instruction from normalized assembly text
pub fn parse_instruction(text: &str, mode: Mode, loc_db: &mut LocationDb) -> Result<Instruction> {
    let tokens = tokenize(text)?;
    let (name, rest) = match tokens.split_first() {
        Some(((Token::Identifier(name), _), rest)) => (name.clone(), rest),
        Some(((token, column), _)) => {
            return Err(AssemblerError::SyntaxError {
                column: *column,
                message: format!("expected mnemonic, found {:?}", token),
            })
        }
        None => {
            return Err(AssemblerError::SyntaxError {
                column: 0,
                message: "Empty instruction".to_string(),
            })
        }
    };

    let operands = parse_operands(rest)?;
    build(&name, operands, mode, loc_db)
}

/// Parse `operand (, operand)*`
fn parse_operands(tokens: &[(Token, usize)]) -> Result<Vec<ParsedOperand>> {
    let mut operands = Vec::new();
    let mut iter = tokens.iter().peekable();

    while iter.peek().is_some() {
        if !operands.is_empty() {
            match iter.next() {
                Some((Token::Comma, _)) => {}
                Some((token, column)) => {
                    return Err(AssemblerError::SyntaxError {
                        column: *column,
                        message: format!("expected ',', found {:?}", token),
                    })
                }
                None => break,
            }
        }

        let operand = match iter.next() {
            Some((Token::Identifier(name), _)) => match Register::from_name(name) {
                Some(reg) => ParsedOperand::Register(reg),
                None => ParsedOperand::Name(name.clone()),
            },
            Some((Token::Number(value), _)) | Some((Token::Hex(value), _)) => {
                ParsedOperand::Number(*value as i128)
            }
            Some((Token::Minus, column)) => match iter.next() {
                Some((Token::Number(value), _)) | Some((Token::Hex(value), _)) => {
                    ParsedOperand::Number(-(*value as i128))
                }
                _ => {
                    return Err(AssemblerError::SyntaxError {
                        column: *column,
                        message: "expected number after '-'".to_string(),
                    })
                }
            },
            Some((token, column)) => {
                return Err(AssemblerError::SyntaxError {
                    column: *column,
                    message: format!("expected operand, found {:?}", token),
                })
            }
            None => {
                return Err(AssemblerError::SyntaxError {
                    column: 0,
                    message: "expected operand after ','".to_string(),
                })
            }
        };
        operands.push(operand);
    }

    Ok(operands)
}

fn build(
    name: &str,
    operands: Vec<ParsedOperand>,
    mode: Mode,
    loc_db: &mut LocationDb,
) -> Result<Instruction> {
    let mnemonic = Mnemonic::from_name(canonical_name(name), mode)
        .ok_or_else(|| AssemblerError::UnknownInstruction(name.to_string()))?;
    let invalid = |message: &str| AssemblerError::InvalidOperands {
        mnemonic: name.to_string(),
        message: message.to_string(),
    };

    let (mnemonic, operands) = match (mnemonic, operands.as_slice()) {
        (Mnemonic::Ret, [ParsedOperand::Number(n)]) => {
            (Mnemonic::RetImm, vec![immediate(*n, 16)?])
        }
        (m, []) if takes_no_operands(m) => (m, vec![]),
        (m, _) if takes_no_operands(m) => return Err(invalid("takes no operands")),

        (Mnemonic::Int, [ParsedOperand::Number(n)]) => (Mnemonic::Int, vec![immediate(*n, 8)?]),

        (m @ (Mnemonic::Inc | Mnemonic::Dec | Mnemonic::Pop | Mnemonic::Push),
            [ParsedOperand::Register(reg)]) => {
            (m, vec![Operand::Register(check_register(*reg, mode)?)])
        }
        (Mnemonic::Push, [ParsedOperand::Number(n)]) => {
            (Mnemonic::Push, vec![immediate(*n, mode.bits())?])
        }
        (Mnemonic::Mov, [ParsedOperand::Register(reg), ParsedOperand::Number(n)]) => (
            Mnemonic::Mov,
            vec![
                Operand::Register(check_register(*reg, mode)?),
                immediate(*n, mode.bits())?,
            ],
        ),

        (m, [ParsedOperand::Number(n)]) if m.is_control_flow() => {
            (m, vec![immediate(*n, mode.bits())?])
        }
        (m, [ParsedOperand::Name(label)]) if m.is_control_flow() => {
            (m, vec![Operand::LocationRef(loc_db.get_or_create_name_location(label))])
        }

        (Mnemonic::Int, _) => return Err(invalid("expected an 8-bit immediate")),
        (Mnemonic::Mov, _) => return Err(invalid("expected a register and an immediate")),
        (Mnemonic::Push, _) => return Err(invalid("expected a register or an immediate")),
        (m, _) if m.is_control_flow() => return Err(invalid("expected a destination")),
        _ => return Err(invalid("expected a register")),
    };

    Ok(Instruction::new(mnemonic, operands, mode))
}

fn takes_no_operands(mnemonic: Mnemonic) -> bool {
    matches!(
        mnemonic,
        Mnemonic::Nop
            | Mnemonic::Ret
            | Mnemonic::Leave
            | Mnemonic::Int3
            | Mnemonic::Hlt
            | Mnemonic::Clc
            | Mnemonic::Stc
            | Mnemonic::Cli
            | Mnemonic::Sti
            | Mnemonic::Cld
            | Mnemonic::Std
    )
}

/// Registers must match the mode's operand size
fn check_register(reg: Register, mode: Mode) -> Result<Register> {
    if reg.size() == mode.bits() {
        Ok(reg)
    } else {
        Err(AssemblerError::InvalidRegister(format!(
            "{} is not available in {} mode",
            reg, mode
        )))
    }
}

/// Immediate of `bits`, accepting unsigned values and negative values that
/// fit the signed range
fn immediate(value: i128, bits: u8) -> Result<Operand> {
    let fits = if value < 0 {
        value >= i64::MIN as i128 && fits_signed(value as i64, bits)
    } else {
        value <= width_mask(bits) as i128
    };
    if !fits {
        return Err(AssemblerError::InvalidImmediate(format!(
            "{} does not fit in {} bits",
            value, bits
        )));
    }
    Ok(Operand::imm(value as u64, bits))
}

/// Parse register name (upper case)
pub fn parse_register(name: &str) -> Result<Register> {
    Register::from_name(name.trim()).ok_or_else(|| AssemblerError::InvalidRegister(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use r2m2_core::Cond;

    fn parse32(text: &str) -> Result<Instruction> {
        parse_instruction(text, Mode::Bits32, &mut LocationDb::new())
    }

    #[test]
    fn test_parse_nop() {
        let instr = parse32("NOP").unwrap();
        assert_eq!(instr.mnemonic, Mnemonic::Nop);
        assert!(instr.operands.is_empty());
    }

    #[test]
    fn test_parse_mov() {
        let instr = parse32("MOV EAX, 0x1").unwrap();
        assert_eq!(
            instr.operands,
            vec![Operand::Register(Register::Eax), Operand::imm(1, 32)]
        );
    }

    #[test]
    fn test_parse_ret_forms() {
        assert_eq!(parse32("RET").unwrap().mnemonic, Mnemonic::Ret);
        let instr = parse32("RET 0x8").unwrap();
        assert_eq!(instr.mnemonic, Mnemonic::RetImm);
        assert_eq!(instr.operands, vec![Operand::imm(8, 16)]);
    }

    #[test]
    fn test_parse_alias() {
        let instr = parse32("JE 0x10").unwrap();
        assert_eq!(instr.mnemonic, Mnemonic::Jcc(Cond::Z));
    }

    #[test]
    fn test_parse_negative_immediate() {
        let instr = parse32("PUSH -1").unwrap();
        assert_eq!(instr.operands, vec![Operand::imm(0xFFFF_FFFF, 32)]);
        assert!(parse_instruction("PUSH -0x8001", Mode::Bits16, &mut LocationDb::new()).is_err());
    }

    #[test]
    fn test_parse_label_destination() {
        let mut db = LocationDb::new();
        let instr = parse_instruction("CALL HELPER", Mode::Bits32, &mut db).unwrap();
        let key = db.name_location("HELPER").unwrap();
        assert_eq!(instr.operands, vec![Operand::LocationRef(key)]);
    }

    #[test]
    fn test_parse_register_mode_mismatch() {
        assert!(matches!(
            parse32("PUSH AX"),
            Err(AssemblerError::InvalidRegister(_))
        ));
        assert!(parse_instruction("PUSH AX", Mode::Bits16, &mut LocationDb::new()).is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse32("FOO"),
            Err(AssemblerError::UnknownInstruction(_))
        ));
        assert!(matches!(
            parse32("NOP EAX"),
            Err(AssemblerError::InvalidOperands { .. })
        ));
        assert!(matches!(
            parse32("INT 0x100"),
            Err(AssemblerError::InvalidImmediate(_))
        ));
        assert!(matches!(
            parse32("MOV EAX 0x1"),
            Err(AssemblerError::SyntaxError { .. })
        ));
        assert!(matches!(
            parse32("MOV EAX,"),
            Err(AssemblerError::SyntaxError { .. })
        ));
        assert!(matches!(parse32(""), Err(AssemblerError::SyntaxError { .. })));
    }

    #[test]
    fn test_parse_register() {
        assert_eq!(parse_register("ESP").unwrap(), Register::Esp);
        assert!(parse_register("R8").is_err());
    }
}
