//! # Lexer for r2m2 Assembly Text
//!
//! Operates on normalized (upper-case) text; hex digits may be either case.

use logos::Logos;

/// Tokens for one line of assembly
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")] // Skip whitespace
pub enum Token {
    /// Mnemonics, registers and labels
    #[regex(r"[A-Za-z_.$][A-Za-z0-9_.$]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Decimal number
    #[regex(r"[0-9]+", |lex| lex.slice().parse().ok())]
    Number(u64),

    /// Hexadecimal number
    #[regex(r"0x[0-9a-fA-F]+", |lex| u64::from_str_radix(&lex.slice()[2..], 16).ok())]
    Hex(u64),

    /// Negation of the following number
    #[token("-")]
    Minus,

    /// Operand separator
    #[token(",")]
    Comma,

    /// Label terminator
    #[token(":")]
    Colon,
}
