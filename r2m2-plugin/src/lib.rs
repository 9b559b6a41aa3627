//! # r2m2 Host Plugin
//!
//! Glue between a disassembly host and the r2m2 decode/encode bridges.
//!
//! - [`R2m2`] caches the selected machine for the life of the process
//! - [`ffi`] exposes the C entry points and the host record layout
//! - the `r2m2` binary drives the same bridges from the command line
//!
//! ## Example
//!
//! ```rust
//! use r2m2_plugin::{PluginConfig, R2m2};
//!
//! let r2m2 = R2m2::with_config(PluginConfig::default().with_arch("x86_32"));
//! let op = r2m2.disassemble(0x1000, &[0x90]).unwrap();
//! assert_eq!(op.buf_asm.as_str(), "NOP");
//! ```

pub mod config;
pub mod error;
pub mod ffi;
pub mod service;

pub use config::PluginConfig;
pub use error::{PluginError, Result};
pub use ffi::{RAsmOp, r2m2_asm, r2m2_dis};
pub use service::R2m2;

/// Parse a hex byte string such as `eb03` or `eb 03`
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let digits = digits
        .strip_prefix(b"0x")
        .unwrap_or(&digits);

    if digits.len() % 2 != 0 {
        return Err(PluginError::InvalidHex("odd number of digits".to_string()));
    }
    digits
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                Ok((hex_value(*hi) << 4) | hex_value(*lo))
            }
            _ => Err(PluginError::InvalidHex(format!(
                "'{}'",
                String::from_utf8_lossy(pair)
            ))),
        })
        .collect()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
