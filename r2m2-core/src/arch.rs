//! # Machine Registry
//!
//! The set of machines r2m2 can translate for, and the resolved
//! [`ArchitectureContext`] the decode/encode bridges run against.
//!
//! Machine names are matched case-sensitively (`x86_32`, not `X86_32`).

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processor mode (operand and address size)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// 16-bit operands and addresses
    Bits16 = 16,
    /// 32-bit operands and addresses
    Bits32 = 32,
}

impl Mode {
    /// Width in bits
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Width in bytes of a full-size immediate or near displacement
    #[inline]
    pub const fn bytes(self) -> usize {
        self as usize / 8
    }

    /// All ones for the mode width
    #[inline]
    pub const fn mask(self) -> u64 {
        crate::encoding::width_mask(self as u8)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Registered machines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    /// x86 real/16-bit protected mode subset
    X86_16,
    /// x86 32-bit protected mode subset
    X86_32,
}

impl Arch {
    /// Every registered machine, in listing order
    pub const ALL: [Arch; 2] = [Arch::X86_16, Arch::X86_32];

    /// Registered name
    pub const fn name(self) -> &'static str {
        match self {
            Arch::X86_16 => "x86_16",
            Arch::X86_32 => "x86_32",
        }
    }

    /// Mode the machine decodes and encodes in
    pub const fn mode(self) -> Mode {
        match self {
            Arch::X86_16 => Mode::Bits16,
            Arch::X86_32 => Mode::Bits32,
        }
    }

    /// Look up a machine by its exact registered name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|arch| arch.name() == name)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names of every registered machine
pub fn available_machines() -> Vec<&'static str> {
    Arch::ALL.iter().map(|arch| arch.name()).collect()
}

/// A resolved machine/mode pair.
///
/// Immutable once built. Process-wide caching is the job of the host layer;
/// the bridges only ever borrow a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchitectureContext {
    arch: Arch,
    mode: Mode,
}

impl ArchitectureContext {
    /// Build a context for a known machine
    pub const fn new(arch: Arch) -> Self {
        Self {
            arch,
            mode: arch.mode(),
        }
    }

    /// Resolve an external selector value into a context.
    ///
    /// `None` and the empty string mean nothing was selected.
    pub fn resolve(selector: Option<&str>) -> Result<Self, CoreError> {
        let available = available_machines().join(", ");
        match selector {
            None | Some("") => Err(CoreError::NoArchSelected { available }),
            Some(name) => Arch::from_name(name)
                .map(Self::new)
                .ok_or_else(|| CoreError::UnknownArch {
                    name: name.to_string(),
                    available,
                }),
        }
    }

    #[inline]
    pub const fn arch(&self) -> Arch {
        self.arch
    }

    #[inline]
    pub const fn mode(&self) -> Mode {
        self.mode
    }
}

impl fmt::Display for ArchitectureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.arch, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known() {
        let ctx = ArchitectureContext::resolve(Some("x86_32")).unwrap();
        assert_eq!(ctx.arch(), Arch::X86_32);
        assert_eq!(ctx.mode(), Mode::Bits32);

        let ctx = ArchitectureContext::resolve(Some("x86_16")).unwrap();
        assert_eq!(ctx.mode().bits(), 16);
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let err = ArchitectureContext::resolve(Some("X86_32")).unwrap_err();
        assert!(matches!(err, CoreError::UnknownArch { .. }));
    }

    #[test]
    fn test_resolve_unset() {
        assert!(matches!(
            ArchitectureContext::resolve(None),
            Err(CoreError::NoArchSelected { .. })
        ));
        assert!(matches!(
            ArchitectureContext::resolve(Some("")),
            Err(CoreError::NoArchSelected { .. })
        ));
    }

    #[test]
    fn test_error_lists_machines() {
        let err = ArchitectureContext::resolve(Some("mips32b")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("mips32b"));
        assert!(message.contains("x86_16, x86_32"));
    }

    #[test]
    fn test_mode_widths() {
        assert_eq!(Mode::Bits16.bytes(), 2);
        assert_eq!(Mode::Bits32.bytes(), 4);
        assert_eq!(Mode::Bits16.mask(), 0xFFFF);
        assert_eq!(Mode::Bits32.mask(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_display() {
        let ctx = ArchitectureContext::new(Arch::X86_16);
        assert_eq!(ctx.to_string(), "x86_16 (16-bit)");
    }
}
