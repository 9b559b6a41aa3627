//! # Bounded Output Slots
//!
//! Fixed-capacity values the bridges return to the host layer. Every write
//! checks its length first; nothing here can grow past `N` bytes.
//!
//! Two capacity classes exist:
//! - payload slots ([`ASM_BUF_SIZE`] bytes) for text, hex dumps and encodings
//! - name slots ([`NAME_BUF_SIZE`] bytes including the C terminator)
//!
//! Overflow policy is chosen by the caller:
//! [`FixedStr::write_or_replace`], [`FixedStr::write_truncated`] or a plain
//! refusal through [`FixedBuf::try_write`].

use std::fmt;
use thiserror::Error;

/// Payload capacity of the text, hex and byte slots
pub const ASM_BUF_SIZE: usize = 256;

/// Size of a name slot, C terminator included
pub const NAME_BUF_SIZE: usize = 32;

/// Name slot replacement when the value does not fit
pub const NAME_TOO_LONG: &str = "/!\\ buffer too long /!\\";

/// Decode text replacement when the formatted instruction does not fit
pub const TEXT_TOO_LONG: &str = "/!\\ Disassembled instruction is too long /!\\";

/// Decode text when the bytes cannot be decoded
pub const CANNOT_DISASSEMBLE: &str = "/!\\ cannot disassemble /!\\";

/// Bytes reported consumed when decoding fails.
///
/// Not derived from the input; kept so a host always makes forward progress.
pub const DECODE_FALLBACK_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value of {len} bytes exceeds slot capacity of {capacity} bytes")]
pub struct Overflow {
    pub len: usize,
    pub capacity: usize,
}

/// Fixed-capacity byte slot
#[derive(Clone, Copy)]
pub struct FixedBuf<const N: usize> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> FixedBuf<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Self {
            data: [0; N],
            len: 0,
        }
    }

    /// Replace the contents, refusing values longer than `N`.
    ///
    /// On overflow the slot is left untouched.
    pub fn try_write(&mut self, value: &[u8]) -> Result<(), Overflow> {
        if value.len() > N {
            return Err(Overflow {
                len: value.len(),
                capacity: N,
            });
        }
        self.data[..value.len()].copy_from_slice(value);
        self.len = value.len();
        Ok(())
    }

    /// Replace the contents with at most `N` leading bytes of `value`
    pub fn write_truncated(&mut self, value: &[u8]) -> usize {
        let len = value.len().min(N);
        self.data[..len].copy_from_slice(&value[..len]);
        self.len = len;
        len
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for FixedBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for FixedBuf<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for FixedBuf<N> {}

impl<const N: usize> fmt::Debug for FixedBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedBuf")
            .field("capacity", &N)
            .field("bytes", &self.as_bytes())
            .finish()
    }
}

/// Fixed-capacity UTF-8 slot
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedStr<const N: usize>(FixedBuf<N>);

impl<const N: usize> FixedStr<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Self(FixedBuf::new())
    }

    /// Replace the contents, refusing values longer than `N`
    pub fn try_write(&mut self, value: &str) -> Result<(), Overflow> {
        self.0.try_write(value.as_bytes())
    }

    /// Write `value`, or `replacement` if `value` does not fit.
    ///
    /// Returns `true` when the replacement was used. `replacement` must fit.
    pub fn write_or_replace(&mut self, value: &str, replacement: &'static str) -> bool {
        match self.try_write(value) {
            Ok(()) => false,
            Err(_) => {
                debug_assert!(replacement.len() <= N);
                self.0.write_truncated(replacement.as_bytes());
                true
            }
        }
    }

    /// Write at most `N` bytes of `value`, cut on a char boundary
    pub fn write_truncated(&mut self, value: &str) -> usize {
        let mut end = value.len().min(N);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        self.0.write_truncated(&value.as_bytes()[..end])
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.0.as_bytes()).unwrap_or("")
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disassembly text slot
pub type AsmText = FixedStr<ASM_BUF_SIZE>;

/// Hex dump slot
pub type HexText = FixedStr<ASM_BUF_SIZE>;

/// Encoded bytes slot
pub type AsmBytes = FixedBuf<ASM_BUF_SIZE>;

/// Name slot (payload only, the terminator is added by the host copy)
pub type NameText = FixedStr<{ NAME_BUF_SIZE - 1 }>;

/// Store a name with the short-slot policy
pub fn write_name(slot: &mut NameText, value: &str) -> bool {
    slot.write_or_replace(value, NAME_TOO_LONG)
}
