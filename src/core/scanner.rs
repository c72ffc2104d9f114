// Scanner selection and the scalar reference scanner
//
// A scanner appends one token per structural byte in its window, in
// ascending offset order, and returns immediately after appending a Null
// for a zero byte. Quote semantics are not applied here; the reducer owns
// them.

use crate::core::simd_scanner::{scan_v16, scan_v32};
use crate::core::token::{TokenKind, TokenStream};

/// Which scan implementation drives a parse. Chosen once per parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scanner {
    /// Byte-at-a-time comparisons.
    Scalar,
    /// 16-lane vector compares.
    V16,
    /// 32-lane vector compares.
    V32,
}

impl Scanner {
    /// Scan `window`, whose first byte sits at absolute offset `base`.
    #[inline]
    pub fn scan(
        self,
        window: &[u8],
        base: u32,
        delim: u8,
        quote: u8,
        row: u8,
        out: &mut TokenStream,
    ) {
        match self {
            Scanner::Scalar => scan_scalar(window, base, delim, quote, row, out),
            Scanner::V16 => scan_v16(window, base, delim, quote, row, out),
            Scanner::V32 => scan_v32(window, base, delim, quote, row, out),
        }
    }
}

/// Classify one byte against the structural set. The zero byte is reserved
/// for end-of-input; delimiter, quote, and row bytes must be nonzero.
#[inline]
pub(crate) fn classify(byte: u8, delim: u8, quote: u8, row: u8) -> Option<TokenKind> {
    if byte == delim {
        Some(TokenKind::Delim)
    } else if byte == quote {
        Some(TokenKind::Quote)
    } else if byte == row {
        Some(TokenKind::Row)
    } else if byte == 0 {
        Some(TokenKind::Null)
    } else {
        None
    }
}

/// Scalar scanner: compare every byte in the window.
pub fn scan_scalar(
    window: &[u8],
    base: u32,
    delim: u8,
    quote: u8,
    row: u8,
    out: &mut TokenStream,
) {
    for (i, &byte) in window.iter().enumerate() {
        match classify(byte, delim, quote, row) {
            Some(TokenKind::Null) => {
                out.push(TokenKind::Null, base + i as u32);
                return;
            }
            Some(kind) => out.push(kind, base + i as u32),
            None => {}
        }
    }
}
