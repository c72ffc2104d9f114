// Vectorized structural scanners
//
// ## Stabilization-safe API subset (std::simd)
//
// We use only: Simd::from_slice, splat, simd_eq, to_bitmask, bitwise ops.
// These are the most stable parts of portable_simd. We avoid: swizzle,
// scatter, gather, and any SIMD shuffles.
//
// ## Shape
//
// Per stride: four splat-compares (delimiter, quote, row, zero), OR the
// lane masks into one bitmask. Strides with no matches cost nothing more;
// a stride with matches runs a scalar emission loop that extracts set bits
// in ascending order with trailing_zeros, so token order equals byte order.
// A scalar tail covers windows that are not a multiple of the lane width,
// making the 32-byte size alignment a throughput property rather than a
// requirement.
//
// Both lane widths compile on every target; portable SIMD lowers a 32-lane
// op to two 16-lane ops where the hardware is narrower.

use std::simd::prelude::*;

use crate::core::scanner::{classify, scan_scalar};
use crate::core::token::{TokenKind, TokenStream};

/// Baseline vector width (128-bit).
pub(crate) const CHUNK: usize = 16;

/// Wide vector width (256-bit).
pub(crate) const WIDE: usize = 32;

/// 16-lane scanner.
pub fn scan_v16(window: &[u8], base: u32, delim: u8, quote: u8, row: u8, out: &mut TokenStream) {
    scan_lanes::<CHUNK>(window, base, delim, quote, row, out);
}

/// 32-lane scanner.
pub fn scan_v32(window: &[u8], base: u32, delim: u8, quote: u8, row: u8, out: &mut TokenStream) {
    scan_lanes::<WIDE>(window, base, delim, quote, row, out);
}

fn scan_lanes<const N: usize>(
    window: &[u8],
    base: u32,
    delim: u8,
    quote: u8,
    row: u8,
    out: &mut TokenStream,
) {
    let delim_splat = Simd::<u8, N>::splat(delim);
    let quote_splat = Simd::<u8, N>::splat(quote);
    let row_splat = Simd::<u8, N>::splat(row);
    let zero_splat = Simd::<u8, N>::splat(0);

    let lane_mask: u64 = if N >= 64 { !0 } else { (1u64 << N) - 1 };

    let mut pos = 0;
    while pos + N <= window.len() {
        let chunk = Simd::<u8, N>::from_slice(&window[pos..pos + N]);

        let hits = (chunk.simd_eq(delim_splat)
            | chunk.simd_eq(quote_splat)
            | chunk.simd_eq(row_splat)
            | chunk.simd_eq(zero_splat))
        .to_bitmask()
            & lane_mask;

        // Emission loop runs only for strides that contain a match
        let mut bits = hits;
        while bits != 0 {
            let lane = bits.trailing_zeros() as usize;
            let i = pos + lane;
            match classify(window[i], delim, quote, row) {
                Some(TokenKind::Null) => {
                    out.push(TokenKind::Null, base + i as u32);
                    return;
                }
                Some(kind) => out.push(kind, base + i as u32),
                None => {}
            }
            bits &= bits - 1;
        }

        pos += N;
    }

    scan_scalar(&window[pos..], base + pos as u32, delim, quote, row, out);
}
