#![feature(portable_simd)]
// cellscan - chunk-parallel CSV cell indexing
//
// Engine safety: no unwrap/expect in production code. Fallible paths degrade
// in place and report through tracing.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//
// Pipeline:
//   scan:   the file is split into contiguous regions, one per worker; each
//           worker drives a scalar or vector scanner over page-sized reads,
//           emitting (kind, offset) tokens for structural bytes
//   stitch: a sequential reducer folds the token streams, in region order,
//           into [start, end) cell offsets, carrying quote state across
//           region boundaries
//
// Cells are byte ranges into the source file; no per-cell copies are made.

pub mod core;
pub mod parser;
pub mod platform;
pub mod strategy;

pub use crate::core::index::Cell;
pub use crate::core::scanner::Scanner;
pub use crate::parser::Parser;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
