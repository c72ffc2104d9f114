// Region split and worker orchestration
//
// The file is divided into contiguous, disjoint, covering regions, one per
// worker. Scanning is embarrassingly parallel; reduction is not, because a
// quote opens or closes depending on everything before it. Scan jobs
// therefore run on the pool and are collected in region order, and the
// reducer stitches the streams sequentially afterwards.

use std::path::Path;
use std::sync::OnceLock;

use rayon::prelude::*;

use crate::core::scanner::Scanner;
use crate::core::token::TokenStream;
use crate::platform;
use crate::strategy::paged::ScanJob;

/// Region lengths are rounded up to this, matching the alignment of the
/// stored file size, so vector scanners never straddle a region boundary
/// mid-stride.
pub const REGION_ALIGN: u64 = 32;

static SCAN_POOL: OnceLock<Option<rayon::ThreadPool>> = OnceLock::new();

fn get_pool() -> Option<&'static rayon::ThreadPool> {
    SCAN_POOL
        .get_or_init(|| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(platform::cpu_count())
                .thread_name(|i| format!("cellscan-{i}"))
                .build()
                .ok()
        })
        .as_ref()
}

/// Run a closure on the dedicated scan pool, falling back to the global pool.
fn run_parallel<T: Send, F: FnOnce() -> T + Send>(f: F) -> T {
    match get_pool() {
        Some(pool) => pool.install(f),
        None => f(),
    }
}

#[inline]
fn align_region(n: u64) -> u64 {
    n.div_ceil(REGION_ALIGN) * REGION_ALIGN
}

/// Worker count for a file: bounded by the CPU count and by the number of
/// pages the file spans. At least 1.
pub fn thread_count_for(file_size: u64) -> usize {
    let pages = file_size.div_ceil(platform::page_size() as u64);
    platform::cpu_count().min(pages.max(1) as usize).max(1)
}

/// Split `file_size` bytes into contiguous, disjoint, covering regions of
/// `(offset, length)`. Every length except possibly the last is a multiple
/// of the region alignment; the last is clamped to the file size.
pub fn split_regions(file_size: u64, thread_count: usize) -> Vec<(u64, u64)> {
    let per_worker = align_region(file_size.div_ceil(thread_count.max(1) as u64)).max(REGION_ALIGN);

    let mut regions = Vec::with_capacity(thread_count);
    let mut offset = 0;
    while offset < file_size {
        let len = per_worker.min(file_size - offset);
        regions.push((offset, len));
        offset += len;
    }
    regions
}

/// Scan the whole file and return one token stream per region, in region
/// order. `threaded` selects between a single inline job and the pool.
pub fn scan_file(
    path: &Path,
    file_size: u64,
    threaded: bool,
    scanner: Scanner,
    delim: u8,
    quote: u8,
    row: u8,
) -> Vec<TokenStream> {
    let thread_count = if threaded { thread_count_for(file_size) } else { 1 };

    let jobs: Vec<ScanJob> = split_regions(file_size, thread_count)
        .into_iter()
        .map(|(file_offset, bytes_to_read)| ScanJob {
            file_offset,
            bytes_to_read,
            delim,
            quote,
            row,
            scanner,
        })
        .collect();

    if jobs.len() == 1 {
        return vec![jobs[0].run(path)];
    }

    run_parallel(|| jobs.par_iter().map(|job| job.run(path)).collect())
}
