// Scan-and-stitch strategies

pub mod paged;
pub mod parallel;
pub mod reduce;

pub use paged::ScanJob;
pub use parallel::{scan_file, split_regions, thread_count_for};
pub use reduce::Reducer;
