// Public parser handle
//
// Lifecycle: creation probes the file for its size only; no buffer is
// retained. A parse call scans, reduces, and replaces the handle's cell
// index. The handle is write-once, read-many on the produced index; the
// file bytes themselves are never kept in memory.
//
// The contract is best-effort with observable state on the handle: a path
// that cannot be sized yields an inert handle (size 0, parse is a no-op),
// and failures during a parse degrade to a truncated index, reported on
// the diagnostic channel.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::index::{Cell, CellIndex};
use crate::core::scanner::Scanner;
use crate::strategy::parallel::scan_file;
use crate::strategy::reduce::Reducer;

/// Stored file sizes are rounded up to a multiple of this, so scanners can
/// stride in 16- or 32-byte steps without tail handling.
const SIZE_ALIGN: u64 = 32;

#[inline]
fn align_size(n: u64) -> u64 {
    n.div_ceil(SIZE_ALIGN) * SIZE_ALIGN
}

/// Handle over one CSV file and the cell index produced from it.
///
/// Cell `k` of row `r`, column `c` sits at `r * column_count + c` when the
/// file is rectangular; ragged files expose the raw cell stream and the
/// positional accessor is not meaningful for them.
#[derive(Debug)]
pub struct Parser {
    path: PathBuf,
    file_size: u64,
    logical_size: u64,
    index: CellIndex,
}

impl Parser {
    /// Probe `path` for its size and build a handle. A path that cannot be
    /// sized yields a handle with `file_size() == 0` on which every parse
    /// call is a no-op.
    pub fn create(path: impl AsRef<Path>) -> Parser {
        let path = path.as_ref().to_path_buf();
        let (file_size, logical_size) = match crate::platform::stat_size(&path) {
            Ok(size) => (align_size(size), size),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "stat failed; handle is inert");
                (0, 0)
            }
        };
        Parser {
            path,
            file_size,
            logical_size,
            index: CellIndex::default(),
        }
    }

    /// Single worker, scalar scanner.
    pub fn parse_slow(&mut self, delim: u8, quote: u8, row: u8) {
        self.parse_with(Scanner::Scalar, false, delim, quote, row);
    }

    /// Worker per region, scalar scanner.
    pub fn parse_threaded_slow(&mut self, delim: u8, quote: u8, row: u8) {
        self.parse_with(Scanner::Scalar, true, delim, quote, row);
    }

    /// Worker per region, 16-lane scanner.
    pub fn parse_threaded_v16(&mut self, delim: u8, quote: u8, row: u8) {
        self.parse_with(Scanner::V16, true, delim, quote, row);
    }

    /// Worker per region, 32-lane scanner.
    pub fn parse_threaded_v32(&mut self, delim: u8, quote: u8, row: u8) {
        self.parse_with(Scanner::V32, true, delim, quote, row);
    }

    fn parse_with(&mut self, scanner: Scanner, threaded: bool, delim: u8, quote: u8, row: u8) {
        if self.file_size == 0 {
            return;
        }

        let streams = scan_file(
            &self.path,
            self.file_size,
            threaded,
            scanner,
            delim,
            quote,
            row,
        );

        let mut reducer = Reducer::new();
        for stream in streams {
            reducer.consume(&stream);
            // Stream freed here, before the next region is folded in
        }
        self.index = reducer.finish(self.logical_size as u32);
    }

    /// Aligned file size recorded at creation.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Actual on-disk size recorded at creation.
    pub fn logical_size(&self) -> u64 {
        self.logical_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cell_count(&self) -> usize {
        self.index.len()
    }

    pub fn row_count(&self) -> u32 {
        self.index.row_count()
    }

    pub fn column_count(&self) -> u32 {
        self.index.column_count()
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        self.index.cells()
    }

    /// Positional lookup for rectangular files.
    pub fn cell(&self, row: u32, col: u32) -> Option<Cell> {
        if col >= self.index.column_count() {
            return None;
        }
        let at = row as usize * self.index.column_count() as usize + col as usize;
        self.index.cells().get(at).copied()
    }
}
