// Cell index produced by the reduce phase
//
// Offsets use u32 (4 GB cap, halves memory vs usize on 64-bit).
// Storage grows by doubling the row capacity; the first completed row
// converts the initial over-allocation into a per-row capacity hint.

use tracing::warn;

/// A half-open byte range [start, end) into the source file.
///
/// The payload is the raw file bytes; surrounding quote bytes are left in
/// place for consumers to strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub start: u32,
    pub end: u32,
}

/// Column capacity assumed until the first row terminator seals the real
/// column count.
const INITIAL_COLUMNS: u32 = 256;

/// Contiguous, growable cell store with the row/column accounting the
/// reducer maintains.
#[derive(Debug, Default)]
pub struct CellIndex {
    cells: Vec<Cell>,
    column_count: u32,
    row_count: u32,
    dropped: usize,
}

impl CellIndex {
    /// Index primed with the initial 256 x 1 geometry, ready for reduction.
    pub fn with_initial_geometry() -> Self {
        let mut cells = Vec::new();
        if cells.try_reserve(INITIAL_COLUMNS as usize).is_err() {
            warn!(capacity = INITIAL_COLUMNS, "cell index allocation failed");
        }
        CellIndex {
            cells,
            column_count: INITIAL_COLUMNS,
            row_count: 1,
            dropped: 0,
        }
    }

    /// Append a cell, doubling the row capacity when the current geometry
    /// is full. Growth failure drops the cell and is counted.
    #[inline]
    pub(crate) fn push(&mut self, cell: Cell) {
        let capacity = self.column_count as usize * self.row_count as usize;
        if self.cells.len() >= capacity {
            self.row_count = (self.row_count * 2).max(1);
            let target = self.column_count as usize * self.row_count as usize;
            if let Err(err) = self
                .cells
                .try_reserve(target.saturating_sub(self.cells.len()))
            {
                if self.dropped == 0 {
                    warn!(
                        len = self.cells.len(),
                        error = %err,
                        "cell index growth failed; dropping cells"
                    );
                }
                self.dropped += 1;
                return;
            }
        }
        self.cells.push(cell);
    }

    /// Seal the column count at the current cell count (the first row just
    /// closed) and rescale the row capacity so the initial allocation is
    /// reinterpreted as a number of rows.
    pub(crate) fn seal_columns(&mut self) {
        let previous_columns = self.column_count;
        self.column_count = (self.cells.len() as u32).max(1);
        self.row_count = (previous_columns / self.column_count).max(1);
    }

    /// Replace the capacity-oriented row count with the number of rows the
    /// reducer actually observed.
    pub(crate) fn finalize(&mut self, rows: u32) {
        self.row_count = rows;
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    #[inline]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Number of cells lost to failed growth.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_geometry() {
        let index = CellIndex::default();
        assert_eq!(index.len(), 0);
        assert_eq!(index.column_count(), 0);
        assert_eq!(index.row_count(), 0);
    }

    #[test]
    fn test_seal_rescales_row_capacity() {
        let mut index = CellIndex::with_initial_geometry();
        for i in 0..3u32 {
            index.push(Cell { start: i, end: i + 1 });
        }
        index.seal_columns();

        assert_eq!(index.column_count(), 3);
        // 256-cell initial allocation reinterpreted as 85 rows of 3
        assert_eq!(index.row_count(), 85);
    }

    #[test]
    fn test_seal_with_wide_first_row() {
        let mut index = CellIndex::with_initial_geometry();
        for i in 0..300u32 {
            index.push(Cell { start: i, end: i });
        }
        index.seal_columns();

        assert_eq!(index.column_count(), 300);
        assert_eq!(index.row_count(), 1, "row hint never drops below 1");
    }

    #[test]
    fn test_growth_past_initial_allocation() {
        let mut index = CellIndex::with_initial_geometry();
        for i in 0..2u32 {
            index.push(Cell { start: i, end: i });
        }
        index.seal_columns();

        // 2 columns x 128 row hint = 256 cells; push well past that
        for i in 2..10_000u32 {
            index.push(Cell { start: i, end: i });
        }
        assert_eq!(index.len(), 10_000);
        assert_eq!(index.dropped(), 0);
        assert_eq!(index.cells()[9_999], Cell { start: 9_999, end: 9_999 });
    }

    #[test]
    fn test_finalize_overrides_row_capacity() {
        let mut index = CellIndex::with_initial_geometry();
        index.push(Cell { start: 0, end: 1 });
        index.seal_columns();
        index.finalize(1);
        assert_eq!(index.row_count(), 1);
    }
}
