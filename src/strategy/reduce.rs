// Token reducer: the quoted-field state machine
//
// Scanning is chunk-parallel, but a quote byte opens or closes a field
// depending on everything before it, so reduction is strictly sequential.
// The state below is exactly what a single-pass parser would carry on its
// stack, made explicit so it can be threaded across region boundaries:
// token streams are consumed in region order and the machine never notices
// where one worker's window ended and the next began.
//
// Quote handling:
//   - start_quote_count counts the contiguous quote run at the head of the
//     current cell. Odd run: the cell is quoted. Even run: it is not.
//   - end_quote_count counts the most recent quote run elsewhere in the
//     cell. For a quoted cell, an even trailing run (as in a doubled ""
//     escape) leaves the field open; an odd run closes it.
//   - Runs are tracked through offset adjacency, so quote bytes separated
//     by any content reset the trailing run.

use crate::core::index::{Cell, CellIndex};
use crate::core::token::{Token, TokenKind, TokenStream};

/// Sequential reducer folding token streams into a cell index.
#[derive(Debug)]
pub struct Reducer {
    index: CellIndex,
    prev: Option<Token>,
    is_quoted: bool,
    cell_start: u32,
    rows_done: u32,
    start_quote_count: u32,
    end_quote_count: u32,
    is_start_of_cell: bool,
    keep_running: bool,
    columns_sealed: bool,
    trailing_cell: bool,
}

impl Reducer {
    pub fn new() -> Self {
        Reducer {
            index: CellIndex::with_initial_geometry(),
            prev: None,
            is_quoted: false,
            cell_start: 0,
            rows_done: 0,
            start_quote_count: 0,
            end_quote_count: 0,
            is_start_of_cell: true,
            keep_running: true,
            columns_sealed: false,
            trailing_cell: false,
        }
    }

    /// Fold one worker's stream into the index. Streams must arrive in
    /// region order. Returns early once a terminal cell has been emitted.
    pub fn consume(&mut self, stream: &TokenStream) {
        for &token in stream.tokens() {
            if !self.keep_running {
                return;
            }
            self.step(token);
        }
    }

    /// Close the index. If no terminal Null was ever seen (a file whose
    /// logical size is exactly stride-aligned produces none), apply the
    /// terminal rule at logical end-of-file so an unterminated final cell
    /// is not lost.
    pub fn finish(mut self, logical_size: u32) -> CellIndex {
        if self.keep_running {
            self.step(Token { kind: TokenKind::Null, offset: logical_size });
        }
        let rows = self.rows_done + u32::from(self.trailing_cell);
        self.index.finalize(rows);
        self.index
    }

    fn step(&mut self, token: Token) {
        let adjacent = self.prev.is_some_and(|p| p.offset + 1 == token.offset);
        let prev_quote = matches!(self.prev, Some(Token { kind: TokenKind::Quote, .. }));

        match token.kind {
            TokenKind::Quote => {
                // The head run is contiguous from cell_start; a quote at
                // exactly the next position extends it.
                if self.is_start_of_cell && token.offset == self.cell_start + self.start_quote_count
                {
                    self.start_quote_count += 1;
                } else {
                    self.is_start_of_cell = false;
                    if !adjacent || !prev_quote {
                        self.end_quote_count = 0;
                    }
                    self.end_quote_count += 1;
                }
            }
            kind => {
                self.is_start_of_cell = false;

                // Re-derive quotedness from the head run parity; a trailing
                // quote run can close the field (odd) or be escapes (even).
                self.is_quoted = self.start_quote_count % 2 == 1;
                if prev_quote && self.is_quoted && self.end_quote_count > 0 {
                    self.is_quoted = self.end_quote_count % 2 == 0;
                }
                self.end_quote_count = 0;

                if kind == TokenKind::Null {
                    // A file ending in a row terminator has no trailing
                    // empty cell; anything else still owes one.
                    let after_row =
                        adjacent && matches!(self.prev, Some(Token { kind: TokenKind::Row, .. }));
                    if !after_row {
                        self.emit(token.offset);
                        self.trailing_cell = true;
                    }
                    if !self.columns_sealed {
                        self.seal();
                    }
                    self.keep_running = false;
                } else if !self.is_quoted {
                    // Unquoted delimiter or row terminator closes the cell
                    self.emit(token.offset);
                    self.is_start_of_cell = true;
                    self.start_quote_count = 0;
                    self.cell_start = token.offset + 1;
                    if kind == TokenKind::Row {
                        if !self.columns_sealed {
                            self.seal();
                        }
                        self.rows_done += 1;
                    }
                }
                // Quoted delimiter or row terminator: body, not structure
            }
        }

        self.prev = Some(token);
    }

    #[inline]
    fn emit(&mut self, end: u32) {
        self.index.push(Cell { start: self.cell_start, end });
    }

    fn seal(&mut self) {
        self.index.seal_columns();
        self.columns_sealed = true;
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}
