// Paged reader: drives one scanner across a file region
//
// Each job owns its file handle and its page buffer; workers share nothing
// during the scan phase. The buffer carries one extra guard byte that stays
// zero. Reads that come up short (the stored file size is aligned upward,
// so the last region extends past logical end-of-file) leave a zeroed
// remainder, which the scanner turns into the terminal Null token.

use std::path::Path;

use tracing::{debug, warn};

use crate::core::scanner::Scanner;
use crate::core::token::TokenStream;
use crate::platform;

/// One worker's slice of a parse: a contiguous file region plus the
/// structural bytes and the scanner that walks it.
#[derive(Debug, Clone, Copy)]
pub struct ScanJob {
    pub file_offset: u64,
    pub bytes_to_read: u64,
    pub delim: u8,
    pub quote: u8,
    pub row: u8,
    pub scanner: Scanner,
}

impl ScanJob {
    /// Scan the region in page-sized reads and return the token stream.
    ///
    /// I/O failures degrade: the stream collected so far is returned and
    /// the failure is reported on the diagnostic channel.
    pub fn run(&self, path: &Path) -> TokenStream {
        let mut stream = TokenStream::new();

        let page = platform::page_size();
        let mut file = match platform::open_read(path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "worker open failed");
                return stream;
            }
        };
        if let Err(err) = platform::seek(&mut file, self.file_offset) {
            warn!(offset = self.file_offset, error = %err, "worker seek failed");
            return stream;
        }

        // Page buffer plus one guard byte; the guard stays zero.
        let mut buf = vec![0u8; page + 1];
        let mut offset = self.file_offset;

        let full_pages = self.bytes_to_read as usize / page;
        let tail_len = self.bytes_to_read as usize % page;

        for _ in 0..full_pages {
            match platform::read_full(&mut file, &mut buf[..page]) {
                Ok(read) if read < page => {
                    debug!(offset, read, want = page, "short page read; tail zeroed");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(offset, error = %err, "worker read failed");
                    return stream;
                }
            }
            self.scanner
                .scan(&buf[..page], offset as u32, self.delim, self.quote, self.row, &mut stream);
            offset += page as u64;
        }

        if tail_len > 0 {
            match platform::read_full(&mut file, &mut buf[..tail_len]) {
                Ok(read) if read < tail_len => {
                    debug!(offset, read, want = tail_len, "short tail read; tail zeroed");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(offset, error = %err, "worker read failed");
                    return stream;
                }
            }
            buf[tail_len] = 0;
            self.scanner
                .scan(&buf[..tail_len], offset as u32, self.delim, self.quote, self.row, &mut stream);
        }

        stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token::{Token, TokenKind};
    use std::path::PathBuf;

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cellscan_paged_{}_{}", name, std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn job(offset: u64, len: u64) -> ScanJob {
        ScanJob {
            file_offset: offset,
            bytes_to_read: len,
            delim: b',',
            quote: b'"',
            row: b'\n',
            scanner: Scanner::Scalar,
        }
    }

    #[test]
    fn test_short_read_emits_terminal_null() {
        let path = temp_file("short", b"a,b\n");
        // Region extends past logical EOF, as aligned sizes do
        let stream = job(0, 32).run(&path);

        assert_eq!(
            stream.tokens(),
            &[
                Token { kind: TokenKind::Delim, offset: 1 },
                Token { kind: TokenKind::Row, offset: 3 },
                Token { kind: TokenKind::Null, offset: 4 },
            ]
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_region_offsets_are_absolute() {
        let mut bytes = vec![b'x'; 64];
        bytes[40] = b',';
        let path = temp_file("absolute", &bytes);

        let stream = job(32, 32).run(&path);
        // Region read exactly to EOF: no zero byte inside the window
        assert_eq!(stream.tokens(), &[Token { kind: TokenKind::Delim, offset: 40 }]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_multi_page_region() {
        let page = platform::page_size();
        let mut bytes = vec![b'x'; page + 100];
        bytes[page - 1] = b',';
        bytes[page] = b'\n';
        bytes[page + 99] = b'\n';
        let len = bytes.len() as u64;
        let path = temp_file("multipage", &bytes);

        let stream = job(0, len.div_ceil(32) * 32).run(&path);
        let tokens = stream.tokens();
        assert_eq!(tokens[0], Token { kind: TokenKind::Delim, offset: page as u32 - 1 });
        assert_eq!(tokens[1], Token { kind: TokenKind::Row, offset: page as u32 });
        assert_eq!(tokens[2], Token { kind: TokenKind::Row, offset: page as u32 + 99 });
        assert_eq!(tokens[3].kind, TokenKind::Null);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_returns_empty_stream() {
        let path = PathBuf::from("/definitely/not/here.csv");
        let stream = job(0, 32).run(&path);
        assert!(stream.is_empty());
    }
}
