// Platform shim: page size, CPU count, blocking file primitives.
//
// The only module that touches the filesystem.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::OnceLock;

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
static CPU_COUNT: OnceLock<usize> = OnceLock::new();

/// OS page size, probed once and cached. Falls back to 4 KiB when the
/// probe is unavailable or reports nonsense.
pub fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(|| {
        #[cfg(unix)]
        {
            // SAFETY: sysconf has no memory-safety preconditions.
            let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
            if size > 0 {
                return size as usize;
            }
        }
        4096
    })
}

/// Number of logical CPUs, probed once and cached. At least 1.
pub fn cpu_count() -> usize {
    *CPU_COUNT.get_or_init(|| {
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
    })
}

/// Open a file for reading.
pub fn open_read(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Seek to an absolute byte offset.
pub fn seek(file: &mut File, offset: u64) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset)).map(|_| ())
}

/// Read until `buf` is full or the file ends, retrying on interruption.
/// The unread remainder is zero-filled, so a short read surfaces to the
/// scanner as a zeroed tail. Returns the number of bytes actually read.
pub fn read_full(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    if filled < buf.len() {
        buf[filled..].fill(0);
    }
    Ok(filled)
}

/// Size of the file at `path` in bytes.
pub fn stat_size(path: &Path) -> io::Result<u64> {
    std::fs::metadata(path).map(|m| m.len())
}
