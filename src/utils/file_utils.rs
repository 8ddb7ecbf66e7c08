use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

/// Read a binary file using memory mapping.
///
/// Large acquisitions are never loaded into RAM as a whole. Empty files are
/// returned as `None` since a zero-length mapping is not portable.
pub fn read_binary_file_mmap(path: impl AsRef<Path>) -> io::Result<Option<Mmap>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    debug!(path = %path.display(), bytes = len, "mapping acquisition file");
    if len == 0 {
        return Ok(None);
    }
    // Safety: acquisition files are written once and not modified while mapped
    unsafe { Mmap::map(&file) }.map(Some)
}
