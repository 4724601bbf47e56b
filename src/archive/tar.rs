use log::debug;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use thiserror::Error;

const BLOCK_SIZE: usize = 512;
const TYPE_OFFSET: usize = 156;
const NAME_OFFSET: usize = 0;
const NAME_SIZE: usize = 100;
const SIZE_OFFSET: usize = 124;
const SIZE_SIZE: usize = 12;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum TarError {
    #[error("archive stream ended mid-entry")]
    TruncatedStream,
    #[error("entry name is not valid UTF-8")]
    InvalidName,
    #[error("entry size field is not octal")]
    InvalidSize,
    #[error("unknown entry type {0:?}")]
    UnknownEntryType(char),
}

/// One member decoded from a package archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TarEntry {
    File { name: String, data: Vec<u8> },
    Directory { name: String },
}

impl TarEntry {
    pub fn name(&self) -> &str {
        match self {
            TarEntry::File { name, .. } | TarEntry::Directory { name } => name,
        }
    }
}

/// Decode a whole TAR stream into its file and directory entries.
///
/// The cursor is consumed eagerly, so memory scales with the total file
/// content of the archive. Entry types with nothing to unpack (links,
/// device nodes, FIFOs, extended headers) are skipped without emitting
/// an entry; an unrecognized type or any truncation fails the whole
/// read, there is no partial recovery.
pub fn read_all<R: Read + Seek>(source: &mut R) -> Result<Vec<TarEntry>, TarError> {
    let mut entries = Vec::new();
    let mut block = [0u8; BLOCK_SIZE];

    loop {
        let count = read_up_to(source, &mut block).map_err(|_| TarError::TruncatedStream)?;
        if count == 0 {
            break;
        }
        if count < BLOCK_SIZE {
            return Err(TarError::TruncatedStream);
        }

        match block[TYPE_OFFSET] {
            // Regular file
            b'0' => {
                let name = read_name(&block)?;
                let size = read_size(&block)?;
                let mut data = vec![0u8; size];
                if size > 0 {
                    let got =
                        read_up_to(source, &mut data).map_err(|_| TarError::TruncatedStream)?;
                    if got < size {
                        return Err(TarError::TruncatedStream);
                    }
                    // Seek to the next block boundary
                    let pad = (BLOCK_SIZE - 1) - ((size + BLOCK_SIZE - 1) % BLOCK_SIZE);
                    if pad > 0 {
                        skip(source, pad)?;
                    }
                }
                entries.push(TarEntry::File { name, data });
            }
            // Directory
            b'5' => {
                let name = read_name(&block)?;
                entries.push(TarEntry::Directory { name });
            }
            // Null block, tolerated as inter-entry or trailing padding
            0 => (),
            // Extended header: skipped as a single block. A header whose
            // own payload exceeds one block is not handled.
            b'x' => skip(source, BLOCK_SIZE)?,
            // Symlink, char/block device, FIFO, reserved, global header:
            // skip the header's payload without emitting an entry
            b'1' | b'2' | b'3' | b'4' | b'6' | b'7' | b'g' => {
                let size = read_size(&block)?;
                let blocks = size.div_ceil(BLOCK_SIZE).max(1);
                debug!(
                    "Skipping {blocks} block(s) of entry type '{}'",
                    block[TYPE_OFFSET] as char
                );
                skip(source, blocks * BLOCK_SIZE)?;
            }
            other => return Err(TarError::UnknownEntryType(other as char)),
        }
    }

    Ok(entries)
}

/// Fill as much of `buf` as the source still has, tolerating short
/// `read` calls. Returns the number of bytes actually read.
fn read_up_to<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn skip<R: Seek>(source: &mut R, amount: usize) -> Result<(), TarError> {
    source
        .seek(SeekFrom::Current(amount as i64))
        .map_err(|_| TarError::TruncatedStream)?;
    Ok(())
}

fn read_name(block: &[u8; BLOCK_SIZE]) -> Result<String, TarError> {
    let field = &block[NAME_OFFSET..NAME_OFFSET + NAME_SIZE];
    let len = field.iter().position(|&b| b == 0).unwrap_or(NAME_SIZE);
    std::str::from_utf8(&field[..len])
        .map(str::to_string)
        .map_err(|_| TarError::InvalidName)
}

fn read_size(block: &[u8; BLOCK_SIZE]) -> Result<usize, TarError> {
    let field = &block[SIZE_OFFSET..SIZE_OFFSET + SIZE_SIZE];
    let len = field
        .iter()
        .position(|&b| b == 0 || b == b' ')
        .unwrap_or(SIZE_SIZE);
    let text = std::str::from_utf8(&field[..len]).map_err(|_| TarError::InvalidSize)?;
    usize::from_str_radix(text, 8).map_err(|_| TarError::InvalidSize)
}
