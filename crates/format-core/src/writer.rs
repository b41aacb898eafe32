//! Serialization of a property table to the seaside wire format.
//!
//! Byte layout:
//!
//! ```text
//! offset 0..7   : ASCII "seaside"
//! offset 7      : 0x00
//! offset 8..12  : producer version, [patch_lo, patch_hi, minor, major]
//! offset 12..   : records: 4-byte LE identifier, then the bare payload
//! ```
//!
//! Records carry no length prefix and no type tag; the consumer must hold
//! the same schema the producer validated against. Records appear in the
//! table's insertion order.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ident::PropertyId;
use crate::table::PropertyTable;
use crate::value::{PackedVersion, PropertyValue};

/// Fixed magic tag opening every file.
pub const MAGIC: [u8; 7] = *b"seaside";

/// Total header length: magic, NUL separator, packed version.
pub const HEADER_LEN: usize = 12;

/// Error while emitting an encoded buffer to disk.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The output path already exists; nothing was written.
    #[error("output path already exists: {0}")]
    PathAlreadyExists(PathBuf),
    /// An underlying create/write error.
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
}

/// Appends the 12-byte file header to `buf`.
pub fn write_header(buf: &mut Vec<u8>, version: PackedVersion) {
    buf.extend_from_slice(&MAGIC);
    buf.push(0x00);
    buf.extend_from_slice(&version.to_bytes());
}

/// Appends one record: the identifier as 4 little-endian bytes, then the
/// payload verbatim.
pub fn write_record(buf: &mut Vec<u8>, id: PropertyId, value: &PropertyValue) {
    buf.extend_from_slice(&id.as_u32().to_le_bytes());
    value.write_to(buf);
}

/// Serializes the whole table: header first, then one record per entry in
/// insertion order.
#[must_use]
pub fn encode(table: &PropertyTable, version: PackedVersion) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + 4 * table.len() + table.payload_len());
    write_header(&mut buf, version);
    for (id, value) in table.iter() {
        write_record(&mut buf, id, value);
    }
    buf
}

/// Writes `bytes` to a newly created file at `path`.
///
/// The file is created exclusively: an existing file at `path` aborts the
/// operation before any write and is left untouched. The whole buffer goes
/// out in a single write and the handle is closed on every exit path.
///
/// # Errors
///
/// Returns [`EmitError::PathAlreadyExists`] if `path` exists, or
/// [`EmitError::Io`] for any other create/write failure.
pub fn emit_to_new_file(path: &Path, bytes: &[u8]) -> Result<(), EmitError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|error| {
            if error.kind() == io::ErrorKind::AlreadyExists {
                EmitError::PathAlreadyExists(path.to_path_buf())
            } else {
                EmitError::Io(error)
            }
        })?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}


#[cfg(test)]
mod emit_tests {
    use super::{emit_to_new_file, EmitError};

    #[test]
    fn refuses_existing_path_and_preserves_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.bin");
        std::fs::write(&path, b"keep me").unwrap();

        let result = emit_to_new_file(&path, b"new content");
        assert!(matches!(result, Err(EmitError::PathAlreadyExists(_))));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
    }

    #[test]
    fn writes_fresh_file_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.bin");

        emit_to_new_file(&path, &[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), [0x01, 0x02, 0x03]);
    }

    #[test]
    fn missing_parent_directory_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.bin");

        let result = emit_to_new_file(&path, &[0x00]);
        assert!(matches!(result, Err(EmitError::Io(_))));
    }
}
