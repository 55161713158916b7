use std::io::Read;
use std::io::Write;

use pg_utilities::PgError;

use crate::BitStreamReader;
use crate::BitStreamWriter;

/// Magic value identifying a progress-measure bitstream.
pub const MAGIC: u16 = 0x8baf;

/// Current format version.
pub const VERSION: u16 = 0x8306;

/// Writes the canonical `(magic, version)` header.
pub fn write_header<W: Write>(writer: &mut BitStreamWriter<W>) -> Result<(), PgError> {
    writer.write_bits(u64::from(MAGIC), 16)?;
    writer.write_bits(u64::from(VERSION), 16)?;
    Ok(())
}

/// Reads and validates the canonical `(magic, version)` header.
pub fn read_header<R: Read>(reader: &mut BitStreamReader<R>) -> Result<(), PgError> {
    let magic = reader.read_bits(16)? as u16;
    let version = reader.read_bits(16)? as u16;
    if magic != MAGIC || version != VERSION {
        return Err(PgError::VersionMismatch {
            expected_magic: MAGIC,
            expected_version: VERSION,
            found_magic: magic,
            found_version: version,
        });
    }
    Ok(())
}
