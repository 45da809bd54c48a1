//! The fixed 15-byte header block and descriptor-table codec (spec §4.3).

use crate::field::FieldDef;
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::fmt;
use std::io::{self, Read, Write};

pub const MAGIC: [u8; 3] = *b"ELD";
pub const MARKER: [u8; 2] = *b"--";
/// Width of the fixed header block, not counting the descriptor table.
pub const HEADER_BLOCK_LEN: u16 = 15;

/// The fixed, fixed-layout record at the start of every ELD file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
  pub header_len: u16,
  pub row_len: u16,
  pub field_desc_len: u8,
  pub field_desc_count: u8,
  pub row_count: u32,
}

impl Header {
  pub fn new() -> Header {
    Header {
      header_len: HEADER_BLOCK_LEN,
      row_len: 0,
      field_desc_len: crate::field::FIELD_DESC_LEN,
      field_desc_count: 0,
      row_count: 0,
    }
  }

  /// Recomputes `header_len` and `row_len` from the current field list
  /// (invariants 1 and 2). Called after every `add_field`.
  pub fn recompute_lengths(&mut self, fields: &[FieldDef]) {
    self.field_desc_count = fields.len() as u8;
    self.header_len =
      HEADER_BLOCK_LEN + self.field_desc_len as u16 * self.field_desc_count as u16;
    self.row_len = fields.iter().map(|f| f.size_bytes()).sum();
    debug!(
      "recomputed header_len={} row_len={} for {} fields",
      self.header_len, self.row_len, self.field_desc_count
    );
  }

  /// Byte offset of row `i` (invariant 4).
  pub fn row_offset(&self, index: u32) -> u64 {
    self.header_len as u64 + self.row_len as u64 * index as u64
  }

  pub(crate) fn encode(&self, out: &mut impl Write) -> io::Result<()> {
    out.write_all(&MAGIC)?;
    out.write_u16::<NativeEndian>(self.header_len)?;
    out.write_u16::<NativeEndian>(self.row_len)?;
    out.write_u8(self.field_desc_len)?;
    out.write_u8(self.field_desc_count)?;
    out.write_u32::<NativeEndian>(self.row_count)?;
    out.write_all(&MARKER)?;
    Ok(())
  }

  pub(crate) fn decode(input: &mut impl Read) -> Result<Header, HeaderError> {
    let mut magic = [0u8; 3];
    input.read_exact(&mut magic)?;
    if magic != MAGIC {
      return Err(HeaderError::BadMagic(magic));
    }

    let header_len = input.read_u16::<NativeEndian>()?;
    let row_len = input.read_u16::<NativeEndian>()?;
    let field_desc_len = input.read_u8()?;
    let field_desc_count = input.read_u8()?;
    let row_count = input.read_u32::<NativeEndian>()?;

    let mut marker = [0u8; 2];
    input.read_exact(&mut marker)?;
    if marker != MARKER {
      return Err(HeaderError::BadMarker(marker));
    }

    debug!(
      "parsed header: header_len={} row_len={} field_desc_len={} field_desc_count={} row_count={}",
      header_len, row_len, field_desc_len, field_desc_count, row_count
    );

    Ok(Header {
      header_len,
      row_len,
      field_desc_len,
      field_desc_count,
      row_count,
    })
  }
}

impl Default for Header {
  fn default() -> Header {
    Header::new()
  }
}

#[derive(Debug)]
pub enum HeaderError {
  Io(io::Error),
  BadMagic([u8; 3]),
  BadMarker([u8; 2]),
}

impl fmt::Display for HeaderError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      HeaderError::Io(err) => write!(f, "header I/O error: {}", err),
      HeaderError::BadMagic(magic) => write!(f, "bad magic bytes {:?}, expected \"ELD\"", magic),
      HeaderError::BadMarker(marker) => write!(f, "bad marker bytes {:?}, expected \"--\"", marker),
    }
  }
}

impl std::error::Error for HeaderError {}

impl From<io::Error> for HeaderError {
  fn from(err: io::Error) -> HeaderError {
    HeaderError::Io(err)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::field::{FieldDef, FieldKind};

  #[test]
  fn new_header_has_no_fields_or_rows() {
    let header = Header::new();
    assert_eq!(header.header_len, HEADER_BLOCK_LEN);
    assert_eq!(header.row_len, 0);
    assert_eq!(header.row_count, 0);
  }

  #[test]
  fn recompute_matches_worked_example() {
    let mut header = Header::new();
    let fields = vec![
      FieldDef::new(FieldKind::Int, "Integer", 1).unwrap(),
      FieldDef::new(FieldKind::Float, "Float", 1).unwrap(),
      FieldDef::new(FieldKind::Str, "String 10", 10).unwrap(),
    ];
    header.recompute_lengths(&fields);
    assert_eq!(header.header_len, 15 + 3 * 24);
    assert_eq!(header.row_len, 4 + 4 + 11);
  }

  #[test]
  fn round_trips_through_encode_decode() {
    let mut header = Header::new();
    header.row_count = 3;
    let mut buf = Vec::new();
    header.encode(&mut buf).unwrap();
    assert_eq!(buf.len(), HEADER_BLOCK_LEN as usize);

    let mut cursor = io::Cursor::new(buf);
    assert_eq!(Header::decode(&mut cursor).unwrap(), header);
  }

  #[test]
  fn rejects_bad_magic() {
    let mut buf = vec![b'X', b'X', b'X'];
    buf.extend_from_slice(&[0; 12]);
    let mut cursor = io::Cursor::new(buf);
    assert!(matches!(Header::decode(&mut cursor), Err(HeaderError::BadMagic(_))));
  }
}
