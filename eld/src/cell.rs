//! Typed cell values and their byte-level codec (spec §4.1).

use crate::field::{FieldDef, FieldKind};
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{self, Read, Write};
use std::str::Utf8Error;

/// A single typed value bound to a field descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Int(i32),
  Float(f32),
  Str(String),
}

impl Cell {
  pub fn kind(&self) -> FieldKind {
    match self {
      Cell::Int(_) => FieldKind::Int,
      Cell::Float(_) => FieldKind::Float,
      Cell::Str(_) => FieldKind::Str,
    }
  }

  /// Builds the zero value for a descriptor's kind, the way `Row::empty`
  /// populates a freshly allocated row.
  pub(crate) fn zero(kind: FieldKind) -> Cell {
    match kind {
      FieldKind::Int => Cell::Int(0),
      FieldKind::Float => Cell::Float(0.0),
      FieldKind::Str => Cell::Str(String::new()),
    }
  }

  pub(crate) fn encode(&self, field: &FieldDef, out: &mut impl Write) -> Result<(), CellError> {
    if self.kind() != field.kind() {
      return Err(CellError::WrongKind {
        expected: field.kind(),
        found: self.kind(),
      });
    }
    match self {
      Cell::Int(value) => out.write_i32::<NativeEndian>(*value)?,
      Cell::Float(value) => out.write_f32::<NativeEndian>(*value)?,
      Cell::Str(value) => {
        let capacity = field.size_bytes() as usize;
        let bytes = value.as_bytes();
        // capacity always includes room for the terminator (§4.2/P6).
        if bytes.len() + 1 > capacity {
          return Err(CellError::StringTooLong {
            max: capacity - 1,
            got: bytes.len(),
          });
        }
        out.write_all(bytes)?;
        let padding = capacity - bytes.len();
        out.write_all(&vec![0u8; padding])?;
      }
    }
    Ok(())
  }

  pub(crate) fn decode(field: &FieldDef, input: &mut impl Read) -> Result<Cell, CellError> {
    match field.kind() {
      FieldKind::Int => Ok(Cell::Int(input.read_i32::<NativeEndian>()?)),
      FieldKind::Float => Ok(Cell::Float(input.read_f32::<NativeEndian>()?)),
      FieldKind::Str => {
        let capacity = field.size_bytes() as usize;
        let mut buf = vec![0u8; capacity];
        input.read_exact(&mut buf)?;
        let nul_at = buf.iter().position(|&b| b == 0).unwrap_or(capacity);
        let value = std::str::from_utf8(&buf[..nul_at])?.to_string();
        Ok(Cell::Str(value))
      }
    }
  }
}

#[derive(Debug)]
pub enum CellError {
  Io(io::Error),
  WrongKind { expected: FieldKind, found: FieldKind },
  StringTooLong { max: usize, got: usize },
  Utf8(Utf8Error),
}

impl fmt::Display for CellError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CellError::Io(err) => write!(f, "cell I/O error: {}", err),
      CellError::WrongKind { expected, found } => {
        write!(f, "cell kind {:?} does not match field kind {:?}", found, expected)
      }
      CellError::StringTooLong { max, got } => {
        write!(f, "string cell of {} bytes does not fit in a {}-byte field", got, max)
      }
      CellError::Utf8(err) => write!(f, "string cell is not valid UTF-8: {}", err),
    }
  }
}

impl std::error::Error for CellError {}

impl From<io::Error> for CellError {
  fn from(err: io::Error) -> CellError {
    CellError::Io(err)
  }
}

impl From<Utf8Error> for CellError {
  fn from(err: Utf8Error) -> CellError {
    CellError::Utf8(err)
  }
}
