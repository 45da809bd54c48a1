//! Field descriptors: the schema entries that make up an ELD document's
//! column list.

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{self, Read, Write};
use std::string::FromUtf8Error;

/// Usable characters in a field name (the 20th on-disk byte is always the
/// NUL terminator).
pub const FIELD_NAME_CHARS: usize = 19;
/// On-disk capacity of a field name, terminator included.
pub const FIELD_NAME_CAPACITY: usize = FIELD_NAME_CHARS + 1;
/// On-disk width of one field descriptor: 1 (type) + 1 (reserved) + 2
/// (size_bytes) + 20 (name). Fixed explicitly rather than left to a host's
/// struct padding rules (see DESIGN.md, Q4).
pub const FIELD_DESC_LEN: u8 = 24;

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Int,
  Float,
  Str,
}

impl FieldKind {
  const INT_TAG: u8 = 0;
  const FLOAT_TAG: u8 = 1;
  const STR_TAG: u8 = 2;

  /// Per-character base size used to compute a STRING field's on-disk
  /// width; INT and FLOAT are always 4 bytes.
  pub fn base_size(self) -> u16 {
    match self {
      FieldKind::Int | FieldKind::Float => 4,
      FieldKind::Str => 1,
    }
  }

  fn tag(self) -> u8 {
    match self {
      FieldKind::Int => Self::INT_TAG,
      FieldKind::Float => Self::FLOAT_TAG,
      FieldKind::Str => Self::STR_TAG,
    }
  }

  fn from_tag(tag: u8) -> Result<FieldKind, FieldError> {
    match tag {
      Self::INT_TAG => Ok(FieldKind::Int),
      Self::FLOAT_TAG => Ok(FieldKind::Float),
      Self::STR_TAG => Ok(FieldKind::Str),
      unknown => Err(FieldError::UnknownType(unknown)),
    }
  }
}

/// A single schema entry: type, on-disk width, and name.
///
/// Descriptors are immutable once constructed; a document appends them in
/// order and never mutates one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
  kind: FieldKind,
  size_bytes: u16,
  name: String,
}

impl FieldDef {
  /// Builds a descriptor. `length` is the *declared* length: characters for
  /// a STRING field, always 1 for INT/FLOAT. Names longer than
  /// [`FIELD_NAME_CHARS`] are truncated (B4); the on-disk 20th byte is
  /// always NUL.
  pub fn new(kind: FieldKind, name: &str, length: u16) -> Result<FieldDef, FieldError> {
    let size_bytes = match kind {
      FieldKind::Str => length
        .checked_add(1)
        .ok_or(FieldError::InvalidLength(length))?,
      FieldKind::Int | FieldKind::Float => {
        if length != 1 {
          return Err(FieldError::InvalidLength(length));
        }
        kind.base_size()
      }
    };

    let mut name_bytes = name.as_bytes().to_vec();
    if name_bytes.len() > FIELD_NAME_CHARS {
      name_bytes.truncate(FIELD_NAME_CHARS);
      // A truncation point may land inside a multi-byte UTF-8 sequence;
      // back off until it doesn't.
      while std::str::from_utf8(&name_bytes).is_err() {
        name_bytes.pop();
      }
    }
    let name = String::from_utf8(name_bytes).expect("validated above");

    Ok(FieldDef {
      kind,
      size_bytes,
      name,
    })
  }

  pub fn kind(&self) -> FieldKind {
    self.kind
  }

  pub fn size_bytes(&self) -> u16 {
    self.size_bytes
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn encode(&self, out: &mut impl Write) -> Result<(), FieldError> {
    out.write_u8(self.kind.tag())?;
    out.write_u8(0)?; // reserved
    out.write_u16::<NativeEndian>(self.size_bytes)?;

    let mut name_buf = [0u8; FIELD_NAME_CAPACITY];
    let name_bytes = self.name.as_bytes();
    name_buf[..name_bytes.len()].copy_from_slice(name_bytes);
    out.write_all(&name_buf)?;
    Ok(())
  }

  pub(crate) fn decode(input: &mut impl Read) -> Result<FieldDef, FieldError> {
    let tag = input.read_u8()?;
    let kind = FieldKind::from_tag(tag)?;
    let _reserved = input.read_u8()?;
    let size_bytes = input.read_u16::<NativeEndian>()?;

    let mut name_buf = [0u8; FIELD_NAME_CAPACITY];
    input.read_exact(&mut name_buf)?;
    let nul_at = name_buf
      .iter()
      .position(|&b| b == 0)
      .unwrap_or(FIELD_NAME_CAPACITY);
    let name = String::from_utf8(name_buf[..nul_at].to_vec())?;

    Ok(FieldDef {
      kind,
      size_bytes,
      name,
    })
  }
}

#[derive(Debug)]
pub enum FieldError {
  /// STRING declared with length 0, or INT/FLOAT declared with a length
  /// other than 1.
  InvalidLength(u16),
  /// A descriptor tag byte that isn't INT/FLOAT/STRING.
  UnknownType(u8),
  Io(io::Error),
  Utf8(FromUtf8Error),
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FieldError::InvalidLength(n) => write!(f, "invalid declared field length {}", n),
      FieldError::UnknownType(tag) => write!(f, "unknown field type tag {}", tag),
      FieldError::Io(err) => write!(f, "field descriptor I/O error: {}", err),
      FieldError::Utf8(err) => write!(f, "field name is not valid UTF-8: {}", err),
    }
  }
}

impl std::error::Error for FieldError {}

impl From<io::Error> for FieldError {
  fn from(err: io::Error) -> FieldError {
    FieldError::Io(err)
  }
}

impl From<FromUtf8Error> for FieldError {
  fn from(err: FromUtf8Error) -> FieldError {
    FieldError::Utf8(err)
  }
}
