//! Top-level error type for document operations (spec §7).

use crate::field::FieldError;
use crate::header::HeaderError;
use crate::row::RowError;
use std::fmt;
use std::io;

/// Everything that can go wrong while opening, reading, or writing an ELD
/// document.
#[derive(Debug)]
pub enum DocError {
  Io(io::Error),
  Header(HeaderError),
  Field(FieldError),
  Row(RowError),
  /// `add_field` called after at least one row has been added (Q2).
  SchemaFrozen,
  /// An operation needs an open document but none is open.
  NotOpen,
  /// An `open_*` call on a handle that already has an open file (spec
  /// §4.7/B3: transitions require a prior `close`).
  AlreadyOpen,
  /// A row index past `row_count`.
  NoSuchRow { index: u32, row_count: u32 },
  /// The embedder interface surfaces this for paths not yet wired up to a
  /// concrete implementation (spec §6.3's `EL_ERROR_NOT_IMPL`).
  NotImplemented,
}

impl fmt::Display for DocError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DocError::Io(err) => write!(f, "document I/O error: {}", err),
      DocError::Header(err) => write!(f, "{}", err),
      DocError::Field(err) => write!(f, "{}", err),
      DocError::Row(err) => write!(f, "{}", err),
      DocError::SchemaFrozen => write!(f, "cannot add a field after rows have been added"),
      DocError::NotOpen => write!(f, "no document is open"),
      DocError::AlreadyOpen => write!(f, "document already has an open file"),
      DocError::NoSuchRow { index, row_count } => {
        write!(f, "row index {} out of range, row_count is {}", index, row_count)
      }
      DocError::NotImplemented => write!(f, "operation not implemented"),
    }
  }
}

impl std::error::Error for DocError {}

impl From<io::Error> for DocError {
  fn from(err: io::Error) -> DocError {
    DocError::Io(err)
  }
}

impl From<HeaderError> for DocError {
  fn from(err: HeaderError) -> DocError {
    DocError::Header(err)
  }
}

impl From<FieldError> for DocError {
  fn from(err: FieldError) -> DocError {
    DocError::Field(err)
  }
}

impl From<RowError> for DocError {
  fn from(err: RowError) -> DocError {
    DocError::Row(err)
  }
}

impl DocError {
  /// Maps to the legacy `EL_STATUS_*` codes exposed across the FFI
  /// boundary (spec §6.3).
  pub fn status(&self) -> crate::ffi::Status {
    match self {
      DocError::Io(_)
      | DocError::Header(_)
      | DocError::Field(_)
      | DocError::Row(_)
      | DocError::NotOpen
      | DocError::AlreadyOpen
      | DocError::NoSuchRow { .. } => crate::ffi::Status::FileError,
      DocError::NotImplemented => crate::ffi::Status::NotImplemented,
      DocError::SchemaFrozen => crate::ffi::Status::Unknown,
    }
  }
}
