//! The fixed-size row model (spec §4.5).

use crate::cell::{Cell, CellError};
use crate::field::FieldDef;
use std::fmt;
use std::io::{self, Read, Write};

/// A single row: one cell per field descriptor, in descriptor order, plus
/// the zero-based index it occupies in the document (invariant 4).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
  index: u32,
  cells: Vec<Cell>,
}

impl Row {
  /// A row of zero values matching `fields`, at the given index.
  pub(crate) fn empty(fields: &[FieldDef], index: u32) -> Row {
    Row {
      index,
      cells: fields.iter().map(|f| Cell::zero(f.kind())).collect(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }

  pub fn get(&self, position: usize) -> Option<&Cell> {
    self.cells.get(position)
  }

  /// Overwrites the cell at `position`. Callers go through
  /// `Document::update_row` to persist the change; this only mutates the
  /// in-memory copy.
  pub fn set(&mut self, position: usize, cell: Cell) -> Result<(), RowError> {
    let slot = self
      .cells
      .get_mut(position)
      .ok_or(RowError::NoSuchField(position))?;
    *slot = cell;
    Ok(())
  }

  pub(crate) fn encode(&self, fields: &[FieldDef], out: &mut impl Write) -> Result<(), RowError> {
    if self.cells.len() != fields.len() {
      return Err(RowError::Arity {
        expected: fields.len(),
        found: self.cells.len(),
      });
    }
    for (position, (cell, field)) in self.cells.iter().zip(fields).enumerate() {
      cell.encode(field, out).map_err(|source| RowError::Cell {
        position,
        row_index: self.index,
        source,
      })?;
    }
    Ok(())
  }

  pub(crate) fn decode(
    fields: &[FieldDef],
    index: u32,
    input: &mut impl Read,
  ) -> Result<Row, RowError> {
    let mut cells = Vec::with_capacity(fields.len());
    for (position, field) in fields.iter().enumerate() {
      let cell = Cell::decode(field, input).map_err(|source| RowError::Cell {
        position,
        row_index: index,
        source,
      })?;
      cells.push(cell);
    }
    Ok(Row { index, cells })
  }
}

#[derive(Debug)]
pub enum RowError {
  Io(io::Error),
  /// A cell at `position` in row `row_index` failed to encode or decode.
  Cell {
    position: usize,
    row_index: u32,
    source: CellError,
  },
  /// A row was built or decoded against the wrong number of fields.
  Arity { expected: usize, found: usize },
  /// `Row::set` was given a position past the last field.
  NoSuchField(usize),
}

impl fmt::Display for RowError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RowError::Io(err) => write!(f, "row I/O error: {}", err),
      RowError::Cell {
        position,
        row_index,
        source,
      } => write!(
        f,
        "row {}, cell {}: {}",
        row_index, position, source
      ),
      RowError::Arity { expected, found } => {
        write!(f, "row has {} cells, schema has {} fields", found, expected)
      }
      RowError::NoSuchField(position) => write!(f, "no field at position {}", position),
    }
  }
}

impl std::error::Error for RowError {}

impl From<io::Error> for RowError {
  fn from(err: io::Error) -> RowError {
    RowError::Io(err)
  }
}
