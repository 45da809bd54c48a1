//! The document handle and file-mode controller (spec §4.4, §4.6, §4.7).
//!
//! A [`Document`] tracks its schema and row count in memory and only talks
//! to the filesystem when a caller asks it to: opening, closing, and
//! switching between read/write/append modes are explicit steps, mirroring
//! the legacy `el_doc_fopen`/`el_doc_fclose` pair this module is grounded
//! on rather than keeping a file handle open across every call.

use crate::error::DocError;
use crate::field::FieldDef;
use crate::header::Header;
use crate::row::Row;
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// The mode a document's backing file is currently open in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
  Read,
  ReadWrite,
  Append,
}

/// A handle onto one ELD document: its schema, row count, and (while open)
/// a file.
pub struct Document {
  header: Header,
  fields: Vec<FieldDef>,
  path: Option<PathBuf>,
  file: Option<File>,
  mode: Option<FileMode>,
}

impl Document {
  /// A brand-new, schema-less document with no backing file.
  pub fn new() -> Document {
    Document {
      header: Header::new(),
      fields: Vec::new(),
      path: None,
      file: None,
      mode: None,
    }
  }

  pub fn fields(&self) -> &[FieldDef] {
    &self.fields
  }

  pub fn row_count(&self) -> u32 {
    self.header.row_count
  }

  pub fn is_open(&self) -> bool {
    self.file.is_some()
  }

  pub fn mode(&self) -> Option<FileMode> {
    self.mode
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
  }

  /// Appends a field to the schema (spec §4.4). Rejected once the document
  /// already has rows (Q2): the original C allows this and silently
  /// corrupts existing rows by shifting `row_len`, which this port treats
  /// as a bug rather than a feature to preserve.
  pub fn add_field(&mut self, kind: crate::field::FieldKind, name: &str, length: u16) -> Result<(), DocError> {
    if self.header.row_count > 0 {
      return Err(DocError::SchemaFrozen);
    }
    let field = FieldDef::new(kind, name, length)?;
    self.fields.push(field);
    self.header.recompute_lengths(&self.fields);
    debug!(
      "added field {:?}, schema now has {} fields, row_len={}",
      self.fields.last().map(|f| f.name()),
      self.fields.len(),
      self.header.row_len
    );
    Ok(())
  }

  fn remember_path(&mut self, path: Option<&Path>) -> Result<&Path, DocError> {
    if let Some(path) = path {
      self.path = Some(path.to_path_buf());
    }
    self.path.as_deref().ok_or(DocError::NotOpen)
  }

  /// Opens (or reuses the last-used) path for reading.
  pub fn open_read(&mut self, path: Option<&Path>) -> Result<(), DocError> {
    if self.is_open() {
      return Err(DocError::AlreadyOpen);
    }
    let path = self.remember_path(path)?.to_path_buf();
    let file = OpenOptions::new().read(true).open(&path)?;
    self.file = Some(file);
    self.mode = Some(FileMode::Read);
    info!("opened {} for reading", path.display());
    Ok(())
  }

  /// Opens (or reuses the last-used) path for in-place reading and
  /// writing, creating it if it does not exist.
  pub fn open_read_write(&mut self, path: Option<&Path>) -> Result<(), DocError> {
    if self.is_open() {
      return Err(DocError::AlreadyOpen);
    }
    let path = self.remember_path(path)?.to_path_buf();
    let file = OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .open(&path)?;
    self.file = Some(file);
    self.mode = Some(FileMode::ReadWrite);
    info!("opened {} for read-write", path.display());
    Ok(())
  }

  /// Opens (or reuses the last-used) path for append-only writes at EOF.
  pub fn open_append(&mut self, path: Option<&Path>) -> Result<(), DocError> {
    if self.is_open() {
      return Err(DocError::AlreadyOpen);
    }
    let path = self.remember_path(path)?.to_path_buf();
    let file = OpenOptions::new().append(true).create(true).open(&path)?;
    self.file = Some(file);
    self.mode = Some(FileMode::Append);
    info!("opened {} for append", path.display());
    Ok(())
  }

  /// Closes the backing file. The remembered path survives, so the next
  /// open call may omit it (spec §4.7's "reuse last filename").
  pub fn close(&mut self) -> Result<(), DocError> {
    if let Some(mut file) = self.file.take() {
      file.flush()?;
    }
    self.mode = None;
    Ok(())
  }

  fn require_file(&mut self) -> Result<&mut File, DocError> {
    self.file.as_mut().ok_or(DocError::NotOpen)
  }

  /// Reads the header and field descriptor table from the open file into
  /// memory, replacing the current in-memory schema (spec §4.6).
  pub fn read_document(&mut self) -> Result<(), DocError> {
    let file = self.require_file()?;
    file.seek(SeekFrom::Start(0))?;
    let mut reader = BufReader::new(file);
    let header = Header::decode(&mut reader)?;
    let mut fields = Vec::with_capacity(header.field_desc_count as usize);
    for _ in 0..header.field_desc_count {
      fields.push(FieldDef::decode(&mut reader)?);
    }
    self.header = header;
    self.fields = fields;
    debug!(
      "read_document: {} fields, {} rows",
      self.fields.len(),
      self.header.row_count
    );
    Ok(())
  }

  /// Writes the header and field descriptor table to the open file. Never
  /// truncates (Q5): any existing row region past the descriptor table is
  /// left untouched, which is safe as long as the schema itself never
  /// shrinks after rows exist (see `add_field`'s `SchemaFrozen` rule).
  pub fn save_document(&mut self) -> Result<(), DocError> {
    let header = self.header.clone();
    let fields = self.fields.clone();
    let file = self.require_file()?;
    file.seek(SeekFrom::Start(0))?;
    let mut writer = BufWriter::new(file);
    header.encode(&mut writer)?;
    for field in &fields {
      field.encode(&mut writer)?;
    }
    writer.flush()?;
    debug!("save_document: header_len={}", header.header_len);
    Ok(())
  }

  /// A fresh, zero-valued row at the next available index.
  pub fn new_row(&self) -> Row {
    Row::empty(&self.fields, self.header.row_count)
  }

  /// Appends `row` to the document (spec §4.6). This persists `row_count`
  /// to the header before writing the row body: a crash between the two
  /// steps leaves the header overstating the document's true row count.
  /// No journaling is added to close that gap (see DESIGN.md, Q3).
  pub fn add_row(&mut self, path: Option<&Path>, row: Row) -> Result<(), DocError> {
    let path = self.remember_path(path)?.to_path_buf();

    self.header.row_count += 1;
    self.open_read_write(Some(&path))?;
    let result = self.save_document();
    self.close()?;
    result?;

    self.open_append(Some(&path))?;
    let result = (|| -> Result<(), DocError> {
      let fields = self.fields.clone();
      let file = self.require_file()?;
      let mut writer = BufWriter::new(file);
      row.encode(&fields, &mut writer)?;
      writer.flush()?;
      Ok(())
    })();
    self.close()?;
    result?;

    info!("appended row {} to {}", row.index(), path.display());
    Ok(())
  }

  /// Overwrites an existing row in place.
  pub fn update_row(&mut self, path: Option<&Path>, row: &Row) -> Result<(), DocError> {
    if row.index() >= self.header.row_count {
      return Err(DocError::NoSuchRow {
        index: row.index(),
        row_count: self.header.row_count,
      });
    }
    let path = self.remember_path(path)?.to_path_buf();
    let offset = self.header.row_offset(row.index());

    self.open_read_write(Some(&path))?;
    let result = (|| -> Result<(), DocError> {
      let fields = self.fields.clone();
      let file = self.require_file()?;
      file.seek(SeekFrom::Start(offset))?;
      let mut writer = BufWriter::new(file);
      row.encode(&fields, &mut writer)?;
      writer.flush()?;
      Ok(())
    })();
    self.close()?;
    result
  }

  /// Reads a single row back out of the document.
  pub fn get_row(&mut self, path: Option<&Path>, index: u32) -> Result<Row, DocError> {
    if index >= self.header.row_count {
      return Err(DocError::NoSuchRow {
        index,
        row_count: self.header.row_count,
      });
    }
    let path = self.remember_path(path)?.to_path_buf();
    let offset = self.header.row_offset(index);

    self.open_read(Some(&path))?;
    let result = (|| -> Result<Row, DocError> {
      let fields = self.fields.clone();
      let file = self.require_file()?;
      file.seek(SeekFrom::Start(offset))?;
      let mut reader = BufReader::new(file);
      Ok(Row::decode(&fields, index, &mut reader)?)
    })();
    self.close()?;
    result
  }

  /// Reads every row in the document, in index order.
  pub fn read_rows(&mut self, path: Option<&Path>) -> Result<Vec<Row>, DocError> {
    let path = self.remember_path(path)?.to_path_buf();
    let row_count = self.header.row_count;

    self.open_read(Some(&path))?;
    let result = (|| -> Result<Vec<Row>, DocError> {
      let fields = self.fields.clone();
      let offset = self.header.row_offset(0);
      let file = self.require_file()?;
      file.seek(SeekFrom::Start(offset))?;
      let mut reader = BufReader::new(file);
      let mut rows = Vec::with_capacity(row_count as usize);
      for index in 0..row_count {
        rows.push(Row::decode(&fields, index, &mut reader)?);
      }
      Ok(rows)
    })();
    self.close()?;
    result
  }
}

impl Default for Document {
  fn default() -> Document {
    Document::new()
  }
}
