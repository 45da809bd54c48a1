//! Scenario-level tests against real files, exercising the document handle
//! end to end rather than any single codec in isolation. Numbered to match
//! the end-to-end scenarios and boundary behaviors they cover.

use eld::{Cell, DocError, Document, FieldKind};
use std::fs::OpenOptions;
use tempfile::NamedTempFile;

fn build_schema(doc: &mut Document) {
  doc.add_field(FieldKind::Int, "Integer", 1).unwrap();
  doc.add_field(FieldKind::Float, "Float", 1).unwrap();
  doc.add_field(FieldKind::Str, "String 10", 10).unwrap();
}

#[test]
fn scenario_1_create_schema() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  assert_eq!(std::fs::metadata(tmp.path()).unwrap().len(), 87);

  let mut reread = Document::new();
  reread.open_read(Some(tmp.path())).unwrap();
  reread.read_document().unwrap();
  reread.close().unwrap();

  assert_eq!(reread.fields().len(), 3);
  assert_eq!(reread.row_count(), 0);
}

#[test]
fn scenario_2_append_three_rows() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  for i in 1..=3 {
    let mut row = doc.new_row();
    row.set(0, Cell::Int(123 * i)).unwrap();
    row.set(1, Cell::Float(1.1 * i as f32)).unwrap();
    row.set(2, Cell::Str(format!("Row {}", i))).unwrap();
    doc.add_row(None, row).unwrap();
  }

  assert_eq!(std::fs::metadata(tmp.path()).unwrap().len(), 87 + 3 * 19);

  let row = doc.get_row(None, 1).unwrap();
  assert_eq!(row.get(0), Some(&Cell::Int(246)));
  assert_eq!(row.get(1), Some(&Cell::Float(2.2)));
  assert_eq!(row.get(2), Some(&Cell::Str("Row 2".to_string())));
}

#[test]
fn scenario_3_in_place_update() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  for i in 1..=3 {
    let mut row = doc.new_row();
    row.set(0, Cell::Int(123 * i)).unwrap();
    row.set(1, Cell::Float(1.1 * i as f32)).unwrap();
    row.set(2, Cell::Str(format!("Row {}", i))).unwrap();
    doc.add_row(None, row).unwrap();
  }

  let mut row = doc.get_row(None, 1).unwrap();
  row.set(0, Cell::Int(492)).unwrap();
  doc.update_row(None, &row).unwrap();

  assert_eq!(std::fs::metadata(tmp.path()).unwrap().len(), 87 + 3 * 19);
  assert_eq!(doc.get_row(None, 1).unwrap().get(0), Some(&Cell::Int(492)));
}

#[test]
fn scenario_4_reopen_round_trip() {
  let tmp = NamedTempFile::new().unwrap();
  {
    let mut doc = Document::new();
    build_schema(&mut doc);
    doc.open_read_write(Some(tmp.path())).unwrap();
    doc.save_document().unwrap();
    doc.close().unwrap();

    for i in 1..=3 {
      let mut row = doc.new_row();
      row.set(0, Cell::Int(123 * i)).unwrap();
      row.set(1, Cell::Float(1.1 * i as f32)).unwrap();
      row.set(2, Cell::Str(format!("Row {}", i))).unwrap();
      doc.add_row(None, row).unwrap();
    }
  }

  let mut reopened = Document::new();
  reopened.open_read(Some(tmp.path())).unwrap();
  reopened.read_document().unwrap();
  reopened.close().unwrap();

  assert_eq!(reopened.fields().len(), 3);
  assert_eq!(reopened.row_count(), 3);
  assert_eq!(reopened.fields()[2].name(), "String 10");
  assert_eq!(
    reopened.get_row(Some(tmp.path()), 0).unwrap().get(0),
    Some(&Cell::Int(123))
  );
}

#[test]
fn scenario_5_truncated_file_names_cell_and_row_index() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  let mut row = doc.new_row();
  row.set(0, Cell::Int(1)).unwrap();
  row.set(1, Cell::Float(1.0)).unwrap();
  row.set(2, Cell::Str("hello".to_string())).unwrap();
  doc.add_row(None, row).unwrap();

  // header (87) + int (4) + float (4) = 95: row 0 is cut off inside its
  // third (STRING) cell.
  let file = OpenOptions::new().write(true).open(tmp.path()).unwrap();
  file.set_len(95).unwrap();
  drop(file);

  let err = doc.get_row(None, 0).unwrap_err();
  let message = err.to_string();
  assert!(message.contains("row 0"), "message was: {}", message);
  assert!(message.contains("cell 2"), "message was: {}", message);
  assert_eq!(err.status(), eld::ffi::Status::FileError);
}

#[test]
fn scenario_6_bounds_names_index_and_row_count() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  for _ in 0..3 {
    let row = doc.new_row();
    doc.add_row(None, row).unwrap();
  }

  let err = doc.get_row(None, 3).unwrap_err();
  assert!(matches!(
    err,
    DocError::NoSuchRow { index: 3, row_count: 3 }
  ));
  assert_eq!(err.status(), eld::ffi::Status::FileError);
}

#[test]
fn b3_open_on_an_already_open_handle_fails() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();

  let err = doc.open_read(Some(tmp.path())).unwrap_err();
  assert!(matches!(err, DocError::AlreadyOpen));
  assert_eq!(err.status(), eld::ffi::Status::FileError);
}

#[test]
fn b4_long_field_name_is_truncated() {
  let mut doc = Document::new();
  doc
    .add_field(FieldKind::Int, "a_name_that_is_way_too_long_for_one_descriptor", 1)
    .unwrap();
  assert_eq!(doc.fields()[0].name().len(), 19);
}

#[test]
fn schema_is_frozen_once_a_document_has_rows() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  let row = doc.new_row();
  doc.add_row(None, row).unwrap();

  let result = doc.add_field(FieldKind::Int, "TooLate", 1);
  assert!(matches!(result, Err(DocError::SchemaFrozen)));
}

#[test]
fn save_document_never_truncates_existing_rows() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  let row = doc.new_row();
  doc.add_row(None, row).unwrap();

  // Re-saving the header (e.g. after reopening in read-write mode) must
  // leave the already-written row region intact.
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  assert_eq!(doc.get_row(None, 0).unwrap().index(), 0);
}

#[test]
fn read_rows_returns_every_row_in_order() {
  let tmp = NamedTempFile::new().unwrap();
  let mut doc = Document::new();
  build_schema(&mut doc);
  doc.open_read_write(Some(tmp.path())).unwrap();
  doc.save_document().unwrap();
  doc.close().unwrap();

  for n in 0..5 {
    let mut row = doc.new_row();
    row.set(0, Cell::Int(n)).unwrap();
    doc.add_row(None, row).unwrap();
  }

  let rows = doc.read_rows(None).unwrap();
  assert_eq!(rows.len(), 5);
  for (i, row) in rows.iter().enumerate() {
    assert_eq!(row.index(), i as u32);
    assert_eq!(row.get(0), Some(&Cell::Int(i as i32)));
  }
}
