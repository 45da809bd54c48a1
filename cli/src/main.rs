use eld::{Cell, Document, FieldKind};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  env_logger::init();
  let args: Vec<_> = env::args().collect();
  if args.len() < 3 {
    panic!("Args are create|add-row|read|dump <filename>");
  }
  let op = &args[1];
  let filename = &args[2];

  if op == "create" {
    let mut doc = Document::new();
    doc.add_field(FieldKind::Int, "Integer", 1)?;
    doc.add_field(FieldKind::Float, "Float", 1)?;
    doc.add_field(FieldKind::Str, "String 10", 10)?;
    doc.open_read_write(Some(filename.as_ref()))?;
    doc.save_document()?;
    doc.close()?;
    println!("Successfully created document");
  } else if op == "add-row" {
    let mut doc = Document::new();
    doc.open_read(Some(filename.as_ref()))?;
    doc.read_document()?;
    doc.close()?;

    let mut row = doc.new_row();
    row.set(0, Cell::Int(246))?;
    row.set(1, Cell::Float(2.2))?;
    row.set(2, Cell::Str("Row 1".into()))?;
    doc.add_row(None, row)?;
    println!("Successfully added row {}", doc.row_count() - 1);
  } else if op == "read" {
    let mut doc = Document::new();
    doc.open_read(Some(filename.as_ref()))?;
    doc.read_document()?;
    doc.close()?;
    println!("Schema:");
    for field in doc.fields() {
      println!("  {:?} {} ({} bytes)", field.kind(), field.name(), field.size_bytes());
    }
    println!("Rows: {}", doc.row_count());
  } else if op == "dump" {
    let mut doc = Document::new();
    doc.open_read(Some(filename.as_ref()))?;
    doc.read_document()?;
    doc.close()?;
    for row in doc.read_rows(Some(filename.as_ref()))? {
      println!("{:?}", row.cells());
    }
  } else {
    panic!("Unknown op {}", op);
  }

  Ok(())
}
