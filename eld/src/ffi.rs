//! Legacy C-style embedder interface (spec §6.3): a process-wide "last
//! error" sink plus `extern "C"` entry points wrapping [`crate::Document`].
//!
//! This mirrors the original `el_doc_*` surface for hosts that link against
//! this crate as a C library rather than using the Rust API directly.

use crate::cell::Cell;
use crate::document::Document;
use crate::field::FieldKind;
use log::error;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Status codes returned across the FFI boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Ok = 0,
  FileError = 1,
  Unknown = 2,
  NotImplemented = 3,
}

fn last_error_slot() -> &'static Mutex<Option<String>> {
  static SLOT: OnceLock<Mutex<Option<String>>> = OnceLock::new();
  SLOT.get_or_init(|| Mutex::new(None))
}

/// Records `message` as the process-wide last error, logging it the way a
/// failed operation would be logged from Rust-native call sites.
pub(crate) fn set_last_error(message: impl Into<String>) {
  let message = message.into();
  error!("{}", message);
  let mut slot = last_error_slot().lock().unwrap_or_else(|e| e.into_inner());
  *slot = Some(message);
}

/// Returns the last error message recorded by a failed `el_*` call, if any.
#[no_mangle]
pub extern "C" fn el_last_error() -> *mut c_char {
  let slot = last_error_slot().lock().unwrap_or_else(|e| e.into_inner());
  match slot.as_ref() {
    Some(message) => CString::new(message.as_str())
      .unwrap_or_else(|_| CString::new("<error message contained NUL>").unwrap())
      .into_raw(),
    None => std::ptr::null_mut(),
  }
}

/// Frees a string previously returned by [`el_last_error`].
///
/// # Safety
/// `ptr` must be a pointer returned by [`el_last_error`] and not already
/// freed.
#[no_mangle]
pub unsafe extern "C" fn el_free_string(ptr: *mut c_char) {
  if !ptr.is_null() {
    drop(CString::from_raw(ptr));
  }
}

/// Opaque handle type exposed to C callers.
pub struct ElDoc(Document);

/// Allocates a new, schema-less document (`el_doc_new`).
#[no_mangle]
pub extern "C" fn el_doc_new() -> *mut ElDoc {
  Box::into_raw(Box::new(ElDoc(Document::new())))
}

/// Releases a document handle (`el_doc_free`).
///
/// # Safety
/// `doc` must be a pointer returned by [`el_doc_new`] and not already freed.
#[no_mangle]
pub unsafe extern "C" fn el_doc_free(doc: *mut ElDoc) {
  if !doc.is_null() {
    drop(Box::from_raw(doc));
  }
}

unsafe fn path_from_c(fname: *const c_char) -> Result<PathBuf, Status> {
  if fname.is_null() {
    set_last_error("null filename passed across FFI boundary");
    return Err(Status::Unknown);
  }
  match CStr::from_ptr(fname).to_str() {
    Ok(s) => Ok(PathBuf::from(s)),
    Err(err) => {
      set_last_error(format!("filename is not valid UTF-8: {}", err));
      Err(Status::Unknown)
    }
  }
}

/// Opens `fname` in the given mode (`el_doc_fopen`). `fmode` follows stdio
/// convention: `"r"`, `"w"` (read-write, creating if absent), or `"a"`.
///
/// # Safety
/// `doc` must be a valid, non-null pointer from [`el_doc_new`]; `fname` and
/// `fmode` must be valid, non-null, NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn el_doc_fopen(
  doc: *mut ElDoc,
  fname: *const c_char,
  fmode: *const c_char,
) -> Status {
  let doc = match doc.as_mut() {
    Some(doc) => doc,
    None => return Status::Unknown,
  };
  let path = match path_from_c(fname) {
    Ok(path) => path,
    Err(status) => return status,
  };
  if fmode.is_null() {
    set_last_error("null mode string passed across FFI boundary");
    return Status::Unknown;
  }
  let mode = CStr::from_ptr(fmode).to_string_lossy();

  let result = match mode.as_ref() {
    "r" => doc.0.open_read(Some(&path)).and_then(|_| doc.0.read_document()),
    "w" => doc.0.open_read_write(Some(&path)),
    "a" => doc.0.open_append(Some(&path)),
    other => {
      set_last_error(format!("unknown file mode \"{}\"", other));
      return Status::Unknown;
    }
  };

  match result {
    Ok(()) => Status::Ok,
    Err(err) => {
      set_last_error(err.to_string());
      err.status()
    }
  }
}

/// Closes a document's backing file (`el_doc_fclose`).
///
/// # Safety
/// `doc` must be a valid, non-null pointer from [`el_doc_new`].
#[no_mangle]
pub unsafe extern "C" fn el_doc_fclose(doc: *mut ElDoc) -> Status {
  let doc = match doc.as_mut() {
    Some(doc) => doc,
    None => return Status::Unknown,
  };
  match doc.0.close() {
    Ok(()) => Status::Ok,
    Err(err) => {
      set_last_error(err.to_string());
      err.status()
    }
  }
}

/// Appends an INT field to the schema (`el_doc_add_field_int`). STRING and
/// FLOAT counterparts are provided as [`el_doc_add_field_float`] and
/// [`el_doc_add_field_string`]; collapsing all three into one call would
/// require a tagged union across the FFI boundary for no real benefit.
///
/// # Safety
/// `doc` must be valid and non-null; `name` must be a valid, non-null,
/// NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn el_doc_add_field_int(doc: *mut ElDoc, name: *const c_char) -> Status {
  add_field(doc, name, FieldKind::Int, 1)
}

/// Appends a FLOAT field to the schema (`el_doc_add_field_float`).
///
/// # Safety
/// Same requirements as [`el_doc_add_field_int`].
#[no_mangle]
pub unsafe extern "C" fn el_doc_add_field_float(doc: *mut ElDoc, name: *const c_char) -> Status {
  add_field(doc, name, FieldKind::Float, 1)
}

/// Appends a STRING field of `length` characters to the schema
/// (`el_doc_add_field_string`).
///
/// # Safety
/// Same requirements as [`el_doc_add_field_int`].
#[no_mangle]
pub unsafe extern "C" fn el_doc_add_field_string(
  doc: *mut ElDoc,
  name: *const c_char,
  length: c_int,
) -> Status {
  add_field(doc, name, FieldKind::Str, length.max(0) as u16)
}

unsafe fn add_field(doc: *mut ElDoc, name: *const c_char, kind: FieldKind, length: u16) -> Status {
  let doc = match doc.as_mut() {
    Some(doc) => doc,
    None => return Status::Unknown,
  };
  if name.is_null() {
    set_last_error("null field name passed across FFI boundary");
    return Status::Unknown;
  }
  let name = CStr::from_ptr(name).to_string_lossy();
  match doc.0.add_field(kind, &name, length) {
    Ok(()) => Status::Ok,
    Err(err) => {
      set_last_error(err.to_string());
      err.status()
    }
  }
}

/// Persists the header and field descriptor table (`el_doc_save`).
///
/// # Safety
/// `doc` must be a valid, non-null pointer from [`el_doc_new`].
#[no_mangle]
pub unsafe extern "C" fn el_doc_save(doc: *mut ElDoc) -> Status {
  let doc = match doc.as_mut() {
    Some(doc) => doc,
    None => return Status::Unknown,
  };
  match doc.0.save_document() {
    Ok(()) => Status::Ok,
    Err(err) => {
      set_last_error(err.to_string());
      err.status()
    }
  }
}

/// Appends a row built from `ints`, `floats`, and `strings` taken in schema
/// order (`el_doc_add_row`). Raw cell arrays are the only practical way to
/// move a whole row across the FFI boundary without per-field round trips;
/// this is a deliberate addition beyond the named embedder surface.
///
/// # Safety
/// `doc` must be valid and non-null. `ints` must point to at least as many
/// `i32`s, `floats` to at least as many `f32`s, and `strings` to at least as
/// many NUL-terminated C strings as the schema has INT, FLOAT, and STRING
/// fields respectively.
#[no_mangle]
pub unsafe extern "C" fn el_doc_add_row(
  doc: *mut ElDoc,
  ints: *const i32,
  floats: *const f32,
  strings: *const *const c_char,
) -> Status {
  let doc = match doc.as_mut() {
    Some(doc) => doc,
    None => return Status::Unknown,
  };

  let mut row = doc.0.new_row();
  let mut int_idx = 0isize;
  let mut float_idx = 0isize;
  let mut str_idx = 0isize;

  for (position, field) in doc.0.fields().to_vec().iter().enumerate() {
    let cell = match field.kind() {
      FieldKind::Int => {
        let value = *ints.offset(int_idx);
        int_idx += 1;
        Cell::Int(value)
      }
      FieldKind::Float => {
        let value = *floats.offset(float_idx);
        float_idx += 1;
        Cell::Float(value)
      }
      FieldKind::Str => {
        let ptr = *strings.offset(str_idx);
        str_idx += 1;
        if ptr.is_null() {
          set_last_error("null string cell passed across FFI boundary");
          return Status::Unknown;
        }
        Cell::Str(CStr::from_ptr(ptr).to_string_lossy().into_owned())
      }
    };
    if let Err(err) = row.set(position, cell) {
      set_last_error(err.to_string());
      return Status::Unknown;
    }
  }

  match doc.0.add_row(None, row) {
    Ok(()) => Status::Ok,
    Err(err) => {
      set_last_error(err.to_string());
      err.status()
    }
  }
}
