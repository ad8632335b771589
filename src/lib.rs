//! Format-agnostic workbook/worksheet model with bidirectional type coercion
//!
//! Provides an in-memory model for tabular documents (books of named sheets)
//! plus a coercion engine that converts between the untyped strings a
//! serialized format stores and the rich values an application manipulates
//! (booleans, integers, floats, UTC instants, nested JSON structures, null).
//!
//! The crate never touches file bytes: format-specific encoders and decoders
//! plug in behind the [`FormatHandler`] trait and are dispatched through an
//! explicitly injected [`FormatRegistry`].
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use gridbook::Sheet;
//!
//! let sheet = Sheet::from_data(vec![
//!     vec!["Name", "Age", "City"],
//!     vec!["Alice", "30", "NYC"],
//!     vec!["Bob", "25", "LA"],
//! ]);
//!
//! assert_eq!(sheet.row_count(), 3);
//! assert_eq!(sheet.col_count(), 3);
//! ```
//!
//! ## Indexed and associative sheets
//!
//! ```
//! use gridbook::{CellValue, Sheet};
//!
//! let indexed = Sheet::from_data(vec![
//!     vec!["name", "age"],
//!     vec!["Alice", "30"],
//! ]);
//!
//! // Row 0 becomes the column keys; records are keyed by name.
//! let assoc = indexed.to_associative();
//! assert_eq!(
//!     assoc.get_by_name(0, "name"),
//!     Some(&CellValue::String("Alice".to_string()))
//! );
//!
//! // And back: the header row is re-synthesized from the column union.
//! let back = assoc.to_indexed();
//! assert_eq!(back.header_row(), indexed.header_row());
//! ```
//!
//! ## Type coercion
//!
//! ```
//! use gridbook::{Book, CellValue, Sheet, TypeCoercion};
//!
//! let mut book = Book::new();
//! book.add_sheet(
//!     "data",
//!     Sheet::from_data(vec![vec!["id", "flag"], vec!["1", "true"]]),
//! )
//! .unwrap();
//!
//! // The caller's book is cloned, never mutated.
//! let typed = TypeCoercion::new().post_load(&book);
//! let sheet = typed.get_sheet("data").unwrap();
//! assert_eq!(sheet.get(1, 0), Some(&CellValue::Int(1)));
//! assert_eq!(sheet.get(1, 1), Some(&CellValue::Bool(true)));
//! ```
//!
//! ## Working with books
//!
//! ```
//! use gridbook::{Book, Sheet};
//!
//! let mut book = Book::new();
//! book.add_sheet("Data", Sheet::new()).unwrap();
//! book.add_sheet("Summary", Sheet::new()).unwrap();
//!
//! assert_eq!(book.sheet_count(), 2);
//! // The first sheet added is the active one.
//! assert_eq!(book.active_sheet().unwrap().name(), "Data");
//! ```

mod book;
mod cell;
mod coerce;
mod error;
mod format;
mod sheet;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export the coercion engine and its per-cell functions.
pub use coerce::{canonicalize, infer, TypeCoercion};
/// Re-export error types.
pub use error::{BoxedError, GridError, Result};
/// Re-export the format boundary.
pub use format::{Dumper, FormatHandler, FormatRegistry, Loader};
/// Re-export sheet types.
pub use sheet::{ColKey, Sheet};
