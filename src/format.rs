//! The boundary between the workbook model and format-specific collaborators.
//!
//! A [`FormatHandler`] translates between raw books (string/primitive cells
//! only) and a serialized byte format; the model never touches bytes itself.
//! A [`FormatRegistry`] maps format identifiers and filename extensions to
//! handlers, and [`Loader`]/[`Dumper`] glue a registry and a
//! [`TypeCoercion`] engine together so callers get typed books in and out.

use crate::book::Book;
use crate::coerce::TypeCoercion;
use crate::error::{GridError, Result};
use indexmap::IndexMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// A format-specific reader/writer.
///
/// Handlers consume and produce *raw* books: loading performs no type
/// inference, and dumping expects cells already canonicalized by the caller.
pub trait FormatHandler {
    /// Parse serialized bytes into a raw book.
    fn load_from_bytes(&self, bytes: &[u8]) -> Result<Book>;

    /// Parse serialized text into a raw book.
    ///
    /// `default_sheet_name` names the sheet for single-sheet formats that do
    /// not carry one of their own.
    fn load_from_str(&self, text: &str, default_sheet_name: Option<&str>) -> Result<Book>;

    /// Serialize a raw (canonicalized) book into bytes.
    fn dump_to_bytes(&self, book: &Book) -> Result<Vec<u8>>;

    /// Serialize a raw (canonicalized) book into text.
    fn dump_to_string(&self, book: &Book) -> Result<String>;

    /// The filename extension this handler owns (without the dot).
    fn extension(&self) -> &str;

    /// The MIME type of the serialized form.
    fn mime_type(&self) -> &str;
}

/// Maps format identifiers to handlers (preserves registration order).
#[derive(Default)]
pub struct FormatRegistry {
    handlers: IndexMap<String, Box<dyn FormatHandler>>,
}

impl FormatRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        FormatRegistry {
            handlers: IndexMap::new(),
        }
    }

    /// Register a handler under an extension, replacing any previous one
    pub fn register(&mut self, extension: &str, handler: Box<dyn FormatHandler>) {
        self.handlers
            .insert(extension.to_ascii_lowercase(), handler);
    }

    /// Resolve a handler from a bare format identifier or a filename.
    ///
    /// `"csv"`, `"data.csv"`, and `"DATA.CSV"` all resolve the same handler.
    pub fn resolve(&self, name_or_path: &str) -> Result<&dyn FormatHandler> {
        let key = format_key(name_or_path);
        self.handlers
            .get(&key)
            .map(Box::as_ref)
            .ok_or_else(|| GridError::UnsupportedFormat {
                name: name_or_path.to_string(),
            })
    }

    /// The registered format identifiers, in registration order
    #[must_use]
    pub fn supported_formats(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

/// Extract the lookup key: the extension of a filename, or the identifier
/// itself when there is none.
fn format_key(name_or_path: &str) -> String {
    let tail = name_or_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name_or_path);
    match tail.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => extension.to_ascii_lowercase(),
        _ => tail.to_ascii_lowercase(),
    }
}

/// Reads serialized documents into typed books.
///
/// Orchestrates resolve -> handler load -> post-load inference. The registry
/// and engine are injected by the caller.
pub struct Loader<'a> {
    registry: &'a FormatRegistry,
    coercion: &'a TypeCoercion,
}

impl<'a> Loader<'a> {
    #[must_use]
    pub fn new(registry: &'a FormatRegistry, coercion: &'a TypeCoercion) -> Self {
        Loader { registry, coercion }
    }

    /// Load a typed book from serialized bytes.
    ///
    /// Handler failures surface as [`GridError::Load`] with the original
    /// cause preserved.
    pub fn load_bytes(&self, format: &str, bytes: &[u8]) -> Result<Book> {
        let handler = self.registry.resolve(format)?;
        let raw = handler
            .load_from_bytes(bytes)
            .map_err(|e| GridError::Load {
                format: format.to_string(),
                source: Box::new(e),
            })?;
        Ok(self.coercion.post_load(&raw))
    }

    /// Load a typed book from serialized text.
    pub fn load_str(
        &self,
        format: &str,
        text: &str,
        default_sheet_name: Option<&str>,
    ) -> Result<Book> {
        let handler = self.registry.resolve(format)?;
        let raw = handler
            .load_from_str(text, default_sheet_name)
            .map_err(|e| GridError::Load {
                format: format.to_string(),
                source: Box::new(e),
            })?;
        Ok(self.coercion.post_load(&raw))
    }

    /// Load a typed book from a file, resolving the handler from the
    /// filename extension.
    ///
    /// A missing file surfaces as [`GridError::NotFound`] rather than a bare
    /// IO error.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Book> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                GridError::NotFound {
                    name: path.display().to_string(),
                }
            } else {
                GridError::Io(e)
            }
        })?;
        self.load_bytes(&path.to_string_lossy(), &bytes)
    }
}

/// Writes typed books out as serialized documents.
///
/// Orchestrates pre-dump canonicalization -> handler dump.
pub struct Dumper<'a> {
    registry: &'a FormatRegistry,
    coercion: &'a TypeCoercion,
}

impl<'a> Dumper<'a> {
    #[must_use]
    pub fn new(registry: &'a FormatRegistry, coercion: &'a TypeCoercion) -> Self {
        Dumper { registry, coercion }
    }

    /// Dump a typed book to serialized bytes.
    ///
    /// Handler failures surface as [`GridError::Dump`] with the original
    /// cause preserved.
    pub fn dump_bytes(&self, format: &str, book: &Book) -> Result<Vec<u8>> {
        let handler = self.registry.resolve(format)?;
        let canonical = self.coercion.pre_dump(book);
        handler
            .dump_to_bytes(&canonical)
            .map_err(|e| GridError::Dump {
                format: format.to_string(),
                source: Box::new(e),
            })
    }

    /// Dump a typed book to serialized text.
    pub fn dump_string(&self, format: &str, book: &Book) -> Result<String> {
        let handler = self.registry.resolve(format)?;
        let canonical = self.coercion.pre_dump(book);
        handler
            .dump_to_string(&canonical)
            .map_err(|e| GridError::Dump {
                format: format.to_string(),
                source: Box::new(e),
            })
    }

    /// Dump a typed book to a file, resolving the handler from the filename
    /// extension.
    pub fn dump_path<P: AsRef<Path>>(&self, path: P, book: &Book) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.dump_bytes(&path.to_string_lossy(), book)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use crate::sheet::Sheet;

    /// A minimal text format: one sheet, one line per row, cells joined by
    /// a pipe. Enough surface to exercise the boundary contract.
    struct PipeHandler;

    impl FormatHandler for PipeHandler {
        fn load_from_bytes(&self, bytes: &[u8]) -> Result<Book> {
            self.load_from_str(&String::from_utf8_lossy(bytes), None)
        }

        fn load_from_str(&self, text: &str, default_sheet_name: Option<&str>) -> Result<Book> {
            let mut sheet = Sheet::new();
            for line in text.lines() {
                sheet.add_row(line.split('|').collect::<Vec<_>>());
            }
            let mut book = Book::new();
            book.add_sheet(default_sheet_name.unwrap_or("Sheet1"), sheet)?;
            Ok(book)
        }

        fn dump_to_bytes(&self, book: &Book) -> Result<Vec<u8>> {
            self.dump_to_string(book).map(String::into_bytes)
        }

        fn dump_to_string(&self, book: &Book) -> Result<String> {
            let sheet = book.active_sheet()?;
            let lines: Vec<String> = sheet
                .rows()
                .map(|row| {
                    row.iter()
                        .map(CellValue::as_str)
                        .collect::<Vec<_>>()
                        .join("|")
                })
                .collect();
            Ok(lines.join("\n"))
        }

        fn extension(&self) -> &str {
            "psv"
        }

        fn mime_type(&self) -> &str {
            "text/plain"
        }
    }

    /// A handler that always fails, for error-wrapping tests.
    struct BrokenHandler;

    impl FormatHandler for BrokenHandler {
        fn load_from_bytes(&self, _bytes: &[u8]) -> Result<Book> {
            Err(GridError::Parse("corrupt input".to_string()))
        }

        fn load_from_str(&self, _text: &str, _default: Option<&str>) -> Result<Book> {
            Err(GridError::Parse("corrupt input".to_string()))
        }

        fn dump_to_bytes(&self, _book: &Book) -> Result<Vec<u8>> {
            Err(GridError::Serialize("cannot write".to_string()))
        }

        fn dump_to_string(&self, _book: &Book) -> Result<String> {
            Err(GridError::Serialize("cannot write".to_string()))
        }

        fn extension(&self) -> &str {
            "bad"
        }

        fn mime_type(&self) -> &str {
            "application/octet-stream"
        }
    }

    fn registry() -> FormatRegistry {
        let mut registry = FormatRegistry::new();
        registry.register("psv", Box::new(PipeHandler));
        registry.register("bad", Box::new(BrokenHandler));
        registry
    }

    #[test]
    fn test_resolve_by_id_and_filename() {
        let registry = registry();
        assert_eq!(registry.resolve("psv").unwrap().extension(), "psv");
        assert_eq!(registry.resolve("data.psv").unwrap().extension(), "psv");
        assert_eq!(registry.resolve("DIR/REPORT.PSV").unwrap().extension(), "psv");
    }

    #[test]
    fn test_resolve_unknown_format() {
        let registry = registry();
        let result = registry.resolve("report.xyz");
        assert!(matches!(result, Err(GridError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_supported_formats_in_registration_order() {
        let registry = registry();
        assert_eq!(registry.supported_formats(), vec!["psv", "bad"]);
    }

    #[test]
    fn test_loader_applies_inference() {
        let registry = registry();
        let coercion = TypeCoercion::new();
        let loader = Loader::new(&registry, &coercion);

        let book = loader
            .load_str("psv", "id|flag\n1|true", Some("import"))
            .unwrap();

        let sheet = book.get_sheet("import").unwrap();
        assert_eq!(sheet.get(1, 0), Some(&CellValue::Int(1)));
        assert_eq!(sheet.get(1, 1), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_dumper_applies_canonicalization() {
        let registry = registry();
        let coercion = TypeCoercion::new();
        let dumper = Dumper::new(&registry, &coercion);

        let mut book = Book::new();
        book.add_sheet(
            "out",
            Sheet::from_data(vec![vec![CellValue::Bool(true), CellValue::Null]]),
        )
        .unwrap();

        let text = dumper.dump_string("psv", &book).unwrap();
        assert_eq!(text, "true|");
        // The caller's book keeps its rich values.
        assert_eq!(
            book.get_sheet("out").unwrap().get(0, 0),
            Some(&CellValue::Bool(true))
        );
    }

    #[test]
    fn test_handler_failures_are_wrapped() {
        let registry = registry();
        let coercion = TypeCoercion::new();
        let loader = Loader::new(&registry, &coercion);
        let dumper = Dumper::new(&registry, &coercion);

        let load_err = loader.load_bytes("bad", b"x").unwrap_err();
        assert!(matches!(load_err, GridError::Load { .. }));
        assert!(load_err.to_string().contains("corrupt input"));

        let dump_err = dumper.dump_string("bad", &Book::new()).unwrap_err();
        assert!(matches!(dump_err, GridError::Dump { .. }));
        assert!(dump_err.to_string().contains("cannot write"));
    }

    #[test]
    fn test_format_key() {
        assert_eq!(format_key("csv"), "csv");
        assert_eq!(format_key("data.csv"), "csv");
        assert_eq!(format_key("a/b/data.tar.gz"), "gz");
        assert_eq!(format_key("XLSX"), "xlsx");
    }
}
