use crate::cell::CellValue;
use crate::error::{GridError, Result};
use crate::sheet::Sheet;
use indexmap::IndexMap;

/// A book containing multiple sheets (preserves insertion order).
///
/// Insertion order determines output order for formats that serialize
/// multiple sheets. One sheet is the *active* selection, tracked by name;
/// there is no active sheet only while the book is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    sheets: IndexMap<String, Sheet>,
    active_sheet: Option<String>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Book {
            sheets: IndexMap::new(),
            active_sheet: None,
        }
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Check if a sheet exists
    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    // ===== Sheet Access =====

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| GridError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Get a mutable sheet by name
    pub fn get_sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(name)
            .ok_or_else(|| GridError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Get a sheet by index (0-based)
    pub fn get_sheet_by_index(&self, index: usize) -> Result<&Sheet> {
        self.sheets
            .get_index(index)
            .map(|(_, sheet)| sheet)
            .ok_or_else(|| GridError::SheetNotFound {
                name: format!("index {index}"),
            })
    }

    /// Get the name of the active sheet, if any
    #[must_use]
    pub fn active_sheet_name(&self) -> Option<&str> {
        self.active_sheet.as_deref()
    }

    /// Get the active sheet.
    ///
    /// Fails with [`GridError::NoActiveSheet`] only on an empty book; every
    /// mutation path keeps the activation pointing at an existing sheet.
    pub fn active_sheet(&self) -> Result<&Sheet> {
        let name = self.active_sheet.as_ref().ok_or(GridError::NoActiveSheet)?;
        self.sheets
            .get(name)
            .ok_or_else(|| GridError::SheetNotFound { name: name.clone() })
    }

    /// Get the active sheet mutably
    pub fn active_sheet_mut(&mut self) -> Result<&mut Sheet> {
        let name = self
            .active_sheet
            .clone()
            .ok_or(GridError::NoActiveSheet)?;
        self.sheets
            .get_mut(&name)
            .ok_or(GridError::SheetNotFound { name })
    }

    /// Set the active sheet by name
    pub fn set_active_sheet(&mut self, name: &str) -> Result<()> {
        if !self.sheets.contains_key(name) {
            return Err(GridError::SheetNotFound {
                name: name.to_string(),
            });
        }
        self.active_sheet = Some(name.to_string());
        Ok(())
    }

    // ===== Sheet Management =====

    /// Add a sheet to the book.
    ///
    /// The sheet is renamed to `name`, and the first sheet added becomes the
    /// active sheet.
    pub fn add_sheet(&mut self, name: &str, sheet: Sheet) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Err(GridError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }

        let mut sheet = sheet;
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);

        // Set as active if first sheet
        if self.active_sheet.is_none() {
            self.active_sheet = Some(name.to_string());
        }

        Ok(())
    }

    /// Build a sheet from raw rows and add it.
    ///
    /// `associative` converts the rows using row 0 as the header.
    pub fn create_sheet<T: Into<CellValue>>(
        &mut self,
        name: &str,
        rows: Vec<Vec<T>>,
        associative: bool,
    ) -> Result<()> {
        let mut sheet = Sheet::from_data(rows);
        if associative {
            sheet = sheet.to_associative();
        }
        self.add_sheet(name, sheet)
    }

    /// Remove a sheet by name.
    ///
    /// Removing the active sheet re-activates the first remaining sheet, or
    /// clears the activation when none remain.
    pub fn remove_sheet(&mut self, name: &str) -> Result<Sheet> {
        let sheet = self
            .sheets
            .shift_remove(name)
            .ok_or_else(|| GridError::SheetNotFound {
                name: name.to_string(),
            })?;

        if self.active_sheet.as_deref() == Some(name) {
            self.active_sheet = self.sheets.keys().next().cloned();
        }

        Ok(sheet)
    }

    /// Rename a sheet (preserves position in sheet order)
    pub fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if !self.sheets.contains_key(old_name) {
            return Err(GridError::SheetNotFound {
                name: old_name.to_string(),
            });
        }

        if self.sheets.contains_key(new_name) {
            return Err(GridError::SheetAlreadyExists {
                name: new_name.to_string(),
            });
        }

        if let Some(index) = self.sheets.get_index_of(old_name) {
            let (_, mut sheet) = self.sheets.shift_remove_index(index).unwrap();
            sheet.set_name(new_name);
            self.sheets.shift_insert(index, new_name.to_string(), sheet);

            if self.active_sheet.as_deref() == Some(old_name) {
                self.active_sheet = Some(new_name.to_string());
            }
        }

        Ok(())
    }

    // ===== Bulk Conversion =====

    /// Create a book from a mapping of sheet name -> raw rows.
    ///
    /// Always creates indexed sheets: whether rows were records is not
    /// recoverable from the bare literal.
    pub fn from_array<T: Into<CellValue>>(sheets: IndexMap<String, Vec<Vec<T>>>) -> Result<Self> {
        let mut book = Book::new();
        for (name, data) in sheets {
            let sheet = Sheet::from_data(data);
            book.add_sheet(&name, sheet)?;
        }
        Ok(book)
    }

    /// Convert the book into a mapping of sheet name -> raw rows.
    #[must_use]
    pub fn to_array(&self) -> IndexMap<String, Vec<Vec<CellValue>>> {
        self.sheets
            .iter()
            .map(|(name, sheet)| (name.clone(), sheet.data().clone()))
            .collect()
    }

    // ===== Iteration =====

    /// Iterate over sheets
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over sheets mutably
    pub fn sheets_mut(&mut self) -> impl Iterator<Item = (&str, &mut Sheet)> {
        self.sheets.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply a function to each sheet mutably.
    pub fn for_each_sheet_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Sheet),
    {
        for sheet in self.sheets.values_mut() {
            f(sheet);
        }
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for Book {
    type Item = (String, Sheet);
    type IntoIter = indexmap::map::IntoIter<String, Sheet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.into_iter()
    }
}
