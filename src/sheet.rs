use crate::cell::CellValue;
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Column key of a visited cell: a position on indexed sheets, a name on
/// associative sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColKey<'a> {
    Index(usize),
    Name(&'a str),
}

/// A sheet representing an ordered grid of rows (row-major storage).
///
/// A sheet is either *indexed* (column keys are contiguous integers and row 0
/// conventionally holds the header labels) or *associative* (column keys are
/// strings and every row is a logical record). The key shape is uniform across
/// a sheet: `columns` is `Some(_)` exactly when the sheet is associative, and
/// then holds the ordered union of keys seen across all records, in order of
/// first appearance. Associative sheets store no header row in `data`.
///
/// Malformed access never fails: out-of-range reads return `None`, writes
/// auto-extend, and accessors with the wrong key shape for the sheet degrade
/// to empty results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    columns: Option<Vec<String>>,
}

impl Sheet {
    /// Create a new empty indexed sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty indexed sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            columns: None,
        }
    }

    /// Create an indexed sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Sheet {
            name: "Sheet1".to_string(),
            data: converted,
            columns: None,
        }
    }

    /// Create an associative sheet from a list of records.
    ///
    /// The column list is the union of keys across all records, ordered by
    /// first appearance.
    #[must_use]
    pub fn from_records(records: Vec<IndexMap<String, CellValue>>) -> Self {
        let mut sheet = Sheet::with_name("Sheet1");
        sheet.columns = Some(Vec::new());
        for record in records {
            sheet.add_record(record);
        }
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Check whether rows are keyed by column name rather than position
    #[must_use]
    pub fn is_associative(&self) -> bool {
        self.columns.is_some()
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        match &self.columns {
            Some(columns) => columns.len(),
            None => self.data.first().map_or(0, Vec::len),
        }
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get column names (associative sheets only)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.columns.as_ref()
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based).
    ///
    /// Returns `None` when the cell is not present.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.data.get(row)?.get(col)
    }

    /// Get a cell value by row index and column name (associative sheets).
    #[must_use]
    pub fn get_by_name(&self, row: usize, key: &str) -> Option<&CellValue> {
        let col = self.columns.as_ref()?.iter().position(|c| c == key)?;
        self.get(row, col)
    }

    /// Set a cell value by row and column index (0-based).
    ///
    /// Auto-extends the sheet, creating empty rows and padding the target row
    /// with nulls as needed. On an associative sheet a positional write past
    /// the known columns is ignored, since the cell would have no key.
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) {
        if let Some(columns) = &self.columns {
            if col >= columns.len() {
                return;
            }
        }
        if self.data.len() <= row {
            self.data.resize_with(row + 1, Vec::new);
        }
        let target = &mut self.data[row];
        if target.len() <= col {
            target.resize(col + 1, CellValue::Null);
        }
        target[col] = value.into();
    }

    /// Set a cell value by row index and column name (associative sheets).
    ///
    /// An unknown key extends the column union; ignored on indexed sheets.
    pub fn set_by_name<T: Into<CellValue>>(&mut self, row: usize, key: &str, value: T) {
        let Some(columns) = self.columns.as_mut() else {
            return;
        };
        let col = match columns.iter().position(|c| c == key) {
            Some(i) => i,
            None => {
                columns.push(key.to_string());
                columns.len() - 1
            }
        };
        if self.data.len() <= row {
            self.data.resize_with(row + 1, Vec::new);
        }
        let target = &mut self.data[row];
        if target.len() <= col {
            target.resize(col + 1, CellValue::Null);
        }
        target[col] = value.into();
    }

    // ===== Row Operations =====

    /// Append a row at the next row index.
    ///
    /// On an associative sheet the values are aligned positionally to the
    /// column list: short rows are padded with nulls and excess values past
    /// the known columns are dropped.
    pub fn add_row<T: Into<CellValue>>(&mut self, values: Vec<T>) {
        let mut row: Vec<CellValue> = values.into_iter().map(Into::into).collect();
        if let Some(columns) = &self.columns {
            row.truncate(columns.len());
            row.resize(columns.len(), CellValue::Null);
        }
        self.data.push(row);
    }

    /// Append a record keyed by column name.
    ///
    /// On an associative sheet, keys not seen before extend the column union
    /// in order of first appearance. Earlier rows stay short and read back as
    /// not-present for the new key; [`Sheet::to_indexed`] substitutes null
    /// when it materializes them. On an indexed sheet the record's values are
    /// appended positionally.
    pub fn add_record(&mut self, record: IndexMap<String, CellValue>) {
        let Some(columns) = self.columns.as_mut() else {
            self.data.push(record.into_values().collect());
            return;
        };
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
        let row = columns
            .iter()
            .map(|c| record.get(c).cloned().unwrap_or(CellValue::Null))
            .collect();
        self.data.push(row);
    }

    /// Get the header row.
    ///
    /// Indexed sheets return row 0 verbatim (empty when there are no rows);
    /// associative sheets return the derived column union as string cells.
    #[must_use]
    pub fn header_row(&self) -> Vec<CellValue> {
        match &self.columns {
            Some(columns) => columns
                .iter()
                .map(|c| CellValue::String(c.clone()))
                .collect(),
            None => self.data.first().cloned().unwrap_or_default(),
        }
    }

    /// Get the data rows: all rows except the header row for indexed sheets,
    /// every row for associative sheets (no header row is stored).
    #[must_use]
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        if self.is_associative() {
            &self.data
        } else {
            self.data.get(1..).unwrap_or(&[])
        }
    }

    /// Get rows iterator
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get internal data reference
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable internal data reference
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }

    // ===== Key-Shape Conversion =====

    /// Convert to an associative sheet, using row 0 as the header.
    ///
    /// Returns a new sheet; the receiver is untouched. Already-associative
    /// sheets convert to a plain copy. Row 0 supplies the keys positionally
    /// for every subsequent row; rows shorter than the header are padded with
    /// nulls and values past the header are dropped. An indexed sheet with no
    /// rows has no header to use and converts to an empty associative sheet.
    #[must_use]
    pub fn to_associative(&self) -> Sheet {
        if self.is_associative() {
            return self.clone();
        }

        let mut out = Sheet::with_name(&self.name);
        let Some((header, rows)) = self.data.split_first() else {
            out.columns = Some(Vec::new());
            return out;
        };

        let columns: Vec<String> = header.iter().map(CellValue::as_str).collect();
        for row in rows {
            let aligned: Vec<CellValue> = (0..columns.len())
                .map(|i| row.get(i).cloned().unwrap_or(CellValue::Null))
                .collect();
            out.data.push(aligned);
        }
        out.columns = Some(columns);
        out
    }

    /// Convert to an indexed sheet, emitting the derived column union as a
    /// synthetic header row 0.
    ///
    /// Returns a new sheet; the receiver is untouched. Already-indexed sheets
    /// convert to a plain copy. Each record's values are emitted in the fixed
    /// column order, with null substituted for any key the record lacks.
    ///
    /// The column order is the order of first appearance across records, which
    /// is a heuristic: it is stable for a given sheet but depends on which
    /// record introduced each key first.
    #[must_use]
    pub fn to_indexed(&self) -> Sheet {
        let Some(columns) = &self.columns else {
            return self.clone();
        };

        let mut out = Sheet::with_name(&self.name);
        out.data.push(
            columns
                .iter()
                .map(|c| CellValue::String(c.clone()))
                .collect(),
        );
        for row in &self.data {
            out.data.push(
                (0..columns.len())
                    .map(|i| row.get(i).cloned().unwrap_or(CellValue::Null))
                    .collect(),
            );
        }
        out
    }

    // ===== Non-Mutating Selection =====

    /// Return a new sheet keeping only the rows matching the predicate.
    ///
    /// Surviving rows are re-indexed to a contiguous 0-based sequence; the
    /// key shape is unchanged.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Sheet
    where
        F: Fn(usize, &[CellValue]) -> bool,
    {
        let mut out = self.clone();
        out.data = self
            .data
            .iter()
            .enumerate()
            .filter(|(i, row)| predicate(*i, row.as_slice()))
            .map(|(_, row)| row.clone())
            .collect();
        out
    }

    /// Return a new sheet keeping only the named columns, in the given order.
    ///
    /// Requested keys absent from the sheet are silently skipped. Column names
    /// only exist on associative sheets; on an indexed sheet every key is
    /// absent and the result keeps the rows with no columns.
    #[must_use]
    pub fn select_columns(&self, keys: &[&str]) -> Sheet {
        let Some(columns) = &self.columns else {
            let mut out = Sheet::with_name(&self.name);
            out.data = self.data.iter().map(|_| Vec::new()).collect();
            return out;
        };

        let picks: Vec<(usize, String)> = keys
            .iter()
            .filter_map(|k| {
                columns
                    .iter()
                    .position(|c| c == *k)
                    .map(|i| (i, (*k).to_string()))
            })
            .collect();

        let mut out = Sheet::with_name(&self.name);
        out.columns = Some(picks.iter().map(|(_, name)| name.clone()).collect());
        out.data = self
            .data
            .iter()
            .map(|row| {
                picks
                    .iter()
                    .map(|(i, _)| row.get(*i).cloned().unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();
        out
    }

    /// Return a new sheet keeping only the columns at the given positions, in
    /// the given order. Out-of-range positions are silently skipped.
    #[must_use]
    pub fn select_columns_at(&self, indices: &[usize]) -> Sheet {
        let mut out = Sheet::with_name(&self.name);
        let keep: Vec<usize> = match &self.columns {
            Some(columns) => {
                out.columns = Some(
                    indices
                        .iter()
                        .filter_map(|&i| columns.get(i).cloned())
                        .collect(),
                );
                indices
                    .iter()
                    .copied()
                    .filter(|&i| i < columns.len())
                    .collect()
            }
            None => indices.to_vec(),
        };
        out.data = self
            .data
            .iter()
            .map(|row| keep.iter().filter_map(|&i| row.get(i).cloned()).collect())
            .collect();
        out
    }

    // ===== In-Place Transformation =====

    /// Apply a function to every cell in row-major visiting order.
    ///
    /// The callback also receives the cell's row index and column key, so a
    /// transform can target a single row or column. The key carries the
    /// column name on associative sheets and the column position on indexed
    /// ones.
    pub fn map<F>(&mut self, mut f: F)
    where
        F: FnMut(&CellValue, usize, ColKey<'_>) -> CellValue,
    {
        let columns = self.columns.as_deref();
        for (row_idx, row) in self.data.iter_mut().enumerate() {
            for (col_idx, cell) in row.iter_mut().enumerate() {
                let key = match columns.and_then(|c| c.get(col_idx)) {
                    Some(name) => ColKey::Name(name),
                    None => ColKey::Index(col_idx),
                };
                *cell = f(cell, row_idx, key);
            }
        }
    }

    /// Sort every stored row in place with the given comparator.
    ///
    /// On an indexed sheet this includes the header row; filter to
    /// [`Sheet::data_rows`] first if the header must stay put.
    pub fn sort_rows<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&[CellValue], &[CellValue]) -> Ordering,
    {
        self.data.sort_by(|a, b| cmp(a, b));
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
