//! Measurement tables read from spreadsheet workbooks.
//!
//! The first row of every sheet holds the column names. Tables are immutable
//! once loaded; every accessor validates the schema it needs and reports the
//! table, column and row that broke it.

use crate::error::{FigureError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Empty => Cell::Empty,
            // dates and error cells carry no measurement
            _ => Cell::Empty,
        }
    }

    /// Text form; integral numbers print without a fractional part so that
    /// subject ids stored as floats compare equal to their text form.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl MeasurementTable {
    /// Build a table from a header and rows. Short rows are padded with
    /// empty cells; long rows are a schema error.
    pub fn from_rows(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<Self> {
        let name = name.into();
        let width = columns.len();
        let mut padded = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(FigureError::schema(
                    &name,
                    format!("row {} has {} cells but only {width} columns", i + 1, row.len()),
                ));
            }
            row.resize(width, Cell::Empty);
            padded.push(row);
        }
        Ok(Self {
            name,
            columns,
            rows: padded,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                FigureError::schema(
                    &self.name,
                    format!(
                        "missing column '{column}' (have: {})",
                        self.columns.join(", ")
                    ),
                )
            })
    }

    /// Fail early unless every listed column is present.
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        for column in columns {
            self.column_index(column)?;
        }
        Ok(())
    }

    /// Numeric column. Empty cells read as `NaN`; text that does not parse
    /// as a number is a schema error.
    pub fn numeric(&self, column: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match &row[idx] {
                Cell::Number(n) => Ok(*n),
                Cell::Empty => Ok(f64::NAN),
                Cell::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                    FigureError::schema(
                        &self.name,
                        format!("column '{column}' row {}: '{s}' is not a number", i + 2),
                    )
                }),
            })
            .collect()
    }

    pub fn text(&self, column: &str) -> Result<Vec<String>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| row[idx].as_text()).collect())
    }

    /// Rows whose `column` reads as `value`.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<MeasurementTable> {
        let idx = self.column_index(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| row[idx].as_text() == value)
            .cloned()
            .collect();
        Ok(MeasurementTable {
            name: format!("{}[{column}={value}]", self.name),
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Mean of `value` per distinct key tuple, in order of first appearance.
    /// `NaN` values are skipped; groups with no finite value yield `NaN`.
    pub fn group_mean(&self, keys: &[&str], value: &str) -> Result<Vec<(Vec<String>, f64)>> {
        let key_cols = keys
            .iter()
            .map(|k| self.text(k))
            .collect::<Result<Vec<_>>>()?;
        let values = self.numeric(value)?;

        let mut groups: Vec<(Vec<String>, f64, usize)> = Vec::new();
        for (row, v) in values.iter().enumerate() {
            let key: Vec<String> = key_cols.iter().map(|col| col[row].clone()).collect();
            let slot = match groups.iter().position(|(k, _, _)| *k == key) {
                Some(pos) => pos,
                None => {
                    groups.push((key, 0.0, 0));
                    groups.len() - 1
                }
            };
            if v.is_finite() {
                groups[slot].1 += v;
                groups[slot].2 += 1;
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, sum, n)| {
                let mean = if n > 0 { sum / n as f64 } else { f64::NAN };
                (key, mean)
            })
            .collect())
    }

    /// The last `n` columns as a row-major numeric matrix.
    pub fn trailing_numeric_columns(&self, n: usize) -> Result<Vec<Vec<f64>>> {
        if n > self.columns.len() {
            return Err(FigureError::schema(
                &self.name,
                format!(
                    "expected at least {n} trailing value columns, found {} columns",
                    self.columns.len()
                ),
            ));
        }
        let start = self.columns.len() - n;
        let cols = self.columns[start..]
            .iter()
            .map(|c| self.numeric(c))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.rows.len())
            .map(|r| cols.iter().map(|c| c[r]).collect())
            .collect())
    }
}

/// All sheets of one workbook, in workbook order, keyed by sheet name.
#[derive(Debug, Clone)]
pub struct Workbook {
    path: PathBuf,
    sheets: Vec<(String, MeasurementTable)>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(FigureError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let spreadsheet_err = |reason: String| FigureError::Spreadsheet {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut sheets = Vec::new();
        for sheet in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&sheet)
                .map_err(|e| spreadsheet_err(e.to_string()))?;
            let mut rows = range.rows();
            let columns: Vec<String> = match rows.next() {
                Some(header) => header
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| match Cell::from_data(cell) {
                        Cell::Empty => format!("Unnamed: {i}"),
                        other => other.as_text(),
                    })
                    .collect(),
                None => Vec::new(),
            };
            let body: Vec<Vec<Cell>> = rows
                .map(|row| row.iter().map(Cell::from_data).collect())
                .collect();
            debug!(
                file = %file,
                sheet = %sheet,
                rows = body.len(),
                columns = columns.len(),
                "loaded sheet"
            );
            let table = MeasurementTable::from_rows(format!("{file}:{sheet}"), columns, body)?;
            sheets.push((sheet, table));
        }

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Result<&MeasurementTable> {
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, table)| table)
            .ok_or_else(|| {
                FigureError::schema(
                    self.path.display().to_string(),
                    format!(
                        "missing sheet '{name}' (have: {})",
                        self.sheet_names().join(", ")
                    ),
                )
            })
    }

    pub fn first_sheet(&self) -> Result<&MeasurementTable> {
        self.sheets.first().map(|(_, table)| table).ok_or_else(|| {
            FigureError::schema(self.path.display().to_string(), "workbook has no sheets")
        })
    }
}
