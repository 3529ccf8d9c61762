use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;

/// A single cell of a sheet.
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

/// Kind of a column, derived from its non-empty values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Date,
    Categorical,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts raw user input into a value fitting `kind`.
    ///
    /// Returns the value together with a flag telling whether the input had
    /// to fall back to text because it did not fit the column.
    pub fn from_input(input: &str, kind: ColumnKind) -> (Self, bool) {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return (CellValue::Empty, false);
        }
        let parsed = match kind {
            ColumnKind::Numeric => trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(CellValue::Number),
            ColumnKind::Boolean => match trimmed.to_lowercase().as_str() {
                "true" | "yes" => Some(CellValue::Bool(true)),
                "false" | "no" => Some(CellValue::Bool(false)),
                _ => None,
            },
            ColumnKind::Date => parse_date(trimmed).map(CellValue::Date),
            ColumnKind::Categorical => return (CellValue::Text(input.to_string()), false),
        };
        match parsed {
            Some(value) => (value, false),
            None => (CellValue::Text(input.to_string()), true),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => {
                // Integers without decimals
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(dt) => {
                if dt.num_seconds_from_midnight() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// One sheet held in memory: a header plus rows of equal width.
#[derive(Clone, Serialize, Debug, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    /// Worksheet position (row, column) of the header's first cell.
    #[serde(skip)]
    origin: (u32, u16),
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
            origin: (0, 0),
        }
    }

    /// Builds a table, padding short rows with empty cells and cutting long ones.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Table {
            columns,
            rows,
            origin: (0, 0),
        }
    }

    /// Anchors the table at `(row, col)` of its worksheet instead of A1.
    pub fn with_origin(mut self, row: u32, col: u16) -> Self {
        self.origin = (row, col);
        self
    }

    pub fn origin(&self) -> (u32, u16) {
        self.origin
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    pub fn column_values(&self, column: &str) -> Option<Vec<&CellValue>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(|r| &r[col]).collect())
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.column_kind_at(self.column_index(column)?)
    }

    pub fn column_kind_at(&self, col: usize) -> Option<ColumnKind> {
        if col >= self.columns.len() {
            return None;
        }
        Some(kind_of(self.rows.iter().map(|r| &r[col])))
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// Overwrites a cell. Returns false when the position is out of range.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Removes the rows at `indices`, keeping the order of the rest.
    pub fn remove_rows(&mut self, indices: &[usize]) -> usize {
        let before = self.rows.len();
        let mut index = 0;
        self.rows.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
        before - self.rows.len()
    }

    /// Copies the rows at `indices` into a new table with the same header.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
            origin: self.origin,
        }
    }

    /// Rows rendered as display strings, for templates and CSV.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }
}

fn kind_of<'a>(values: impl Iterator<Item = &'a CellValue>) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        let this = match value {
            CellValue::Empty => continue,
            CellValue::Number(_) => ColumnKind::Numeric,
            CellValue::Bool(_) => ColumnKind::Boolean,
            CellValue::Date(_) => ColumnKind::Date,
            CellValue::Text(_) => return ColumnKind::Categorical,
        };
        match kind {
            None => kind = Some(this),
            Some(k) if k != this => return ColumnKind::Categorical,
            _ => {}
        }
    }
    kind.unwrap_or(ColumnKind::Numeric)
}
