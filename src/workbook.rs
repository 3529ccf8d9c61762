use crate::error::Result;
use crate::table::Table;
use crate::{loader, saving};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The yearly sheets the application works with, in sidebar order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum SheetYear {
    #[default]
    Y2024,
    Y2023,
    Y2022,
}

impl SheetYear {
    pub const ALL: [SheetYear; 3] = [SheetYear::Y2024, SheetYear::Y2023, SheetYear::Y2022];

    pub fn as_str(&self) -> &'static str {
        match self {
            SheetYear::Y2024 => "2024",
            SheetYear::Y2023 => "2023",
            SheetYear::Y2022 => "2022",
        }
    }

    pub fn names() -> [&'static str; 3] {
        Self::ALL.map(|y| y.as_str())
    }
}

impl fmt::Display for SheetYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SheetYear {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|y| y.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown sheet: {}", s))
    }
}

impl TryFrom<String> for SheetYear {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Named sheets held in memory, in workbook order.
#[derive(Clone, Debug, Default)]
pub struct Workbook {
    sheets: Vec<(String, Table)>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook { sheets: Vec::new() }
    }

    /// Inserts a sheet, replacing the contents of an existing sheet with the same name.
    pub fn insert(&mut self, name: &str, table: Table) {
        match self.sheets.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = table,
            None => self.sheets.push((name.to_string(), table)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn take(&mut self, name: &str) -> Option<Table> {
        let pos = self.sheets.iter().position(|(n, _)| n == name)?;
        Some(self.sheets.remove(pos).1)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// The workbook file behind the application.
#[derive(Clone, Debug)]
pub struct WorkbookStore {
    path: PathBuf,
}

impl WorkbookStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        WorkbookStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self, sheet_name: &str) -> Result<Table> {
        loader::load_sheet(&self.path, sheet_name)
    }

    /// Reads all three yearly sheets.
    pub fn load_years(&self) -> Result<Workbook> {
        loader::load_sheets(&self.path, &SheetYear::names())
    }

    pub fn save(&self, table: &Table, sheet_name: &str) -> Result<()> {
        saving::save_sheet(table, &self.path, sheet_name)
    }
}
