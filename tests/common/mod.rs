#![allow(dead_code)]

use player_sheets::saving::save_workbook;
use player_sheets::{CellValue, Table, Workbook, WorkbookStore};
use std::path::PathBuf;
use tempfile::TempDir;

pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

pub fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

/// A season sheet with five players.
pub fn season(offset: f64) -> Table {
    let columns = ["Player Name", "Team", "Matches Played", "Matches Won"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    Table::from_rows(
        columns,
        vec![
            vec![text("Ann"), text("Red"), num(10.0 + offset), num(8.0)],
            vec![text("Ben"), text("Blue"), num(12.0 + offset), num(5.0)],
            vec![text("Cara"), text("Red"), num(9.0 + offset), num(3.0)],
            vec![text("ann "), text("Green"), num(7.0 + offset), num(7.0)],
            vec![text("Dev"), text("Blue"), num(11.0 + offset), num(2.0)],
        ],
    )
}

/// Writes a workbook with the three yearly sheets into a fresh directory.
pub fn sample_store() -> (TempDir, WorkbookStore) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("final.xlsx");

    let mut book = Workbook::new();
    book.insert("2024", season(0.0));
    book.insert("2023", season(1.0));
    book.insert("2022", season(2.0));
    save_workbook(&book, &path).expect("write sample workbook");

    (dir, WorkbookStore::new(path))
}

pub fn missing_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("absent.xlsx");
    (dir, path)
}
