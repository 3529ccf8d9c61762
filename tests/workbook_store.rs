mod common;

use common::{missing_path, num, sample_store, text};
use calamine::{Reader, Xlsx, open_workbook};
use player_sheets::saving::{excel_serial, save_workbook};
use player_sheets::{CellValue, StoreError, Table, Workbook, WorkbookStore};
use std::fs;

#[test]
fn test_load_years_reads_all_three_sheets() {
    let (_dir, store) = sample_store();
    let book = store.load_years().expect("load");

    assert_eq!(book.sheet_names(), vec!["2024", "2023", "2022"]);
    let table = book.get("2023").expect("2023 sheet");
    assert_eq!(table.columns()[0], "Player Name");
    assert_eq!(table.len(), 5);
    assert_eq!(table.cell(0, "Matches Played"), Some(&num(11.0)));
    println!("✓ Three yearly sheets loaded");
}

#[test]
fn test_missing_file_is_not_found() {
    let (_dir, path) = missing_path();
    let store = WorkbookStore::new(&path);

    let err = store.load("2024").unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(err.user_message(), "File not found. Please provide the correct file path.");
}

#[test]
fn test_garbage_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("final.xlsx");
    fs::write(&path, b"this is not a zip archive").unwrap();

    let err = WorkbookStore::new(&path).load("2024").unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got {:?}", err);
    assert_eq!(err.user_message(), "Error parsing the Excel file. Please check the file format.");
}

#[test]
fn test_unknown_sheet() {
    let (_dir, store) = sample_store();
    match store.load("2019") {
        Err(StoreError::SheetNotFound(name)) => assert_eq!(name, "2019"),
        other => panic!("expected SheetNotFound, got {:?}", other),
    }
}

#[test]
fn test_save_replaces_only_target_sheet() {
    let (_dir, store) = sample_store();
    let before = store.load_years().unwrap();

    let mut table = Table::new(vec!["Player Name".into(), "Joined".into(), "Active".into()]);
    let joined = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    table.push_row(vec![text("Zoe"), CellValue::Date(joined), CellValue::Bool(true)]);
    table.push_row(vec![text("Yan"), CellValue::Empty, CellValue::Bool(false)]);
    store.save(&table, "2023").expect("save");

    let after = store.load_years().unwrap();
    assert_eq!(after.get("2023"), Some(&table));
    assert_eq!(after.get("2024"), before.get("2024"));
    assert_eq!(after.get("2022"), before.get("2022"));
    println!("✓ Saving 2023 left 2024 and 2022 untouched");
}

#[test]
fn test_save_then_load_keeps_values() {
    let (_dir, store) = sample_store();
    let mut table = store.load("2024").unwrap();
    table.set_cell(1, 3, num(6.5));
    store.save(&table, "2024").unwrap();

    let reloaded = store.load("2024").unwrap();
    assert_eq!(reloaded, table);
    assert_eq!(reloaded.cell(1, "Matches Won").map(|c| c.to_string()), Some("6.5".into()));
}

#[test]
fn test_save_to_missing_file() {
    let (_dir, path) = missing_path();
    let store = WorkbookStore::new(&path);
    let err = store.save(&Table::new(vec!["A".into()]), "2024").unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn test_read_only_file_is_permission_error() {
    let (_dir, store) = sample_store();
    let mut perms = fs::metadata(store.path()).unwrap().permissions();
    perms.set_readonly(true);
    fs::set_permissions(store.path(), perms).unwrap();

    // Privileged users can write regardless of the mode bits
    if fs::OpenOptions::new().write(true).open(store.path()).is_ok() {
        println!("skipping: read-only mode is not enforced for this user");
        return;
    }

    let table = store.load("2024").unwrap();
    let err = store.save(&table, "2024").unwrap_err();
    assert!(matches!(err, StoreError::Permission { .. }), "got {:?}", err);
    assert_eq!(err.user_message(), "Error saving the file. Please check file permissions.");
}

#[test]
fn test_excel_serial_dates() {
    let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(excel_serial(&epoch), 25_569.0);
}

#[test]
fn test_save_keeps_other_sheet_origin() {
    let (dir, _) = missing_path();
    let path = dir.path().join("final.xlsx");

    let mut book = Workbook::new();
    book.insert("2024", common::season(0.0));
    book.insert("2023", common::season(1.0));
    book.insert("2022", common::season(2.0));
    let notes = Table::from_rows(
        vec!["Note".into(), "Author".into()],
        vec![vec![text("bring cones"), text("Ben")]],
    )
    .with_origin(4, 2);
    book.insert("Notes", notes.clone());
    save_workbook(&book, &path).unwrap();

    let store = WorkbookStore::new(&path);
    let mut table = store.load("2024").unwrap();
    table.set_cell(0, 3, num(9.0));
    store.save(&table, "2024").unwrap();

    let mut xlsx: Xlsx<_> = open_workbook(&path).unwrap();
    let range = xlsx.worksheet_range("Notes").unwrap();
    assert_eq!(range.start(), Some((4, 2)));
    assert_eq!(store.load("Notes").unwrap(), notes);
    println!("✓ Notes still anchored at C5 after saving 2024");
}

#[test]
fn test_offset_target_sheet_round_trips() {
    let (_dir, store) = sample_store();
    let table = common::season(0.0).with_origin(2, 1);
    store.save(&table, "2023").unwrap();

    let mut reloaded = store.load("2023").unwrap();
    assert_eq!(reloaded.origin(), (2, 1));
    assert_eq!(reloaded, table);

    reloaded.set_cell(4, 2, num(30.0));
    store.save(&reloaded, "2023").unwrap();
    let again = store.load("2023").unwrap();
    assert_eq!(again.origin(), (2, 1));
    assert_eq!(again.cell(4, "Matches Played"), Some(&num(30.0)));
}
