use crate::error::{Result, StoreError};
use crate::table::{CellValue, Table};
use crate::workbook::Workbook;
use calamine::{Data, Range, Reader, Xlsx, XlsxError, open_workbook};
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

type XlsxReader = Xlsx<BufReader<File>>;

/// Load one sheet from an Excel workbook
///
/// The first row of the sheet is taken as the header; every following row
/// becomes a record.
///
/// # Arguments
/// * `filepath` - Path to the `.xlsx` file
/// * `sheet_name` - Name of the worksheet to read
///
/// # Returns
/// * `Result<Table>` - The sheet contents or a store error
///
/// # Examples
/// ```no_run
/// use player_sheets::loader::load_sheet;
///
/// match load_sheet("final.xlsx", "2024") {
///     Ok(table) => println!("Loaded {} rows", table.len()),
///     Err(e) => eprintln!("{}", e.user_message()),
/// }
/// ```
pub fn load_sheet(filepath: impl AsRef<Path>, sheet_name: &str) -> Result<Table> {
    let path = filepath.as_ref();
    let mut workbook = open(path)?;
    read_sheet(&mut workbook, path, sheet_name)
}

/// Load the named sheets with a single open of the file
pub fn load_sheets(filepath: impl AsRef<Path>, sheet_names: &[&str]) -> Result<Workbook> {
    let path = filepath.as_ref();
    let mut workbook = open(path)?;

    let mut loaded = Workbook::new();
    for name in sheet_names {
        let table = read_sheet(&mut workbook, path, name)?;
        loaded.insert(name, table);
    }
    info!("Loaded {} sheets from {}", loaded.len(), path.display());
    Ok(loaded)
}

/// Load every sheet of the workbook in file order
pub fn load_workbook(filepath: impl AsRef<Path>) -> Result<Workbook> {
    let path = filepath.as_ref();
    let mut workbook = open(path)?;

    let mut loaded = Workbook::new();
    for name in workbook.sheet_names() {
        let table = read_sheet(&mut workbook, path, &name)?;
        loaded.insert(&name, table);
    }
    Ok(loaded)
}

fn open(path: &Path) -> Result<XlsxReader> {
    if !path.exists() {
        return Err(StoreError::NotFound {
            path: path.to_path_buf(),
        });
    }

    open_workbook(path).map_err(|e: XlsxError| match e {
        XlsxError::Io(io) if io.kind() == ErrorKind::NotFound => StoreError::NotFound {
            path: path.to_path_buf(),
        },
        XlsxError::Io(io) => StoreError::Io(io),
        other => StoreError::Parse {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })
}

fn read_sheet(workbook: &mut XlsxReader, path: &Path, sheet_name: &str) -> Result<Table> {
    if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
        return Err(StoreError::SheetNotFound(sheet_name.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            message: format!("sheet '{}': {}", sheet_name, e),
        })?;

    let table = range_to_table(&range);
    debug!(
        "Read sheet '{}': {} columns, {} rows",
        sheet_name,
        table.columns().len(),
        table.len()
    );
    Ok(table)
}

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();

    let columns: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("Unnamed: {}", i),
                other => convert_cell(other).to_string(),
            })
            .collect(),
        None => return Table::default(),
    };

    let records = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    // The range begins at the first used cell, not necessarily A1
    let (row, col) = range.start().unwrap_or((0, 0));
    // Worksheets have at most 16_384 columns
    let col = u16::try_from(col).unwrap_or(u16::MAX);
    Table::from_rows(columns, records).with_origin(row, col)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::Date(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // Store error as text representation
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}
