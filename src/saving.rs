use crate::error::{Result, StoreError};
use crate::loader;
use crate::table::{CellValue, Table};
use crate::workbook::Workbook;
use chrono::{NaiveDateTime, Timelike};
use log::{info, warn};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use std::io::ErrorKind;
use std::path::Path;

/// Replace one sheet of an existing workbook file
///
/// Every sheet of the file is read back, the named sheet is swapped for
/// `table` (or appended when missing), and the whole workbook is written out
/// again. Values of the other sheets are carried over unchanged.
///
/// # Arguments
/// * `table` - New contents of the sheet
/// * `filepath` - Path to the `.xlsx` file
/// * `sheet_name` - Sheet to replace
///
/// # Errors
/// * `StoreError::NotFound` when the workbook does not exist
/// * `StoreError::Permission` when the file is locked or read-only
pub fn save_sheet(table: &Table, filepath: impl AsRef<Path>, sheet_name: &str) -> Result<()> {
    let path = filepath.as_ref();
    let mut workbook = loader::load_workbook(path).map_err(|e| permission_or(path, e))?;
    workbook.insert(sheet_name, table.clone());
    save_workbook(&workbook, path)?;

    info!(
        "Saved sheet '{}' ({} rows) to {}",
        sheet_name,
        table.len(),
        path.display()
    );
    Ok(())
}

/// Write a whole workbook to disk, creating or truncating the file
pub fn save_workbook(workbook: &Workbook, filepath: impl AsRef<Path>) -> Result<()> {
    let path = filepath.as_ref();
    let buffer = to_xlsx(workbook)?;

    std::fs::write(path, buffer).map_err(|e| {
        warn!("Failed to write {}: {}", path.display(), e);
        match e.kind() {
            ErrorKind::PermissionDenied => StoreError::Permission {
                path: path.to_path_buf(),
            },
            _ => StoreError::Io(e),
        }
    })
}

/// Serialize a workbook to XLSX bytes
pub fn to_xlsx(workbook: &Workbook) -> Result<Vec<u8>> {
    let mut xlsx = XlsxWorkbook::new();

    for (name, table) in workbook.sheets() {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(name)?;
        write_table(&mut worksheet, table)?;
        xlsx.push_worksheet(worksheet);
    }

    Ok(xlsx.save_to_buffer()?)
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let (top, left) = table.origin();

    for (c, name) in table.columns().iter().enumerate() {
        worksheet.write_string(top, left + c as u16, name)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let row_num = top + 1 + r as u32;
        for (c, value) in row.iter().enumerate() {
            let col = left + c as u16;
            match value {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row_num, col, *n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
                CellValue::Date(dt) => {
                    let format = if dt.num_seconds_from_midnight() == 0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_number_with_format(row_num, col, excel_serial(dt), format)?;
                }
            }
        }
    }

    Ok(())
}

/// Days since the 1900-system epoch (1899-12-30), with the time as a fraction.
pub fn excel_serial(dt: &NaiveDateTime) -> f64 {
    // 25569 days between the Excel epoch and the Unix epoch
    dt.and_utc().timestamp_millis() as f64 / 86_400_000.0 + 25_569.0
}

fn permission_or(path: &Path, err: StoreError) -> StoreError {
    match err {
        StoreError::Io(io) if io.kind() == ErrorKind::PermissionDenied => StoreError::Permission {
            path: path.to_path_buf(),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_excel_serial() {
        let dt = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(excel_serial(&dt), 25_569.0);

        let noon = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(excel_serial(&noon), 45_292.5);
    }
}
