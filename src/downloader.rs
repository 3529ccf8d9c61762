use crate::table::Table;

/// Convert a sheet to CSV format
///
/// The header row holds the column names; values are written as they are
/// displayed. Fields containing commas, quotes or newlines are quoted.
///
/// # Arguments
/// * `table` - Reference to the sheet to convert
///
/// # Returns
/// * `String` - CSV content
///
/// # Examples
/// ```
/// use player_sheets::table::{CellValue, Table};
/// use player_sheets::downloader::to_csv;
///
/// let mut table = Table::new(vec!["Player Name".to_string(), "Wins".to_string()]);
/// table.push_row(vec![CellValue::Text("Lee, Jo".to_string()), CellValue::Number(4.0)]);
/// assert_eq!(to_csv(&table), "Player Name,Wins\n\"Lee, Jo\",4\n");
/// ```
pub fn to_csv(table: &Table) -> String {
    let mut csv_content = String::new();

    push_record(&mut csv_content, table.columns().iter().map(String::as_str));
    for row in table.display_rows() {
        push_record(&mut csv_content, row.iter().map(String::as_str));
    }

    csv_content
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, value) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Escape commas, quotes, newlines as needed
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            let escaped = value.replace('"', "\"\"");
            out.push_str(&format!("\"{}\"", escaped));
        } else {
            out.push_str(value);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    #[test]
    fn test_quotes_are_doubled() {
        let mut table = Table::new(vec!["Note".to_string()]);
        table.push_row(vec![CellValue::Text("said \"hi\"".to_string())]);
        table.push_row(vec![CellValue::Empty]);
        assert_eq!(to_csv(&table), "Note\n\"said \"\"hi\"\"\"\n\n");
    }
}
