use crate::error::{Result, ValidationWarning};
use crate::table::{CellValue, ColumnKind, Table};
use crate::workbook::WorkbookStore;
use log::{info, warn};
use serde::Deserialize;
use std::str::FromStr;

/// Column used to find rows for deletion.
pub const PLAYER_NAME_COLUMN: &str = "Player Name";

/// Answer to "Are you sure you want to delete the above rows?".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Confirmation {
    Yes,
    #[default]
    No,
}

impl FromStr for Confirmation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "Yes" => Ok(Confirmation::Yes),
            "No" => Ok(Confirmation::No),
            other => Err(format!("Unknown confirmation: {}", other)),
        }
    }
}

/// One requested cell change, as typed by the user.
#[derive(Clone, Debug, PartialEq)]
pub struct CellEdit {
    pub column: String,
    pub row: String,
    pub value: String,
}

#[derive(Debug)]
pub struct EditReport {
    pub applied: usize,
    pub warnings: Vec<ValidationWarning>,
    /// Result of writing the sheet back; `None` when nothing was written.
    pub saved: Option<Result<()>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted { removed: usize },
    Aborted { matched: usize },
    Skipped(ValidationWarning),
}

#[derive(Debug)]
pub struct DeleteReport {
    pub outcome: DeleteOutcome,
    pub saved: Option<Result<()>>,
}

/// Splits "Wins, Losses" into trimmed column names, dropping blanks.
pub fn parse_column_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn coerce(table: &Table, col: usize, input: &str) -> (CellValue, Option<ValidationWarning>) {
    let kind = table.column_kind_at(col).unwrap_or(ColumnKind::Categorical);
    let column = table.columns().get(col).map(String::as_str).unwrap_or_default();
    let (value, fell_back) = CellValue::from_input(input, kind);
    let warning = fell_back.then(|| ValidationWarning::StoredAsText {
        column: column.to_string(),
        value: input.to_string(),
    });
    (value, warning)
}

/// Appends one record built from `inputs`, given in column order.
///
/// Columns without an input get an empty cell; extra inputs are ignored.
pub fn append_record(table: &mut Table, inputs: &[String]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut record = Vec::with_capacity(table.columns().len());

    for col in 0..table.columns().len() {
        let input = inputs.get(col).map(String::as_str).unwrap_or("");
        let (value, warning) = coerce(table, col, input);
        warnings.extend(warning);
        record.push(value);
    }

    table.push_row(record);
    warnings
}

/// Applies each edit whose column exists and whose row index is in range.
///
/// Returns how many cells changed and the warnings for the skipped edits.
pub fn apply_edits(table: &mut Table, edits: &[CellEdit]) -> (usize, Vec<ValidationWarning>) {
    let mut applied = 0;
    let mut warnings = Vec::new();

    for edit in edits {
        let Some(col) = table.column_index(&edit.column) else {
            warnings.push(ValidationWarning::UnknownColumn(edit.column.clone()));
            continue;
        };

        let row = match edit.row.trim().parse::<i64>() {
            Ok(row) => row,
            Err(_) => {
                warnings.push(ValidationWarning::InvalidRowIndex {
                    column: edit.column.clone(),
                    input: edit.row.clone(),
                });
                continue;
            }
        };
        if row < 0 || row as usize >= table.len() {
            warnings.push(ValidationWarning::RowOutOfRange {
                column: edit.column.clone(),
                row,
                len: table.len(),
            });
            continue;
        }

        let (value, warning) = coerce(table, col, &edit.value);
        warnings.extend(warning);
        if table.set_cell(row as usize, col, value) {
            applied += 1;
        }
    }

    (applied, warnings)
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Indices of rows whose player name equals `name`, ignoring case and
/// surrounding whitespace.
pub fn find_player_rows(
    table: &Table,
    name: &str,
) -> std::result::Result<Vec<usize>, ValidationWarning> {
    let Some(values) = table.column_values(PLAYER_NAME_COLUMN) else {
        return Err(ValidationWarning::MissingColumn(PLAYER_NAME_COLUMN.to_string()));
    };

    let wanted = normalize_name(name);
    let matches: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| match v {
            CellValue::Empty => false,
            other => normalize_name(&other.to_string()) == wanted,
        })
        .map(|(i, _)| i)
        .collect();

    if matches.is_empty() {
        return Err(ValidationWarning::NoMatchingPlayer(name.trim().to_string()));
    }
    Ok(matches)
}

/// Removes every row matching `name` when the user confirmed.
pub fn remove_player(table: &mut Table, name: &str, confirmation: Confirmation) -> DeleteOutcome {
    let matches = match find_player_rows(table, name) {
        Ok(matches) => matches,
        Err(warning) => return DeleteOutcome::Skipped(warning),
    };

    match confirmation {
        Confirmation::Yes => DeleteOutcome::Deleted {
            removed: table.remove_rows(&matches),
        },
        Confirmation::No => DeleteOutcome::Aborted {
            matched: matches.len(),
        },
    }
}

/// Create, update and delete against one sheet, persisting after each change.
pub struct RecordEditor<'a> {
    store: &'a WorkbookStore,
    sheet: &'a str,
}

impl<'a> RecordEditor<'a> {
    pub fn new(store: &'a WorkbookStore, sheet: &'a str) -> Self {
        RecordEditor { store, sheet }
    }

    fn persist(&self, table: &Table) -> Result<()> {
        let result = self.store.save(table, self.sheet);
        if let Err(e) = &result {
            warn!("Saving sheet '{}' failed: {}", self.sheet, e);
        }
        result
    }

    pub fn create(&self, table: &mut Table, inputs: &[String]) -> EditReport {
        let warnings = append_record(table, inputs);
        info!("Appended a record to sheet '{}'", self.sheet);
        EditReport {
            applied: 1,
            warnings,
            saved: Some(self.persist(table)),
        }
    }

    /// Applies the edits, then writes the sheet once whatever was applied.
    pub fn update(&self, table: &mut Table, edits: &[CellEdit]) -> EditReport {
        let (applied, warnings) = apply_edits(table, edits);
        for warning in &warnings {
            warn!("Update on sheet '{}': {}", self.sheet, warning);
        }
        info!("Updated {} cells in sheet '{}'", applied, self.sheet);
        EditReport {
            applied,
            warnings,
            saved: Some(self.persist(table)),
        }
    }

    pub fn delete(&self, table: &mut Table, name: &str, confirmation: Confirmation) -> DeleteReport {
        let outcome = remove_player(table, name, confirmation);
        let saved = match &outcome {
            DeleteOutcome::Deleted { removed } => {
                info!("Deleted {} rows for '{}' from sheet '{}'", removed, name.trim(), self.sheet);
                Some(self.persist(table))
            }
            DeleteOutcome::Aborted { .. } => None,
            DeleteOutcome::Skipped(warning) => {
                warn!("Delete on sheet '{}': {}", self.sheet, warning);
                None
            }
        };
        DeleteReport { outcome, saved }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_list() {
        assert_eq!(parse_column_list(" Wins , Team"), vec!["Wins", "Team"]);
        assert_eq!(parse_column_list("Wins,,"), vec!["Wins"]);
        assert!(parse_column_list("  ").is_empty());
    }

    #[test]
    fn test_confirmation_parsing() {
        assert_eq!("Yes".parse::<Confirmation>(), Ok(Confirmation::Yes));
        assert_eq!("No".parse::<Confirmation>(), Ok(Confirmation::No));
        assert!("yes please".parse::<Confirmation>().is_err());
        assert_eq!(Confirmation::default(), Confirmation::No);
    }

    #[test]
    fn test_append_record_keeps_duplicate_headers_apart() {
        let mut table = Table::new(vec!["Note".into(), "Note".into(), "Score".into()]);
        table.push_row(vec![CellValue::Text("a".into()), CellValue::Text("b".into())]);
        let warnings = append_record(&mut table, &["first".into(), "second".into()]);

        assert!(warnings.is_empty());
        assert_eq!(
            table.row(1).unwrap(),
            &[
                CellValue::Text("first".into()),
                CellValue::Text("second".into()),
                CellValue::Empty
            ]
        );
    }

    #[test]
    fn test_missing_player_column() {
        let table = Table::new(vec!["Name".into()]);
        assert_eq!(
            find_player_rows(&table, "Ann"),
            Err(ValidationWarning::MissingColumn("Player Name".into()))
        );
    }
}
