use std::collections::BTreeSet;
use std::fmt::{self, Display};
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use suite_core::errors::{ErrorInfo, SuiteError};

use crate::case::Case;

/// Tabular summary of a suite, one row per case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds the summary: fixed columns, then one per independent variable.
    pub(crate) fn from_cases<'a>(cases: impl Iterator<Item = &'a Case> + Clone) -> Result<Self, SuiteError> {
        let variables: BTreeSet<String> = cases
            .clone()
            .flat_map(|case| case.independent_variables().names().cloned())
            .collect();
        let mut columns: Vec<String> = ["index", "name", "directory", "fingerprint"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        columns.extend(variables.iter().cloned());

        let mut rows = Vec::new();
        for case in cases {
            let mut row = vec![
                case.index().to_string(),
                case.name().to_string(),
                case.directory().display().to_string(),
                case.fingerprint()?,
            ];
            for name in &variables {
                row.push(
                    case.independent_variables()
                        .get(name)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                );
            }
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    /// Writes the table as CSV, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> Result<(), SuiteError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| wrap_io("table-create", path, err))?;
        }
        let file = fs::File::create(path).map_err(|err| wrap_io("table-open", path, err))?;
        let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));
        writer
            .write_record(&self.columns)
            .map_err(|err| wrap_csv("table-write-header", err))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|err| wrap_csv("table-write-row", err))?;
        }
        writer
            .flush()
            .map_err(|err| wrap_io("table-flush", path, err))?;
        Ok(())
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(String::len).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(idx) {
                    *width = (*width).max(cell.len());
                }
            }
        }
        let render = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let line = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(f, "{}", line.trim_end())
        };
        render(f, &self.columns)?;
        for row in &self.rows {
            render(f, row)?;
        }
        Ok(())
    }
}

fn wrap_io(code: &str, path: &Path, err: std::io::Error) -> SuiteError {
    SuiteError::Io(
        ErrorInfo::new(code, "failed to write summary table")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

fn wrap_csv(code: &str, err: csv::Error) -> SuiteError {
    SuiteError::Io(ErrorInfo::new(code, "CSV summary failure").with_hint(err.to_string()))
}
