//! Tabular export of the full customer set. Two flavors: a plain CSV and a
//! tab-separated variant that spreadsheet applications open natively. Files
//! get a timestamped name so repeated exports never clobber each other.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;

use crate::models::Customer;

/// Output format selected by the export shortcut.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "tsv",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Spreadsheet => b'\t',
        }
    }
}

/// Write every customer as `ID, Name, Email, Phone` rows into `dir` and
/// return the path of the file that was written, for display in the status
/// footer. The UI passes the working directory.
pub fn export_customers(
    customers: &[Customer],
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("customers-{stamp}.{}", format.extension()));

    let mut writer = WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer
        .write_record(["ID", "Name", "Email", "Phone"])
        .context("failed to write export header")?;
    for customer in customers {
        writer
            .write_record([
                customer.id.to_string().as_str(),
                &customer.name,
                &customer.email,
                &customer.phone,
            ])
            .context("failed to write export row")?;
    }
    writer.flush().context("failed to flush export file")?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn sample() -> Vec<Customer> {
        vec![
            Customer {
                id: 1,
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                phone: "111".to_string(),
            },
            Customer {
                id: 2,
                name: "Bo, Jr.".to_string(),
                email: "bo@x.com".to_string(),
                phone: "222".to_string(),
            },
        ]
    }

    #[test]
    fn csv_export_quotes_embedded_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_customers(&sample(), ExportFormat::Csv, dir.path()).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("ID,Name,Email,Phone"));
        assert!(contents.contains("\"Bo, Jr.\""));
    }

    #[test]
    fn spreadsheet_export_is_tab_separated() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_customers(&sample(), ExportFormat::Spreadsheet, dir.path()).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("tsv"));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("ID\tName\tEmail\tPhone"));
    }
}
