//! Contact sheet I/O: read a tabular export, write the members CSV.
//!
//! Spreadsheets are read from their CSV (or TSV) export. Header names are
//! trimmed so `" Phone "` matches `Phone`.
//!
//! CHANGELOG:
//! - 02/16/2026 - Tolerate ragged rows and reject xlsx with a hint
//! - 02/14/2026 - Initial CSV import/export

use super::store::{ContactRecord, ContactStore};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

/// Default file name for the members export.
pub const EXPORT_FILE_NAME: &str = "whatsapp_members.csv";

/// Export column order.
pub const EXPORT_HEADERS: [&str; 3] = ["ID", "Name", "Phone"];

/// Errors reading or writing contact sheets.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported sheet format '{0}': export the spreadsheet as CSV first")]
    UnsupportedFormat(String),

    #[error("Sheet has no header row")]
    MissingHeader,
}

/// A parsed table: trimmed headers plus raw string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Build a sheet from in-memory cells (headers are trimmed).
    pub fn new<H, R>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = Vec<String>>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|h| h.as_ref().trim().to_string())
                .collect(),
            rows: rows.into_iter().collect(),
        }
    }

    /// Parse delimited text from a reader.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, SheetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(SheetError::MissingHeader);
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Read a sheet from disk, picking the delimiter from the extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let delimiter = match extension.as_str() {
            "xlsx" | "xls" | "xlsm" | "ods" => {
                return Err(SheetError::UnsupportedFormat(extension));
            }
            "tsv" | "tab" => b'\t',
            _ => b',',
        };

        let file = File::open(path).map_err(|source| SheetError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "reading contact sheet");
        Self::from_reader(file, delimiter)
    }

    /// Index of a header column, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, column); missing cells in ragged rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Write the store as `ID,Name,Phone` CSV in current order.
pub fn write_csv<W: Write>(store: &ContactStore, writer: W) -> Result<(), SheetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;
    for ContactRecord { id, name, phone } in store.records() {
        csv_writer.write_record([id, name, phone])?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Export the store to a CSV file on disk.
pub fn export_csv<P: AsRef<Path>>(store: &ContactStore, path: P) -> Result<(), SheetError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| SheetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_csv(store, file)?;
    tracing::info!(path = %path.display(), records = store.len(), "exported members CSV");
    Ok(())
}
