//! In-memory CSV table reassembled from one or more export pages.

use crate::error::Result;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::de::DeserializeOwned;
use std::path::Path;

/// A header row plus data rows, in export order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl ExportTable {
    /// Parse CSV text whose first record is the column header.
    ///
    /// Blank lines are skipped and rows with a different field count than the
    /// header are kept as they are.
    pub fn from_csv_text(text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    /// Column names
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, `None` if the header has no such name
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.headers.iter().position(|h| h == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).unwrap_or(""))
                .collect(),
        )
    }

    /// Deserialize every row into `T` using the header names
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.rows
            .iter()
            .map(|row| row.deserialize(Some(&self.headers)).map_err(Into::into))
            .collect()
    }

    /// Render the table as CSV text
    pub fn to_csv_string(&self) -> Result<String> {
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        self.write_records(&mut wtr)?;
        let bytes = wtr
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Save the table to a CSV file
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = WriterBuilder::new().flexible(true).from_path(path)?;
        self.write_records(&mut wtr)?;
        wtr.flush()?;
        Ok(())
    }

    fn write_records<W: std::io::Write>(&self, wtr: &mut csv::Writer<W>) -> Result<()> {
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        Ok(())
    }
}
