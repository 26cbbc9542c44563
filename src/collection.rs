//! CSV persistence for collected card records.
//!
//! The table is rewritten from scratch on every run: a fixed header row for
//! the configured schema, then one row per record.

use std::path::Path;

use tracing::info;

use crate::config::OutputSchema;
use crate::error::{CardScanError, Result};
use crate::models::CardRecord;

/// Writes records as a comma-separated table
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionWriter {
    schema: OutputSchema,
}

impl CollectionWriter {
    pub fn new(schema: OutputSchema) -> Self {
        Self { schema }
    }

    /// Cells of one record under this writer's schema
    pub fn row(&self, record: &CardRecord) -> Vec<String> {
        match self.schema {
            OutputSchema::Full => vec![
                record.name.clone(),
                record.set_info.clone(),
                record.card_number.clone(),
                record.quantity.to_string(),
            ],
            OutputSchema::Details => vec![record.name.clone(), record.set_info.clone()],
        }
    }

    /// Write header and rows to `path`, replacing any existing file
    pub fn write<'a>(&self, records: impl IntoIterator<Item = &'a CardRecord>, path: &Path) -> Result<usize> {
        let output_err = |source: std::io::Error| CardScanError::Output {
            path: path.to_path_buf(),
            source,
        };
        let csv_err = |e: csv::Error| output_err(e.into());

        let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
        wtr.write_record(self.schema.header()).map_err(csv_err)?;

        let mut count = 0;
        for record in records {
            wtr.write_record(self.row(record)).map_err(csv_err)?;
            count += 1;
        }
        wtr.flush().map_err(output_err)?;

        info!(path = %path.display(), rows = count, schema = ?self.schema, "Collection written");
        Ok(count)
    }
}

/// A table read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read a table written by [`CollectionWriter`]
pub fn read_table(path: &Path) -> Result<Table> {
    let malformed = |reason: String| CardScanError::MalformedTable {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| CardScanError::Read {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if header.is_empty() {
        return Err(malformed("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(format!("row {}: {e}", row_idx + 1)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { header, rows })
}
