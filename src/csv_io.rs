use std::fs::File;
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, Writer, WriterBuilder};

use crate::error::Result;

/// An in-memory CSV document: one header row plus raw string rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvDocument {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read an entire CSV file into memory. Rows are normalized to the header
/// width; a missing trailing field reads as the empty string.
pub fn read_document(path: &Path) -> Result<CsvDocument> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();
        rows.push(row);
    }

    Ok(CsvDocument { headers, rows })
}

/// Writer for exported data; non-numeric fields are quoted.
pub fn open_writer(path: &Path) -> Result<Writer<File>> {
    let writer = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_path(path)?;
    Ok(writer)
}
