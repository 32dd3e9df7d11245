use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::csv_io::{self, CsvDocument};
use crate::error::Result;

/// Outcome of a CSV comparison. The match flag is derived: two documents
/// match exactly when no differences were recorded.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    differences: Vec<String>,
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn differences(&self) -> &[String] {
        &self.differences
    }

    fn record(&mut self, difference: String) {
        self.differences.push(difference);
    }
}

/// Compare two CSV files. Mismatches are data in the result, never errors;
/// only unreadable or malformed input fails.
pub fn compare_files(left: &Path, right: &Path, ignore_order: bool) -> Result<Comparison> {
    let left_doc = csv_io::read_document(left)?;
    let right_doc = csv_io::read_document(right)?;
    Ok(compare_documents(&left_doc, &right_doc, ignore_order))
}

/// Structural and value-level comparison of two in-memory documents. Header
/// and row-count mismatches are recorded but do not stop the row comparison,
/// which runs position-wise up to the shorter document.
pub fn compare_documents(
    left: &CsvDocument,
    right: &CsvDocument,
    ignore_order: bool,
) -> Comparison {
    let mut result = Comparison::default();

    let left_set: HashSet<&str> = left.headers.iter().map(String::as_str).collect();
    let right_set: HashSet<&str> = right.headers.iter().map(String::as_str).collect();
    if left_set != right_set {
        result.record(format!(
            "Headers differ: {:?} vs {:?}",
            left.headers, right.headers
        ));
    }

    if left.rows.len() != right.rows.len() {
        result.record(format!(
            "Row count differs: {} vs {}",
            left.rows.len(),
            right.rows.len()
        ));
    }

    // Composite sort key over the first document's headers, alphabetically.
    let mut key_headers: Vec<&str> = left.headers.iter().map(String::as_str).collect();
    key_headers.sort_unstable();

    let left_rows = ordered_rows(left, &key_headers, ignore_order);
    let right_rows = ordered_rows(right, &key_headers, ignore_order);

    let right_index = column_index(right);
    for (i, (left_row, right_row)) in left_rows.iter().zip(right_rows.iter()).enumerate() {
        for (col, header) in left.headers.iter().enumerate() {
            let left_value = left_row.get(col).map(String::as_str).unwrap_or("");
            let right_value = right_index
                .get(header.as_str())
                .and_then(|&idx| right_row.get(idx))
                .map(String::as_str)
                .unwrap_or("");
            if left_value != right_value && !numeric_equal(left_value, right_value) {
                result.record(format!(
                    "Row {}, column '{}': '{}' vs '{}'",
                    i + 1,
                    header,
                    left_value,
                    right_value
                ));
            }
        }
    }

    result
}

fn column_index(doc: &CsvDocument) -> HashMap<&str, usize> {
    doc.headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (header.as_str(), idx))
        .collect()
}

/// Rows in comparison order: sorted by the composite key when order is
/// ignored, original file order otherwise. A key column the document lacks
/// contributes the empty string.
fn ordered_rows<'a>(
    doc: &'a CsvDocument,
    key_headers: &[&str],
    ignore_order: bool,
) -> Vec<&'a Vec<String>> {
    if !ignore_order {
        return doc.rows.iter().collect();
    }
    let index = column_index(doc);
    let mut decorated: Vec<(Vec<&str>, &Vec<String>)> = doc
        .rows
        .iter()
        .map(|row| {
            let key: Vec<&str> = key_headers
                .iter()
                .copied()
                .map(|h| {
                    index
                        .get(h)
                        .and_then(|&idx| row.get(idx))
                        .map(String::as_str)
                        .unwrap_or("")
                })
                .collect();
            (key, row)
        })
        .collect();
    decorated.sort();
    decorated.into_iter().map(|(_, row)| row).collect()
}

/// Numeric fallback: "1.0" and "1.00000" are the same value.
fn numeric_equal(left: &str, right: &str) -> bool {
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => l == r,
        _ => false,
    }
}
