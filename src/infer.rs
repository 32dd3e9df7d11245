use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::constants::{VARCHAR_LONG, VARCHAR_SHORT};
use crate::types::{ColumnSpec, ColumnType};

/// Strict calendar-date shape, e.g. 2024-01-31.
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Date plus a T- or space-separated time; fractional seconds may follow.
static DATETIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").unwrap());

/// Derive a column type for every header from the full row set. Only
/// non-empty values take part in a column's sample; a column with no values
/// anywhere defaults to VARCHAR(255).
pub fn infer_column_types(headers: &[String], rows: &[Vec<String>]) -> ColumnSpec {
    let mut spec = ColumnSpec::new();
    for (idx, header) in headers.iter().enumerate() {
        let values: Vec<&str> = rows
            .iter()
            .filter_map(|row| row.get(idx).map(String::as_str))
            .filter(|v| !v.is_empty())
            .collect();
        spec.push(header.clone(), infer_column(&values));
    }
    spec
}

/// Candidate tests in strict precedence order; the first test every value
/// passes wins. Numeric runs before date so zero-padded numbers stay out of
/// the date types.
fn infer_column(values: &[&str]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::VarChar(VARCHAR_LONG);
    }
    if let Some(ty) = integer_type(values) {
        return ty;
    }
    if values.iter().all(|v| v.parse::<f64>().is_ok()) {
        return ColumnType::Decimal;
    }
    if values.iter().all(|v| DATE_REGEX.is_match(v)) {
        return ColumnType::Date;
    }
    if values.iter().all(|v| DATETIME_REGEX.is_match(v)) {
        return ColumnType::Timestamp;
    }
    text_type(values)
}

/// INTEGER when every value is representable in 32 bits, BIGINT when any
/// needs 64.
fn integer_type(values: &[&str]) -> Option<ColumnType> {
    let mut fits_i32 = true;
    for value in values {
        match value.parse::<i64>() {
            Ok(n) => fits_i32 &= i32::try_from(n).is_ok(),
            Err(_) => return None,
        }
    }
    Some(if fits_i32 {
        ColumnType::Integer
    } else {
        ColumnType::BigInt
    })
}

/// Smallest width class that fits the longest observed value.
fn text_type(values: &[&str]) -> ColumnType {
    let max_len = values.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    if max_len <= VARCHAR_SHORT as usize {
        ColumnType::VarChar(VARCHAR_SHORT)
    } else if max_len <= VARCHAR_LONG as usize {
        ColumnType::VarChar(VARCHAR_LONG)
    } else {
        ColumnType::Text
    }
}
