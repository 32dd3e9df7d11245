use std::fmt;

use bytes::BytesMut;
use chrono::{NaiveDate, NaiveDateTime};
use postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use rust_decimal::Decimal;

use crate::error::{Result, SyncError};

/// Sizing constants shared by inference and DDL generation.
pub mod constants {
    /// Width classes for inferred character columns.
    pub const VARCHAR_SHORT: u16 = 50;
    pub const VARCHAR_LONG: u16 = 255;

    /// Fixed precision and scale for inferred decimal columns.
    pub const DECIMAL_PRECISION: u8 = 18;
    pub const DECIMAL_SCALE: u8 = 6;
}

/// Column type tags, decided once per import and never revised mid-load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Decimal,
    Date,
    Timestamp,
    VarChar(u16),
    Text,
}

impl ColumnType {
    /// Render the tag as a PostgreSQL column type for CREATE TABLE.
    pub fn sql(&self) -> String {
        match self {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Decimal => format!(
                "NUMERIC({},{})",
                constants::DECIMAL_PRECISION,
                constants::DECIMAL_SCALE
            ),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::VarChar(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "TEXT".to_string(),
        }
    }

    /// Map an information_schema data_type back onto a tag. Types outside
    /// the closed set ride as text.
    pub fn from_catalog(data_type: &str, max_length: Option<i32>) -> ColumnType {
        match data_type {
            "integer" => ColumnType::Integer,
            "bigint" => ColumnType::BigInt,
            "numeric" | "double precision" | "real" => ColumnType::Decimal,
            "date" => ColumnType::Date,
            s if s.starts_with("timestamp") => ColumnType::Timestamp,
            "character varying" | "character" => match max_length {
                Some(len) if len > 0 && len <= i32::from(u16::MAX) => {
                    ColumnType::VarChar(len as u16)
                }
                _ => ColumnType::Text,
            },
            _ => ColumnType::Text,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql())
    }
}

/// Ordered column-name to type mapping. Iteration order matches the CSV
/// header order, with exactly one entry per header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSpec {
    columns: Vec<(String, ColumnType)>,
}

impl ColumnSpec {
    pub fn new() -> Self {
        ColumnSpec {
            columns: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, ty: ColumnType) {
        self.columns.push((name.into(), ty));
    }

    pub fn get(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, ColumnType)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Fallback specification when no inference result exists: every column
    /// rides as text.
    pub fn all_text(headers: &[String]) -> Self {
        ColumnSpec {
            columns: headers
                .iter()
                .map(|h| (h.clone(), ColumnType::Text))
                .collect(),
        }
    }
}

/// A single CSV cell converted to its native form for parameter binding.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i32),
    BigInt(i64),
    Numeric(Decimal),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// Convert a raw CSV string per its column tag. The empty string is NULL
    /// for every tag.
    pub fn from_raw(raw: &str, ty: ColumnType) -> Result<CellValue> {
        if raw.is_empty() {
            return Ok(CellValue::Null);
        }
        let value = match ty {
            ColumnType::Integer => {
                CellValue::Int(raw.parse::<i32>().map_err(|_| invalid(raw, ty))?)
            }
            ColumnType::BigInt => {
                CellValue::BigInt(raw.parse::<i64>().map_err(|_| invalid(raw, ty))?)
            }
            ColumnType::Decimal => {
                // Decimal's FromStr rejects exponents; values like 1e5 that
                // passed float inference need the scientific parser.
                let parsed = raw
                    .parse::<Decimal>()
                    .or_else(|_| Decimal::from_scientific(raw))
                    .map_err(|_| invalid(raw, ty))?;
                CellValue::Numeric(parsed)
            }
            ColumnType::Date => CellValue::Date(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid(raw, ty))?,
            ),
            ColumnType::Timestamp => {
                let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
                    .map_err(|_| invalid(raw, ty))?;
                CellValue::Timestamp(parsed)
            }
            ColumnType::VarChar(_) | ColumnType::Text => CellValue::Text(raw.to_string()),
        };
        Ok(value)
    }
}

fn invalid(raw: &str, ty: ColumnType) -> SyncError {
    SyncError::Input(format!("value '{raw}' is not a valid {}", ty.sql()))
}

impl ToSql for CellValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            CellValue::Null => Ok(IsNull::Yes),
            CellValue::Int(v) => v.to_sql(ty, out),
            CellValue::BigInt(v) => v.to_sql(ty, out),
            CellValue::Numeric(v) => v.to_sql(ty, out),
            CellValue::Date(v) => v.to_sql(ty, out),
            CellValue::Timestamp(v) => v.to_sql(ty, out),
            CellValue::Text(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        // The union of what the delegated implementations accept; the per-tag
        // check happens when the inner value encodes itself.
        *ty == Type::INT4
            || *ty == Type::INT8
            || *ty == Type::NUMERIC
            || *ty == Type::FLOAT4
            || *ty == Type::FLOAT8
            || *ty == Type::DATE
            || *ty == Type::TIMESTAMP
            || *ty == Type::VARCHAR
            || *ty == Type::TEXT
            || *ty == Type::BPCHAR
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_rendering() {
        assert_eq!(ColumnType::Integer.sql(), "INTEGER");
        assert_eq!(ColumnType::BigInt.sql(), "BIGINT");
        assert_eq!(ColumnType::Decimal.sql(), "NUMERIC(18,6)");
        assert_eq!(ColumnType::Date.sql(), "DATE");
        assert_eq!(ColumnType::Timestamp.sql(), "TIMESTAMP");
        assert_eq!(ColumnType::VarChar(50).sql(), "VARCHAR(50)");
        assert_eq!(ColumnType::Text.sql(), "TEXT");
    }

    #[test]
    fn test_catalog_roundtrip() {
        // Every tag maps to DDL whose catalog description maps back to the
        // same tag.
        assert_eq!(
            ColumnType::from_catalog("integer", None),
            ColumnType::Integer
        );
        assert_eq!(ColumnType::from_catalog("bigint", None), ColumnType::BigInt);
        assert_eq!(
            ColumnType::from_catalog("numeric", None),
            ColumnType::Decimal
        );
        assert_eq!(ColumnType::from_catalog("date", None), ColumnType::Date);
        assert_eq!(
            ColumnType::from_catalog("timestamp without time zone", None),
            ColumnType::Timestamp
        );
        assert_eq!(
            ColumnType::from_catalog("character varying", Some(50)),
            ColumnType::VarChar(50)
        );
        assert_eq!(ColumnType::from_catalog("text", None), ColumnType::Text);
    }

    #[test]
    fn test_catalog_unknown_types_ride_as_text() {
        assert_eq!(ColumnType::from_catalog("uuid", None), ColumnType::Text);
        assert_eq!(ColumnType::from_catalog("boolean", None), ColumnType::Text);
        assert_eq!(
            ColumnType::from_catalog("character varying", None),
            ColumnType::Text
        );
    }

    #[test]
    fn test_empty_string_is_null_for_every_tag() {
        let tags = [
            ColumnType::Integer,
            ColumnType::BigInt,
            ColumnType::Decimal,
            ColumnType::Date,
            ColumnType::Timestamp,
            ColumnType::VarChar(50),
            ColumnType::Text,
        ];
        for tag in tags {
            assert_eq!(CellValue::from_raw("", tag).unwrap(), CellValue::Null);
        }
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(
            CellValue::from_raw("42", ColumnType::Integer).unwrap(),
            CellValue::Int(42)
        );
        assert_eq!(
            CellValue::from_raw("3000000000", ColumnType::BigInt).unwrap(),
            CellValue::BigInt(3_000_000_000)
        );
        assert_eq!(
            CellValue::from_raw("10.50", ColumnType::Decimal).unwrap(),
            CellValue::Numeric("10.50".parse().unwrap())
        );
        // Scientific notation passes float inference and must convert too.
        assert_eq!(
            CellValue::from_raw("1e3", ColumnType::Decimal).unwrap(),
            CellValue::Numeric("1000".parse().unwrap())
        );
    }

    #[test]
    fn test_temporal_conversions() {
        assert_eq!(
            CellValue::from_raw("2024-01-31", ColumnType::Date).unwrap(),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(12, 30, 45)
            .unwrap();
        assert_eq!(
            CellValue::from_raw("2024-01-31 12:30:45", ColumnType::Timestamp).unwrap(),
            CellValue::Timestamp(expected)
        );
        assert_eq!(
            CellValue::from_raw("2024-01-31T12:30:45", ColumnType::Timestamp).unwrap(),
            CellValue::Timestamp(expected)
        );
        // Fractional seconds survive.
        assert!(matches!(
            CellValue::from_raw("2024-01-31 12:30:45.500", ColumnType::Timestamp).unwrap(),
            CellValue::Timestamp(_)
        ));
    }

    #[test]
    fn test_invalid_value_is_input_error() {
        assert!(CellValue::from_raw("abc", ColumnType::Integer).is_err());
        assert!(CellValue::from_raw("2024-13-99", ColumnType::Date).is_err());
    }

    #[test]
    fn test_text_passthrough() {
        assert_eq!(
            CellValue::from_raw("hello", ColumnType::VarChar(50)).unwrap(),
            CellValue::Text("hello".to_string())
        );
    }

    #[test]
    fn test_column_spec_preserves_order() {
        let mut spec = ColumnSpec::new();
        spec.push("zebra", ColumnType::Integer);
        spec.push("alpha", ColumnType::Text);
        let names: Vec<&str> = spec.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["zebra", "alpha"]);
        assert_eq!(spec.get("alpha"), Some(ColumnType::Text));
        assert_eq!(spec.get("missing"), None);
    }

    #[test]
    fn test_all_text_fallback() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let spec = ColumnSpec::all_text(&headers);
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.get("a"), Some(ColumnType::Text));
        assert_eq!(spec.get("b"), Some(ColumnType::Text));
    }
}
