use log::info;
use postgres::Client;

use crate::error::Result;
use crate::types::{ColumnSpec, ColumnType};

// information_schema exposes its columns through domain types the driver
// will not decode directly; the catalog queries below cast identifiers and
// lengths to concrete types.

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Schema-qualified table reference.
pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Whether a schema with this name exists.
pub fn schema_exists(client: &mut Client, schema: &str) -> Result<bool> {
    let row = client.query_one(
        "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name::text = $1",
        &[&schema],
    )?;
    let count: i64 = row.get(0);
    Ok(count > 0)
}

/// Whether a table exists in the schema.
pub fn table_exists(client: &mut Client, schema: &str, table: &str) -> Result<bool> {
    let row = client.query_one(
        "SELECT COUNT(*) FROM information_schema.tables \
         WHERE table_schema::text = $1 AND table_name::text = $2",
        &[&schema, &table],
    )?;
    let count: i64 = row.get(0);
    Ok(count > 0)
}

/// Names of every base table in the schema.
pub fn list_tables(client: &mut Client, schema: &str) -> Result<Vec<String>> {
    let rows = client.query(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema::text = $1 AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
        &[&schema],
    )?;
    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Create a schema. Succeeds without touching the backend if the schema
/// already exists.
pub fn create_schema(client: &mut Client, schema: &str) -> Result<()> {
    if schema_exists(client, schema)? {
        info!("Schema '{schema}' already exists");
        return Ok(());
    }
    client.batch_execute(&format!("CREATE SCHEMA {}", quote_ident(schema)))?;
    info!("Created schema '{schema}'");
    Ok(())
}

/// Drop a schema. A missing schema is success, not an error, and triggers no
/// table drops. With cascade, every table inside is dropped individually
/// before the schema itself; without cascade the schema drop is issued
/// directly and a non-empty schema fails at the backend.
pub fn drop_schema(client: &mut Client, schema: &str, cascade: bool) -> Result<()> {
    if !schema_exists(client, schema)? {
        info!("Schema '{schema}' does not exist");
        return Ok(());
    }

    if cascade {
        for table in list_tables(client, schema)? {
            client.batch_execute(&format!("DROP TABLE {}", qualified(schema, &table)))?;
            info!("Dropped table '{schema}.{table}'");
        }
    }

    client.batch_execute(&format!("DROP SCHEMA {}", quote_ident(schema)))?;
    info!("Dropped schema '{schema}'");
    Ok(())
}

/// Read a table's column types back from the catalog, in ordinal order.
pub fn column_types(client: &mut Client, schema: &str, table: &str) -> Result<ColumnSpec> {
    let rows = client.query(
        "SELECT column_name::text, data_type::text, character_maximum_length::int \
         FROM information_schema.columns \
         WHERE table_schema::text = $1 AND table_name::text = $2 \
         ORDER BY ordinal_position",
        &[&schema, &table],
    )?;

    let mut spec = ColumnSpec::new();
    for row in rows {
        let name: String = row.get(0);
        let data_type: String = row.get(1);
        let max_length: Option<i32> = row.get(2);
        spec.push(name, ColumnType::from_catalog(&data_type, max_length));
    }
    Ok(spec)
}

/// Generate the CREATE TABLE statement for a column specification. Column
/// order follows the specification, which follows the CSV header; every
/// column is nullable and no keys or constraints are synthesized.
pub fn create_table_sql(schema: &str, table: &str, spec: &ColumnSpec) -> String {
    let columns: Vec<String> = spec
        .iter()
        .map(|(name, ty)| format!("{} {} NULL", quote_ident(name), ty.sql()))
        .collect();
    format!(
        "CREATE TABLE {} (\n    {}\n)",
        qualified(schema, table),
        columns.join(",\n    ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_qualified() {
        assert_eq!(qualified("test", "orders"), "\"test\".\"orders\"");
    }

    #[test]
    fn test_create_table_sql() {
        let mut spec = ColumnSpec::new();
        spec.push("id", ColumnType::Integer);
        spec.push("amount", ColumnType::Decimal);
        spec.push("created", ColumnType::Date);
        let sql = create_table_sql("test", "orders", &spec);
        assert_eq!(
            sql,
            "CREATE TABLE \"test\".\"orders\" (\n    \
             \"id\" INTEGER NULL,\n    \
             \"amount\" NUMERIC(18,6) NULL,\n    \
             \"created\" DATE NULL\n)"
        );
    }

    #[test]
    fn test_create_table_sql_keeps_header_order() {
        let mut spec = ColumnSpec::new();
        spec.push("zebra", ColumnType::Text);
        spec.push("alpha", ColumnType::Integer);
        let sql = create_table_sql("s", "t", &spec);
        let zebra = sql.find("\"zebra\"").unwrap();
        let alpha = sql.find("\"alpha\"").unwrap();
        assert!(zebra < alpha);
    }
}
