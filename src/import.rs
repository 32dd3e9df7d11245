use std::path::Path;

use log::info;
use postgres::types::ToSql;
use postgres::Client;

use crate::csv_io;
use crate::error::{Result, SyncError};
use crate::infer::infer_column_types;
use crate::schema;
use crate::types::{CellValue, ColumnSpec, ColumnType};

/// Flags controlling table creation and truncation during an import.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub create_table: bool,
    pub truncate: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            create_table: true,
            truncate: false,
        }
    }
}

/// Load a CSV file into a table, creating the table from inferred types when
/// requested. The whole row set shares one transaction with a single commit;
/// a failure part-way in rolls back and propagates. Returns the number of
/// rows inserted.
pub fn import_csv(
    client: &mut Client,
    csv_path: &Path,
    schema_name: &str,
    table: &str,
    options: ImportOptions,
) -> Result<u64> {
    let doc = csv_io::read_document(csv_path)?;
    if doc.headers.is_empty() {
        return Err(SyncError::Input(format!(
            "CSV file {} has no header row",
            csv_path.display()
        )));
    }
    if doc.rows.is_empty() {
        info!("CSV file {} has no data rows", csv_path.display());
        return Ok(0);
    }

    let spec = if schema::table_exists(client, schema_name, table)? {
        // The table's declared columns carry the types decided when it was
        // created; read them back so conversion matches the declarations.
        schema::column_types(client, schema_name, table)?
    } else if options.create_table {
        schema::create_schema(client, schema_name)?;
        let spec = infer_column_types(&doc.headers, &doc.rows);
        client.batch_execute(&schema::create_table_sql(schema_name, table, &spec))?;
        info!("Created table '{schema_name}.{table}'");
        spec
    } else {
        ColumnSpec::all_text(&doc.headers)
    };

    if options.truncate && schema::table_exists(client, schema_name, table)? {
        client.batch_execute(&format!(
            "TRUNCATE TABLE {}",
            schema::qualified(schema_name, table)
        ))?;
        info!("Truncated table '{schema_name}.{table}'");
    }

    let insert_sql = insert_statement(schema_name, table, &doc.headers);
    let mut transaction = client.transaction()?;
    let statement = transaction.prepare(&insert_sql)?;
    let mut inserted: u64 = 0;
    for (idx, row) in doc.rows.iter().enumerate() {
        let values = convert_row(&doc.headers, row, &spec).map_err(|err| at_row(idx + 1, err))?;
        let params: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        transaction.execute(&statement, &params)?;
        inserted += 1;
    }
    transaction.commit()?;

    info!("Imported {inserted} rows into '{schema_name}.{table}'");
    Ok(inserted)
}

/// Parameterized single-row INSERT over the document's header columns.
fn insert_statement(schema_name: &str, table: &str, headers: &[String]) -> String {
    let columns: Vec<String> = headers.iter().map(|h| schema::quote_ident(h)).collect();
    let placeholders: Vec<String> = (1..=headers.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema::qualified(schema_name, table),
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn convert_row(headers: &[String], row: &[String], spec: &ColumnSpec) -> Result<Vec<CellValue>> {
    headers
        .iter()
        .zip(row)
        .map(|(header, raw)| {
            let ty = spec.get(header).unwrap_or(ColumnType::Text);
            CellValue::from_raw(raw, ty)
        })
        .collect()
}

fn at_row(row: usize, err: SyncError) -> SyncError {
    match err {
        SyncError::Input(msg) => SyncError::Input(format!("row {row}: {msg}")),
        other => other,
    }
}
