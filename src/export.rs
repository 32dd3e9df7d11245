use std::path::Path;

use log::info;
use postgres::{Client, SimpleQueryMessage};

use crate::csv_io;
use crate::error::Result;
use crate::schema;

/// Export a table, or the result of a free-form query, to a CSV file. Runs
/// exactly one read; NULL values serialize as empty strings. Returns the
/// number of rows written.
pub fn export_csv(
    client: &mut Client,
    schema_name: &str,
    table: &str,
    csv_path: &Path,
    query: Option<&str>,
) -> Result<u64> {
    let sql = match query {
        Some(q) => q.to_string(),
        None => format!("SELECT * FROM {}", schema::qualified(schema_name, table)),
    };

    // The text protocol hands every value over in its natural string form,
    // which is exactly what lands in the CSV.
    let messages = client.simple_query(&sql)?;

    let mut writer = csv_io::open_writer(csv_path)?;
    let mut wrote_header = false;
    let mut exported: u64 = 0;
    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                if !wrote_header {
                    writer.write_record(columns.iter().map(|c| c.name()))?;
                    wrote_header = true;
                }
            }
            SimpleQueryMessage::Row(row) => {
                if !wrote_header {
                    writer.write_record(row.columns().iter().map(|c| c.name()))?;
                    wrote_header = true;
                }
                let record: Vec<&str> = (0..row.len()).map(|i| row.get(i).unwrap_or("")).collect();
                writer.write_record(&record)?;
                exported += 1;
            }
            _ => {}
        }
    }
    writer.flush()?;

    info!("Exported {exported} rows to '{}'", csv_path.display());
    Ok(exported)
}
