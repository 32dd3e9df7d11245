use log::debug;
use postgres::{Client, NoTls};

use crate::config::DbConfig;
use crate::error::Result;

/// Open a blocking session against the configured database.
pub fn connect(config: &DbConfig) -> Result<Client> {
    debug!(
        "Connecting to {}:{}/{}",
        config.host, config.port, config.database
    );
    let client = Client::connect(&config.connection_string(), NoTls)?;
    Ok(client)
}

/// Probe the connection. This is the one operation that swallows backend
/// errors: the outcome is a boolean plus a printed message.
pub fn test_connection(config: &DbConfig) -> bool {
    match server_version(config) {
        Ok(version) => {
            println!("Connected successfully!");
            println!("Server version: {version}");
            true
        }
        Err(err) => {
            println!("Connection failed: {err}");
            false
        }
    }
}

fn server_version(config: &DbConfig) -> Result<String> {
    let mut client = connect(config)?;
    let row = client.query_one("SELECT version()", &[])?;
    let version: String = row.get(0);
    // "PostgreSQL 16.2 on x86_64-..." -> keep the product and release.
    Ok(version
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" "))
}
