use std::env;

use crate::error::{Result, SyncError};

/// Default PostgreSQL port, applied when neither the CLI nor the environment
/// names one.
pub const DEFAULT_PORT: u16 = 5432;

/// Database coordinates handed to the connection collaborator.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Create a new DbConfig with explicit values
    pub fn new(host: String, port: u16, database: String, user: String, password: String) -> Self {
        DbConfig {
            host,
            port,
            database,
            user,
            password,
        }
    }

    /// Load coordinates from the standard PG* environment variables.
    /// Returns an error if a required variable is not set; PGPORT is
    /// optional and defaults to 5432.
    pub fn from_env() -> Result<Self> {
        let host = require_env("PGHOST")?;

        let port = match env::var("PGPORT") {
            Ok(value) => value.parse().map_err(|_| {
                SyncError::Config("PGPORT must be a valid port number".to_string())
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let database = require_env("PGDATABASE")?;
        let user = require_env("PGUSER")?;
        let password = require_env("PGPASSWORD")?;

        Ok(DbConfig {
            host,
            port,
            database,
            user,
            password,
        })
    }

    /// Build the key/value connection string for the postgres client.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.database, self.user, self.password
        )
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| SyncError::Config(format!("{name} environment variable not set")))
}
