pub mod compare;
pub mod config;
pub mod csv_io;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod infer;
pub mod schema;
pub mod types;

pub use compare::{compare_documents, compare_files, Comparison};
pub use config::DbConfig;
pub use csv_io::CsvDocument;
pub use error::{Result, SyncError};
pub use import::ImportOptions;
pub use infer::infer_column_types;
pub use types::{CellValue, ColumnSpec, ColumnType};
