use std::path::PathBuf;
use std::process::exit;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use csvsync::{
    compare, config, db, export, import, schema, DbConfig, ImportOptions, Result, SyncError,
};

/// How many differences `compare` prints before summarizing the rest.
const DIFF_REPORT_LIMIT: usize = 10;

/// Seed, extract, and verify SQL test data from CSV files.
#[derive(Debug, Parser)]
#[command(name = "csvsync")]
#[command(about = "Seed, extract, and verify SQL test data from CSV files")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    db: DbArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Target database coordinates. Anything omitted falls back to the PG*
/// environment variables.
#[derive(Debug, Args)]
struct DbArgs {
    /// Database server host
    #[arg(long)]
    server: Option<String>,

    /// Database server port (default: 5432)
    #[arg(long)]
    port: Option<u16>,

    /// Database name
    #[arg(long)]
    database: Option<String>,

    /// Database user
    #[arg(long)]
    user: Option<String>,

    /// Database password (can also use PGPASSWORD env var)
    #[arg(long)]
    password: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Test the database connection
    Test,
    /// Import a CSV file into a table
    Import(ImportArgs),
    /// Export a table or query result to a CSV file
    Export(ExportArgs),
    /// Compare two CSV files
    Compare(CompareArgs),
    /// Drop a schema and the tables inside it
    DropSchema(DropSchemaArgs),
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// CSV file to load
    #[arg(long)]
    csv: PathBuf,

    /// Target schema
    #[arg(long)]
    schema: String,

    /// Target table
    #[arg(long)]
    table: String,

    /// Truncate the table before loading
    #[arg(long)]
    truncate: bool,

    /// Fail at the backend instead of creating a missing table
    #[arg(long = "no-create")]
    no_create: bool,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Output CSV path
    #[arg(long)]
    csv: PathBuf,

    /// Source schema
    #[arg(long)]
    schema: String,

    /// Source table
    #[arg(long)]
    table: String,

    /// Custom query instead of a full-table scan
    #[arg(long)]
    query: Option<String>,
}

#[derive(Debug, Args)]
struct CompareArgs {
    /// First CSV file
    #[arg(long)]
    file1: PathBuf,

    /// Second CSV file
    #[arg(long)]
    file2: PathBuf,

    /// Compare rows in file order instead of sorting first
    #[arg(long)]
    ordered: bool,
}

#[derive(Debug, Args)]
struct DropSchemaArgs {
    /// Schema to drop
    #[arg(long)]
    schema: String,

    /// Drop the schema only, failing if tables remain
    #[arg(long = "no-cascade")]
    no_cascade: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => exit(code),
        Err(err) => {
            eprintln!("Error: {err}");
            exit(1);
        }
    }
}

fn init_logging() {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.format_timestamp_millis();
    builder.init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Test => {
            let config = build_db_config(&cli.db)?;
            Ok(if db::test_connection(&config) { 0 } else { 1 })
        }
        Commands::Import(args) => {
            let config = build_db_config(&cli.db)?;
            let mut client = db::connect(&config)?;
            let options = ImportOptions {
                create_table: !args.no_create,
                truncate: args.truncate,
            };
            import::import_csv(&mut client, &args.csv, &args.schema, &args.table, options)?;
            Ok(0)
        }
        Commands::Export(args) => {
            let config = build_db_config(&cli.db)?;
            let mut client = db::connect(&config)?;
            export::export_csv(
                &mut client,
                &args.schema,
                &args.table,
                &args.csv,
                args.query.as_deref(),
            )?;
            Ok(0)
        }
        Commands::Compare(args) => {
            let result = compare::compare_files(&args.file1, &args.file2, !args.ordered)?;
            if result.is_match() {
                println!("Files match!");
                return Ok(0);
            }
            println!("Files differ:");
            for difference in result.differences().iter().take(DIFF_REPORT_LIMIT) {
                println!("  {difference}");
            }
            let remaining = result.differences().len().saturating_sub(DIFF_REPORT_LIMIT);
            if remaining > 0 {
                println!("  ... and {remaining} more differences");
            }
            Ok(1)
        }
        Commands::DropSchema(args) => {
            let config = build_db_config(&cli.db)?;
            let mut client = db::connect(&config)?;
            schema::drop_schema(&mut client, &args.schema, !args.no_cascade)?;
            Ok(0)
        }
    }
}

/// CLI arguments win over PG* environment variables; a full set of CLI
/// coordinates needs no environment at all.
fn build_db_config(args: &DbArgs) -> Result<DbConfig> {
    if let (Some(server), Some(database), Some(user), Some(password)) = (
        args.server.clone(),
        args.database.clone(),
        args.user.clone(),
        args.password.clone(),
    ) {
        return Ok(DbConfig::new(
            server,
            args.port.unwrap_or(config::DEFAULT_PORT),
            database,
            user,
            password,
        ));
    }

    let mut config = DbConfig::from_env().map_err(|_| {
        SyncError::Config(
            "Database coordinates not found. Provide them via:\n\
             - CLI arguments (--server, --database, --user, --password)\n\
             - Environment variables (PGHOST, PGPORT, PGDATABASE, PGUSER, PGPASSWORD)"
                .to_string(),
        )
    })?;

    if let Some(ref server) = args.server {
        config.host = server.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ref database) = args.database {
        config.database = database.clone();
    }
    if let Some(ref user) = args.user {
        config.user = user.clone();
    }
    if let Some(ref password) = args.password {
        config.password = password.clone();
    }
    Ok(config)
}
