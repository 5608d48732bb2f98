use std::env;
use std::error::Error as StdError;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use handle_errors::Error as CustomError;
use mongo_bootstrap::{
    MongoDriver, Settings, init_database_with_logging, load_seed_file, seed_database_with_logging,
};
use tracing::error;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Parser)]
#[command(name = "mongo-bootstrap", version, about = "Create MongoDB collections and load seed data")]
struct Cli {
    /// Settings file name, without extension
    #[arg(long, global = true, default_value = "setup")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the configured collections and their indexes
    Init,
    /// Load documents from a JSON seed file
    Seed {
        /// Seed file, overriding `seed_file` from the settings
        #[arg(long)]
        file: Option<PathBuf>,
        /// Clear each collection before inserting, overriding `clear_first`
        #[arg(long, conflicts_with = "keep_existing")]
        clear: bool,
        /// Insert without clearing the collections first
        #[arg(long)]
        keep_existing: bool,
    },
}

/// `None` leaves the configured `clear_first` in place.
fn clear_first_override(clear: bool, keep_existing: bool) -> Option<bool> {
    match (clear, keep_existing) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Loading the env values
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = match Settings::load(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", report(&e));
            return ExitCode::FAILURE;
        }
    };

    let log_filter = env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("mongo_bootstrap={}", settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    match run(cli.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", report(&e));
            if e.is_authentication() {
                error!("Check the credentials in the MongoDB connection string");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, settings: &Settings) -> Result<(), CustomError> {
    let driver = MongoDriver::with_app_name("mongo-bootstrap");

    match command {
        Command::Init => {
            init_database_with_logging(&driver, &settings.init_config()).await?;
        }
        Command::Seed {
            file,
            clear,
            keep_existing,
        } => {
            let path = file.or_else(|| settings.seed_file.clone()).ok_or_else(|| {
                CustomError::InvalidRequest(
                    "no seed file given; pass --file or set `seed_file`".to_string(),
                )
            })?;
            let mut config = settings.seed_config(load_seed_file(&path)?);
            if let Some(clear_first) = clear_first_override(clear, keep_existing) {
                config.clear_first = Some(clear_first);
            }
            seed_database_with_logging(&driver, &config).await?;
        }
    }
    Ok(())
}

/// Joins an error with its sources, outermost first.
fn report(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
