use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use journey_search::browser::{BrowserOptions, BrowserSearch};
use journey_search::client::{SearchClient, SearchClientConfig};
use journey_search::{ErrorKind, JourneyResult, JourneySource, SearchError};

/// Bundled search response used by the `example` command.
const EXAMPLE_FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/journey-search-result.json"
);

#[derive(Parser)]
#[command(version, about = "Search train journeys and print them as JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search by numeric location codes through the search API
    Code {
        from: String,
        to: String,
        /// Departure, e.g. 2023-12-16T06:00 or 2023-12-16T06:00:00+01:00 (default: now)
        #[arg(long)]
        departure: Option<String>,
    },
    /// Search by place names through the site's search form
    Name {
        from: String,
        to: String,
        /// Departure, e.g. 2023-12-16T06:00 or 2023-12-16T06:00:00+01:00 (default: now)
        #[arg(long)]
        departure: Option<String>,
        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },
    /// Normalize a saved search response without network access
    Example {
        #[arg(long, default_value = EXAMPLE_FIXTURE)]
        fixture: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("journey_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(Some(results)) => match serde_json::to_string_pretty(&results) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Unknown Error: {e}");
                ExitCode::FAILURE
            }
        },
        Ok(None) => {
            println!("No search response was captured.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<Option<Vec<JourneyResult>>, SearchError> {
    match command {
        Command::Code {
            from,
            to,
            departure,
        } => {
            let departure_at = departure_or_now(departure.as_deref())?;
            let client = SearchClient::new(SearchClientConfig::from_env())?;
            journey_search::find(&JourneySource::ByCode(client), &from, &to, departure_at).await
        }
        Command::Name {
            from,
            to,
            departure,
            headed,
        } => {
            let departure_at = departure_or_now(departure.as_deref())?;
            let options = BrowserOptions::from_env().with_headless(!headed);
            let source = JourneySource::ByName(BrowserSearch::chromium(options));
            journey_search::find(&source, &from, &to, departure_at).await
        }
        Command::Example { fixture } => journey_search::find_example(fixture).map(Some),
    }
}

fn departure_or_now(input: Option<&str>) -> Result<DateTime<FixedOffset>, SearchError> {
    match input {
        Some(input) => journey_search::parse_departure(input),
        None => Ok(Utc::now().fixed_offset()),
    }
}

fn report(err: &SearchError) {
    match err.kind() {
        kind @ (ErrorKind::InvalidArgument | ErrorKind::SecurityBlocked) => {
            eprintln!("{kind}: {err}");
        }
        ErrorKind::Unknown => eprintln!("Unknown Error: {err}"),
    }
}
