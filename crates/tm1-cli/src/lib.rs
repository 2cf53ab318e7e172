//! # TM1 element CLI
//!
//! Command-line access to the element metadata of a TM1 server, built on
//! `tm1-elements` and the reqwest transport from `tm1-http`.
//!
//! ## Usage
//!
//! ```bash
//! # Leaf element names of the Region dimension
//! tm1-elements elements Region --leaves --url https://tm1.example.com:8010
//!
//! # Currency attribute of two elements, as JSON
//! tm1-elements attribute Region Currency -e Germany -e Japan --format json
//!
//! # Members under a consolidation of an alternate hierarchy
//! tm1-elements members Region Europe --hierarchy "Sales Regions" --leaves
//! ```
//!
//! ## Architecture
//!
//! 1. **Command Layer** (`cli`): Clap-based argument parsing
//! 2. **Execution Layer** (`executor`): One `ElementService` call per command
//! 3. **Output Layer** (`output`, `formatter`): Human, JSON and table output

pub mod cli;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod output;

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;
use tm1_elements::ElementService;
use tm1_http::RestClientTransport;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Commands, Connection, CountKind, OutputFormat, Target};
pub use error::{CliError, CliResult, ErrorCategory};
pub use executor::CommandExecutor;
pub use formatter::Formatter;
pub use output::Output;

/// Run the CLI application
pub async fn run() -> CliResult<()> {
    let Cli {
        command,
        conn,
        format,
        verbose,
        no_color,
    } = Cli::parse();
    init_tracing(verbose);

    let colored = !no_color && std::io::stdout().is_terminal();
    let executor = CommandExecutor::new(format, colored);

    let result = async {
        let service = connect(&conn)?;
        let output = executor.execute(&service, command).await?;
        executor.formatter.display(&output)
    }
    .await;

    if let Err(e) = result {
        executor.display_error(&e);
        std::process::exit(1);
    }

    Ok(())
}

/// Build an element client over the reqwest transport
pub fn connect(conn: &Connection) -> CliResult<ElementService> {
    let transport = RestClientTransport::new(conn.config())?;
    Ok(ElementService::from_rest(Arc::new(transport)))
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
