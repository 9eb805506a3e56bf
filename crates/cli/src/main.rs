//! taskweave CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Plan, execute and reflect on one request
//! - `onboard`  — Write the default config
//! - `status`   — Show configuration, limits and capabilities

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "taskweave",
    about = "taskweave — plan, execute and reflect on multi-step requests",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the workflow on a request
    Run {
        /// The request; read from stdin when omitted
        request: Option<String>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Do not truncate task results
        #[arg(long)]
        full: bool,
    },

    /// Initialize configuration
    Onboard,

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so `run --json` output stays parseable
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Run {
            request,
            json,
            full,
        } => commands::run::run(request, json, full).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
