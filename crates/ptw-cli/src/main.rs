//! # ptw CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use ptw_api::config::AppConfig;
use ptw_cli::classify::{run_classify, ClassifyArgs};
use ptw_cli::logging;
use ptw_cli::policy::{run_policy, PolicyArgs};
use ptw_cli::serve::{run_serve, ServeArgs};

/// Permit-to-work toolchain: API server, risk preview, and capability tables.
#[derive(Parser, Debug)]
#[command(name = "ptw", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),

    /// Classify permit attributes and print the risk report.
    Classify(ClassifyArgs),

    /// Print or validate a capability table.
    Policy(PolicyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => match AppConfig::from_env() {
            Ok(config) => {
                let config = args.apply(config);
                logging::init(
                    &logging::default_directive(cli.verbose, "info"),
                    cli.log_json || config.log_json,
                );
                tracing::debug!(?config, "configuration resolved");
                run_serve(config)
            }
            Err(e) => {
                logging::init("error", cli.log_json);
                Err(e.into())
            }
        },
        Commands::Classify(args) => {
            logging::init(&logging::default_directive(cli.verbose, "warn"), cli.log_json);
            run_classify(&args)
        }
        Commands::Policy(args) => {
            logging::init(&logging::default_directive(cli.verbose, "warn"), cli.log_json);
            run_policy(&args)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
