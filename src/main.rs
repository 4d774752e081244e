// ABOUTME: Entry point for the beanstalk-deploy CLI application.
// ABOUTME: Parses arguments, sets up logging, and maps outcomes to exit codes.

mod cli;
mod commands;

use beanstalk_deploy::output::Output;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info for this crate, debug with --verbose
    let default_filter = if cli.verbose {
        "beanstalk_deploy=debug,info"
    } else {
        "beanstalk_deploy=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(cli.output_mode());
    let error_output = Output::new(cli.output_mode());

    let result = match cli.command {
        Commands::Deploy(args) => commands::deploy(args, output).await,
        Commands::Package(args) => commands::package(args, output),
        Commands::Status(args) => commands::status(args, output).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error_output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}
