use clap::Parser;
use std::process::ExitCode;

use intrig::cli::args::{Cli, Commands};
use intrig::cli::{clean, list, status, sync, up};
use intrig::error::exit_codes;

#[tokio::main]
async fn main() -> ExitCode {
    intrig::logging::init_cli();

    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> intrig::Result<()> {
    match cli.command {
        Commands::List => list::list(cli.json).await,

        Commands::Status { identifier } => status::status(identifier, cli.json).await,

        Commands::Up { path } => up::up(path, cli.json).await,

        Commands::Sync { path, force } => sync::sync(path, force).await,

        Commands::Clean => clean::clean().await,
    }
}
