mod commands;
mod engine;

use clap::Parser;

use commands::Command;
use engine::DemoEngine;

/// Drives a workflow engine instance from the command line.
#[derive(Parser, Debug)]
#[command(name = "workflow-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let demo = DemoEngine::new();
    cli.command.run(&demo).await
}
