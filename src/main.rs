use clap::{Parser, Subcommand};

use fmtignore::commands::{CheckCommand, InfoCommand};
use fmtignore::Context;

/// fmtignore decides which files a formatter should skip.
#[derive(Parser)]
#[command(author, version, about, long_about=None)]
#[command(propagate_version = true)]
struct FmtIgnoreCommands {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the files that would be processed
    Check(CheckCommand),

    /// Print whether a file is ignored and its inferred parser
    Info(InfoCommand),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = FmtIgnoreCommands::parse();
    let ctx = Context::new()?;
    match &cli.commands {
        Commands::Check(check) => check.run(ctx)?,
        Commands::Info(info) => info.run(ctx)?,
    }

    Ok(())
}
