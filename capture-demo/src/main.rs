mod cli;
mod commands;
mod delegate;
mod meter;

use clap::Parser;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Devices { json } => commands::devices(json),
        Command::Record(args) => commands::record(args),
    }
}
