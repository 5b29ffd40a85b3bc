mod commands;
mod terminal;

use commands::{CommandLine, Commands, interfaces, range, resolve};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    terminal::logging::init();

    match commands.command {
        Commands::Interfaces => interfaces::run(),
        Commands::Range { cidr, sample } => range::run(&cidr, sample),
        Commands::Resolve { endpoints } => resolve::run(endpoints).await,
    }
}
