//! Terminal front end for the arena: one session, one command per line.

use clap::Parser;
use pokedex_arena::interface::{help_text, Arena, Command, DEFAULT_SESSION};
use pokedex_arena::ArenaConfig;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "pokedex-arena", about = "Browse the Pokédex and battle random opponents")]
struct Cli {
    /// RON config file; falls back to ARENA_CONFIG, then built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the offline dex instead of PokeAPI
    #[arg(long)]
    offline: bool,

    /// Seed for opponent generation
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::from_env()?,
    };
    if cli.offline {
        config = config.offline();
    }
    if cli.seed.is_some() {
        config.rules.encounter_seed = cli.seed;
    }

    let arena = Arena::from_config(&config)?;
    tracing::info!(dex_limit = arena.rules().dex_limit, "arena ready");

    println!("Welcome to the Pokédex Arena!");
    println!("{}", help_text());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Ok(Command::Quit) => {
                println!("Goodbye!");
                break;
            }
            Ok(command) => println!("{}", arena.execute(DEFAULT_SESSION, command).await),
            Err(message) => println!("{}", message),
        }
    }

    Ok(())
}
