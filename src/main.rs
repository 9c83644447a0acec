//! Fragua CLI — deterministic assembly engine for generated quantum programs.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fragua",
    version,
    about = "Deterministic assembly engine for generated quantum programs — needs/provides resolution, import normalization, single-file emission"
)]
struct Cli {
    #[command(subcommand)]
    command: fragua::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = fragua::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
