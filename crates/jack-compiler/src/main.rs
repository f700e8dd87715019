use std::path::PathBuf;
use std::process;

use clap::Parser;

/// Compile Jack `.jack` sources into Hack VM `.vm` command files.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// A single `.jack` file, or a directory containing `.jack` files.
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    match jackc::compile_path(&cli.path) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}
