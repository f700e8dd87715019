use std::path::PathBuf;
use std::process;

use clap::Parser;

/// Translate Hack VM `.vm` commands into a single Hack `.asm` program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// A single `.vm` file, or a directory containing `.vm` files.
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    match hackvm::translate_path(&cli.path) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}
