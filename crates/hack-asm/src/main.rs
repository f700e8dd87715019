use std::path::PathBuf;
use std::process;

use clap::Parser;

/// Assemble Hack `.asm` source into `.hack` binary files.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// A single `.asm` file, or a directory containing `.asm` files.
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let files = match n2t_core::files_with_extension(&cli.path, "asm") {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{}: {}", cli.path.display(), e);
            process::exit(1);
        }
    };

    let mut had_failure = false;
    for file in &files {
        if let Err(e) = hackasm::assemble_file(file) {
            eprintln!("{}", e);
            had_failure = true;
        }
    }

    if had_failure {
        process::exit(1);
    }
}
