// enigma: encrypt or decrypt messages with a configured rotor machine.
//
// Usage:
//   enigma [-v] CONFIG [INPUT [OUTPUT]]
//
// CONFIG describes the alphabet, slot counts and available rotors. INPUT
// (default stdin) holds setting lines starting with `*` followed by message
// lines; converted messages go to OUTPUT (default stdout) in groups of five.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use enigma_machine::MachineOptions;

/// Enigma rotor machine simulator.
#[derive(Parser, Debug)]
#[command(name = "enigma", version)]
#[command(about = "Encrypt or decrypt messages with a configurable rotor machine")]
struct Args {
    /// Machine configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Input file with setting and message lines (default: stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(value_name = "OUTPUT", requires = "input")]
    output: Option<PathBuf>,

    /// Log configuration changes and trace each symbol through the machine
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    setup_tracing(args.verbose);

    let options = MachineOptions {
        trace: args.verbose,
    };
    if let Err(e) = enigma_cli::run(
        &args.config,
        args.input.as_deref(),
        args.output.as_deref(),
        options,
    ) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn setup_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();
}
