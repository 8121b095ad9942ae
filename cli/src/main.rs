#![deny(missing_docs)]

//! # Thaum CLI
//!
//! Command Line Interface for the thaum schema compiler.
//!
//! Supported Commands:
//! - `generate`: Schema -> `generated.dart` (server, frontend or both).
//! - `check`: Validates a schema and prints its symbols and exception codes.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod check;
mod config;
mod error;
mod generate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Thaum schema compiler")]
struct Cli {
    /// Log at debug level regardless of `RUST_LOG`.
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the typed model, dispatcher and client stubs from a schema.
    Generate(generate::GenerateArgs),
    /// Validate a schema without generating code.
    Check(check::CheckArgs),
}

/// Installs the stderr subscriber. `RUST_LOG` applies unless `--verbose` is given.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => {
            generate::execute(args)?;
        }
        Commands::Check(args) => {
            print!("{}", check::execute(args)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "thaum",
            "generate",
            "--target",
            "frontend",
            "--output-dir",
            "lib",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.target, Some(thaum_core::GenerationTarget::Frontend));
                assert_eq!(args.output_dir, Some(std::path::PathBuf::from("lib")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        assert!(Cli::try_parse_from(["thaum", "generate", "--target", "backend"]).is_err());
    }
}
