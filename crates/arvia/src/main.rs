//! Arvia CLI - static site toolchain.
//!
//! Provides commands for:
//! - `init`: Scaffold a new project
//! - `serve`: Start the development server with live reload
//! - `build`: Mirror source and assets into the build directory
//! - `preview`: Serve the build output
//! - `version`: Print the version

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, InitArgs, PreviewArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Arvia - static site toolchain.
#[derive(Parser)]
#[command(name = "arvia", version, about)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project.
    Init(InitArgs),
    /// Start the development server with live reload.
    #[command(alias = "dev")]
    Serve(ServeArgs),
    /// Build the project for deployment.
    Build(BuildArgs),
    /// Serve the built project.
    Preview(PreviewArgs),
    /// Show version.
    Version,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(command: Commands, output: &Output) -> Result<(), CliError> {
    match command {
        Commands::Init(args) => args.execute(output),
        Commands::Serve(args) => tokio::runtime::Runtime::new()?.block_on(args.execute(output)),
        Commands::Build(args) => args.execute(output),
        Commands::Preview(args) => tokio::runtime::Runtime::new()?.block_on(args.execute(output)),
        Commands::Version => {
            output.info(&format!("Arvia {VERSION}"));
            Ok(())
        }
    }
}
