use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the stubsmith binary.
#[derive(Parser, Debug)]
#[command(
    name = "stubsmith",
    version,
    about = "Generate override stubs for the unimplemented abstract members of a class"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the implement-abstract-class fix and print the edit as JSON.
    Fix {
        /// Snapshot document describing the types, target and declaration parts.
        snapshot: PathBuf,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Print the members the target still has to implement.
    Resolve {
        /// Snapshot document describing the types and target.
        snapshot: PathBuf,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod tests;
