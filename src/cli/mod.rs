pub mod release;

use clap::{Parser, Subcommand};

/// agentrt — an agent execution runtime core: FSM engine, decision
/// parser, tool dispatch, memory, and batch benchmarking.
#[derive(Debug, Parser)]
#[command(name = "agentrt", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the release hardening checks and print PASS/FAIL per check.
    CheckRelease {
        /// Print the report as JSON instead of a human-readable list.
        #[arg(long)]
        json: bool,
    },
    /// Run the release hardening checks and write a markdown readiness
    /// report to the given path.
    WriteReleaseReport {
        /// Destination path for the markdown report.
        path: String,
    },
}
