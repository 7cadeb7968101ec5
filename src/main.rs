mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{release, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::CheckRelease { json } => {
            let report = release::run_all().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                release::print_human(&report);
            }
            if !report.ok {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::WriteReleaseReport { path } => {
            let report = release::run_all().await;
            std::fs::write(&path, release::to_markdown(&report))?;
            tracing::info!(path = %path, ok = report.ok, "release report written");
            if !report.ok {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,agentrt=debug")))
        .json()
        .init();
}
