mod cli;
mod commands;
mod editor;
mod error;
mod gallery;
mod mcp;
mod page_range;
mod pdf;
mod tracker;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // stdout belongs to command output and the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let renderer =
        || pdf::default_renderer(cli.render.options(), cli.render.pdfium_library.as_deref());

    match &cli.command {
        Commands::Mcp => {
            mcp::run_server(cli.render.options(), cli.render.pdfium_library.clone()).await?;
        }
        Commands::Info { path } => {
            commands::info::run(path)?;
        }
        Commands::Thumbnails { path, output_dir } => {
            commands::thumbnails::run(path, output_dir, renderer())?;
        }
        Commands::Remove {
            path,
            pages,
            output,
        } => {
            commands::remove::run(path, pages, output)?;
        }
        Commands::Edit { path } => {
            commands::edit::run(path, renderer())?;
        }
    }

    Ok(())
}
