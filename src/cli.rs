use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::pdf::render::DEFAULT_SCALE;
use crate::pdf::RenderOptions;

#[derive(Parser)]
#[command(name = "pdfcull")]
#[command(about = "Preview PDF pages as thumbnails and remove the ones you don't want")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub render: RenderArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Magnification applied to page thumbnails
    #[arg(long, global = true, default_value_t = DEFAULT_SCALE)]
    pub scale: f32,

    /// Path to the pdfium shared library (needs the `pdfium` feature)
    #[arg(long, global = true, env = "PDFCULL_PDFIUM_LIBRARY")]
    pub pdfium_library: Option<PathBuf>,
}

impl RenderArgs {
    pub fn options(&self) -> RenderOptions {
        RenderOptions { scale: self.scale }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Show page count and page sizes
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Render one PNG thumbnail per page
    Thumbnails {
        /// PDF file to render
        path: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Remove pages and save the result to a new PDF
    #[command(alias = "rm")]
    Remove {
        /// PDF file to remove pages from
        path: PathBuf,

        /// Pages to remove (e.g., "2,5-7,end")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Interactively list, remove and save pages
    Edit {
        /// PDF file to edit
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_render_flags() {
        let cli = Cli::try_parse_from([
            "pdfcull", "remove", "in.pdf", "1,3", "-o", "out.pdf", "--scale", "2", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.render.options(), RenderOptions { scale: 2.0 });
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Remove { ref pages, .. } if pages == "1,3"));
    }

    #[test]
    fn test_default_scale() {
        let cli = Cli::try_parse_from(["pdfcull", "info", "in.pdf"]).unwrap();
        assert_eq!(cli.render.scale, DEFAULT_SCALE);
    }
}
