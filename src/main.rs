//! ai-digest - aggregate a codebase into a single Markdown file
//!
//! ai-digest provides:
//! - Directory, file and glob inputs
//! - Layered ignore rules (defaults, ignore file, CLI, include)
//! - Text/binary/SVG aware rendering with deterministic ordering
//! - Token estimates for LLM context budgeting

use anyhow::{Context, Result};
use clap::Parser;

mod backends;
mod cli;
mod core;
mod filters;
mod flows;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let color = cli.color_enabled();
    if !color {
        colored::control::set_override(false);
    }

    let log = core::logging::init(color);
    if cli.verbose {
        log.set_verbose(true)
            .context("failed to raise log level")?;
    }

    cli::run(cli)
}
