//! CLI module - Command-line interface definition and handler

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::core::paths::{absolutize, resolve_output_path};
use crate::core::tokenizer::TokenModel;
use crate::flows::aggregate::{
    aggregate, AggregateOptions, DEFAULT_IGNORE_FILE, DEFAULT_OUTPUT_FILE,
};

/// ai-digest - aggregate a codebase into one Markdown file for LLM context.
#[derive(Parser, Debug)]
#[command(name = "ai-digest")]
#[command(
    author,
    version,
    about,
    long_about = r#"ai-digest walks the given inputs, filters files through layered ignore
rules, and writes every surviving file as a Markdown section into one output
file, together with an estimated token count.

Text files become fenced code blocks labelled with their extension. Binary and
SVG files become a one-line type description. Text files above 5 MB are
replaced by a placeholder.

Ignore precedence (first match wins):
  1. the output file itself
  2. --ignore patterns
  3. ignore-file patterns
  4. default ignores (unless --no-default-ignores)
  5. --include given but not matched

Examples:
    ai-digest
    ai-digest -i src -i README.md -o digest.md
    ai-digest -i folder-a --ignore folder-a/folder-b --show-tokens
    ai-digest -i "src/**/*.rs" -c 8 --dry-run --json
"#
)]
pub struct Cli {
    /// Input files, directories or glob patterns.
    #[arg(
        short,
        long = "input",
        value_name = "PATH",
        num_args = 1..,
        default_value = ".",
        long_help = "Input files, directories or glob patterns (repeatable).\n\n\
Directories are walked recursively, dotfiles included, and keep their own name as\n\
the first path segment. Globs are expanded relative to the working directory."
    )]
    pub inputs: Vec<String>,

    /// Output Markdown file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "AI_DIGEST_OUTPUT",
        default_value = DEFAULT_OUTPUT_FILE,
        long_help = "Output Markdown file. Relative paths resolve against the working directory;\n\
missing parent directories are created. The output file is never included in itself."
    )]
    pub output: PathBuf,

    /// Ignore file with one pattern per line.
    #[arg(
        long,
        value_name = "FILE",
        env = "AI_DIGEST_IGNORE_FILE",
        default_value = DEFAULT_IGNORE_FILE,
        long_help = "File with newline-delimited ignore patterns. Blank lines and lines starting\n\
with '#' are skipped. A missing file simply means no custom patterns."
    )]
    pub ignore_file: PathBuf,

    /// Disable the built-in ignore patterns.
    #[arg(
        long,
        long_help = "Disable the built-in ignore set (node_modules, lockfiles, .git, build\n\
output, env files, ...)."
    )]
    pub no_default_ignores: bool,

    /// Collapse whitespace in files where it is not significant.
    #[arg(
        long,
        long_help = "Collapse every whitespace run to a single space. Files whose extension is\n\
whitespace-sensitive (.py .yaml .yml .jade .haml .slim .coffee .pug .styl .gd) are\n\
left untouched."
    )]
    pub whitespace_removal: bool,

    /// List the included files after the run.
    #[arg(short = 'f', long)]
    pub show_output_files: bool,

    /// Show a per-file token breakdown.
    #[arg(
        long,
        long_help = "Show each included file's token count and share of the total, largest\n\
first. Replaces the plain --show-output-files listing."
    )]
    pub show_tokens: bool,

    /// Render files in parallel with N workers (default 4).
    #[arg(
        short = 'c',
        long = "concurrent",
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = "4",
        env = "AI_DIGEST_CONCURRENCY",
        long_help = "Render files on a pool of N worker threads. Without a value, 4 workers are\n\
used; 0 or omitting the flag renders sequentially. Output order never depends on this."
    )]
    pub concurrent: Option<usize>,

    /// Run everything except writing the output file.
    #[arg(long)]
    pub dry_run: bool,

    /// Extra ignore pattern (repeatable).
    #[arg(
        long = "ignore",
        value_name = "PATTERN",
        long_help = "Extra ignore pattern (repeatable). These take precedence over every other\n\
rule, including --include."
    )]
    pub ignores: Vec<String>,

    /// Only include files matching PATTERN (repeatable).
    #[arg(long = "include", value_name = "PATTERN")]
    pub includes: Vec<String>,

    /// Skip matching paths while walking (repeatable).
    #[arg(
        long = "exclude",
        value_name = "PATTERN",
        long_help = "Skip matching paths while walking directories and glob inputs (repeatable).\n\n\
Unlike --ignore, skipped paths never become candidates and are not counted in the\n\
summary. Literal file inputs are never skipped."
    )]
    pub excludes: Vec<String>,

    /// Token encoding used for estimates.
    #[arg(
        long,
        value_name = "MODEL",
        default_value = "o200k",
        long_help = "Token encoding used for estimates.\n\n\
Supported values:\n\
- o200k (default, GPT-4o)\n\
- cl100k (GPT-4)\n\
- heuristic (no BPE, character-class estimate)"
    )]
    pub token_model: TokenModel,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Disable colored output.
    #[arg(
        long,
        long_help = "Disable colored output. NO_COLOR in the environment has the same effect."
    )]
    pub no_color: bool,

    /// Verbose mode (debug logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether logs and tables may use ANSI colour.
    pub fn color_enabled(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }

    pub fn to_options(&self, cwd: &Path) -> AggregateOptions {
        AggregateOptions {
            cwd: cwd.to_path_buf(),
            inputs: self.inputs.clone(),
            output_path: resolve_output_path(&self.output, cwd),
            ignore_file: absolutize(&self.ignore_file, cwd),
            use_default_ignores: !self.no_default_ignores,
            remove_whitespace: self.whitespace_removal,
            show_output_files: self.show_output_files,
            show_tokens: self.show_tokens,
            cli_ignores: self.ignores.clone(),
            include: self.includes.clone(),
            walk_excludes: self.excludes.clone(),
            concurrency: self.concurrent.unwrap_or(0),
            dry_run: self.dry_run,
            token_model: self.token_model,
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let cwd = cwd.canonicalize().unwrap_or(cwd);

    let options = cli.to_options(&cwd);
    let summary = aggregate(&options)
        .with_context(|| format!("failed to build {}", options.output_path.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{}", json);
    }

    Ok(())
}
