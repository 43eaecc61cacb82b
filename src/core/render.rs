//! Snippet renderer
//!
//! Turns one gated candidate into its Markdown block:
//! - text files become a fenced code block labelled with the extension
//! - binary and SVG files become a one-line type description
//! - oversized text files become a placeholder without reading content

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::core::classify::{classify, FileType, MAX_TEXT_FILE_SIZE};
use crate::core::model::{CandidateFile, RenderResult, Verdict};
use crate::core::paths::display_path;
use crate::core::tokenizer::{count_tokens, TokenModel, PLACEHOLDER_TOKENS};
use crate::core::util::{escape_triple_backticks, format_mib, remove_whitespace};

/// Extensions whose whitespace carries meaning; never collapsed
pub const WHITESPACE_SENSITIVE_EXTENSIONS: &[&str] = &[
    "py", "yaml", "yml", "jade", "haml", "slim", "coffee", "pug", "styl", "gd",
];

/// Read-only settings shared by every render task
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Absolute output path; a candidate equal to it is never rendered
    pub output_path: PathBuf,
    /// Directory headings are made relative to
    pub cwd: PathBuf,
    pub remove_whitespace: bool,
    pub token_model: TokenModel,
}

/// Render one candidate. I/O failures are logged and yield an unreadable,
/// non-included result.
pub fn render_file(candidate: &CandidateFile, ctx: &RenderContext) -> RenderResult {
    let absolute = candidate.absolute_path();

    if absolute == ctx.output_path {
        debug!("Skipping output file: {}", absolute.display());
        return RenderResult::excluded(Verdict::ExcludedDefault);
    }

    match try_render(candidate, &absolute, ctx) {
        Ok(result) => result,
        Err(e) => {
            error!(
                "Error processing file {} in directory {}: {}",
                candidate.relative_path,
                candidate.base_dir.display(),
                e
            );
            RenderResult::unreadable()
        }
    }
}

fn try_render(
    candidate: &CandidateFile,
    absolute: &Path,
    ctx: &RenderContext,
) -> std::io::Result<RenderResult> {
    let classification = classify(absolute)?;
    let size = fs::metadata(absolute)?.len();
    let display = display_path(absolute, &ctx.cwd, &candidate.relative_path);

    debug!(
        "{}: {:.2}KB, text={}, treat_as_binary={}",
        candidate.relative_path,
        size as f64 / 1024.0,
        classification.is_text,
        classification.treat_as_binary
    );

    if !classification.renders_as_text() {
        return Ok(included(
            binary_snippet(&display, classification.file_type),
            display,
            true,
            PLACEHOLDER_TOKENS,
        ));
    }

    if size > MAX_TEXT_FILE_SIZE {
        debug!(
            "File exceeds size limit ({}MB): {}",
            format_mib(MAX_TEXT_FILE_SIZE),
            candidate.relative_path
        );
        let snippet = oversized_snippet(&display);
        let tokens = count_tokens(&snippet, ctx.token_model);
        return Ok(included(snippet, display, false, tokens));
    }

    let bytes = fs::read(absolute)?;
    let mut content = escape_triple_backticks(&String::from_utf8_lossy(&bytes));
    let extension = candidate.extension();

    if ctx.remove_whitespace && !is_whitespace_sensitive(extension) {
        let before = content.len();
        content = remove_whitespace(&content);
        debug!(
            "Whitespace removal for {}: {} -> {} bytes",
            candidate.relative_path,
            before,
            content.len()
        );
    }

    let snippet = text_snippet(&display, extension, &content);
    let tokens = count_tokens(&snippet, ctx.token_model);
    Ok(included(snippet, display, false, tokens))
}

fn included(
    snippet: String,
    display_path: String,
    is_binary_or_svg: bool,
    token_count: usize,
) -> RenderResult {
    RenderResult {
        snippet,
        verdict: Verdict::Included,
        is_binary_or_svg,
        token_count,
        display_path,
        unreadable: false,
    }
}

fn is_whitespace_sensitive(extension: &str) -> bool {
    let ext = extension.to_ascii_lowercase();
    WHITESPACE_SENSITIVE_EXTENSIONS.contains(&ext.as_str())
}

/// Fenced code block for a text file
pub fn text_snippet(display_path: &str, extension: &str, content: &str) -> String {
    format!("# {display_path}\n\n```{extension}\n{content}\n```\n\n")
}

/// Type description for binary and SVG files
pub fn binary_snippet(display_path: &str, file_type: FileType) -> String {
    if file_type == FileType::SvgImage {
        format!("# {display_path}\n\nThis is a file of the type: {file_type}\n\n")
    } else {
        format!("# {display_path}\n\nThis is a binary file of the type: {file_type}\n\n")
    }
}

/// Placeholder for text files above the size limit
pub fn oversized_snippet(display_path: &str) -> String {
    format!(
        "# {display_path}\n\n(This text file is > {} MB, skipping content.)\n\n",
        format_mib(MAX_TEXT_FILE_SIZE)
    )
}
