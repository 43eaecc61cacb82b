//! Aggregation flow
//!
//! resolve -> sort -> verdict -> render -> concatenate -> write -> summarize.
//! Rendering may run on a bounded rayon pool; results are collected by index
//! so the output order is always the sorted candidate order.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::backends::scan::{PathResolver, ResolveFilter};
use crate::core::error::{DigestError, DigestResult};
use crate::core::model::{AggregationSummary, CandidateFile, RenderResult, Verdict};
use crate::core::paths::{absolutize, normalize_path};
use crate::core::render::{render_file, RenderContext};
use crate::core::tokenizer::{count_tokens, TokenModel};
use crate::core::util::{format_mib, natural_cmp};
use crate::filters::defaults::DEFAULT_IGNORES;
use crate::filters::ignore_file::read_ignore_file;
use crate::filters::patterns::{PatternSet, PatternSource};
use crate::filters::verdict::IgnoreResolver;
use crate::flows::display::{log_included_files, log_token_breakdown};

/// Output size above which the token estimate is skipped
pub const MAX_OUTPUT_SIZE_FOR_TOKENS: u64 = 10 * 1024 * 1024;

pub const DEFAULT_OUTPUT_FILE: &str = "codebase.md";
pub const DEFAULT_IGNORE_FILE: &str = ".aidigestignore";

/// Everything one run needs. Paths are absolute.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub cwd: PathBuf,
    pub inputs: Vec<String>,
    pub output_path: PathBuf,
    pub ignore_file: PathBuf,
    pub use_default_ignores: bool,
    pub remove_whitespace: bool,
    pub show_output_files: bool,
    pub show_tokens: bool,
    pub cli_ignores: Vec<String>,
    pub include: Vec<String>,
    /// Dropped while walking; never counted as found
    pub walk_excludes: Vec<String>,
    /// 0 renders on the calling thread
    pub concurrency: usize,
    pub dry_run: bool,
    pub token_model: TokenModel,
}

impl AggregateOptions {
    /// Defaults for a run over `cwd` writing `cwd/codebase.md`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        Self {
            inputs: vec![".".to_string()],
            output_path: cwd.join(DEFAULT_OUTPUT_FILE),
            ignore_file: cwd.join(DEFAULT_IGNORE_FILE),
            cwd,
            use_default_ignores: true,
            remove_whitespace: false,
            show_output_files: false,
            show_tokens: false,
            cli_ignores: Vec::new(),
            include: Vec::new(),
            walk_excludes: Vec::new(),
            concurrency: 0,
            dry_run: false,
            token_model: TokenModel::default(),
        }
    }
}

/// In-memory result of steps 1-6
#[derive(Debug, Clone)]
pub struct Digest {
    pub content: String,
    pub summary: AggregationSummary,
}

/// Full run: build the digest, write it unless dry-run, report.
pub fn aggregate(options: &AggregateOptions) -> DigestResult<AggregationSummary> {
    let started = Instant::now();
    let Digest {
        content,
        mut summary,
    } = build_digest(options)?;

    if options.dry_run {
        info!(
            "🧪 Dry run: {} bytes would be written to {}",
            content.len(),
            options.output_path.display()
        );
    } else {
        write_output(&options.output_path, &content)?;
    }

    if summary.output_bytes > MAX_OUTPUT_SIZE_FOR_TOKENS {
        warn!(
            "⚠️ Output size ({} MB) exceeds {} MB, token count estimation skipped",
            format_mib(summary.output_bytes),
            format_mib(MAX_OUTPUT_SIZE_FOR_TOKENS)
        );
        info!("💡 Consider adding more patterns to the ignore file to reduce the output size.");
    } else {
        summary.estimated_tokens = Some(count_tokens(&content, options.token_model));
    }

    summary.elapsed_ms = started.elapsed().as_millis() as u64;
    log_summary(options, &summary);

    if options.show_tokens {
        log_token_breakdown(&summary.files);
    } else if options.show_output_files {
        log_included_files(&summary.files);
    }

    if !options.dry_run {
        info!("✅ Done! Wrote code base to {}", options.output_path.display());
    }

    Ok(summary)
}

/// Resolve, gate and render every candidate, without touching the output file.
pub fn build_digest(options: &AggregateOptions) -> DigestResult<Digest> {
    let custom_patterns = read_ignore_file(&absolutize(&options.ignore_file, &options.cwd))?;
    let resolver = build_ignore_resolver(options, custom_patterns);

    if options.remove_whitespace {
        info!("🧹 Whitespace removal enabled (except for whitespace-dependent languages).");
    } else {
        info!("📝 Whitespace removal disabled.");
    }

    let mut candidates = PathResolver::new(&options.cwd)
        .with_filter(walk_filter(options))
        .resolve(options.inputs.as_slice())?;
    info!(
        "🔍 Found {} file paths across all inputs. Applying filters...",
        candidates.len()
    );
    sort_candidates(&mut candidates);

    let ctx = RenderContext {
        output_path: options.output_path.clone(),
        cwd: options.cwd.clone(),
        remove_whitespace: options.remove_whitespace,
        token_model: options.token_model,
    };

    let results = render_all(&candidates, &resolver, &ctx, options.concurrency);

    let mut summary = AggregationSummary {
        total_found: candidates.len(),
        dry_run: options.dry_run,
        output_path: normalize_path(&options.output_path),
        ..AggregationSummary::default()
    };
    let mut content = String::new();
    for result in &results {
        summary.record(result);
        if result.is_included() {
            content.push_str(&result.snippet);
        }
    }
    summary.output_bytes = content.len() as u64;

    Ok(Digest { content, summary })
}

fn build_ignore_resolver(options: &AggregateOptions, custom_patterns: Vec<String>) -> IgnoreResolver {
    let mut resolver = IgnoreResolver::new(&options.output_path);

    if options.use_default_ignores {
        info!("🚫 Using default ignore patterns.");
        let defaults = PatternSet::new(PatternSource::Default, DEFAULT_IGNORES.iter().copied());
        resolver = resolver.with_defaults(defaults.compile());
    } else {
        info!("✅ Default ignore patterns disabled.");
    }

    let custom = PatternSet::new(PatternSource::IgnoreFile, custom_patterns);
    if !custom.is_empty() {
        resolver = resolver.with_custom(custom.compile());
    }

    let cli = PatternSet::new(PatternSource::Cli, options.cli_ignores.iter().cloned());
    if !cli.is_empty() {
        resolver = resolver.with_cli(cli.compile());
    }

    let include = PatternSet::new(PatternSource::Include, options.include.iter().cloned());
    if !include.is_empty() {
        let matcher = include.compile();
        if matcher.is_empty() {
            warn!("No usable include pattern; include filtering disabled");
        } else {
            resolver = resolver.with_include(matcher);
        }
    }

    resolver
}

fn walk_filter(options: &AggregateOptions) -> ResolveFilter {
    if options.walk_excludes.is_empty() {
        return ResolveFilter::default();
    }
    let excludes = PatternSet::new(PatternSource::Cli, options.walk_excludes.iter().cloned());
    ResolveFilter::new(excludes.compile())
}

/// Natural order on the full joined path.
pub fn sort_candidates(candidates: &mut Vec<CandidateFile>) {
    let mut keyed: Vec<(String, CandidateFile)> = candidates
        .drain(..)
        .map(|c| (normalize_path(&c.absolute_path()), c))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| natural_cmp(a, b));
    candidates.extend(keyed.into_iter().map(|(_, c)| c));
}

fn render_all(
    candidates: &[CandidateFile],
    resolver: &IgnoreResolver,
    ctx: &RenderContext,
    concurrency: usize,
) -> Vec<RenderResult> {
    let process = |candidate: &CandidateFile| match resolver.verdict(candidate) {
        Verdict::Included => render_file(candidate, ctx),
        verdict => RenderResult::excluded(verdict),
    };

    if concurrency == 0 {
        info!("🔄 Running sequentially (no concurrency)");
        return candidates.iter().map(process).collect();
    }

    match ThreadPoolBuilder::new().num_threads(concurrency).build() {
        Ok(pool) => {
            info!("🔄 Using concurrent processing with {} workers", concurrency);
            pool.install(|| candidates.par_iter().map(process).collect())
        }
        Err(e) => {
            warn!("Failed to start worker pool ({}), running sequentially", e);
            candidates.iter().map(process).collect()
        }
    }
}

/// Write `content` and verify the on-disk size.
pub fn write_output(path: &Path, content: &str) -> DigestResult<()> {
    let write_err = |source| DigestError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)?;
    verify_written_size(path, content.len() as u64)?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Fail unless the file at `path` is exactly `expected` bytes long.
pub fn verify_written_size(path: &Path, expected: u64) -> DigestResult<()> {
    let actual = fs::metadata(path)
        .map_err(|source| DigestError::Write {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    if actual != expected {
        return Err(DigestError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn log_summary(options: &AggregateOptions, summary: &AggregationSummary) {
    if !options.dry_run {
        info!(
            "✅ Files aggregated successfully into {}",
            options.output_path.display()
        );
    }
    info!("📚 Total files found: {}", summary.total_found);
    info!("📎 Files included in output: {}", summary.included);
    info!(
        "🚫 Files ignored by default patterns: {}",
        summary.excluded_default
    );
    if summary.excluded_custom > 0 {
        info!(
            "🚫 Files ignored by custom patterns: {}",
            summary.excluded_custom
        );
    }
    if summary.unreadable > 0 {
        warn!("❗ Files skipped because they could not be read: {}", summary.unreadable);
    }
    info!("📦 Binary and SVG files included: {}", summary.binary_and_svg);
    if let Some(tokens) = summary.estimated_tokens {
        info!("🔢 Estimated token count: {} ({})", tokens, options.token_model);
    }
    debug!("Finished in {} ms", summary.elapsed_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Workspace {
        _temp: TempDir,
        root: PathBuf,
    }

    impl Workspace {
        fn new(files: &[(&str, &str)]) -> Self {
            let temp = TempDir::new().unwrap();
            let root = fs::canonicalize(temp.path()).unwrap();
            for (rel, content) in files {
                let path = root.join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
            Self { _temp: temp, root }
        }

        fn options(&self) -> AggregateOptions {
            let mut options = AggregateOptions::new(&self.root);
            options.token_model = TokenModel::Heuristic;
            options
        }
    }

    fn headings(content: &str) -> Vec<&str> {
        content
            .lines()
            .filter_map(|line| line.strip_prefix("# "))
            .collect()
    }

    #[test]
    fn test_folder_ignore_inside_input_directory() {
        let ws = Workspace::new(&[
            ("folder-a/root.txt", "root"),
            ("folder-a/folder-b/b.txt", "b"),
            ("folder-a/folder-c/c.txt", "c"),
        ]);
        let mut options = ws.options();
        options.inputs = vec!["folder-a".to_string()];
        options.cli_ignores = vec!["folder-a/folder-b".to_string()];

        let digest = build_digest(&options).unwrap();
        assert_eq!(
            headings(&digest.content),
            vec!["folder-a/folder-c/c.txt", "folder-a/root.txt"]
        );
        assert_eq!(digest.summary.excluded_custom, 1);
    }

    #[test]
    fn test_cli_ignore_overrides_include() {
        let ws = Workspace::new(&[
            ("folder-a/root.txt", "root"),
            ("folder-a/folder-b/b.txt", "b"),
            ("other.txt", "other"),
        ]);
        let mut options = ws.options();
        options.include = vec!["folder-a".to_string()];
        options.cli_ignores = vec!["folder-a/folder-b".to_string()];

        let digest = build_digest(&options).unwrap();
        assert_eq!(headings(&digest.content), vec!["folder-a/root.txt"]);
        assert_eq!(digest.summary.excluded_custom, 2);
    }

    #[test]
    fn test_ignore_file_patterns() {
        let ws = Workspace::new(&[
            (".aidigestignore", "# styles\n*.css\n"),
            ("a.ts", "let a = 1;"),
            ("b.css", "body {}"),
        ]);
        let digest = build_digest(&ws.options()).unwrap();
        let heads = headings(&digest.content);
        assert!(heads.contains(&"a.ts"));
        assert!(!heads.contains(&"b.css"));
        assert_eq!(digest.summary.excluded_custom, 1);
    }

    #[test]
    fn test_counts_cover_every_candidate() {
        let ws = Workspace::new(&[
            ("src/main.rs", "fn main() {}"),
            ("node_modules/x/index.js", "x"),
            ("Cargo.lock", "lock"),
            ("notes.md", "notes"),
            ("logo.svg", "<svg/>"),
            ("codebase.md", "old output"),
        ]);
        let mut options = ws.options();
        options.cli_ignores = vec!["notes.md".to_string()];

        let summary = build_digest(&options).unwrap().summary;
        assert_eq!(summary.total_found, 6);
        assert_eq!(
            summary.included + summary.excluded_default + summary.excluded_custom,
            summary.total_found
        );
        assert_eq!(summary.included, 2);
        assert_eq!(summary.binary_and_svg, 1);
        assert_eq!(summary.excluded_custom, 1);
        assert_eq!(summary.files.len(), summary.included);
    }

    #[test]
    fn test_output_order_independent_of_concurrency() {
        let files: Vec<(String, String)> = (1..=40)
            .map(|i| (format!("dir{}/file{}.txt", i % 5, i), format!("content {i}")))
            .collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let ws = Workspace::new(&refs);

        let mut sequential = ws.options();
        sequential.concurrency = 0;
        let mut parallel = ws.options();
        parallel.concurrency = 8;

        let a = build_digest(&sequential).unwrap();
        let b = build_digest(&parallel).unwrap();
        assert_eq!(a.content, b.content);
        assert_eq!(a.summary.files, b.summary.files);
    }

    #[test]
    fn test_walk_excludes_are_not_counted() {
        let ws = Workspace::new(&[("keep.txt", "k"), ("generated/a.txt", "a"), ("generated/b.txt", "b")]);
        let mut options = ws.options();
        options.walk_excludes = vec!["generated".to_string()];

        let summary = build_digest(&options).unwrap().summary;
        assert_eq!(summary.total_found, 1);
        assert_eq!(summary.included, 1);
        assert_eq!(summary.excluded_custom, 0);
    }

    #[test]
    fn test_natural_order_in_output() {
        let ws = Workspace::new(&[("file10.txt", "10"), ("file2.txt", "2"), ("File1.txt", "1")]);
        let digest = build_digest(&ws.options()).unwrap();
        assert_eq!(
            headings(&digest.content),
            vec!["File1.txt", "file2.txt", "file10.txt"]
        );
    }

    #[test]
    fn test_aggregate_is_idempotent_and_skips_own_output() {
        let ws = Workspace::new(&[("a.txt", "alpha"), ("b.txt", "beta")]);
        let mut options = ws.options();
        options.use_default_ignores = false;

        let first = aggregate(&options).unwrap();
        let first_content = fs::read_to_string(&options.output_path).unwrap();
        let second = aggregate(&options).unwrap();
        let second_content = fs::read_to_string(&options.output_path).unwrap();

        assert_eq!(first_content, second_content);
        assert_eq!(first.included, 2);
        assert_eq!(second.included, 2);
        assert_eq!(second.excluded_default, 1);
        assert_eq!(second.output_bytes, second_content.len() as u64);
        assert!(second.estimated_tokens.is_some());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let ws = Workspace::new(&[("a.txt", "alpha")]);
        let mut options = ws.options();
        options.dry_run = true;

        let summary = aggregate(&options).unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.included, 1);
        assert!(summary.output_bytes > 0);
        assert!(!options.output_path.exists());
    }

    #[test]
    fn test_output_into_new_directory() {
        let ws = Workspace::new(&[("a.txt", "alpha")]);
        let mut options = ws.options();
        options.output_path = ws.root.join("out/nested/digest.md");

        aggregate(&options).unwrap();
        let written = fs::read_to_string(&options.output_path).unwrap();
        assert!(written.starts_with("# a.txt\n"));
    }

    #[test]
    fn test_missing_input_aborts_before_write() {
        let ws = Workspace::new(&[("a.txt", "alpha")]);
        let mut options = ws.options();
        options.inputs = vec!["nope".to_string()];

        let result = aggregate(&options);
        assert!(matches!(result, Err(DigestError::PathResolution { .. })));
        assert!(!options.output_path.exists());
    }

    #[test]
    fn test_unreadable_ignore_file_is_fatal() {
        let ws = Workspace::new(&[("a.txt", "alpha")]);
        fs::create_dir(ws.root.join(".aidigestignore")).unwrap();

        let result = build_digest(&ws.options());
        assert!(matches!(result, Err(DigestError::IgnoreFile { .. })));
    }

    #[test]
    fn test_token_estimate_skipped_above_ceiling() {
        let chunk = "a".repeat(4 * 1024 * 1024);
        let ws = Workspace::new(&[
            ("one.txt", chunk.as_str()),
            ("two.txt", chunk.as_str()),
            ("three.txt", chunk.as_str()),
        ]);
        let mut options = ws.options();
        options.dry_run = true;

        let summary = aggregate(&options).unwrap();
        assert_eq!(summary.included, 3);
        assert!(summary.output_bytes > MAX_OUTPUT_SIZE_FOR_TOKENS);
        assert_eq!(summary.estimated_tokens, None);
    }

    #[test]
    fn test_verify_written_size_detects_mismatch() {
        let ws = Workspace::new(&[("short.md", "abc")]);
        let path = ws.root.join("short.md");

        assert!(verify_written_size(&path, 3).is_ok());
        let result = verify_written_size(&path, 5);
        assert!(matches!(
            result,
            Err(DigestError::SizeMismatch {
                expected: 5,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_verify_written_size_missing_file() {
        let ws = Workspace::new(&[]);
        let result = verify_written_size(&ws.root.join("gone.md"), 0);
        assert!(matches!(result, Err(DigestError::Write { .. })));
    }

    #[test]
    fn test_write_output_reports_size() {
        let ws = Workspace::new(&[]);
        let path = ws.root.join("x.md");
        write_output(&path, "héllo").unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), "héllo".len() as u64);
    }
}
