//! Pattern matching
//!
//! Compiles ignore/include pattern lists into a single glob set. Plain names
//! are widened so they match at any depth:
//! - `foo` (no extension) matches `foo`, `foo/x`, `a/foo`, `a/foo/x`
//! - `foo.txt` matches `foo.txt` and `a/foo.txt`
//! - globs are used as written and also tried under `**/`

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::paths::{is_glob_pattern, normalize_separators};

/// Anything that can answer "does this path match?"
pub trait PatternPredicate {
    fn matches(&self, path: &str) -> bool;
}

/// Where a pattern list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSource {
    Default,
    IgnoreFile,
    Cli,
    Include,
}

impl fmt::Display for PatternSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternSource::Default => "default",
            PatternSource::IgnoreFile => "ignore-file",
            PatternSource::Cli => "cli",
            PatternSource::Include => "include",
        };
        f.write_str(name)
    }
}

/// Raw patterns tagged with their provenance
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub source: PatternSource,
    pub patterns: Vec<String>,
}

impl PatternSet {
    pub fn new<I, S>(source: PatternSource, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source,
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn compile(&self) -> PatternMatcher {
        let matcher = PatternMatcher::compile(self.patterns.as_slice());
        debug!(
            "Compiled {}/{} {} pattern(s): {}",
            matcher.len(),
            self.patterns.len(),
            self.source,
            self.patterns.join(", ")
        );
        matcher
    }
}

/// Compiled, immutable pattern predicate
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    set: GlobSet,
    len: usize,
}

impl PatternMatcher {
    /// Compile `patterns`. Invalid globs are logged and skipped.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut len = 0;

        for raw in patterns {
            let Some(pattern) = clean_pattern(raw.as_ref()) else {
                continue;
            };

            let globs: Result<Vec<Glob>, globset::Error> =
                expand_pattern(&pattern).iter().map(|p| build_glob(p)).collect();

            match globs {
                Ok(globs) => {
                    for glob in globs {
                        builder.add(glob);
                    }
                    len += 1;
                }
                Err(e) => warn!("Skipping invalid pattern '{}': {}", raw.as_ref(), e),
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            warn!("Failed to build pattern set: {}", e);
            GlobSet::empty()
        });

        Self { set, len }
    }

    /// Number of source patterns that compiled
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl PatternPredicate for PatternMatcher {
    fn matches(&self, path: &str) -> bool {
        !self.is_empty() && self.set.is_match(normalize_separators(path))
    }
}

/// Build one glob with `*` confined to a single path segment.
pub fn build_glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Compile a single glob into a matcher.
pub fn glob_matcher(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    build_glob(&normalize_separators(pattern)).map(|g| g.compile_matcher())
}

fn clean_pattern(raw: &str) -> Option<String> {
    let normalized = normalize_separators(raw.trim());
    let trimmed = normalized
        .trim_start_matches("./")
        .trim_start_matches('/')
        .trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Widen one cleaned pattern into the globs that implement it.
fn expand_pattern(pattern: &str) -> Vec<String> {
    if is_glob_pattern(pattern) {
        if pattern.starts_with("**") {
            return vec![pattern.to_string()];
        }
        return vec![pattern.to_string(), format!("**/{pattern}")];
    }

    let literal = globset::escape(pattern);
    if Path::new(pattern).extension().is_none() {
        vec![
            literal.clone(),
            format!("{literal}/**"),
            format!("**/{literal}/**"),
            format!("**/{literal}"),
        ]
    } else {
        vec![literal.clone(), format!("**/{literal}")]
    }
}
