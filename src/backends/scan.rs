//! Path resolution backend
//!
//! Expands input paths into candidates. Directories are walked with the
//! ignore crate (all filters off), globs with walkdir + globset.

use ignore::WalkBuilder;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::error::{DigestError, DigestResult};
use crate::core::model::CandidateFile;
use crate::core::paths::{
    absolutize, base_name, clean_path, is_glob_pattern, make_relative, normalize_path,
    normalize_separators,
};
use crate::filters::patterns::{glob_matcher, PatternMatcher, PatternPredicate};

/// One user-supplied input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    File(PathBuf),
    Directory(PathBuf),
    Glob(String),
}

impl InputSpec {
    /// Classify `input`, stat'ing literal paths. Globs are not touched.
    pub fn parse(input: &str, cwd: &Path) -> DigestResult<Self> {
        if is_glob_pattern(input) {
            return Ok(InputSpec::Glob(input.to_string()));
        }

        let path = absolutize(Path::new(input), cwd);
        let metadata = fs::metadata(&path).map_err(|source| DigestError::PathResolution {
            path: path.clone(),
            source,
        })?;
        let path = fs::canonicalize(&path).unwrap_or(path);

        if metadata.is_dir() {
            Ok(InputSpec::Directory(path))
        } else {
            Ok(InputSpec::File(path))
        }
    }
}

/// Exclusions applied while gathering from directories and globs. Paths it
/// rejects never become candidates.
#[derive(Debug, Clone, Default)]
pub struct ResolveFilter {
    exclude: Option<PatternMatcher>,
}

impl ResolveFilter {
    pub fn new(exclude: PatternMatcher) -> Self {
        Self {
            exclude: Some(exclude).filter(|m| !m.is_empty()),
        }
    }

    pub fn accepts(&self, relative_path: &str) -> bool {
        !self.exclude.as_ref().is_some_and(|m| m.matches(relative_path))
    }
}

pub struct PathResolver {
    cwd: PathBuf,
    filter: ResolveFilter,
}

impl PathResolver {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            filter: ResolveFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ResolveFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Expand every input into candidates, in input order.
    pub fn resolve<S: AsRef<str>>(&self, inputs: &[S]) -> DigestResult<Vec<CandidateFile>> {
        let mut candidates = Vec::new();

        for input in inputs {
            let input = input.as_ref();
            let before = candidates.len();

            match InputSpec::parse(input, &self.cwd)? {
                InputSpec::File(path) => candidates.push(resolve_file(&path)),
                InputSpec::Directory(path) => self.resolve_dir(&path, &mut candidates),
                InputSpec::Glob(pattern) => self.resolve_glob(&pattern, &mut candidates)?,
            }

            debug!("Input '{}' resolved to {} file(s)", input, candidates.len() - before);
        }

        Ok(candidates)
    }

    fn resolve_dir(&self, dir: &Path, out: &mut Vec<CandidateFile>) {
        let name = base_name(dir);
        let base = match dir.parent() {
            Some(parent) if !name.is_empty() => parent.to_path_buf(),
            _ => dir.to_path_buf(),
        };

        let mut builder = WalkBuilder::new(dir);
        builder.standard_filters(false).follow_links(false);

        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = match make_relative(path, &base) {
                Some(r) => r,
                None => continue,
            };

            if self.filter.accepts(&relative) {
                out.push(CandidateFile::new(&base, relative));
            }
        }
    }

    fn resolve_glob(&self, pattern: &str, out: &mut Vec<CandidateFile>) -> DigestResult<()> {
        // Absolute and free of `.`/`..`, like the resolved output path.
        let pattern_path = normalize_separators(pattern);
        let absolute = clean_path(&absolutize(Path::new(&pattern_path), &self.cwd));
        let (match_pattern, under_cwd) = match absolute.strip_prefix(&self.cwd) {
            Ok(rel) => (normalize_path(rel), true),
            Err(_) => (normalize_path(&absolute), false),
        };
        let matcher = glob_matcher(&match_pattern).map_err(|source| DigestError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?;

        let root = literal_prefix(&normalize_path(&absolute));

        for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Glob walk stopped at {}: {}", root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = if under_cwd {
                match make_relative(path, &self.cwd) {
                    Some(r) => r,
                    None => continue,
                }
            } else {
                normalize_path(path)
            };

            if matcher.is_match(&relative) && self.filter.accepts(&relative) {
                out.push(CandidateFile::new(&self.cwd, relative));
            }
        }

        Ok(())
    }
}

fn resolve_file(path: &Path) -> CandidateFile {
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    CandidateFile::new(base, base_name(path))
}

/// Leading components of `pattern` that contain no glob metacharacters.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for component in Path::new(pattern).components() {
        if let Component::Normal(part) = component {
            if is_glob_pattern(&part.to_string_lossy()) {
                break;
            }
        }
        prefix.push(component);
    }
    prefix
}
