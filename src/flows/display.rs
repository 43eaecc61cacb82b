//! Post-run reporting: included-file listing and per-file token breakdown

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::core::model::IncludedFile;

/// One row of the token table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRow {
    pub path: String,
    pub tokens: usize,
    /// Share of the summed per-file tokens, 0..=100
    pub percent: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenBreakdown {
    pub rows: Vec<TokenRow>,
    pub total: usize,
}

impl TokenBreakdown {
    /// Rows sorted by token count, largest first. Ties keep output order.
    pub fn from_files(files: &[IncludedFile]) -> Self {
        let total: usize = files.iter().map(|f| f.tokens).sum();

        let mut rows: Vec<TokenRow> = files
            .iter()
            .map(|f| TokenRow {
                path: f.path.clone(),
                tokens: f.tokens,
                percent: percent_of(f.tokens, total),
            })
            .collect();
        rows.sort_by(|a, b| b.tokens.cmp(&a.tokens));

        Self { rows, total }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .rows
            .iter()
            .map(|r| format!("{} {} tokens ({:.2}%)", r.path, r.tokens, r.percent))
            .collect();
        lines.push(format!("Total: {} tokens", self.total));
        lines
    }
}

fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Numbered listing, one line per included file
pub fn included_file_lines(files: &[IncludedFile]) -> Vec<String> {
    files
        .iter()
        .enumerate()
        .map(|(i, f)| format!(" {}. {}", i + 1, f.path))
        .collect()
}

pub fn log_included_files(files: &[IncludedFile]) {
    info!("{}", "📋 Files included in the output:".bold());
    for line in included_file_lines(files) {
        info!("{}", line);
    }
}

pub fn log_token_breakdown(files: &[IncludedFile]) {
    info!("{}", "📊 Token analysis:".bold());
    for line in TokenBreakdown::from_files(files).lines() {
        info!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, tokens: usize) -> IncludedFile {
        IncludedFile {
            path: path.to_string(),
            tokens,
        }
    }

    #[test]
    fn test_breakdown_sorted_descending_with_stable_ties() {
        let files = vec![
            file("a.rs", 10),
            file("b.rs", 30),
            file("c.rs", 10),
            file("d.png", 10),
        ];
        let breakdown = TokenBreakdown::from_files(&files);

        let order: Vec<&str> = breakdown.rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(order, vec!["b.rs", "a.rs", "c.rs", "d.png"]);
        assert_eq!(breakdown.total, 60);
        assert!((breakdown.rows[0].percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let files: Vec<IncludedFile> = (1..=7).map(|i| file(&format!("f{i}.txt"), i * 13)).collect();
        let breakdown = TokenBreakdown::from_files(&files);
        let sum: f64 = breakdown.rows.iter().map(|r| r.percent).sum();
        assert!((sum - 100.0).abs() <= 0.1);
    }

    #[test]
    fn test_zero_tokens_gives_zero_percent() {
        let breakdown = TokenBreakdown::from_files(&[file("empty.txt", 0)]);
        assert_eq!(breakdown.rows[0].percent, 0.0);
        assert_eq!(breakdown.lines(), vec!["empty.txt 0 tokens (0.00%)", "Total: 0 tokens"]);
    }

    #[test]
    fn test_breakdown_lines() {
        let breakdown = TokenBreakdown::from_files(&[file("a.rs", 1), file("b.rs", 3)]);
        assert_eq!(
            breakdown.lines(),
            vec![
                "b.rs 3 tokens (75.00%)",
                "a.rs 1 tokens (25.00%)",
                "Total: 4 tokens"
            ]
        );
    }

    #[test]
    fn test_included_file_lines() {
        let lines = included_file_lines(&[file("src/main.rs", 5), file("README.md", 2)]);
        assert_eq!(lines, vec![" 1. src/main.rs", " 2. README.md"]);
    }
}
