//! Common utilities: natural ordering and text transforms

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Numeric-aware, case-insensitive string comparison.
///
/// Digit runs compare by value (`file2` < `file10`); everything else compares
/// by lowercased character. Strings that tie are ordered bytewise so the
/// result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut x, mut y) = (a, b);
    loop {
        let (cx, cy) = match (x.chars().next(), y.chars().next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(cx), Some(cy)) => (cx, cy),
        };

        if cx.is_ascii_digit() && cy.is_ascii_digit() {
            let dx = digit_run(x);
            let dy = digit_run(y);
            let ord = cmp_digit_runs(dx, dy);
            if ord != Ordering::Equal {
                return ord;
            }
            x = &x[dx.len()..];
            y = &y[dy.len()..];
        } else {
            let ord = cx.to_lowercase().cmp(cy.to_lowercase());
            if ord != Ordering::Equal {
                return ord;
            }
            x = &x[cx.len_utf8()..];
            y = &y[cy.len_utf8()..];
        }
    }
}

fn digit_run(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    &s[..end]
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Escape literal triple backticks so they cannot close the surrounding fence.
pub fn escape_triple_backticks(content: &str) -> String {
    content.replace("```", "\\`\\`\\`")
}

/// Collapse every whitespace run into a single space and trim the ends.
pub fn remove_whitespace(content: &str) -> String {
    WHITESPACE_RUN.replace_all(content, " ").trim().to_string()
}

/// Format a byte count as mebibytes with one decimal ("5.0").
pub fn format_mib(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / 1024.0 / 1024.0)
}
