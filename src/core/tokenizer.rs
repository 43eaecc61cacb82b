//! Token estimation for LLM context budgeting
//!
//! Counts tokens with tiktoken encodings (o200k_base by default, matching
//! GPT-4o) and falls back to a character-class heuristic when an encoding is
//! unavailable or the heuristic is requested explicitly.

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use std::sync::Once;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};
use tracing::warn;

/// Fixed token cost of a binary or SVG placeholder snippet
pub const PLACEHOLDER_TOKENS: usize = 10;

/// Token encodings available to the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// o200k_base (GPT-4o)
    #[default]
    O200k,
    /// cl100k_base (GPT-4, GPT-3.5-turbo)
    Cl100k,
    /// Character-class estimate, no BPE
    Heuristic,
}

impl TokenModel {
    fn bpe(self) -> Option<&'static CoreBPE> {
        let loaded = match self {
            TokenModel::O200k => &*O200K_BPE,
            TokenModel::Cl100k => &*CL100K_BPE,
            TokenModel::Heuristic => return None,
        };
        match loaded {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                LOAD_WARNING.call_once(|| {
                    warn!("{}; falling back to heuristic token estimate", e);
                });
                None
            }
        }
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::O200k => "o200k",
            TokenModel::Cl100k => "cl100k",
            TokenModel::Heuristic => "heuristic",
        };
        f.write_str(name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "o200k" | "o200k_base" | "gpt-4o" | "gpt4o" => Ok(TokenModel::O200k),
            "cl100k" | "cl100k_base" | "gpt-4" | "gpt4" => Ok(TokenModel::Cl100k),
            "heuristic" | "fast" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "unknown token model '{}' (expected o200k, cl100k or heuristic)",
                s
            )),
        }
    }
}

static LOAD_WARNING: Once = Once::new();

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("failed to load o200k_base: {}", e)));

static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("failed to load cl100k_base: {}", e)));

/// Count tokens in `text`. Deterministic for identical input.
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    match model.bpe() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => estimate_tokens_heuristic(text),
    }
}

/// Rough estimate: ~4 chars per token for ASCII words, ~2 for code symbols
/// and non-CJK unicode, ~1.5 for CJK.
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    let (mut words, mut symbols, mut cjk, mut other) = (0usize, 0usize, 0usize, 0usize);

    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c.is_ascii_whitespace() {
            words += 1;
        } else if c.is_ascii() {
            symbols += 1;
        } else if is_cjk_char(c) {
            cjk += 1;
        } else {
            other += 1;
        }
    }

    words.div_ceil(4) + symbols.div_ceil(2) + (cjk * 2).div_ceil(3) + other.div_ceil(2)
}

#[inline]
fn is_cjk_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x3000..=0x303F
        | 0x3040..=0x30FF
        | 0xAC00..=0xD7AF
        | 0xFF00..=0xFFEF)
}
