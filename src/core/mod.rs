//! Core module - Data model and per-file building blocks
//!
//! This module provides:
//! - Pipeline data model (candidates, verdicts, render results, summary)
//! - Fatal error taxonomy
//! - Path normalization and natural ordering
//! - File classification and snippet rendering
//! - Token counting for LLM context budgeting
//! - Logging setup

pub mod classify;
pub mod error;
pub mod logging;
pub mod model;
pub mod paths;
pub mod render;
pub mod tokenizer;
pub mod util;
