//! Filters module - Deciding which candidates reach the output
//!
//! This module provides:
//! - Glob-backed pattern predicates
//! - The built-in ignore set
//! - Ignore-file loading
//! - Verdict resolution with fixed precedence

pub mod defaults;
pub mod ignore_file;
pub mod patterns;
pub mod verdict;
