//! Backends module - filesystem access
//!
//! Provides:
//! - scan: input path resolution with ignore/walkdir/globset

pub mod scan;
