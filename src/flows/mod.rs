//! Flows module - end-to-end operations built from the core and filters
//!
//! Provides:
//! - aggregate: the resolve/filter/render/write pipeline
//! - display: included-file listing and token breakdown

pub mod aggregate;
pub mod display;
