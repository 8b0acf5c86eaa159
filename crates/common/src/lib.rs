//! Common utilities for the zdb crates.
//!
//! This crate provides shared infrastructure used across the workspace:
//!
//! - [`debug`] - Per-module logging controlled via `DEBUG` environment variable
//! - [`source`] - Source text cache for showing where a program is paused

pub mod debug;
pub mod source;

pub use debug::{create_logger, Logger};
pub use source::{SourceCache, SourceLoc};
