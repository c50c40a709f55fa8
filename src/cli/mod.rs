//! CLI-specific utilities for iconify-dl
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod progress;
pub mod select;

pub use progress::ProgressReporter;
pub use select::CollectionArg;
