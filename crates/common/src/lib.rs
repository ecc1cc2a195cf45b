//! stfilter Common Utilities
//!
//! Shared infrastructure for all stfilter crates:
//! - Error types and result aliases
//! - Stage timing for pipeline run summaries
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
