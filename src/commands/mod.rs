//! Command implementations for the CLI
//!
//! - serve: Start the web front-ends
//! - check: Load both artifacts and report their status
//! - predict: One-shot prediction from the command line
//! - config: Configuration display and validation

pub mod check;
pub mod config;
pub mod predict;
pub mod serve;
