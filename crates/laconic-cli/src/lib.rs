//! laconic CLI library
//!
//! Exposes the command-line entry points so the binary stays a thin wrapper
//! and the commands can be driven with explicit arguments.

mod cli;

pub use cli::{run, run_with};
