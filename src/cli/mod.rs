//! CLI commands
//!
//! Command implementations for the `assemble` binary.

mod serve;

pub use serve::run_serve;
