//! assemble - submit code snippets to a GitHub project as pull requests
//!
//! A small HTTP service: a client authenticates with GitHub through OAuth,
//! then posts a snippet of code. The service forks the upstream project,
//! commits the snippet on a fresh branch of the fork and opens a pull
//! request upstream, reporting per-step progress along the way.

pub mod auth;
pub mod config;
pub mod error;
pub mod platform;
pub mod repo;
pub mod server;
pub mod submit;
pub mod types;

pub use error::{Error, Result};
