//! Shared test utilities

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_git;
pub mod mock_platform;
