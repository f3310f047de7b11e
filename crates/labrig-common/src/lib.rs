//! # labrig-common
//!
//! Shared utilities and types for the labrig node drivers.
//!
//! This crate provides common functionality used across all labrig crates:
//! - Common error types
//! - Lab directory layout
//! - Environment map merging

#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod paths;

pub use env::merge_string_maps;
pub use error::{LabError, LabResult};
pub use paths::{LabPaths, create_directory};
