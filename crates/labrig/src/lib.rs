//! # labrig
//!
//! Command line front-end for the labrig node drivers.

#![warn(missing_docs)]

pub mod cli;

pub use cli::Cli;
