//! Tooling layer
//!
//! Command-line access to a namespace held in a local sled store.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
