//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod categories;
pub mod export;
pub mod fields;
pub mod login;
