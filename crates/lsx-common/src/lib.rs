//! LSX Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared infrastructure for the LSX workspace members.
//!
//! # Overview
//!
//! This crate provides functionality used by both the export engine and the
//! CLI:
//!
//! - **Logging**: Centralized tracing setup with console/file output
//! - **Env**: Small helpers for trimmed, validated environment reads

pub mod env;
pub mod logging;
