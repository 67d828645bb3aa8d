//! Fob pack CLI - script consolidation for generated sites.
//!
//! Command-line front end for [`fob_pack`]: loads a built site from disk,
//! packs its scripts and writes the result back.
//!
//! - [`cli`] - Argument definitions
//! - [`config`] - Layered option loading (defaults, file, env, flags)
//! - [`commands`] - Command implementations
//! - [`error`] - Error types and miette reporting
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - Terminal output helpers

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
