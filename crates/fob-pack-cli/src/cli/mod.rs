//! Command-line interface definition for fob-pack.
//!
//! - `fob-pack pack <SITE_DIR>` - Pack the scripts of a built site

mod commands;

use clap::Parser;

pub use commands::{Command, PackArgs};

/// Fob pack - shared, minified script bundles for generated sites
#[derive(Parser, Debug)]
#[command(
    name = "fob-pack",
    version,
    about = "Share, minify and bundle the scripts of a generated site",
    long_about = "fob-pack collects the <script> elements of every HTML page in a built site,\n\
                  minifies each unique script once and replaces them with one bundle per\n\
                  distinct ordered set of scripts, either as a shared .min.js file or inline."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every script decision: fetched, read, skipped or excluded.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
