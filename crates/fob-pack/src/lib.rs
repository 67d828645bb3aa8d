#![cfg_attr(docsrs, feature(doc_cfg))]

//! # fob-pack
//!
//! Fob pack - script consolidation for generated HTML pages.
//!
//! Given the HTML documents of a static build, this crate finds every
//! `<script>` a page carries (remote, local or inline), deduplicates them by
//! key, minifies each unique script once, and regroups them into shared
//! bundles: pages that need the same ordered set of scripts share a single
//! payload, either as one external `.min.js` file or inlined into each page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fob_pack::{FileCollection, PackOptions, Packer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut files = FileCollection::from_dir("build")?;
//!
//! let report = Packer::new(PackOptions::default().content_root("src"))
//!     .run(&mut files)
//!     .await?;
//!
//! println!("{} bundles for {} pages", report.bundles, report.documents_bundled);
//! files.write_to("build")?;
//! # Ok(()) }
//! ```
//!
//! ## Pipeline
//!
//! A run has two phases separated by a barrier:
//!
//! 1. **Scan** every `.html` document in collection order. Scripts are
//!    classified, claimed in the [`ScriptStore`], and removed from the page.
//!    Remote scripts are fetched in the background.
//! 2. **Emit** every bundle once all remote fetches have settled.

pub mod bundle;
pub mod classify;
pub mod collection;
pub mod config;
pub mod emit;
pub mod fetch;
pub mod html;
pub mod key;
pub mod minify;
pub mod pipeline;
pub mod scan;
pub mod store;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use bundle::{Bundle, BundleGrouper};
pub use classify::{ScriptReference, ScriptTag, classify};
pub use collection::FileCollection;
pub use config::{MinifyOptions, PackOptions};
pub use fetch::{FetchCoordinator, FetchError, FetchedScript, HttpFetcher, ScriptFetcher};
pub use key::{BundleKey, ScriptKey};
pub use minify::{MinifyError, MinifyLevel, OxcMinifier, ScriptMinifier};
pub use pipeline::{PackContext, PackReport, Packer};
pub use store::{Claim, ScriptOrigin, ScriptRecord, ScriptState, ScriptStore};

use std::path::PathBuf;

/// Error types for fob-pack operations.
///
/// Missing local scripts and minifier failures never show up here: both are
/// absorbed where they happen and reported as warnings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote script could not be retrieved. There is no content to fall back to.
    #[error("Failed to fetch remote script {url}: {source}")]
    RemoteFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A local script exists but could not be read.
    #[error("Failed to read script {}: {source}", .path.display())]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document could not be parsed or serialized.
    #[error("HTML error in {document}: {source}")]
    Html {
        document: String,
        #[source]
        source: std::io::Error,
    },

    /// A bundle references a script whose content was never recorded.
    #[error("Script {0} has no content; was its fetch awaited?")]
    UnresolvedScript(ScriptKey),

    /// A fetch task panicked or was cancelled.
    #[error("Fetch task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// I/O error with context message.
    #[error("{message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for fob-pack operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
