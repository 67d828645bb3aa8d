//! Run orchestration.
//!
//! A [`Packer`] holds the options and the pluggable minifier/fetcher. Every
//! call to [`Packer::run`] creates a fresh [`PackContext`], so nothing is
//! shared between runs:
//!
//! ```text
//! validate → scan documents → await fetches → record bodies → emit bundles
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::bundle::BundleGrouper;
use crate::collection::FileCollection;
use crate::config::PackOptions;
use crate::emit::OutputEmitter;
use crate::fetch::{FetchCoordinator, HttpFetcher, ScriptFetcher};
use crate::minify::{OxcMinifier, ScriptMinifier};
use crate::scan::DocumentScanner;
use crate::Result;
use crate::store::ScriptStore;

/// State of a single run.
#[derive(Debug)]
pub struct PackContext {
    pub store: ScriptStore,
    pub grouper: BundleGrouper,
    pub fetches: FetchCoordinator,
}

impl PackContext {
    pub fn new(
        minifier: Option<Arc<dyn ScriptMinifier>>,
        fetcher: Arc<dyn ScriptFetcher>,
    ) -> Self {
        Self {
            store: ScriptStore::new(minifier),
            grouper: BundleGrouper::new(),
            fetches: FetchCoordinator::new(fetcher),
        }
    }
}

/// Counters of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackReport {
    /// `.html` documents scanned.
    pub documents_scanned: usize,
    /// Documents assigned to a bundle.
    pub documents_bundled: usize,
    /// Distinct scripts recorded.
    pub unique_scripts: usize,
    pub bundles: usize,
    /// Bundle files added to the collection (0 in inline mode).
    pub artifacts: usize,
    /// Remote scripts fetched.
    pub remote_fetches: usize,
    /// Local scripts skipped because their file is missing.
    pub missing_local: usize,
    /// Scripts kept unminified because the minifier rejected them.
    pub minify_fallbacks: usize,
}

/// Script packer for a collection of generated pages.
#[derive(Debug, Clone)]
pub struct Packer {
    options: PackOptions,
    minifier: Arc<dyn ScriptMinifier>,
    fetcher: Arc<dyn ScriptFetcher>,
}

impl Packer {
    /// Packer using the oxc minifier and an HTTP fetcher.
    pub fn new(options: PackOptions) -> Self {
        let minifier = Arc::new(OxcMinifier::new(options.uglify_options.clone()));
        Self {
            options,
            minifier,
            fetcher: Arc::new(HttpFetcher::new()),
        }
    }

    pub fn with_minifier(mut self, minifier: Arc<dyn ScriptMinifier>) -> Self {
        self.minifier = minifier;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ScriptFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn options(&self) -> &PackOptions {
        &self.options
    }

    /// Pack the scripts of every `.html` document in `files`, in place.
    ///
    /// Documents whose scripts were packed are written back, with their scripts
    /// replaced by a bundle reference (external mode) or an inline payload
    /// (inline mode). Documents the scan did not touch keep their bytes.
    /// Bundle files are added to `files` in external mode.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Invalid options, unreadable local scripts, HTML failures and any remote
    /// fetch failure abort the run. Bundles are only emitted once every fetch
    /// succeeded, so a failed run adds no bundle files.
    pub async fn run(&self, files: &mut FileCollection) -> Result<PackReport> {
        self.options.validate()?;

        let minifier = self.options.uglify.then(|| Arc::clone(&self.minifier));
        let mut context = PackContext::new(minifier, Arc::clone(&self.fetcher));
        let mut report = PackReport::default();

        // Phase 1: scan. Handles to parsed documents stay inside this block.
        {
            let mut scanner = DocumentScanner::new(&self.options, &mut context);
            for path in files.html_paths() {
                let Some(contents) = files.get(&path) else {
                    continue;
                };
                let scanned = scanner.scan(&path, contents)?;

                report.documents_scanned += 1;
                report.missing_local += scanned.missing_local;
                if scanned.bundle.is_some() {
                    report.documents_bundled += 1;
                }
                if scanned.changed {
                    files.insert(path, scanned.contents);
                }
            }
        }

        // Barrier: every claimed remote script must have its body.
        let PackContext {
            mut store,
            grouper,
            fetches,
        } = context;
        debug!("waiting for {} remote scripts", fetches.pending());
        let fetched = fetches.barrier().await?;
        report.remote_fetches = fetched.len();
        for script in fetched {
            store.set_fetched(&script.key, script.body);
        }

        // Phase 2: emit.
        let summary = OutputEmitter::new(&self.options, &store, &grouper).emit(files)?;

        report.unique_scripts = store.len();
        report.bundles = grouper.len();
        report.artifacts = summary.artifacts;
        report.minify_fallbacks = store.fallback_count();

        info!(
            "Packed {} scripts into {} bundles for {} of {} documents",
            report.unique_scripts,
            report.bundles,
            report.documents_bundled,
            report.documents_scanned
        );

        Ok(report)
    }
}
