//! Shared test utilities for fob-pack tests
//!
//! Fake fetchers and minifiers so the pipeline can run without a network,
//! plus helpers to build sites on disk.

#![allow(dead_code)]

use async_trait::async_trait;
use fob_pack::fetch::FetchResult;
use fob_pack::{
    FetchError, FileCollection, MinifyError, PackOptions, ScriptFetcher, ScriptMinifier,
};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Fetcher answering every URL with `/* <url> */` and counting requests.
#[derive(Debug, Default)]
pub struct CountingFetcher {
    requests: Mutex<Vec<String>>,
}

impl CountingFetcher {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn body_for(url: &str) -> String {
        format!("/* {url} */")
    }
}

#[async_trait]
impl ScriptFetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        self.requests.lock().unwrap().push(url.to_string());
        // Let other fetches start before this one settles
        tokio::task::yield_now().await;
        Ok(Self::body_for(url))
    }
}

/// Fetcher failing every URL containing `needle`.
#[derive(Debug)]
pub struct FailingFetcher {
    pub needle: &'static str,
}

#[async_trait]
impl ScriptFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        if url.contains(self.needle) {
            Err(FetchError::Status { status: 503 })
        } else {
            Ok(CountingFetcher::body_for(url))
        }
    }
}

/// Minifier that trims and uppercases, counting calls.
#[derive(Debug, Default)]
pub struct CountingMinifier {
    calls: AtomicUsize,
}

impl CountingMinifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScriptMinifier for CountingMinifier {
    fn minify(&self, source: &str) -> Result<String, MinifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(source.trim().to_uppercase())
    }
}

/// Minifier rejecting every script.
#[derive(Debug)]
pub struct FailingMinifier;

impl ScriptMinifier for FailingMinifier {
    fn minify(&self, _source: &str) -> Result<String, MinifyError> {
        Err(MinifyError::Syntax("Unexpected token".to_string()))
    }
}

/// Wrap `body` in a minimal page.
pub fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>t</title></head><body>{body}</body></html>")
}

/// Collection of `(path, html)` pages.
pub fn site<S: AsRef<str>>(pages: &[(&str, S)]) -> FileCollection {
    pages
        .iter()
        .map(|(path, html)| (path.to_string(), html.as_ref().as_bytes().to_vec()))
        .collect()
}

/// Content root holding `(relative path, contents)` scripts.
pub fn content_root(scripts: &[(&str, &str)]) -> TempDir {
    let root = TempDir::new().unwrap();
    for (path, contents) in scripts {
        write_file(&root.path().join(path), contents);
    }
    root
}

/// Options resolving local scripts under `root`, minification off.
pub fn raw_options(root: &Path) -> PackOptions {
    PackOptions::default().uglify(false).content_root(root)
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Paths of the bundle files in a collection.
pub fn bundle_files(files: &FileCollection) -> Vec<String> {
    files
        .paths()
        .filter(|path| path.ends_with(".min.js"))
        .map(str::to_string)
        .collect()
}

/// Number of `<script` tags in a page.
pub fn script_tags(files: &FileCollection, path: &str) -> usize {
    files.get_str(path).unwrap().matches("<script").count()
}
