//! Document scanning (phase 1 of a run).
//!
//! Each document is parsed, its scripts are classified in document order,
//! claimed in the store and removed from the page. The page's ordered key
//! list then selects its bundle. Remote fetches are started here but never
//! awaited.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::classify::{EXCLUDE_ATTR, ScriptReference, ScriptTag, classify};
use crate::config::PackOptions;
use crate::html::{self, HtmlDocument};
use crate::key::{BundleKey, ScriptKey};
use crate::pipeline::PackContext;
use crate::store::ScriptOrigin;
use crate::{Error, Result};

/// Result of scanning one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDocument {
    /// Serialized, mutated document.
    pub contents: Vec<u8>,
    /// Keys of the scripts removed from the page, in page order.
    pub scripts: Vec<ScriptKey>,
    /// Bundle the page was assigned to, if it had any scripts.
    pub bundle: Option<BundleKey>,
    /// Local scripts that were left in place because their file is missing.
    pub missing_local: usize,
    /// Whether the page was modified. Untouched pages keep their input bytes.
    pub changed: bool,
}

/// Scans documents into a run's [`PackContext`].
pub struct DocumentScanner<'run> {
    options: &'run PackOptions,
    context: &'run mut PackContext,
}

impl<'run> DocumentScanner<'run> {
    pub fn new(options: &'run PackOptions, context: &'run mut PackContext) -> Self {
        Self { options, context }
    }

    /// Scan one document.
    ///
    /// # Errors
    ///
    /// Fails on HTML parse/serialize errors and on local scripts that exist
    /// but cannot be read. A missing local script is only a warning.
    pub fn scan(&mut self, path: &str, contents: &[u8]) -> Result<ScannedDocument> {
        let document = HtmlDocument::parse(contents).map_err(|source| Error::Html {
            document: path.to_string(),
            source,
        })?;

        let elements = document.scripts();
        debug!("processing {} scripts in \"{}\"", elements.len(), path);

        let mut scripts = Vec::new();
        let mut missing_local = 0;
        let mut changed = false;

        for element in elements {
            let tag = ScriptTag::from_element(&element);

            let key = match classify(&tag) {
                ScriptReference::Excluded => {
                    html::remove_attr(&element, EXCLUDE_ATTR);
                    changed = true;
                    debug!("- skipping excluded script in \"{}\"", path);
                    continue;
                }
                ScriptReference::Unrecognized => {
                    debug!(
                        "- skipping unknown script (type {:?}) in \"{}\"",
                        tag.type_attr, path
                    );
                    continue;
                }
                ScriptReference::Remote { url } => self.remote(&url),
                ScriptReference::Local { path: src } => match self.local(&src)? {
                    Some(key) => key,
                    None => {
                        missing_local += 1;
                        continue;
                    }
                },
                ScriptReference::Inline { code } => self.inline(code),
            };

            scripts.push(key);
            html::detach(&element);
            changed = true;
        }

        let bundle = self.context.grouper.register(path, scripts.clone());

        if let Some(key) = &bundle {
            debug!("register usage of bundle {} for \"{}\"", key, path);
            if !self.options.inline {
                let src = self.options.bundle_url(&key.file_name());
                document.append_to_body(html::external_script(&src));
            }
        }

        let contents = if changed {
            document.serialize().map_err(|source| Error::Html {
                document: path.to_string(),
                source,
            })?
        } else {
            contents.to_vec()
        };

        Ok(ScannedDocument {
            contents,
            scripts,
            bundle,
            missing_local,
            changed,
        })
    }

    fn remote(&mut self, src: &str) -> ScriptKey {
        let key = ScriptKey::for_source(src);
        debug!("+ remote script \"{}\"", src);

        let origin = ScriptOrigin::Remote {
            url: src.to_string(),
        };
        if self.context.store.claim(&key, origin).is_new() {
            self.context.fetches.start(key.clone(), src);
        }
        key
    }

    /// `None` when the file does not exist; the element then stays untouched.
    fn local(&mut self, src: &str) -> Result<Option<ScriptKey>> {
        let key = ScriptKey::for_source(src);
        debug!("+ local script \"{}\"", src);

        let resolved = resolve_local(&self.options.content_root, src);
        let origin = ScriptOrigin::Local {
            path: resolved.clone(),
        };
        if self.context.store.claim(&key, origin).is_new() {
            match read_local(&resolved)? {
                Some(raw) => self.context.store.set(&key, raw),
                None => {
                    warn!("File missing: {}", resolved.display());
                    self.context.store.release(&key);
                    return Ok(None);
                }
            }
        }
        Ok(Some(key))
    }

    fn inline(&mut self, code: String) -> ScriptKey {
        let key = ScriptKey::for_inline(&code);
        debug!("+ inline script {}", key);

        if self.context.store.claim(&key, ScriptOrigin::Inline).is_new() {
            self.context.store.set(&key, code);
        }
        key
    }
}

/// `src` is relative to the content root, even when written with a leading `/`.
/// Query strings and fragments are not part of the file name.
fn resolve_local(content_root: &Path, src: &str) -> PathBuf {
    let file = src.split(['?', '#']).next().unwrap_or_default();
    content_root.join(file.trim_start_matches('/'))
}

/// `None` when nothing readable as a file exists at `path`.
fn read_local(path: &Path) -> Result<Option<String>> {
    if path.is_dir() {
        return Ok(None);
    }

    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::ReadScript {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchResult, ScriptFetcher};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct EchoFetcher;

    #[async_trait]
    impl ScriptFetcher for EchoFetcher {
        async fn fetch(&self, url: &str) -> FetchResult<String> {
            Ok(format!("/* {url} */"))
        }
    }

    fn context() -> PackContext {
        PackContext::new(None, Arc::new(EchoFetcher))
    }

    fn scan(options: &PackOptions, context: &mut PackContext, html: &str) -> ScannedDocument {
        DocumentScanner::new(options, context)
            .scan("index.html", html.as_bytes())
            .unwrap()
    }

    fn text(scanned: &ScannedDocument) -> String {
        String::from_utf8(scanned.contents.clone()).unwrap()
    }

    #[test]
    fn test_resolve_local_strips_leading_slash() {
        assert_eq!(
            resolve_local(Path::new("src"), "/js/app.js"),
            PathBuf::from("src/js/app.js")
        );
        assert_eq!(
            resolve_local(Path::new("src"), "js/app.js"),
            PathBuf::from("src/js/app.js")
        );
    }

    #[test]
    fn test_resolve_local_ignores_query_and_fragment() {
        assert_eq!(
            resolve_local(Path::new("src"), "/js/app.js?v=2"),
            PathBuf::from("src/js/app.js")
        );
        assert_eq!(
            resolve_local(Path::new("src"), "js/app.js#main"),
            PathBuf::from("src/js/app.js")
        );
    }

    #[test]
    fn test_page_without_scripts_keeps_its_bytes() {
        let options = PackOptions::default().uglify(false);
        let mut context = context();

        let scanned = scan(&options, &mut context, "<p>hello</p>\n");

        assert!(!scanned.changed);
        assert_eq!(text(&scanned), "<p>hello</p>\n");
    }

    #[test]
    fn test_page_with_only_unrecognized_scripts_keeps_its_bytes() {
        let options = PackOptions::default().uglify(false);
        let mut context = context();
        let html = "<body>\n  <script type=\"application/ld+json\">{}</script>\n</body>\n";

        let scanned = scan(&options, &mut context, html);

        assert!(!scanned.changed);
        assert_eq!(text(&scanned), html);
    }

    #[test]
    fn test_directory_src_counts_as_missing() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("js")).unwrap();
        let options = PackOptions::default()
            .uglify(false)
            .content_root(root.path());
        let mut context = context();

        let scanned = scan(
            &options,
            &mut context,
            r#"<html><body><script src="js/"></script></body></html>"#,
        );

        assert_eq!(scanned.missing_local, 1);
        assert!(scanned.bundle.is_none());
        assert!(!scanned.changed);
        assert!(context.store.is_empty());
    }

    #[test]
    fn test_inline_scripts_are_removed_and_referenced() {
        let options = PackOptions::default().uglify(false);
        let mut context = context();

        let scanned = scan(
            &options,
            &mut context,
            "<html><body><script>one()</script><p>x</p><script>two()</script></body></html>",
        );

        assert_eq!(
            scanned.scripts,
            vec![ScriptKey::for_inline("one()"), ScriptKey::for_inline("two()")]
        );
        let bundle = scanned.bundle.clone().unwrap();
        let html = text(&scanned);
        assert!(!html.contains("one()"));
        assert!(!html.contains("two()"));
        assert!(html.contains(&format!(
            "<script src=\"/assets/javascript/{}.min.js\"></script>",
            bundle
        )));
        assert_eq!(context.store.content(&scanned.scripts[0]).unwrap(), "one()");
    }

    #[test]
    fn test_inline_mode_adds_no_reference() {
        let options = PackOptions::default().uglify(false).inline(true);
        let mut context = context();

        let scanned = scan(
            &options,
            &mut context,
            "<html><body><script>one()</script></body></html>",
        );

        assert!(scanned.bundle.is_some());
        assert!(!text(&scanned).contains("<script"));
    }

    #[test]
    fn test_excluded_script_is_kept_without_marker() {
        let options = PackOptions::default().uglify(false);
        let mut context = context();

        let scanned = scan(
            &options,
            &mut context,
            r#"<html><body><script data-packer="exclude">  keep( 1 )  </script></body></html>"#,
        );

        assert!(scanned.scripts.is_empty());
        assert!(scanned.bundle.is_none());
        assert!(context.store.is_empty());
        let html = text(&scanned);
        assert!(html.contains("<script>  keep( 1 )  </script>"));
        assert!(!html.contains("data-packer"));
    }

    #[test]
    fn test_unrecognized_script_is_untouched() {
        let options = PackOptions::default().uglify(false);
        let mut context = context();

        let scanned = scan(
            &options,
            &mut context,
            r#"<html><body><script type="text/template"><b>hi</b></script></body></html>"#,
        );

        assert!(scanned.bundle.is_none());
        assert!(text(&scanned).contains(r#"<script type="text/template"><b>hi</b></script>"#));
    }

    #[test]
    fn test_missing_local_file_leaves_element() {
        let root = TempDir::new().unwrap();
        let options = PackOptions::default()
            .uglify(false)
            .content_root(root.path());
        let mut context = context();

        let scanned = scan(
            &options,
            &mut context,
            r#"<html><body><script src="js/missing.js"></script></body></html>"#,
        );

        assert_eq!(scanned.missing_local, 1);
        assert!(scanned.scripts.is_empty());
        assert!(scanned.bundle.is_none());
        assert!(context.store.is_empty());
        assert!(text(&scanned).contains(r#"<script src="js/missing.js"></script>"#));
    }

    #[test]
    fn test_local_file_is_read_from_content_root() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("js")).unwrap();
        fs::write(root.path().join("js/app.js"), "app();").unwrap();

        let options = PackOptions::default()
            .uglify(false)
            .content_root(root.path());
        let mut context = context();

        let scanned = scan(
            &options,
            &mut context,
            r#"<html><body><script src="/js/app.js"></script></body></html>"#,
        );

        let key = ScriptKey::for_source("/js/app.js");
        assert_eq!(scanned.scripts, vec![key.clone()]);
        assert_eq!(context.store.content(&key).unwrap(), "app();");
        assert!(!text(&scanned).contains("/js/app.js"));
    }

    #[tokio::test]
    async fn test_remote_script_is_claimed_and_fetched_once() {
        let options = PackOptions::default().uglify(false);
        let mut context = context();
        let html = r#"<html><body><script src="//cdn.example.com/lib.js"></script></body></html>"#;

        let first = scan(&options, &mut context, html);
        let second = scan(&options, &mut context, html);

        assert_eq!(first.scripts, second.scripts);
        assert_eq!(context.fetches.pending(), 1);
        assert!(context.store.content(&first.scripts[0]).is_err());
    }
}
