//! Bundle emission (phase 2 of a run).
//!
//! Runs after the fetch barrier, when every claimed script has its final
//! content. Each bundle's payload is built once and then either written as a
//! shared `<key>.min.js` file or inlined into each page using the bundle.

use tracing::{debug, info};

use crate::bundle::{Bundle, BundleGrouper};
use crate::collection::FileCollection;
use crate::config::PackOptions;
use crate::html::{self, HtmlDocument};
use crate::store::ScriptStore;
use crate::{Error, Result};

/// What the emitter produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    /// Bundle files added to the collection.
    pub artifacts: usize,
    /// Documents that received an inline payload.
    pub documents_inlined: usize,
}

/// Turns a run's bundles into files or inline scripts.
pub struct OutputEmitter<'run> {
    options: &'run PackOptions,
    store: &'run ScriptStore,
    grouper: &'run BundleGrouper,
}

impl<'run> OutputEmitter<'run> {
    pub fn new(
        options: &'run PackOptions,
        store: &'run ScriptStore,
        grouper: &'run BundleGrouper,
    ) -> Self {
        Self {
            options,
            store,
            grouper,
        }
    }

    /// Emit every bundle into `files`.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedScript`] if a bundle references a script without
    /// content, [`Error::Html`] if a page cannot be re-parsed.
    pub fn emit(&self, files: &mut FileCollection) -> Result<EmitSummary> {
        let mut summary = EmitSummary::default();

        for bundle in self.grouper.iter() {
            let payload = self.payload(bundle)?;

            if self.options.inline {
                for document in &bundle.using_documents {
                    inline_into(files, document, &payload)?;
                    summary.documents_inlined += 1;
                }
                debug!(
                    "inlined bundle {} into {} documents",
                    bundle.key,
                    bundle.using_documents.len()
                );
            } else {
                let path = self.options.bundle_output_path(&bundle.key.file_name());
                info!("Writing {}", path);
                files.insert(path, payload);
                summary.artifacts += 1;
            }
        }

        Ok(summary)
    }

    /// Final contents of the bundle's scripts in order, each followed by a newline.
    pub fn payload(&self, bundle: &Bundle) -> Result<String> {
        let mut payload = String::new();
        for key in &bundle.script_keys {
            payload.push_str(self.store.content(key)?);
            payload.push('\n');
        }
        Ok(payload)
    }
}

fn inline_into(files: &mut FileCollection, document: &str, payload: &str) -> Result<()> {
    let html_error = |source| Error::Html {
        document: document.to_string(),
        source,
    };

    let contents = files
        .get(document)
        .ok_or_else(|| html_error(std::io::ErrorKind::NotFound.into()))?;

    let page = HtmlDocument::parse(contents).map_err(html_error)?;
    page.append_to_body(html::inline_script(payload));
    let contents = page.serialize().map_err(html_error)?;

    files.insert(document, contents);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ScriptKey;
    use crate::store::ScriptOrigin;

    fn store_with(scripts: &[&str]) -> (ScriptStore, Vec<ScriptKey>) {
        let mut store = ScriptStore::new(None);
        let keys = scripts
            .iter()
            .map(|code| {
                let key = ScriptKey::for_inline(code);
                store.claim(&key, ScriptOrigin::Inline);
                store.set(&key, code.to_string());
                key
            })
            .collect();
        (store, keys)
    }

    #[test]
    fn test_payload_joins_with_trailing_newlines() {
        let (store, keys) = store_with(&["a()", "b()"]);
        let mut grouper = BundleGrouper::new();
        let key = grouper.register("index.html", keys).unwrap();
        let options = PackOptions::default();

        let emitter = OutputEmitter::new(&options, &store, &grouper);
        let payload = emitter.payload(grouper.get(&key).unwrap()).unwrap();
        assert_eq!(payload, "a()\nb()\n");
    }

    #[test]
    fn test_external_mode_writes_one_file_per_bundle() {
        let (store, keys) = store_with(&["a()"]);
        let mut grouper = BundleGrouper::new();
        let key = grouper.register("one.html", keys.clone()).unwrap();
        grouper.register("two.html", keys);

        let options = PackOptions::default();
        let mut files = FileCollection::new();
        let summary = OutputEmitter::new(&options, &store, &grouper)
            .emit(&mut files)
            .unwrap();

        assert_eq!(summary.artifacts, 1);
        assert_eq!(summary.documents_inlined, 0);
        let path = format!("assets/javascript/{}.min.js", key);
        assert_eq!(files.get_str(&path), Some("a()\n"));
    }

    #[test]
    fn test_inline_mode_appends_to_each_page() {
        let (store, keys) = store_with(&["a()"]);
        let mut grouper = BundleGrouper::new();
        grouper.register("one.html", keys.clone());
        grouper.register("two.html", keys);

        let mut files = FileCollection::new();
        files.insert("one.html", "<html><body><p>1</p></body></html>");
        files.insert("two.html", "<html><body><p>2</p></body></html>");

        let options = PackOptions::default().inline(true);
        let summary = OutputEmitter::new(&options, &store, &grouper)
            .emit(&mut files)
            .unwrap();

        assert_eq!(summary.artifacts, 0);
        assert_eq!(summary.documents_inlined, 2);
        assert_eq!(files.len(), 2);
        for page in ["one.html", "two.html"] {
            assert!(files.get_str(page).unwrap().contains("<script>a()\n</script></body>"));
        }
    }

    #[test]
    fn test_unresolved_script_fails() {
        let mut store = ScriptStore::new(None);
        let key = ScriptKey::for_source("https://cdn.example.com/a.js");
        store.claim(
            &key,
            ScriptOrigin::Remote {
                url: "https://cdn.example.com/a.js".to_string(),
            },
        );
        let mut grouper = BundleGrouper::new();
        grouper.register("index.html", vec![key]);

        let options = PackOptions::default();
        let err = OutputEmitter::new(&options, &store, &grouper)
            .emit(&mut FileCollection::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedScript(_)));
    }
}
