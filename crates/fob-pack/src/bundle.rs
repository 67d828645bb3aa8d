//! Groups pages by the ordered list of scripts they need.

use indexmap::{IndexMap, IndexSet};

use crate::key::{BundleKey, ScriptKey};

/// Scripts shared by a group of pages, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub key: BundleKey,
    pub script_keys: Vec<ScriptKey>,
    pub using_documents: IndexSet<String>,
}

/// Bundles of a run, in the order their keys were first seen.
#[derive(Debug, Default)]
pub struct BundleGrouper {
    bundles: IndexMap<BundleKey, Bundle>,
}

impl BundleGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document's ordered script list and return its bundle key.
    ///
    /// Returns `None` for an empty list: a page without scripts has no bundle.
    pub fn register(&mut self, document: &str, scripts: Vec<ScriptKey>) -> Option<BundleKey> {
        if scripts.is_empty() {
            return None;
        }

        let key = BundleKey::for_scripts(&scripts);
        let bundle = self.bundles.entry(key.clone()).or_insert_with(|| Bundle {
            key: key.clone(),
            script_keys: scripts,
            using_documents: IndexSet::new(),
        });
        bundle.using_documents.insert(document.to_string());

        Some(key)
    }

    pub fn get(&self, key: &BundleKey) -> Option<&Bundle> {
        self.bundles.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.values()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
