//! Content-addressed script store.
//!
//! The store is the deduplication gate of a run. The first caller to
//! [`ScriptStore::claim`] a key does the read/fetch/minify work; every later
//! caller only records that its page uses the key. A claim is recorded
//! before any asynchronous work starts, so two pages referencing the same
//! remote URL trigger a single fetch even when both are scanned before the
//! fetch completes.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::key::ScriptKey;
use crate::minify::ScriptMinifier;
use crate::{Error, Result};

/// Where a script's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOrigin {
    Remote { url: String },
    Local { path: PathBuf },
    Inline,
}

impl std::fmt::Display for ScriptOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote { url } => write!(f, "remote script {url}"),
            Self::Local { path } => write!(f, "local script {}", path.display()),
            Self::Inline => write!(f, "inline script"),
        }
    }
}

/// Lifecycle of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptState {
    /// Claimed; content not recorded yet (remote fetch pending).
    Claimed,
    /// Final content recorded.
    Ready,
    /// Minification failed; final content is the raw script.
    Fallback,
}

/// Acquisition result for one unique script.
#[derive(Debug, Clone)]
pub struct ScriptRecord {
    pub key: ScriptKey,
    pub origin: ScriptOrigin,
    pub raw_content: Option<String>,
    pub final_content: Option<String>,
    pub state: ScriptState,
}

/// Outcome of [`ScriptStore::claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub already_claimed: bool,
}

impl Claim {
    /// True when the caller must acquire the script's content.
    pub fn is_new(&self) -> bool {
        !self.already_claimed
    }
}

/// Run-scoped key → record table.
#[derive(Debug, Default)]
pub struct ScriptStore {
    records: FxHashMap<ScriptKey, ScriptRecord>,
    /// `None` disables minification.
    minifier: Option<Arc<dyn ScriptMinifier>>,
}

impl ScriptStore {
    /// Create a store. Pass `None` to keep scripts as written.
    pub fn new(minifier: Option<Arc<dyn ScriptMinifier>>) -> Self {
        Self {
            records: FxHashMap::default(),
            minifier,
        }
    }

    /// Reserve `key`. Only the first claim of a key is new.
    pub fn claim(&mut self, key: &ScriptKey, origin: ScriptOrigin) -> Claim {
        if self.records.contains_key(key) {
            return Claim {
                already_claimed: true,
            };
        }

        self.records.insert(
            key.clone(),
            ScriptRecord {
                key: key.clone(),
                origin,
                raw_content: None,
                final_content: None,
                state: ScriptState::Claimed,
            },
        );
        Claim {
            already_claimed: false,
        }
    }

    /// Drop a claim whose acquisition was abandoned, so that the next
    /// reference to the key tries again.
    pub fn release(&mut self, key: &ScriptKey) {
        self.records.remove(key);
    }

    /// Record the raw content of a claimed script and compute its final
    /// content.
    pub fn set(&mut self, key: &ScriptKey, raw: String) {
        let Some(record) = self.records.get_mut(key) else {
            debug!("ignoring content for unclaimed script {}", key);
            return;
        };

        let (final_content, state) = match &self.minifier {
            None => (raw.clone(), ScriptState::Ready),
            Some(minifier) => match minifier.minify(&raw) {
                Ok(minified) => (minified, ScriptState::Ready),
                Err(err) => {
                    warn!("Error while minifying {}: {}", record.origin, err);
                    (raw.clone(), ScriptState::Fallback)
                }
            },
        };

        record.raw_content = Some(raw);
        record.final_content = Some(final_content);
        record.state = state;
    }

    /// Record the body of a fetched remote script.
    pub fn set_fetched(&mut self, key: &ScriptKey, body: String) {
        self.set(key, body);
    }

    /// Final content of a script.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedScript`] if the key is unknown or its content was
    /// never recorded.
    pub fn content(&self, key: &ScriptKey) -> Result<&str> {
        self.records
            .get(key)
            .and_then(|record| record.final_content.as_deref())
            .ok_or_else(|| Error::UnresolvedScript(key.clone()))
    }

    pub fn get(&self, key: &ScriptKey) -> Option<&ScriptRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &ScriptKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records whose minification fell back to raw content.
    pub fn fallback_count(&self) -> usize {
        self.records
            .values()
            .filter(|record| record.state == ScriptState::Fallback)
            .count()
    }

    pub fn minification_enabled(&self) -> bool {
        self.minifier.is_some()
    }
}
