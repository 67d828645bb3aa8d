//! Content-addressed keys for scripts and bundles.
//!
//! Both keys are lowercase hex SHA-256 digests (64 characters). Equality of
//! keys is what deduplication is built on.

use sha2::{Digest, Sha256};

/// Separator used when rendering an ordered key list for hashing.
const BUNDLE_KEY_SEPARATOR: &str = ".";

/// Identity of one unique script.
///
/// Remote and local scripts are keyed by their source attribute, inline
/// scripts by their literal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptKey(String);

impl ScriptKey {
    /// Key a remote or local script by the `src` attribute exactly as written.
    pub fn for_source(src: &str) -> Self {
        Self(hash_hex(src.as_bytes()))
    }

    /// Key an inline script by its code.
    pub fn for_inline(code: &str) -> Self {
        Self(hash_hex(code.as_bytes()))
    }

    /// Create a key from an existing hex string.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Get the key as a hex string.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScriptKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one ordered list of scripts.
///
/// Two pages get the same bundle key iff they reference the same scripts in
/// the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleKey(String);

impl BundleKey {
    /// Compute the bundle key of a page's ordered script list.
    pub fn for_scripts(keys: &[ScriptKey]) -> Self {
        let joined = keys
            .iter()
            .map(ScriptKey::as_hex)
            .collect::<Vec<_>>()
            .join(BUNDLE_KEY_SEPARATOR);
        Self(hash_hex(joined.as_bytes()))
    }

    /// Get the key as a hex string.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// File name of the externalized bundle: `<key>.min.js`.
    pub fn file_name(&self) -> String {
        format!("{}.min.js", self.0)
    }
}

impl std::fmt::Display for BundleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hash_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
