//! In-memory file collection of a build.
//!
//! The packer works on a map of output-relative path → bytes, the way a
//! static site generator hands its rendered files to a plugin. Paths use `/`
//! separators on every platform. Iteration follows insertion order, which is
//! the order documents are scanned in.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Extension of the documents the packer scans.
pub const HTML_EXTENSION: &str = ".html";

/// Ordered map of output-relative path → contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCollection {
    files: IndexMap<String, Vec<u8>>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every file under `root`, sorted by relative path.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let mut collection = Self::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::IoError {
                message: format!("Failed to walk {}", root.display()),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root).map_err(|_| {
                Error::InvalidOutputPath(format!(
                    "{} is outside {}",
                    entry.path().display(),
                    root.display()
                ))
            })?;

            let contents = fs::read(entry.path()).map_err(|e| Error::IoError {
                message: format!("Failed to read {}", entry.path().display()),
                source: e,
            })?;

            collection.insert(to_collection_path(relative), contents);
        }

        Ok(collection)
    }

    /// Insert or replace a file.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Contents of a file as text, if present and valid UTF-8.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Paths of the documents to scan, in collection order.
    pub fn html_paths(&self) -> Vec<String> {
        self.files
            .keys()
            .filter(|path| path.ends_with(HTML_EXTENSION))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files
            .iter()
            .map(|(path, contents)| (path.as_str(), contents.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `dir`, creating directories as needed.
    ///
    /// # Errors
    ///
    /// Fails before writing anything if a path would land outside `dir`.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref().clean();

        let targets = self
            .files
            .iter()
            .map(|(path, contents)| {
                validate_output_path(&dir, path).map(|target| (target, contents))
            })
            .collect::<Result<Vec<_>>>()?;

        for (target, contents) in targets {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::IoError {
                    message: format!("Failed to create directory {}", parent.display()),
                    source: e,
                })?;
            }
            fs::write(&target, contents).map_err(|e| Error::IoError {
                message: format!("Failed to write {}", target.display()),
                source: e,
            })?;
        }

        Ok(())
    }
}

impl FromIterator<(String, Vec<u8>)> for FileCollection {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

fn to_collection_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve `filename` under `base_dir`, rejecting anything that escapes it.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let filename_path = Path::new(filename);
    if filename_path.has_root() {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' is absolute",
            filename
        )));
    }

    let full_path = base_dir.join(filename_path.clean()).clean();
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}
