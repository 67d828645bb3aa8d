//! Packer configuration.
//!
//! [`PackOptions`] deserializes from the same camelCase shape used in config
//! files (`inline`, `siteRootPath`, `outputPath`, `uglify`, `uglifyOptions`,
//! `contentRoot`) and also offers builder-style setters.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::minify::MinifyLevel;
use crate::{Error, Result};

const DEFAULT_SITE_ROOT_PATH: &str = "/";
const DEFAULT_OUTPUT_PATH: &str = "assets/javascript/";

/// Options forwarded to the minifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinifyOptions {
    /// How aggressively to minify.
    pub level: MinifyLevel,

    /// Also mangle top-level names. Off by default since classic scripts
    /// share one global scope across the page.
    pub top_level: bool,
}

/// Configuration for one packer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackOptions {
    /// Inline each bundle into its pages instead of writing a shared file.
    pub inline: bool,

    /// Prefix of generated `<script src>` URLs.
    pub site_root_path: String,

    /// Directory of bundle files, relative to the site root.
    #[serde(alias = "ouputPath")]
    pub output_path: String,

    /// Minify scripts before bundling.
    pub uglify: bool,

    /// Minifier settings, used when `uglify` is on.
    pub uglify_options: MinifyOptions,

    /// Directory local `<script src>` paths resolve against.
    pub content_root: PathBuf,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            inline: false,
            site_root_path: DEFAULT_SITE_ROOT_PATH.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            uglify: true,
            uglify_options: MinifyOptions::default(),
            content_root: PathBuf::from("src"),
        }
    }
}

impl PackOptions {
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn site_root_path(mut self, path: impl Into<String>) -> Self {
        self.site_root_path = path.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn uglify(mut self, enabled: bool) -> Self {
        self.uglify = enabled;
        self
    }

    pub fn minify_level(mut self, level: MinifyLevel) -> Self {
        self.uglify_options.level = level;
        self
    }

    pub fn content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = root.into();
        self
    }

    /// Effective `outputPath`: the default when empty, always ending in `/`.
    pub fn output_dir(&self) -> Cow<'_, str> {
        directory(&self.output_path, DEFAULT_OUTPUT_PATH)
    }

    /// Effective `siteRootPath`: the default when empty, always ending in `/`.
    pub fn site_root(&self) -> Cow<'_, str> {
        directory(&self.site_root_path, DEFAULT_SITE_ROOT_PATH)
    }

    /// Collection path of a bundle file: `<outputPath><file name>`.
    pub fn bundle_output_path(&self, file_name: &str) -> String {
        format!("{}{}", self.output_dir(), file_name)
    }

    /// URL pages use to reference a bundle file.
    pub fn bundle_url(&self, file_name: &str) -> String {
        format!("{}{}", self.site_root(), self.bundle_output_path(file_name))
    }

    /// Check the options before a run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `outputPath` is absolute or
    /// escapes the site root.
    pub fn validate(&self) -> Result<()> {
        let output_dir = self.output_dir();
        let output = Path::new(output_dir.as_ref());
        if output.has_root()
            || output
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(Error::InvalidConfig(format!(
                "outputPath must be relative to the site root: '{}'",
                self.output_path
            )));
        }

        Ok(())
    }
}

fn directory<'a>(value: &'a str, default: &'static str) -> Cow<'a, str> {
    if value.is_empty() {
        Cow::Borrowed(default)
    } else if value.ends_with('/') {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("{value}/"))
    }
}
