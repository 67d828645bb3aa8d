//! Layered loading of [`PackOptions`].
//!
//! Priority: CLI flags > `FOB_PACK_*` environment variables > config file >
//! defaults. The config file is `--config`, or else the first of
//! `fob-pack.toml` / `fob-pack.json` found in the working directory. Files
//! use the same camelCase keys as [`PackOptions`]:
//!
//! ```toml
//! inline = false
//! siteRootPath = "/"
//! outputPath = "assets/javascript/"
//! contentRoot = "src"
//!
//! [uglifyOptions]
//! level = "identifiers"
//! ```
//!
//! Environment variables use snake case with `__` for nesting, e.g.
//! `FOB_PACK_SITE_ROOT_PATH=/blog/` or `FOB_PACK_UGLIFY_OPTIONS__LEVEL=syntax`.

use crate::cli::PackArgs;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use fob_pack::{MinifyLevel, PackOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config files looked up in the working directory, in order.
pub const CONFIG_FILES: [&str; 2] = ["fob-pack.toml", "fob-pack.json"];

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "FOB_PACK_";

/// Options set explicitly on the command line. Unset flags are skipped so
/// they don't shadow lower layers.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    site_root_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uglify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uglify_options: Option<LevelOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_root: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct LevelOverride {
    level: MinifyLevel,
}

impl From<&PackArgs> for CliOverrides {
    fn from(args: &PackArgs) -> Self {
        Self {
            inline: args.inline.then_some(true),
            site_root_path: args.site_root.clone(),
            output_path: args.output_path.clone(),
            uglify: args.no_uglify.then_some(false),
            uglify_options: args.minify_level.map(|level| LevelOverride { level }),
            content_root: args.content_root.clone(),
        }
    }
}

/// Load the options of a pack run.
///
/// A relative `contentRoot` is resolved against `cwd`.
///
/// # Errors
///
/// [`ConfigError::NotFound`] if `--config` points nowhere,
/// [`ConfigError::InvalidValue`] if a layer does not deserialize or the
/// merged options fail validation.
pub fn load_options(args: &PackArgs, cwd: &Path) -> Result<PackOptions> {
    let mut figment = Figment::from(Serialized::defaults(PackOptions::default()));

    if let Some(path) = config_file(args.config.as_deref(), cwd)? {
        tracing::debug!("loading config from {}", path.display());
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        };
    }

    figment = figment
        .merge(Env::prefixed(ENV_PREFIX).map(|key| env_key(key.as_str()).into()))
        .merge(Serialized::defaults(CliOverrides::from(args)));

    let mut options: PackOptions = figment.extract().map_err(|e| ConfigError::InvalidValue {
        field: "configuration".to_string(),
        value: e.to_string(),
        hint: "Check fob-pack.toml / fob-pack.json syntax and FOB_PACK_* variables".to_string(),
    })?;

    options.validate().map_err(|e| ConfigError::InvalidValue {
        field: "options".to_string(),
        value: e.to_string(),
        hint: "outputPath must be a directory relative to the site root".to_string(),
    })?;

    options.content_root = cwd.join(&options.content_root);
    Ok(options)
}

fn config_file(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = cwd.join(path);
        if !path.is_file() {
            return Err(ConfigError::NotFound(path).into());
        }
        return Ok(Some(path));
    }

    Ok(CONFIG_FILES
        .iter()
        .map(|name| cwd.join(name))
        .find(|path| path.is_file()))
}

/// `site_root_path` → `siteRootPath`; `uglify_options__level` → `uglifyOptions.level`.
fn env_key(key: &str) -> String {
    key.split("__")
        .map(snake_to_camel)
        .collect::<Vec<_>>()
        .join(".")
}

fn snake_to_camel(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for c in segment.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
