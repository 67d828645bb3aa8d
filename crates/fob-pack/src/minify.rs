//! JavaScript minification.
//!
//! The packer talks to the minifier through [`ScriptMinifier`]; the default
//! implementation is [`OxcMinifier`]. Minifier failures are never fatal: the
//! store falls back to the raw script.

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::{Deserialize, Serialize};

use crate::config::MinifyOptions;
use crate::{Error, Result};

/// Errors reported by a minifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MinifyError {
    /// The script is not valid JavaScript.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Any other minifier failure.
    #[error("{0}")]
    Other(String),
}

/// Source text in, minified text out.
pub trait ScriptMinifier: Send + Sync + std::fmt::Debug {
    fn minify(&self, source: &str) -> std::result::Result<String, MinifyError>;
}

/// Validated minification level.
///
/// Controls how aggressively JavaScript code is minified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyLevel {
    /// No minification - scripts are bundled as written.
    #[serde(alias = "false")]
    None,
    /// Remove whitespace and comments only.
    Whitespace,
    /// Syntax-level optimizations (names preserved).
    Syntax,
    /// Full minification including identifier mangling.
    #[default]
    #[serde(alias = "true")]
    Identifiers,
}

impl MinifyLevel {
    /// Parse a minification level from a string.
    ///
    /// # Supported Values
    ///
    /// - `"none"` - No minification
    /// - `"whitespace"` - Remove whitespace only
    /// - `"syntax"` - Syntax-level minification
    /// - `"identifiers"` - Full minification with identifier mangling
    ///
    /// Values are case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use fob_pack::MinifyLevel;
    ///
    /// assert_eq!(MinifyLevel::parse("none").unwrap(), MinifyLevel::None);
    /// assert_eq!(MinifyLevel::parse("IDENTIFIERS").unwrap(), MinifyLevel::Identifiers);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error for unrecognized values.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "false" => Ok(Self::None),
            "whitespace" => Ok(Self::Whitespace),
            "syntax" => Ok(Self::Syntax),
            "identifiers" | "true" => Ok(Self::Identifiers),
            _ => Err(Error::InvalidConfig(format!(
                "Invalid minify level: '{}'. Expected: none, whitespace, syntax, identifiers",
                s
            ))),
        }
    }

    /// Convert to oxc minifier options.
    ///
    /// `None` means no AST pass is needed: either nothing happens at all
    /// ([`MinifyLevel::None`]) or only the minified codegen runs
    /// ([`MinifyLevel::Whitespace`]).
    fn to_oxc_options(self, top_level: bool) -> Option<MinifierOptions> {
        match self {
            Self::None | Self::Whitespace => None,
            Self::Syntax => Some(MinifierOptions {
                mangle: None,
                compress: Some(CompressOptions::default()),
                ..MinifierOptions::default()
            }),
            Self::Identifiers => Some(MinifierOptions {
                mangle: Some(MangleOptions {
                    top_level,
                    ..MangleOptions::default()
                }),
                compress: Some(CompressOptions::default()),
                ..MinifierOptions::default()
            }),
        }
    }

    /// Returns true if any minification is enabled.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for MinifyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Whitespace => write!(f, "whitespace"),
            Self::Syntax => write!(f, "syntax"),
            Self::Identifiers => write!(f, "identifiers"),
        }
    }
}

impl std::str::FromStr for MinifyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Minifier backed by oxc.
///
/// Scripts are parsed as classic (non-module) scripts, since that is what a
/// plain `<script>` element runs.
#[derive(Debug, Clone, Default)]
pub struct OxcMinifier {
    options: MinifyOptions,
}

impl OxcMinifier {
    pub fn new(options: MinifyOptions) -> Self {
        Self { options }
    }
}

impl ScriptMinifier for OxcMinifier {
    fn minify(&self, source: &str) -> std::result::Result<String, MinifyError> {
        if !self.options.level.is_enabled() {
            return Ok(source.to_string());
        }

        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

        if parsed.panicked || !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
            return Err(MinifyError::Syntax(messages.join("; ")));
        }

        let mut program = parsed.program;
        let codegen = Codegen::new().with_options(CodegenOptions::minify());

        let code = match self.options.level.to_oxc_options(self.options.top_level) {
            Some(options) => {
                let minified = Minifier::new(options).minify(&allocator, &mut program);
                codegen.with_scoping(minified.scoping).build(&program).code
            }
            None => codegen.build(&program).code,
        };

        Ok(code)
    }
}
