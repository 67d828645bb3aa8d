//! Script classification.
//!
//! Decides what kind of script one `<script>` element is. Classification is
//! pure: the scanner is the one that acts on the result.

use markup5ever_rcdom::Handle;

use crate::html;

/// Attribute marking a script that must be left alone.
pub const EXCLUDE_ATTR: &str = "data-packer";

/// Value of [`EXCLUDE_ATTR`] that excludes a script.
pub const EXCLUDE_VALUE: &str = "exclude";

/// MIME type accepted for inline scripts (besides no `type` at all).
pub const JAVASCRIPT_MIME: &str = "text/javascript";

/// What the classifier needs to know about a `<script>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: Option<String>,
    pub type_attr: Option<String>,
    pub excluded: bool,
    pub text: String,
}

impl ScriptTag {
    /// Read the relevant attributes and text of a `<script>` element.
    pub fn from_element(node: &Handle) -> Self {
        Self {
            src: html::attr(node, "src"),
            type_attr: html::attr(node, "type"),
            excluded: html::attr(node, EXCLUDE_ATTR).as_deref() == Some(EXCLUDE_VALUE),
            text: html::inner_text(node),
        }
    }
}

/// Kind of a discovered script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptReference {
    /// `src` starting with `//` or `http`.
    Remote { url: String },
    /// Any other `src`, relative to the content root.
    Local { path: String },
    /// JavaScript written inside the element.
    Inline { code: String },
    /// Carries the exclusion marker.
    Excluded,
    /// Some other script type (templates, JSON, modules...).
    Unrecognized,
}

/// Classify a script element.
///
/// The exclusion marker wins over everything, then a non-empty `src`, then
/// the `type` attribute.
pub fn classify(tag: &ScriptTag) -> ScriptReference {
    if tag.excluded {
        return ScriptReference::Excluded;
    }

    // An empty `src` counts as no `src` at all.
    if let Some(src) = tag.src.as_deref().filter(|src| !src.is_empty()) {
        return if is_remote(src) {
            ScriptReference::Remote {
                url: src.to_string(),
            }
        } else {
            ScriptReference::Local {
                path: src.to_string(),
            }
        };
    }

    let is_javascript = match &tag.type_attr {
        None => true,
        Some(mime) => mime.trim().eq_ignore_ascii_case(JAVASCRIPT_MIME),
    };

    if is_javascript {
        ScriptReference::Inline {
            code: tag.text.clone(),
        }
    } else {
        ScriptReference::Unrecognized
    }
}

fn is_remote(src: &str) -> bool {
    src.starts_with("//") || src.starts_with("http")
}

/// Turn a protocol-relative URL into a fetchable one.
pub fn normalize_remote_url(url: &str) -> String {
    match url.strip_prefix("//") {
        Some(rest) => format!("http://{rest}"),
        None => url.to_string(),
    }
}
