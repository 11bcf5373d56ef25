//! Metadata preamble handling.
//!
//! Crawlers commonly prepend a header block to the page markdown:
//!
//! ```text
//! Title: Some Article
//!
//! URL Source: https://example.com/some-article
//!
//! Published Time: 2024-03-12T08:00:00Z
//!
//! Markdown Content:
//!
//! ...body...
//! ```
//!
//! The title is kept and promoted to the first line; the rest of the block
//! is dropped.

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

static RE_TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*Title:[ \t]*([^\n]*)$").unwrap());

static RE_URL_SOURCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*URL Source:[ \t]*([^\n]*)$").unwrap());

static RE_PUBLISHED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*Published Time:[ \t]*([^\n]*)$").unwrap());

/// The whole header block: title, URL source, optional published time and
/// optional content marker, each followed by blank lines or the end of input.
static RE_METADATA_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)(^|\n)Title:\s*.*?\n+URL Source:\s*.*?(?:\n+|\z)(?:Published Time:\s*.*?(?:\n+|\z))?(?:Markdown Content:\s*(?:\n+|\z))?",
    )
    .unwrap()
});

/// Metadata found in a document preamble.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preamble {
    /// Value of the `Title:` line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Value of the `URL Source:` line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_source: Option<String>,
    /// Value of the `Published Time:` line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
}

impl Preamble {
    /// Parses preamble fields from a document. Missing lines are `None`.
    pub fn parse(content: &str) -> Self {
        Self {
            title: first_value(&RE_TITLE_LINE, content),
            url_source: first_value(&RE_URL_SOURCE_LINE, content),
            published_time: first_value(&RE_PUBLISHED_LINE, content),
        }
    }

    /// Returns true if no preamble field was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url_source.is_none() && self.published_time.is_none()
    }
}

fn first_value(pattern: &Regex, content: &str) -> Option<String> {
    pattern
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Returns the trimmed value of the first `Title:` line, or an empty string.
pub fn extract_title(content: &str) -> String {
    first_value(&RE_TITLE_LINE, content).unwrap_or_default()
}

/// Replaces every metadata block with `title` followed by a blank line.
///
/// Content without a metadata block is returned unchanged.
pub fn strip_metadata(content: &str, title: &str) -> String {
    RE_METADATA_BLOCK
        .replace_all(content, |caps: &Captures| format!("{}{}\n\n", &caps[1], title))
        .into_owned()
}
