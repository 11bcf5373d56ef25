//! # Cleanup Pipeline
//!
//! Turns scraped article markdown (optionally led by a `Title:` /
//! `URL Source:` preamble) into plain, normalized prose.
//!
//! A [`Cleaner`] runs the enabled subset of [`Rule::ALL`] in order. The
//! pipeline is a pure function of its input: it holds no mutable state and
//! can be shared freely between threads.
//!
//! ## Presets
//!
//! - [`CleanupOptions::default`] - preamble-aware: promotes the title, removes
//!   bylines and boilerplate words, strips every inline HTML tag
//! - [`CleanupOptions::minimal`] - markup only: keeps the preamble and
//!   boilerplate, only unwraps `<https://...>` autolinks
//! - [`CleanupOptions::aggressive`] - default plus a longer boilerplate list

use crate::error::Result;
use crate::preamble::Preamble;
use crate::rules::{self, HtmlPolicy, Rule, RuleContext, DEFAULT_BOILERPLATE_WORDS};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Extra words removed by the aggressive preset.
const AGGRESSIVE_EXTRA_WORDS: &[&str] = &["subscribe", "listen", "bookmark", "clap"];

/// Cleanup configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Apply Unicode NFC normalization
    pub normalize_unicode: bool,
    /// Promote the preamble title and drop the rest of the preamble
    pub extract_title: bool,
    /// Remove author/publication/read-time byline blocks
    pub strip_bylines: bool,
    /// Remove boilerplate words
    pub strip_boilerplate: bool,
    /// Words removed when `strip_boilerplate` is set (case-insensitive, whole words)
    pub boilerplate_words: Vec<String>,
    /// Inline HTML handling
    pub html_policy: HtmlPolicy,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            extract_title: true,
            strip_bylines: true,
            strip_boilerplate: true,
            boilerplate_words: words(DEFAULT_BOILERPLATE_WORDS),
            html_policy: HtmlPolicy::StripTags,
        }
    }
}

impl CleanupOptions {
    /// Creates options for markup-only cleanup (no preamble or boilerplate handling)
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            extract_title: false,
            strip_bylines: false,
            strip_boilerplate: false,
            boilerplate_words: words(DEFAULT_BOILERPLATE_WORDS),
            html_policy: HtmlPolicy::UnwrapAutolinks,
        }
    }

    /// Creates options for aggressive cleanup (longer boilerplate list)
    pub fn aggressive() -> Self {
        let mut boilerplate_words = words(DEFAULT_BOILERPLATE_WORDS);
        boilerplate_words.extend(words(AGGRESSIVE_EXTRA_WORDS));
        Self {
            boilerplate_words,
            ..Self::default()
        }
    }

    /// Sets the inline HTML policy.
    pub fn with_html_policy(mut self, policy: HtmlPolicy) -> Self {
        self.html_policy = policy;
        self
    }

    /// Keeps the preamble as-is instead of promoting the title.
    pub fn without_title(mut self) -> Self {
        self.extract_title = false;
        self
    }

    /// Keeps boilerplate words.
    pub fn keep_boilerplate(mut self) -> Self {
        self.strip_boilerplate = false;
        self
    }

    /// Replaces the boilerplate word list.
    pub fn with_boilerplate_words<I, S>(mut self, list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boilerplate_words = list.into_iter().map(Into::into).collect();
        self
    }

    /// Skips Unicode NFC normalization.
    pub fn without_unicode_normalization(mut self) -> Self {
        self.normalize_unicode = false;
        self
    }

    fn uses_default_words(&self) -> bool {
        self.boilerplate_words.len() == DEFAULT_BOILERPLATE_WORDS.len()
            && self
                .boilerplate_words
                .iter()
                .zip(DEFAULT_BOILERPLATE_WORDS)
                .all(|(a, b)| a == b)
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// Result of cleaning a document together with its preamble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedDocument {
    /// Title from the preamble, empty if there was none
    pub title: String,
    /// All preamble fields found in the raw input
    pub preamble: Preamble,
    /// Cleaned text
    pub text: String,
}

/// A configured cleanup pipeline.
///
/// # Example
///
/// ```
/// use webtext::{Cleaner, CleanupOptions};
///
/// let cleaner = Cleaner::new(CleanupOptions::default())?;
/// assert_eq!(cleaner.clean("**bold** and *italic*"), "bold and italic");
/// # Ok::<(), webtext::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cleaner {
    options: CleanupOptions,
    rules: Vec<Rule>,
    boilerplate: Option<Regex>,
}

impl Default for Cleaner {
    fn default() -> Self {
        let options = CleanupOptions::default();
        let boilerplate = Some(rules::default_boilerplate_pattern().clone());
        Self::assemble(options, boilerplate)
    }
}

impl Cleaner {
    /// Builds a cleaner, compiling the configured boilerplate word list.
    pub fn new(options: CleanupOptions) -> Result<Self> {
        let boilerplate = if !options.strip_boilerplate {
            None
        } else if options.uses_default_words() {
            Some(rules::default_boilerplate_pattern().clone())
        } else {
            rules::boilerplate_pattern(&options.boilerplate_words)?
        };
        Ok(Self::assemble(options, boilerplate))
    }

    fn assemble(options: CleanupOptions, boilerplate: Option<Regex>) -> Self {
        let rules = Rule::ALL
            .iter()
            .copied()
            .filter(|rule| match rule {
                Rule::StripMetadata => options.extract_title,
                Rule::StripBylines => options.strip_bylines,
                Rule::StripBoilerplate => boilerplate.is_some(),
                _ => true,
            })
            .collect();

        Self {
            options,
            rules,
            boilerplate,
        }
    }

    /// Returns the options this cleaner was built with.
    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    /// Returns the enabled rules in execution order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext {
            normalize_unicode: self.options.normalize_unicode,
            html_policy: self.options.html_policy,
            boilerplate: self.boilerplate.as_ref(),
        }
    }

    /// Cleans a single document. Never fails; empty input yields an empty string.
    pub fn clean(&self, content: &str) -> String {
        let cx = self.context();
        self.rules
            .iter()
            .fold(content.to_string(), |text, rule| rule.apply(&text, &cx))
    }

    /// Cleans a document and reports its preamble alongside the text.
    pub fn clean_document(&self, content: &str) -> CleanedDocument {
        let preamble = Preamble::parse(content);
        CleanedDocument {
            title: preamble.title.clone().unwrap_or_default(),
            preamble,
            text: self.clean(content),
        }
    }

    /// Cleans many documents in parallel, preserving input order.
    pub fn clean_batch<S>(&self, documents: &[S]) -> Vec<String>
    where
        S: AsRef<str> + Sync,
    {
        documents
            .par_iter()
            .map(|doc| self.clean(doc.as_ref()))
            .collect()
    }
}

static DEFAULT_CLEANER: LazyLock<Cleaner> = LazyLock::new(Cleaner::default);

/// Cleans `content` with the default options.
///
/// # Example
///
/// ```
/// let text = webtext::clean("Title: Example\n\nURL Source: http://x\n\nMarkdown Content:\n\nBody text");
/// assert_eq!(text, "Example\n\nBody text");
/// ```
pub fn clean(content: &str) -> String {
    DEFAULT_CLEANER.clean(content)
}

/// Cleans `content` with custom options.
pub fn clean_with_options(content: &str, options: &CleanupOptions) -> Result<String> {
    let cleaner = Cleaner::new(options.clone())?;
    Ok(cleaner.clean(content))
}

/// Cleans many documents in parallel with the default options.
pub fn clean_batch<S>(documents: &[S]) -> Vec<String>
where
    S: AsRef<str> + Sync,
{
    DEFAULT_CLEANER.clean_batch(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARTICLE: &str = concat!(
        "Title: Ownership Explained\n\n",
        "URL Source: https://blog.example/ownership\n\n",
        "Markdown Content:\n\n",
        "# Ownership\n\n",
        "Rust uses **ownership** to manage memory.\n\n",
        "- [x] Move semantics\n",
        "- Borrowing\n\n",
        "> Values have one owner.\n\n",
        "See [the book](https://doc.rust-lang.org/book/) for more."
    );

    #[test]
    fn test_full_pipeline() {
        let expected = concat!(
            "Ownership Explained\n\n",
            "Ownership\n\n",
            "Rust uses ownership to manage memory.\n\n",
            "\t• Move semantics\n",
            "\t• Borrowing\n\n",
            "Values have one owner.\n\n",
            "See the book for more."
        );
        assert_eq!(clean(ARTICLE), expected);
    }

    #[test]
    fn test_second_pass_is_stable() {
        let once = clean(ARTICLE);
        assert_eq!(clean(&once), once);
    }

    #[test]
    fn test_title_promoted() {
        let input = "Title: Example\n\nURL Source: http://x\n\nMarkdown Content:\n\nBody text";
        assert_eq!(clean(input), "Example\n\nBody text");
    }

    #[test]
    fn test_bullets() {
        assert_eq!(clean("- item one\n- item two"), "\t• item one\n\t• item two");
    }

    #[test]
    fn test_bullet_starting_with_one_letter_link() {
        let input = "- [X](https://x.com) is where we post\n- [x] done";
        assert_eq!(clean(input), "\t• X is where we post\n\t• done");
    }

    #[test]
    fn test_preamble_without_body() {
        assert_eq!(clean("Title: T\n\nURL Source: https://u\n\nMarkdown Content:"), "T");
        assert_eq!(clean("Title: T\n\nURL Source: https://u"), "T");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(clean("**bold** and *italic*"), "bold and italic");
    }

    #[test]
    fn test_blank_line_runs() {
        assert_eq!(clean("First\n\n\n\n\nSecond"), "First\n\nSecond");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("  \n\t\r\n  "), "");
    }

    #[test]
    fn test_byline_removed_before_separators() {
        let input = "Jane Doe\n·\nPublished in\nBetter Programming\n·\n5 min read\n·\nMar 12, 2024\n42\nListen\nRust is great.";
        assert_eq!(clean(input), "Rust is great.");
    }

    #[test]
    fn test_default_strips_tags_and_boilerplate() {
        let input = "Title: T\n\nURL Source: u\n\nVisit <https://a.example> now and share it";
        let result = clean(input);
        assert!(result.starts_with("T\n\n"));
        assert!(!result.contains("https://a.example"));
        assert!(!result.contains("share"));
        assert!(!result.contains("URL Source"));
    }

    #[test]
    fn test_minimal_preset_keeps_preamble_and_unwraps_autolinks() {
        let input = "Title: T\n\nURL Source: u\n\nVisit <https://a.example> now and share it";
        let result = clean_with_options(input, &CleanupOptions::minimal()).unwrap();
        assert_eq!(
            result,
            "Title: T\n\nURL Source: u\n\nVisit https://a.example now and share it"
        );
    }

    #[test]
    fn test_minimal_rule_set() {
        let cleaner = Cleaner::new(CleanupOptions::minimal()).unwrap();
        let enabled = cleaner.rules();
        assert!(!enabled.contains(&Rule::StripMetadata));
        assert!(!enabled.contains(&Rule::StripBylines));
        assert!(!enabled.contains(&Rule::StripBoilerplate));
        assert!(enabled.contains(&Rule::StripHtml));

        // Disabling rules never changes the relative order.
        let positions: Vec<usize> = enabled
            .iter()
            .map(|r| Rule::ALL.iter().position(|a| a == r).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_default_cleaner_runs_every_rule() {
        assert_eq!(Cleaner::default().rules(), &Rule::ALL[..]);
    }

    #[test]
    fn test_custom_boilerplate_words() {
        let options = CleanupOptions::default().with_boilerplate_words(["subscribe"]);
        let result = clean_with_options("Subscribe to like this", &options).unwrap();
        assert_eq!(result, "to like this");
    }

    #[test]
    fn test_empty_word_list_disables_rule() {
        let options = CleanupOptions::default().with_boilerplate_words(Vec::<String>::new());
        let cleaner = Cleaner::new(options).unwrap();
        assert!(!cleaner.rules().contains(&Rule::StripBoilerplate));
    }

    #[test]
    fn test_keep_boilerplate() {
        let options = CleanupOptions::default().keep_boilerplate();
        let result = clean_with_options("share this", &options).unwrap();
        assert_eq!(result, "share this");
    }

    #[test]
    fn test_presets() {
        let default = CleanupOptions::default();
        assert!(default.extract_title);
        assert!(default.strip_boilerplate);
        assert_eq!(default.html_policy, HtmlPolicy::StripTags);

        let minimal = CleanupOptions::minimal();
        assert!(!minimal.extract_title);
        assert!(!minimal.strip_boilerplate);
        assert_eq!(minimal.html_policy, HtmlPolicy::UnwrapAutolinks);

        let aggressive = CleanupOptions::aggressive();
        assert!(aggressive.boilerplate_words.len() > default.boilerplate_words.len());
        assert!(aggressive.boilerplate_words.iter().any(|w| w == "subscribe"));
    }

    #[test]
    fn test_clean_document_reports_preamble() {
        let doc = Cleaner::default().clean_document(ARTICLE);
        assert_eq!(doc.title, "Ownership Explained");
        assert_eq!(
            doc.preamble.url_source.as_deref(),
            Some("https://blog.example/ownership")
        );
        assert!(doc.text.starts_with("Ownership Explained\n\n"));
    }

    #[test]
    fn test_clean_document_without_preamble() {
        let doc = Cleaner::default().clean_document("plain body");
        assert_eq!(doc.title, "");
        assert!(doc.preamble.is_empty());
        assert_eq!(doc.text, "plain body");
    }

    #[test]
    fn test_batch_matches_sequential() {
        let docs = vec![ARTICLE.to_string(), "- a\n- b".to_string(), String::new()];
        let batch = clean_batch(&docs);
        let sequential: Vec<String> = docs.iter().map(|d| clean(d)).collect();
        assert_eq!(batch, sequential);
    }

    #[test]
    fn test_cleaner_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Cleaner>();
    }
}
