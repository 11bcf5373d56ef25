//! # webtext
//!
//! A fast Rust library for turning scraped article markdown into clean,
//! readable plain text.
//!
//! ## What gets cleaned
//!
//! - **Preamble**: `Title:` / `URL Source:` / `Published Time:` headers (title kept)
//! - **Markup**: headers, emphasis, blockquotes, rules, images, links, footnotes
//! - **Lists**: bullets become `\t• item`, numbering is dropped
//! - **Noise**: bylines, leading image/date runs, boilerplate words, inline HTML
//! - **Layout**: blank-line runs collapsed, blocks spaced, lines trimmed
//!
//! ## Quick Start
//!
//! ```
//! let markdown = "Title: Example\n\nURL Source: http://x\n\nMarkdown Content:\n\n# Intro\n\n- **one**\n- two";
//! let text = webtext::clean(markdown);
//! assert_eq!(text, "Example\n\nIntro\n\n\t• one\n\t• two");
//! ```
//!
//! ## Custom options
//!
//! ```
//! use webtext::{clean_with_options, CleanupOptions, HtmlPolicy};
//!
//! let options = CleanupOptions::default()
//!     .keep_boilerplate()
//!     .with_html_policy(HtmlPolicy::UnwrapAutolinks);
//!
//! let text = clean_with_options("Share <https://example.com>", &options)?;
//! assert_eq!(text, "Share https://example.com");
//! # Ok::<(), webtext::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async` (default): Tokio-based fetch-and-clean API with a pluggable [`async_api::Fetcher`]

pub mod cleanup;
pub mod error;
pub mod preamble;
pub mod response;
pub mod rules;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use cleanup::{clean, clean_batch, clean_with_options, CleanedDocument, Cleaner, CleanupOptions};
pub use error::{Error, Result};
pub use preamble::Preamble;
pub use response::{CleanRequest, Envelope, Reply, ReplyStatus};
pub use rules::{HtmlPolicy, Rule};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_start() {
        let markdown = "Title: Example\n\nURL Source: http://x\n\nMarkdown Content:\n\n# Intro\n\n- **one**\n- two";
        assert_eq!(clean(markdown), "Example\n\nIntro\n\n\t• one\n\t• two");
    }

    #[test]
    fn test_free_function_matches_default_cleaner() {
        let input = "## Notes\n\n1. first\n2. second";
        assert_eq!(clean(input), Cleaner::default().clean(input));
        assert_eq!(
            clean_with_options(input, &CleanupOptions::default()).unwrap(),
            clean(input)
        );
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_unicode_text_survives() {
        // Non-ASCII prose passes through untouched
        let text = clean("한글 테스트 🎉 Unicode");
        assert_eq!(text, "한글 테스트 🎉 Unicode");
    }

    #[test]
    fn test_decomposed_input_is_composed() {
        // "e" + combining acute accent becomes a single code point
        assert_eq!(clean("Cafe\u{301}"), "Caf\u{e9}");
    }

    #[test]
    fn test_only_markup_yields_empty() {
        assert_eq!(clean("---\n\n![](x.png)\n\n> "), "");
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(clean("First\r\n\r\n\r\n\r\nSecond"), "First\n\nSecond");
    }

    #[test]
    fn test_reply_from_clean_result() {
        let reply = Reply::from(clean_with_options("*x*", &CleanupOptions::minimal()));
        assert_eq!(reply.status.code(), 200);
        assert_eq!(reply.envelope, Envelope::success("x"));
    }
}
