//! # Rewrite Rules
//!
//! Every cleanup step is a [`Rule`]: a pure `&str -> String` rewrite with a
//! fixed position in [`Rule::ALL`]. A [`Cleaner`](crate::Cleaner) may switch
//! rules off but never reorders them.
//!
//! ## Groups
//!
//! 1. **Preamble** - text normalization, metadata block, bylines, leading noise
//! 2. **Block markup** - blockquotes, headers, horizontal rules, lists
//! 3. **Inline markup** - emphasis, images, links, HTML, footnotes, boilerplate
//! 4. **Layout** - code fences, blank lines, block spacing, final trimming
//!
//! All patterns are compiled with the `regex` crate, which matches in time
//! linear in the input.

use crate::preamble;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Prefix written in front of every list item.
pub const BULLET_PREFIX: &str = "\t• ";

/// Words removed by [`Rule::StripBoilerplate`] unless configured otherwise.
pub const DEFAULT_BOILERPLATE_WORDS: &[&str] = &[
    "publication",
    "time",
    "follow",
    "like",
    "share",
    "sign-in",
    "sign-out",
];

/// How residual inline HTML is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtmlPolicy {
    /// Delete every tag, keeping the text between tags.
    #[default]
    StripTags,
    /// Only unwrap autolinks (`<https://...>` becomes the bare URL).
    UnwrapAutolinks,
}

/// Per-run settings the rules read.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Apply Unicode NFC while normalizing text.
    pub normalize_unicode: bool,
    /// HTML handling for [`Rule::StripHtml`].
    pub html_policy: HtmlPolicy,
    /// Compiled boilerplate word pattern, if any.
    pub boilerplate: Option<&'a Regex>,
}

impl Default for RuleContext<'_> {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            html_policy: HtmlPolicy::StripTags,
            boilerplate: Some(default_boilerplate_pattern()),
        }
    }
}

/// A single rewrite step of the cleanup pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    NormalizeText,
    StripMetadata,
    StripBylines,
    StripLeadingNoise,
    StripBlockquotes,
    NormalizeAtxHeaders,
    NormalizeSetextHeaders,
    StripHorizontalRules,
    NormalizeTaskLists,
    NormalizeUnorderedLists,
    NormalizeOrderedLists,
    StripEmphasis,
    StripImages,
    StripLinks,
    StripEmptyLinks,
    StripHtml,
    StripFootnotes,
    StripBoilerplate,
    TightenCodeFences,
    CollapseBlankLines,
    SpaceBlocks,
    TrimLines,
    FinalizeLayout,
}

impl Rule {
    /// All rules in execution order.
    pub const ALL: [Rule; 23] = [
        Rule::NormalizeText,
        Rule::StripMetadata,
        Rule::StripBylines,
        Rule::StripLeadingNoise,
        Rule::StripBlockquotes,
        Rule::NormalizeAtxHeaders,
        Rule::NormalizeSetextHeaders,
        Rule::StripHorizontalRules,
        Rule::NormalizeTaskLists,
        Rule::NormalizeUnorderedLists,
        Rule::NormalizeOrderedLists,
        Rule::StripEmphasis,
        Rule::StripImages,
        Rule::StripLinks,
        Rule::StripEmptyLinks,
        Rule::StripHtml,
        Rule::StripFootnotes,
        Rule::StripBoilerplate,
        Rule::TightenCodeFences,
        Rule::CollapseBlankLines,
        Rule::SpaceBlocks,
        Rule::TrimLines,
        Rule::FinalizeLayout,
    ];

    /// Short kebab-case identifier.
    pub fn name(self) -> &'static str {
        match self {
            Rule::NormalizeText => "normalize-text",
            Rule::StripMetadata => "strip-metadata",
            Rule::StripBylines => "strip-bylines",
            Rule::StripLeadingNoise => "strip-leading-noise",
            Rule::StripBlockquotes => "strip-blockquotes",
            Rule::NormalizeAtxHeaders => "normalize-atx-headers",
            Rule::NormalizeSetextHeaders => "normalize-setext-headers",
            Rule::StripHorizontalRules => "strip-horizontal-rules",
            Rule::NormalizeTaskLists => "normalize-task-lists",
            Rule::NormalizeUnorderedLists => "normalize-unordered-lists",
            Rule::NormalizeOrderedLists => "normalize-ordered-lists",
            Rule::StripEmphasis => "strip-emphasis",
            Rule::StripImages => "strip-images",
            Rule::StripLinks => "strip-links",
            Rule::StripEmptyLinks => "strip-empty-links",
            Rule::StripHtml => "strip-html",
            Rule::StripFootnotes => "strip-footnotes",
            Rule::StripBoilerplate => "strip-boilerplate",
            Rule::TightenCodeFences => "tighten-code-fences",
            Rule::CollapseBlankLines => "collapse-blank-lines",
            Rule::SpaceBlocks => "space-blocks",
            Rule::TrimLines => "trim-lines",
            Rule::FinalizeLayout => "finalize-layout",
        }
    }

    /// One-line human readable summary.
    pub fn description(self) -> &'static str {
        match self {
            Rule::NormalizeText => "unify line endings, drop control characters, trim",
            Rule::StripMetadata => "replace the Title/URL Source/... preamble with the title",
            Rule::StripBylines => "remove author/publication/read-time byline blocks",
            Rule::StripLeadingNoise => "remove images, dates and separators at line start",
            Rule::StripBlockquotes => "remove '>' quote markers",
            Rule::NormalizeAtxHeaders => "reduce '#' headers to their text",
            Rule::NormalizeSetextHeaders => "drop '===' and '---' header underlines",
            Rule::StripHorizontalRules => "remove horizontal rule lines",
            Rule::NormalizeTaskLists => "turn task list markers into bullets",
            Rule::NormalizeUnorderedLists => "turn '-', '*' and '+' markers into bullets",
            Rule::NormalizeOrderedLists => "turn '1.' markers into bullets",
            Rule::StripEmphasis => "remove bold and italic delimiters",
            Rule::StripImages => "remove image syntax",
            Rule::StripLinks => "replace links with their text",
            Rule::StripEmptyLinks => "remove empty link artifacts",
            Rule::StripHtml => "remove inline HTML tags or unwrap autolinks",
            Rule::StripFootnotes => "remove footnote references and definitions",
            Rule::StripBoilerplate => "remove social and reading boilerplate words",
            Rule::TightenCodeFences => "remove blank lines just inside code fences",
            Rule::CollapseBlankLines => "collapse runs of blank lines to one",
            Rule::SpaceBlocks => "separate sections and lists with a blank line",
            Rule::TrimLines => "trim whitespace around every line",
            Rule::FinalizeLayout => "cap consecutive newlines and trim the document",
        }
    }

    /// Rules that must already have run when this one runs.
    pub fn runs_after(self) -> &'static [Rule] {
        match self {
            Rule::NormalizeText => &[],
            Rule::StripMetadata | Rule::StripBylines => &[Rule::NormalizeText],
            // The title line would otherwise be eaten as noise, and byline
            // blocks are anchored on the `·` lines this rule deletes.
            Rule::StripLeadingNoise => &[Rule::StripMetadata, Rule::StripBylines],
            Rule::StripBlockquotes => &[Rule::NormalizeText],
            Rule::NormalizeAtxHeaders | Rule::NormalizeSetextHeaders => &[Rule::StripBlockquotes],
            Rule::StripHorizontalRules => &[Rule::NormalizeSetextHeaders],
            Rule::NormalizeTaskLists => &[Rule::StripBlockquotes, Rule::StripHorizontalRules],
            Rule::NormalizeUnorderedLists => &[Rule::NormalizeTaskLists],
            Rule::NormalizeOrderedLists => &[Rule::StripBlockquotes],
            Rule::StripEmphasis => &[Rule::NormalizeUnorderedLists, Rule::StripHorizontalRules],
            Rule::StripImages => &[Rule::StripLeadingNoise],
            Rule::StripLinks => &[Rule::StripImages, Rule::StripEmphasis],
            Rule::StripEmptyLinks | Rule::StripFootnotes => &[Rule::StripLinks],
            Rule::StripHtml => &[Rule::NormalizeText],
            Rule::StripBoilerplate => &[Rule::StripMetadata, Rule::StripBylines],
            Rule::TightenCodeFences => &[Rule::NormalizeText],
            Rule::CollapseBlankLines => &[
                Rule::StripHorizontalRules,
                Rule::StripFootnotes,
                Rule::StripBoilerplate,
                Rule::TightenCodeFences,
            ],
            Rule::SpaceBlocks => &[
                Rule::CollapseBlankLines,
                Rule::NormalizeUnorderedLists,
                Rule::NormalizeOrderedLists,
            ],
            Rule::TrimLines => &[Rule::SpaceBlocks],
            Rule::FinalizeLayout => &[Rule::TrimLines],
        }
    }

    /// Applies this rule to `input`.
    pub fn apply(self, input: &str, cx: &RuleContext<'_>) -> String {
        match self {
            Rule::NormalizeText => normalize_text(input, cx.normalize_unicode),
            Rule::StripMetadata => {
                let title = preamble::extract_title(input);
                preamble::strip_metadata(input, &title)
            }
            Rule::StripBylines => strip_bylines(input),
            Rule::StripLeadingNoise => strip_leading_noise(input),
            Rule::StripBlockquotes => strip_blockquotes(input),
            Rule::NormalizeAtxHeaders => normalize_atx_headers(input),
            Rule::NormalizeSetextHeaders => normalize_setext_headers(input),
            Rule::StripHorizontalRules => strip_horizontal_rules(input),
            Rule::NormalizeTaskLists => normalize_task_lists(input),
            Rule::NormalizeUnorderedLists => normalize_unordered_lists(input),
            Rule::NormalizeOrderedLists => normalize_ordered_lists(input),
            Rule::StripEmphasis => strip_emphasis(input),
            Rule::StripImages => strip_images(input),
            Rule::StripLinks => strip_links(input),
            Rule::StripEmptyLinks => strip_empty_links(input),
            Rule::StripHtml => strip_html(input, cx.html_policy),
            Rule::StripFootnotes => strip_footnotes(input),
            Rule::StripBoilerplate => match cx.boilerplate {
                Some(pattern) => strip_boilerplate(input, pattern),
                None => input.to_string(),
            },
            Rule::TightenCodeFences => tighten_code_fences(input),
            Rule::CollapseBlankLines => collapse_blank_lines(input),
            Rule::SpaceBlocks => space_blocks(input),
            Rule::TrimLines => trim_lines(input),
            Rule::FinalizeLayout => finalize_layout(input),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn replace(pattern: &Regex, input: &str, replacement: &str) -> String {
    pattern.replace_all(input, replacement).into_owned()
}

// ============================================================================
// Preamble
// ============================================================================

/// Normalizes line endings, removes control characters and trims.
pub fn normalize_text(input: &str, nfc: bool) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");

    let cleaned: String = if nfc {
        unified.nfc().filter(|c| !is_control_char(*c)).collect()
    } else {
        unified.chars().filter(|c| !is_control_char(*c)).collect()
    };

    cleaned.trim().to_string()
}

fn is_control_char(c: char) -> bool {
    matches!(
        c,
        '\0'        // Null
        | '\x0B'    // Vertical Tab
        | '\x0C'    // Form Feed
        | '\u{FEFF}' // BOM
        | '\u{FFFD}' // Replacement character
        | '\u{00AD}' // Soft hyphen
    )
}

static RE_BYLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[\w \t.'-]+\n·\nPublished in\n[\w \t&'-]+\n·\n\d+ min read\n·\n[\w \t,]+\n\d+\nListen(?:\n|$)",
    )
    .unwrap()
});

/// Removes Medium-style byline blocks:
///
/// ```text
/// Author Name
/// ·
/// Published in
/// Publication Name
/// ·
/// 5 min read
/// ·
/// Mar 12, 2024
/// 42
/// Listen
/// ```
pub fn strip_bylines(input: &str) -> String {
    replace(&RE_BYLINE, input, "")
}

/// English month names and their common abbreviations.
const MONTH: &str = r"(?i:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

// A date only counts as noise when nothing but a separator follows it.
static RE_LEADING_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^(?:(?:!\[[^\]\n]*\]\([^)\n]*\)|\d{{1,2}}[ \t]*{MONTH},?[ \t]*\d{{4}}[ \t]*(?:·|$)|·)[ \t]*)+\s*",
    ))
    .unwrap()
});

/// Removes images, standalone dates and `·` separators at the start of lines.
pub fn strip_leading_noise(input: &str) -> String {
    replace(&RE_LEADING_NOISE, input, "")
}

// ============================================================================
// Block markup
// ============================================================================

static RE_BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:>[ \t]*)+").unwrap());

static RE_ATX_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+[ \t]*(.*?)(?:[ \t]+#+)?[ \t]*$").unwrap());

static RE_SETEXT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(.+)\n[=-]+[ \t]*(?:\n|\z)").unwrap());

static RE_HORIZONTAL_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

static RE_TASK_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*+][ \t]*\[[xX ]\](?:[ \t]+|$)").unwrap());

static RE_UNORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").unwrap());

static RE_ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+").unwrap());

/// Removes `>` markers at line start; nesting depth is discarded.
pub fn strip_blockquotes(input: &str) -> String {
    replace(&RE_BLOCKQUOTE, input, "")
}

/// Reduces `# Header` (and `## Header ##`) lines to their text.
pub fn normalize_atx_headers(input: &str) -> String {
    replace(&RE_ATX_HEADER, input, "${1}")
}

/// Drops `===`/`---` underlines below setext headers.
pub fn normalize_setext_headers(input: &str) -> String {
    replace(&RE_SETEXT_HEADER, input, "${1}\n")
}

pub fn strip_horizontal_rules(input: &str) -> String {
    replace(&RE_HORIZONTAL_RULE, input, "")
}

/// `- [ ]`, `- [x]` and `- [X]` become plain bullets. The box must be
/// followed by whitespace or the end of the line, so `- [X](url)` stays a link.
pub fn normalize_task_lists(input: &str) -> String {
    replace(&RE_TASK_ITEM, input, BULLET_PREFIX)
}

pub fn normalize_unordered_lists(input: &str) -> String {
    replace(&RE_UNORDERED_ITEM, input, BULLET_PREFIX)
}

pub fn normalize_ordered_lists(input: &str) -> String {
    replace(&RE_ORDERED_ITEM, input, BULLET_PREFIX)
}

// ============================================================================
// Inline markup
// ============================================================================

/// Emphasis patterns, longest delimiter first. Underscore forms only match
/// at word boundaries so identifiers like `snake_case_name` survive.
static RE_EMPHASIS: LazyLock<[Regex; 6]> = LazyLock::new(|| {
    [
        Regex::new(r"\*\*\*(.+?)\*\*\*").unwrap(),
        Regex::new(r"\b___(.+?)___\b").unwrap(),
        Regex::new(r"\*\*(.+?)\*\*").unwrap(),
        Regex::new(r"\b__(.+?)__\b").unwrap(),
        Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").unwrap(),
        Regex::new(r"\b_([^_\s](?:[^_\n]*[^_\s])?)_\b").unwrap(),
    ]
});

static RE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]\n]*\]\([^)\n]*\)").unwrap());

static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]\([^)\n]*\)").unwrap());

static RE_EMPTY_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\]\([^)]*\)").unwrap());

static RE_HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z!?][^>]*>").unwrap());

static RE_AUTOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(https?://[^>\s]+)>").unwrap());

static RE_FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\[\^[^\]\n]+\](?::[ \t]+.*$)?").unwrap());

static RE_DEFAULT_BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<String> = DEFAULT_BOILERPLATE_WORDS
        .iter()
        .map(|w| w.to_string())
        .collect();
    compile_word_pattern(&words).unwrap()
});

/// Strips `***`/`___`, then `**`/`__`, then `*`/`_` emphasis.
pub fn strip_emphasis(input: &str) -> String {
    RE_EMPHASIS
        .iter()
        .fold(input.to_string(), |text, pattern| replace(pattern, &text, "${1}"))
}

/// Removes `![alt](url)` entirely, alt text included.
pub fn strip_images(input: &str) -> String {
    replace(&RE_IMAGE, input, "")
}

/// Replaces `[text](url)` with `text`.
pub fn strip_links(input: &str) -> String {
    replace(&RE_LINK, input, "${1}")
}

pub fn strip_empty_links(input: &str) -> String {
    replace(&RE_EMPTY_LINK, input, "")
}

/// Removes inline HTML according to `policy`.
pub fn strip_html(input: &str, policy: HtmlPolicy) -> String {
    match policy {
        HtmlPolicy::StripTags => replace(&RE_HTML_TAG, input, ""),
        HtmlPolicy::UnwrapAutolinks => replace(&RE_AUTOLINK, input, "${1}"),
    }
}

/// Removes `[^id]` references and `[^id]: text` definitions.
pub fn strip_footnotes(input: &str) -> String {
    replace(&RE_FOOTNOTE, input, "")
}

pub fn strip_boilerplate(input: &str, pattern: &Regex) -> String {
    replace(pattern, input, "")
}

/// Returns the pattern used by default for [`Rule::StripBoilerplate`].
pub fn default_boilerplate_pattern() -> &'static Regex {
    &RE_DEFAULT_BOILERPLATE
}

/// Builds a case-insensitive, whole-word pattern for `words`.
///
/// Returns `Ok(None)` when the list is empty.
pub fn boilerplate_pattern(words: &[String]) -> Result<Option<Regex>, regex::Error> {
    if words.iter().all(|w| w.trim().is_empty()) {
        return Ok(None);
    }
    compile_word_pattern(words).map(Some)
}

fn compile_word_pattern(words: &[String]) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
}

// ============================================================================
// Layout
// ============================================================================

static RE_CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^(```[^\n]*)\n(.*?)\n```[ \t]*$").unwrap());

static RE_BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").unwrap());

static RE_NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Removes blank lines directly after an opening fence and before the
/// closing one.
pub fn tighten_code_fences(input: &str) -> String {
    RE_CODE_FENCE
        .replace_all(input, |caps: &Captures| {
            let body = trim_blank_lines(&caps[2]);
            if body.is_empty() {
                format!("{}\n```", &caps[1])
            } else {
                format!("{}\n{}\n```", &caps[1], body)
            }
        })
        .into_owned()
}

fn trim_blank_lines(text: &str) -> &str {
    let lines: Vec<&str> = text.split('\n').collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());

    match (first, last) {
        (Some(first), Some(last)) => {
            let start: usize = lines[..first].iter().map(|l| l.len() + 1).sum();
            let end: usize = lines[..=last].iter().map(|l| l.len() + 1).sum::<usize>() - 1;
            &text[start..end]
        }
        _ => "",
    }
}

/// Collapses two or more blank lines into exactly one.
pub fn collapse_blank_lines(input: &str) -> String {
    replace(&RE_BLANK_RUN, input, "\n\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Bullet,
    Section,
    Text,
}

impl LineKind {
    fn of(line: &str) -> Self {
        let content = line.trim_start();
        match content.chars().next() {
            None => LineKind::Blank,
            Some('•') => LineKind::Bullet,
            Some(c) if c.is_uppercase() => LineKind::Section,
            Some(_) => LineKind::Text,
        }
    }
}

/// Inserts one blank line before a section line (uppercase start) that
/// follows content, and before the first bullet of a list that follows
/// prose. Consecutive bullets stay together.
pub fn space_blocks(input: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous = LineKind::Blank;

    for line in input.split('\n') {
        let kind = LineKind::of(line);

        let separate = match kind {
            LineKind::Bullet => matches!(previous, LineKind::Section | LineKind::Text),
            LineKind::Section => previous != LineKind::Blank,
            LineKind::Blank | LineKind::Text => false,
        };
        if separate {
            lines.push("");
        }

        lines.push(line);
        previous = kind;
    }

    lines.join("\n")
}

/// Trims every line. Bullet lines keep their tab prefix.
pub fn trim_lines(input: &str) -> String {
    input
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with('•') {
                format!("\t{}", trimmed)
            } else {
                trimmed.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Caps newline runs at two and trims the document.
pub fn finalize_layout(input: &str) -> String {
    let capped = replace(&RE_NEWLINE_RUN, input, "\n\n");
    // Lines are already trimmed; only a bullet tab can lead the first line.
    capped.trim_start_matches('\n').trim_end().to_string()
}
