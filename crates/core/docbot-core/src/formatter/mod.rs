//! Assistant response formatter
//!
//! Turns raw assistant text into HTML: bare URLs become anchors, and a tiny
//! markdown subset (bold, italic, bullet/numbered lines, blank-line paragraphs)
//! becomes markup.
//!
//! The work is an ordered pipeline of [`Stage`]s. Link detection runs first
//! and operates on whitespace-delimited tokens; every later stage is a
//! whole-string rewrite that sees the anchors already in place. Anchors are
//! single-line and carry no `*`, so the markdown stages leave them intact
//! unless the URL itself contains `*`.
//!
//! Input text is not HTML-escaped. The caller that injects the output owns any
//! further sanitizing.
//!
//! # Example
//!
//! ```
//! use docbot_core::formatter::format;
//!
//! assert_eq!(format("**hi** there"), "<p><strong>hi</strong> there</p>");
//! assert_eq!(format(""), "");
//! ```

pub mod links;
mod markup;

use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;
use tracing::warn;

pub use links::{tokenize, Link, Token};

/// Default classes for rendered anchors
pub const DEFAULT_LINK_CLASS: &str =
    "text-blue-600 dark:text-blue-400 hover:underline break-all";
/// Default classes for list containers (disc bullets, vertical spacing)
pub const DEFAULT_LIST_CLASS: &str = "list-disc list-inside space-y-1 my-2";
/// URLs longer than this many characters are shortened for display
pub const DEFAULT_LINK_DISPLAY_LIMIT: usize = 50;

/// Markup options for [`ResponseFormatter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterOptions {
    /// `class` attribute of rendered anchors
    pub link_class: String,
    /// `class` attribute of list containers
    pub list_class: String,
    /// Maximum visible anchor text length, ellipsis included
    pub link_display_limit: usize,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            link_class: DEFAULT_LINK_CLASS.to_string(),
            list_class: DEFAULT_LIST_CLASS.to_string(),
            link_display_limit: DEFAULT_LINK_DISPLAY_LIMIT,
        }
    }
}

/// One named step of the formatting pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Tokenize on whitespace, render detected URLs as anchors, rejoin.
    /// Pre: raw text. Post: text with anchors, whitespace preserved.
    Linkify,
    /// `**x**` to `<strong>`. Post: no balanced `**` pairs remain on a line.
    Bold,
    /// `*x*` to `<em>`. Post: stray single stars paired up as emphasis.
    Italic,
    /// Lines starting with `*`, `-` or `+` and whitespace become `<li>`.
    BulletItems,
    /// Lines starting with `N.` and whitespace become `<li>`.
    NumberedItems,
    /// Every `\n` becomes `<br>`. Post: output is a single line.
    LineBreaks,
    /// `<br><br>` becomes a paragraph boundary.
    Paragraphs,
    /// Runs of `<li>` separated by at most one `<br>` get one `<ul>`.
    ListGrouping,
    /// Wrap in `<p>` unless the output is list-only.
    OuterWrap,
}

/// Stages in execution order
pub const PIPELINE: [Stage; 9] = [
    Stage::Linkify,
    Stage::Bold,
    Stage::Italic,
    Stage::BulletItems,
    Stage::NumberedItems,
    Stage::LineBreaks,
    Stage::Paragraphs,
    Stage::ListGrouping,
    Stage::OuterWrap,
];

impl Stage {
    /// Stable name, used in trace logs
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Linkify => "linkify",
            Stage::Bold => "bold",
            Stage::Italic => "italic",
            Stage::BulletItems => "bullet_items",
            Stage::NumberedItems => "numbered_items",
            Stage::LineBreaks => "line_breaks",
            Stage::Paragraphs => "paragraphs",
            Stage::ListGrouping => "list_grouping",
            Stage::OuterWrap => "outer_wrap",
        }
    }

    /// Run this stage on `input`
    pub fn apply(&self, input: String, options: &FormatterOptions) -> String {
        match self {
            Stage::Linkify => links::render(
                &links::tokenize(&input),
                &options.link_class,
                options.link_display_limit,
            ),
            Stage::Bold => markup::bold(&input),
            Stage::Italic => markup::italic(&input),
            Stage::BulletItems => markup::bullet_items(&input),
            Stage::NumberedItems => markup::numbered_items(&input),
            Stage::LineBreaks => markup::line_breaks(&input),
            Stage::Paragraphs => markup::paragraphs(&input),
            Stage::ListGrouping => markup::group_items(&input, &options.list_class),
            Stage::OuterWrap => markup::outer_wrap(input, &options.list_class),
        }
    }
}

/// Formatter bound to a set of markup options
#[derive(Debug, Clone, Default)]
pub struct ResponseFormatter {
    options: FormatterOptions,
}

impl ResponseFormatter {
    /// Create a formatter with custom options
    pub fn new(options: FormatterOptions) -> Self {
        Self { options }
    }

    /// Options in use
    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    /// Format assistant text as HTML. Empty input gives an empty string.
    pub fn format(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        PIPELINE
            .iter()
            .fold(text.to_string(), |acc, stage| stage.apply(acc, &self.options))
    }

    /// Format a JSON value as received from a backend.
    ///
    /// Falsy values (`null`, `false`, `0`, `""`) give an empty string. Other
    /// non-string values are coerced to their JSON text with a warning.
    pub fn format_value(&self, value: &JsonValue) -> String {
        match value {
            JsonValue::String(s) => self.format(s),
            v if is_falsy(v) => String::new(),
            JsonValue::Bool(b) => {
                warn!("FORMATTER_COERCE kind=bool");
                self.format(&b.to_string())
            }
            JsonValue::Number(n) => {
                warn!("FORMATTER_COERCE kind=number");
                self.format(&n.to_string())
            }
            other => {
                warn!(
                    "FORMATTER_COERCE kind={}",
                    if other.is_array() { "array" } else { "object" }
                );
                self.format(&other.to_string())
            }
        }
    }
}

fn is_falsy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        _ => false,
    }
}

static DEFAULT_FORMATTER: Lazy<ResponseFormatter> = Lazy::new(ResponseFormatter::default);

/// Format assistant text with the default options
pub fn format(text: &str) -> String {
    DEFAULT_FORMATTER.format(text)
}

/// Format a JSON value with the default options
pub fn format_value(value: &JsonValue) -> String {
    DEFAULT_FORMATTER.format_value(value)
}
