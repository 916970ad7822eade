//! Whitespace tokenizer and hyperlink detection
//!
//! The input is split into alternating whitespace and non-whitespace runs
//! without losing any character, so joining the tokens back reproduces the
//! original text exactly except for the runs that became anchors.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const LINK_PREFIXES: [&str; 3] = ["http://", "https://", "www."];
const TRAILING_PUNCTUATION: [char; 5] = ['.', ',', ';', '!', '?'];
const ELLIPSIS: &str = "...";

/// A hyperlink detected in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<'a> {
    /// URL with trailing punctuation removed, as written by the author
    pub url: &'a str,
    /// Punctuation that followed the URL and stays outside the anchor
    pub trailing: &'a str,
}

impl<'a> Link<'a> {
    /// Detect a link in a single non-whitespace run.
    ///
    /// Runs holding `<` or `>` are left alone so markup-looking text is not
    /// rewritten. A run that is nothing but a prefix plus punctuation is not a
    /// link either.
    pub fn detect(run: &'a str) -> Option<Self> {
        if run.contains('<') || run.contains('>') {
            return None;
        }
        let prefix = LINK_PREFIXES.iter().find(|p| run.starts_with(*p))?;
        let url = run.trim_end_matches(TRAILING_PUNCTUATION);
        if !url.starts_with(prefix) || url.len() == prefix.len() {
            return None;
        }
        Some(Self {
            url,
            trailing: &run[url.len()..],
        })
    }

    /// Target of the anchor. `www.` links are promoted to https.
    pub fn href(&self) -> String {
        if self.url.starts_with("www.") {
            format!("https://{}", self.url)
        } else {
            self.url.to_string()
        }
    }

    /// Visible anchor text, shortened to `limit` characters including the ellipsis
    pub fn display(&self, limit: usize) -> String {
        if self.url.chars().count() > limit {
            let keep = limit.saturating_sub(ELLIPSIS.len());
            let mut text: String = self.url.chars().take(keep).collect();
            text.push_str(ELLIPSIS);
            text
        } else {
            self.url.to_string()
        }
    }

    /// Render as an anchor followed by the trailing punctuation
    pub fn to_html(&self, class: &str, limit: usize) -> String {
        format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"{}\">{}</a>{}",
            self.href(),
            class,
            self.display(limit),
            self.trailing
        )
    }
}

/// One piece of the tokenized input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text (whitespace runs included)
    Text(&'a str),
    /// Detected hyperlink
    Link(Link<'a>),
}

/// Split `text` into whitespace runs and words, classifying each word
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for ws in WHITESPACE.find_iter(text) {
        if ws.start() > last {
            tokens.push(classify(&text[last..ws.start()]));
        }
        tokens.push(Token::Text(ws.as_str()));
        last = ws.end();
    }
    if last < text.len() {
        tokens.push(classify(&text[last..]));
    }
    tokens
}

fn classify(run: &str) -> Token<'_> {
    match Link::detect(run) {
        Some(link) => Token::Link(link),
        None => Token::Text(run),
    }
}

/// Join tokens back into a single string, rendering links as anchors
pub fn render(tokens: &[Token<'_>], class: &str, limit: usize) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Link(link) => out.push_str(&link.to_html(class, limit)),
        }
    }
    out
}
