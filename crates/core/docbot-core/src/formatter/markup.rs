//! Regex rewrites applied after link detection

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) const LINE_BREAK: &str = "<br>";
pub(crate) const PARAGRAPH_BREAK: &str = "</p><p>";

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid regex"));
static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[*\-+]\s+([^\r\n]+)(\r?)$").expect("valid regex"));
static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[0-9]+\.\s+([^\r\n]+)(\r?)$").expect("valid regex"));
static ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"<li>.*?</li>").expect("valid regex"));
static ITEM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:<li>.*?</li>(?:<br>)?)+").expect("valid regex"));

pub(crate) fn bold(input: &str) -> String {
    BOLD.replace_all(input, "<strong>${1}</strong>").into_owned()
}

pub(crate) fn italic(input: &str) -> String {
    ITALIC.replace_all(input, "<em>${1}</em>").into_owned()
}

pub(crate) fn bullet_items(input: &str) -> String {
    BULLET_ITEM.replace_all(input, "<li>${1}</li>${2}").into_owned()
}

pub(crate) fn numbered_items(input: &str) -> String {
    NUMBERED_ITEM.replace_all(input, "<li>${1}</li>${2}").into_owned()
}

pub(crate) fn line_breaks(input: &str) -> String {
    input.replace('\n', LINE_BREAK)
}

pub(crate) fn paragraphs(input: &str) -> String {
    input.replace("<br><br>", PARAGRAPH_BREAK)
}

/// Wrap each run of items in one list container, dropping the single line
/// breaks that separated the items.
pub(crate) fn group_items(input: &str, list_class: &str) -> String {
    ITEM_RUN
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let items: String = ITEM.find_iter(&caps[0]).map(|m| m.as_str()).collect();
            format!("{}{}</ul>", list_open(list_class), items)
        })
        .into_owned()
}

pub(crate) fn list_open(list_class: &str) -> String {
    format!("<ul class=\"{}\">", list_class)
}

pub(crate) fn outer_wrap(input: String, list_class: &str) -> String {
    if input.contains(PARAGRAPH_BREAK) {
        // Already split into paragraphs: still wrapped once more, which can
        // leave a list container inside a paragraph.
        format!("<p>{}</p>", input)
    } else if !input.contains(&list_open(list_class)) {
        format!("<p>{}</p>", input)
    } else {
        input
    }
}
