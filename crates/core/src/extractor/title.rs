//! Title cleanup.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::UNKNOWN_TITLE;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("bracketed tag pattern"));

static CONTAINER_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(mkv|mp4|avi)\b").expect("container extension pattern"));

/// Characters trimmed from both ends of a title once separators are spaces.
const EDGE_NOISE: &[char] = &['-', ':', '|', ',', '~', '+', '&', '/', '\\', ' '];

/// Clean a raw title span into a display title.
///
/// Strips `[...]` tags and `.mkv`/`.mp4`/`.avi` extensions, turns `.` and `_`
/// separators into spaces, drops leftover brackets, collapses whitespace and
/// title-cases the result. Returns [`UNKNOWN_TITLE`] if nothing is left.
pub fn clean_title(raw: &str) -> String {
    let without_tags = BRACKETED.replace_all(raw, " ");
    let without_ext = CONTAINER_EXT.replace_all(&without_tags, " ");

    let spaced: String = without_ext
        .chars()
        .map(|c| match c {
            '.' | '_' => ' ',
            '[' | ']' | '(' | ')' | '{' | '}' => ' ',
            c => c,
        })
        .collect();

    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(EDGE_NOISE);

    if trimmed.is_empty() {
        return UNKNOWN_TITLE.to_string();
    }

    title_case(trimmed)
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts after whitespace or a hyphen; apostrophes do not start a word.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = c.is_whitespace() || c == '-';
        }
    }

    out
}
