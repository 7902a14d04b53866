//! Audio language tags.

use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// A language named in a caption or filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Hindi,
    Tamil,
    Telugu,
    English,
}

impl Language {
    /// Checked in this order; the first language mentioned anywhere wins.
    const ALL: [Language; 4] = [
        Language::Hindi,
        Language::Tamil,
        Language::Telugu,
        Language::English,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            Language::Hindi => &HINDI,
            Language::Tamil => &TAMIL,
            Language::Telugu => &TELUGU,
            Language::English => &ENGLISH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Hindi => "Hindi",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::English => "English",
        };
        f.write_str(name)
    }
}

// Words are delimited by anything that is not a letter, so `Movie.Hin.720p`
// counts but `Hotel` does not contain Telugu.
static HINDI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^a-z])(?:hindi|hin)(?:[^a-z]|$)").expect("hindi pattern"));
static TAMIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^a-z])(?:tamil|tam)(?:[^a-z]|$)").expect("tamil pattern"));
static TELUGU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:telugu|tel)(?:[^a-z]|$)").expect("telugu pattern")
});
static ENGLISH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:english|eng)(?:[^a-z]|$)").expect("english pattern")
});

/// Find the language a caption or filename names, if any.
pub fn detect_language(text: &str) -> Option<Language> {
    Language::ALL
        .into_iter()
        .find(|language| language.pattern().is_match(text))
}
