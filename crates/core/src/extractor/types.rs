//! Types produced by the metadata extractor.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::language::Language;

/// Title used when nothing usable is left after cleanup.
pub const UNKNOWN_TITLE: &str = "Unknown Movie";

/// Quality assumed when the caption carries no quality tag.
pub const DEFAULT_QUALITY: &str = "720p";

/// Size label assumed when neither the caption nor the transport gives one.
pub const DEFAULT_SIZE_LABEL: &str = "1.0 GB";

/// Earliest year accepted as a release year.
pub const MIN_RELEASE_YEAR: u16 = 1900;

/// Which full-caption pattern produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPattern {
    /// `Title 2010 1080p ... 1.4 GB` (year optionally parenthesized).
    Spaced,
    /// `Title - 2010 - 1080p ... 1.4 GB`.
    Dashed,
    /// `Title (2010) ... 1080p ... 1.4 GB`.
    Parenthesized,
}

/// How the fields of an [`Extraction`] were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// A full-caption pattern matched.
    Pattern(CaptionPattern),
    /// Fields were searched for independently.
    Fallback,
}

/// A field that may be filled with a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Year,
    Quality,
    Size,
}

/// Best-effort metadata for one caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Cleaned, title-cased display title. Never empty.
    pub title: String,
    /// Release year (defaults to the current year).
    pub year: u16,
    /// Canonical quality tag (`480p`, `1080p`, `4K`, `BluRay`, ...).
    pub quality: String,
    /// Size label such as `"1.45 GB"`.
    pub size_label: String,
    pub method: ExtractionMethod,
    /// Fields that were not found in the text and hold a default.
    pub defaulted: Vec<Field>,
    /// Audio language named in the caption or filename. Not stored in the
    /// catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Extraction {
    /// Whether `field` holds a default rather than a parsed value.
    pub fn is_defaulted(&self, field: Field) -> bool {
        self.defaulted.contains(&field)
    }

    /// Whether any field had to be defaulted.
    pub fn is_ambiguous(&self) -> bool {
        !self.defaulted.is_empty()
    }
}

/// The year used when no plausible year is present.
pub fn default_year() -> u16 {
    Utc::now().year() as u16
}

/// Whether `year` is plausible as a release year (1900 up to next year).
pub fn is_plausible_year(year: u16) -> bool {
    (MIN_RELEASE_YEAR..=default_year() + 1).contains(&year)
}

/// Canonical spelling of a quality tag.
///
/// Resolution tags are lowercased (`1080P` -> `1080p`), the rest use their
/// conventional spelling. Unknown tags are returned trimmed and unchanged.
pub fn normalize_quality(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    match lower.as_str() {
        "4k" => "4K".to_string(),
        "hdtv" => "HDTV".to_string(),
        "bluray" => "BluRay".to_string(),
        "web-dl" => "WEB-DL".to_string(),
        s if s.len() > 1
            && s.ends_with('p')
            && s[..s.len() - 1].chars().all(|c| c.is_ascii_digit()) =>
        {
            lower
        }
        _ => raw.trim().to_string(),
    }
}

/// Sort key for quality tags: resolutions by their line count, `4K` as 2160p,
/// source tags after the known resolutions and unknown tags last.
pub fn quality_rank(quality: &str) -> u32 {
    let lower = quality.trim().to_lowercase();
    if let Some(lines) = lower
        .strip_suffix('p')
        .and_then(|digits| digits.parse::<u32>().ok())
    {
        return lines;
    }
    match lower.as_str() {
        "4k" => 2160,
        "hdtv" => 5000,
        "web-dl" => 5001,
        "bluray" => 5002,
        _ => u32::MAX,
    }
}
