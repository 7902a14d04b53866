//! Pattern cascade and independent-field fallback.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use tracing::debug;

use super::language::detect_language;
use super::size::normalize_size;
use super::title::clean_title;
use super::types::{
    default_year, is_plausible_year, normalize_quality, CaptionPattern, Extraction,
    ExtractionMethod, Field, DEFAULT_QUALITY, DEFAULT_SIZE_LABEL,
};
use crate::metrics::EXTRACTION_FALLBACKS;

const QUALITY: &str = r"(?P<quality>\d{3,4}p|4K|HDTV|BluRay|WEB-DL)";
const SIZE: &str = r"(?P<size>\d+(?:\.\d+)?)\s*(?P<unit>GB|MB|KB)\b";

/// Full-caption patterns, tried in order. The first one that matches with a
/// plausible year wins.
static CASCADE: Lazy<Vec<(CaptionPattern, Regex)>> = Lazy::new(|| {
    let spaced = format!(
        r"(?i)^\s*(?P<title>[^\[\]()\n]+?)[\s._\-]+\(?(?P<year>\d{{4}})\)?[\s._\-]+{QUALITY}[\s\S]*?{SIZE}"
    );
    let dashed = format!(
        r"(?i)^\s*(?P<title>[^\n]+?)\s*-\s*(?P<year>\d{{4}})\s*-\s*{QUALITY}[\s\S]*?{SIZE}"
    );
    let parenthesized = format!(
        r"(?i)^\s*(?P<title>[^\n]+?)\s*\((?P<year>\d{{4}})\)[\s\S]*?{QUALITY}[\s\S]*?{SIZE}"
    );

    vec![
        (
            CaptionPattern::Spaced,
            Regex::new(&spaced).expect("spaced caption pattern"),
        ),
        (
            CaptionPattern::Dashed,
            Regex::new(&dashed).expect("dashed caption pattern"),
        ),
        (
            CaptionPattern::Parenthesized,
            Regex::new(&parenthesized).expect("parenthesized caption pattern"),
        ),
    ]
});

/// Maximal digit runs; only runs of exactly four digits are year candidates.
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit run pattern"));

static QUALITY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?i){QUALITY}")).expect("quality pattern"));

static SIZE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?i){SIZE}")).expect("size pattern"));

/// Extract catalog metadata from a caption, falling back to the filename.
///
/// The caption is tried first, then `fallback_file_name`, against every
/// full-caption pattern. If none match, the year, quality and size are searched
/// for independently in both the caption and the filename. The one that
/// recovered more fields supplies the title, the other fills in whatever it
/// still lacks, and anything found in neither gets a default.
///
/// The language is taken from the caption, or from the filename when the
/// caption names none.
pub fn extract(text: &str, fallback_file_name: Option<&str>) -> Extraction {
    let file_name = fallback_file_name
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let mut extraction = extract_metadata(text, file_name);
    extraction.language = detect_language(text).or_else(|| file_name.and_then(detect_language));
    extraction
}

fn extract_metadata(text: &str, file_name: Option<&str>) -> Extraction {
    let candidates = std::iter::once(text.trim())
        .filter(|t| !t.is_empty())
        .chain(file_name);

    for candidate in candidates {
        if let Some(extraction) = match_cascade(candidate) {
            return extraction;
        }
    }

    let caption = text.trim();
    let extraction = match (caption.is_empty(), file_name) {
        (true, name) => extract_fields(name.unwrap_or("")),
        (false, None) => extract_fields(caption),
        (false, Some(name)) => merge_fields(extract_fields(caption), extract_fields(name)),
    };

    EXTRACTION_FALLBACKS.inc();
    debug!(
        title = %extraction.title,
        defaulted = ?extraction.defaulted,
        "No caption pattern matched, used field fallback"
    );
    extraction
}

fn match_cascade(text: &str) -> Option<Extraction> {
    CASCADE.iter().find_map(|(pattern, regex)| {
        let caps = regex.captures(text)?;
        let year = plausible_year(&caps["year"])?;

        Some(Extraction {
            title: clean_title(&caps["title"]),
            year,
            quality: normalize_quality(&caps["quality"]),
            size_label: size_from(&caps),
            method: ExtractionMethod::Pattern(*pattern),
            defaulted: Vec::new(),
            language: None,
        })
    })
}

/// Combine the field fallbacks of a caption and its filename.
fn merge_fields(caption: Extraction, file_name: Extraction) -> Extraction {
    let (mut base, other) = if file_name.defaulted.len() < caption.defaulted.len() {
        (file_name, caption)
    } else {
        (caption, file_name)
    };

    for field in std::mem::take(&mut base.defaulted) {
        if other.is_defaulted(field) {
            base.defaulted.push(field);
            continue;
        }
        match field {
            Field::Year => base.year = other.year,
            Field::Quality => base.quality = other.quality.clone(),
            Field::Size => base.size_label = other.size_label.clone(),
        }
    }
    base
}

fn extract_fields(text: &str) -> Extraction {
    let mut defaulted = Vec::new();

    let year_match = DIGIT_RUN
        .find_iter(text)
        .filter(|m| m.len() == 4)
        .find_map(|m| plausible_year(m.as_str()).map(|year| (year, m.start())));

    let (year, title_span) = match year_match {
        Some((year, start)) => (year, &text[..start]),
        None => {
            defaulted.push(Field::Year);
            (default_year(), text)
        }
    };

    let quality = match QUALITY_TOKEN.captures(text) {
        Some(caps) => normalize_quality(&caps["quality"]),
        None => {
            defaulted.push(Field::Quality);
            DEFAULT_QUALITY.to_string()
        }
    };

    let size_label = match SIZE_TOKEN.captures(text) {
        Some(caps) => size_from(&caps),
        None => {
            defaulted.push(Field::Size);
            DEFAULT_SIZE_LABEL.to_string()
        }
    };

    Extraction {
        title: clean_title(title_span),
        year,
        quality,
        size_label,
        method: ExtractionMethod::Fallback,
        defaulted,
        language: None,
    }
}

fn plausible_year(digits: &str) -> Option<u16> {
    digits.parse::<u16>().ok().filter(|y| is_plausible_year(*y))
}

fn size_from(caps: &Captures<'_>) -> String {
    normalize_size(&caps["size"], &caps["unit"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{Language, UNKNOWN_TITLE};

    #[test]
    fn test_spaced_pattern_with_parenthesized_year() {
        let e = extract("Cars (2006) 480p BluRay x264 ESubs 1.45GB", None);
        assert_eq!(e.method, ExtractionMethod::Pattern(CaptionPattern::Spaced));
        assert_eq!(e.title, "Cars");
        assert_eq!(e.year, 2006);
        assert_eq!(e.quality, "480p");
        assert_eq!(e.size_label, "1.45 GB");
        assert!(!e.is_ambiguous());
    }

    #[test]
    fn test_spaced_pattern_with_dotted_filename() {
        let e = extract("The.Dark.Knight.2008.1080p.BluRay.x264 2.3 GB", None);
        assert_eq!(e.method, ExtractionMethod::Pattern(CaptionPattern::Spaced));
        assert_eq!(e.title, "The Dark Knight");
        assert_eq!(e.year, 2008);
        assert_eq!(e.quality, "1080p");
        assert_eq!(e.size_label, "2.3 GB");
    }

    #[test]
    fn test_dashed_pattern() {
        let e = extract("Interstellar (IMAX) - 2014 - 720p WEB 900 mb", None);
        assert_eq!(e.method, ExtractionMethod::Pattern(CaptionPattern::Dashed));
        assert_eq!(e.title, "Interstellar Imax");
        assert_eq!(e.year, 2014);
        assert_eq!(e.quality, "720p");
        assert_eq!(e.size_label, "900 MB");
    }

    #[test]
    fn test_parenthesized_pattern_with_noise_before_quality() {
        let e = extract("Avatar (2009) Hindi Dubbed Dual Audio 1080P [HEVC] 2.1GB", None);
        assert_eq!(
            e.method,
            ExtractionMethod::Pattern(CaptionPattern::Parenthesized)
        );
        assert_eq!(e.title, "Avatar");
        assert_eq!(e.year, 2009);
        assert_eq!(e.quality, "1080p");
        assert_eq!(e.size_label, "2.1 GB");
    }

    #[test]
    fn test_multiline_caption() {
        let caption = "Up (2009) 720p\nLanguage: English\nSize: 650 MB";
        let e = extract(caption, None);
        assert_eq!(e.title, "Up");
        assert_eq!(e.year, 2009);
        assert_eq!(e.size_label, "650 MB");
    }

    #[test]
    fn test_quality_is_case_insensitive() {
        let e = extract("Heat 1995 bluray 3.2gb", None);
        assert_eq!(e.quality, "BluRay");
        assert_eq!(e.size_label, "3.2 GB");
    }

    #[test]
    fn test_fallback_defaults_for_random_filename() {
        let e = extract("randomfile.mkv", None);
        assert_eq!(e.method, ExtractionMethod::Fallback);
        assert_eq!(e.quality, "720p");
        assert_eq!(e.size_label, "1.0 GB");
        assert_eq!(e.year, default_year());
        assert_eq!(e.title, "Randomfile");
        assert!(e.is_defaulted(Field::Year));
        assert!(e.is_defaulted(Field::Quality));
        assert!(e.is_defaulted(Field::Size));
    }

    #[test]
    fn test_fallback_title_is_text_before_year() {
        let e = extract("Oppenheimer_2023_[Org]_HQ.mp4", None);
        assert_eq!(e.method, ExtractionMethod::Fallback);
        assert_eq!(e.title, "Oppenheimer");
        assert_eq!(e.year, 2023);
        assert!(e.is_defaulted(Field::Quality));
    }

    #[test]
    fn test_resolution_is_not_taken_as_year() {
        let e = extract("Some.Show.2160p.WEB-DL.mkv", None);
        assert_eq!(e.year, default_year());
        assert!(e.is_defaulted(Field::Year));
        assert_eq!(e.quality, "2160p");
    }

    #[test]
    fn test_implausible_year_falls_through_cascade() {
        // 1080 can't be a release year, so the spaced pattern must not accept it
        let e = extract("Movie 1080 720p 1 GB", None);
        assert_eq!(e.method, ExtractionMethod::Fallback);
        assert_eq!(e.year, default_year());
    }

    #[test]
    fn test_blank_caption_uses_file_name() {
        let e = extract("   ", Some("Joker.2019.1080p.WEB-DL.2.4GB.mkv"));
        assert_eq!(e.title, "Joker");
        assert_eq!(e.year, 2019);
        assert_eq!(e.quality, "1080p");
        assert_eq!(e.size_label, "2.4 GB");
    }

    #[test]
    fn test_file_name_pattern_beats_caption_fallback() {
        let e = extract("New upload!", Some("Dune (2021) 2160p 5.5GB.mkv"));
        assert_eq!(e.title, "Dune");
        assert_eq!(e.year, 2021);
        assert_eq!(e.quality, "2160p");
    }

    #[test]
    fn test_year_after_number_in_title() {
        let e = extract("Blade.Runner.2049.2017.mkv", None);
        assert_eq!(e.method, ExtractionMethod::Fallback);
        assert_eq!(e.year, 2017);
        assert_eq!(e.title, "Blade Runner 2049");
    }

    #[test]
    fn test_adjacent_four_digit_runs_are_each_candidates() {
        let e = extract("Film 2049 2017", None);
        assert_eq!(e.year, 2017);
        assert_eq!(e.title, "Film 2049");

        let e = extract("Clip 12345 2020", None);
        assert_eq!(e.year, 2020);
        assert_eq!(e.title, "Clip 12345");
    }

    #[test]
    fn test_noise_caption_takes_fields_from_file_name() {
        let e = extract("Join @moviechannel for more", Some("Heat.1995.1080p.BluRay.mkv"));
        assert_eq!(e.method, ExtractionMethod::Fallback);
        assert_eq!(e.title, "Heat");
        assert_eq!(e.year, 1995);
        assert_eq!(e.quality, "1080p");
        assert_eq!(e.size_label, DEFAULT_SIZE_LABEL);
        assert_eq!(e.defaulted, vec![Field::Size]);
    }

    #[test]
    fn test_file_name_fills_fields_the_caption_lacks() {
        let e = extract("Heat 1995 BluRay", Some("heat_final_2.1GB.mkv"));
        assert_eq!(e.title, "Heat");
        assert_eq!(e.year, 1995);
        assert_eq!(e.quality, "BluRay");
        assert_eq!(e.size_label, "2.1 GB");
        assert!(!e.is_ambiguous());
    }

    #[test]
    fn test_language_from_caption_then_file_name() {
        let e = extract("Joker 2019 Hindi 1080p 2.4GB", Some("Joker.2019.ENG.mkv"));
        assert_eq!(e.language, Some(Language::Hindi));

        let e = extract("New upload!", Some("Vikram.2022.Tamil.720p.mkv"));
        assert_eq!(e.language, Some(Language::Tamil));

        assert_eq!(extract("Heat 1995 1080p 2 GB", None).language, None);
    }

    #[test]
    fn test_empty_everything_never_fails() {
        let e = extract("", None);
        assert_eq!(e.title, UNKNOWN_TITLE);
        assert_eq!(e.defaulted.len(), 3);
    }

    #[test]
    fn test_titles_never_carry_extensions_or_brackets() {
        let inputs = [
            "[HD] Movie.mkv",
            "Film (2001) [Tamil].mp4",
            "clip.avi",
            "[a][b][c]",
            "Title [2010] 720p 1GB",
        ];
        for input in inputs {
            let e = extract(input, None);
            assert!(!e.title.is_empty(), "empty title for {input}");
            for bad in [".mkv", ".mp4", ".avi", "[", "]"] {
                assert!(
                    !e.title.to_lowercase().contains(bad),
                    "{input} produced {}",
                    e.title
                );
            }
        }
    }
}
