//! Caption metadata extraction.
//!
//! Turns the free-form caption (or filename) an uploader attached to a file into
//! `{title, year, quality, size}`, plus the audio language when one is named.
//! Uploaders do not agree on a format, so the extractor tries a short cascade
//! of full-caption patterns and, when none of them fits, pulls each field out
//! independently and fills the gaps with fixed defaults. Extraction never
//! fails.

mod language;
mod parser;
mod size;
mod title;
mod types;

pub use language::{detect_language, Language};
pub use parser::extract;
pub use size::{format_size, normalize_size};
pub use title::clean_title;
pub use types::*;
