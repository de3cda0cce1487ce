//! Utility functions for text cleaning, logging, and file system checks.
//!
//! This module provides helpers used across the extractors and the
//! pipeline:
//! - Question-number prefix stripping for normalized question text
//! - Whitespace-normalized text collection from parsed elements
//! - String truncation for logging
//! - File system validation for the output directory

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Matches leading question-number tokens like `Q.12`, `Q12:`, `Q 7)`.
static QUESTION_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[Qq]\.?\s*\d+[.:)\s]*").unwrap());

/// Strip a leading question-number token from question text.
///
/// Listing pages number their questions (`Q.70 Which ...`); the normalized
/// record keeps only the question itself.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_question_number("Q.12 Capital of France?"), "Capital of France?");
/// assert_eq!(strip_question_number("Q12: Capital of France?"), "Capital of France?");
/// assert_eq!(strip_question_number("Capital of France?"), "Capital of France?");
/// ```
pub fn strip_question_number(text: &str) -> String {
    QUESTION_NUMBER_RE.replace(text.trim(), "").trim().to_string()
}

/// Collect the text content of an element, whitespace-trimmed.
///
/// Each text fragment is trimmed, empty fragments are dropped, and the
/// remainder is joined with single spaces. Entity decoding already happened
/// at parse time, so `&amp;` in the markup arrives here as `&`.
pub fn element_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte
/// count indicator appended. Used for question-text previews in skip and
/// progress logs.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_strip_question_number_dot_form() {
        assert_eq!(
            strip_question_number("Q.12 Capital of France?"),
            "Capital of France?"
        );
        assert_eq!(strip_question_number("Q.70Who wrote it?"), "Who wrote it?");
    }

    #[test]
    fn test_strip_question_number_colon_and_paren_forms() {
        assert_eq!(
            strip_question_number("Q12: Capital of France?"),
            "Capital of France?"
        );
        assert_eq!(
            strip_question_number("Q 7) Capital of France?"),
            "Capital of France?"
        );
    }

    #[test]
    fn test_strip_question_number_no_prefix() {
        assert_eq!(
            strip_question_number("  Capital of France?  "),
            "Capital of France?"
        );
        // A bare "Question" word is not a number token
        assert_eq!(
            strip_question_number("Quetta is the capital of?"),
            "Quetta is the capital of?"
        );
    }

    #[test]
    fn test_element_text_trims_and_joins() {
        let html = Html::parse_fragment("<li>  HTML &amp; CSS\n  </li>");
        let sel = Selector::parse("li").unwrap();
        let li = html.select(&sel).next().unwrap();
        assert_eq!(element_text(li), "HTML & CSS");
    }

    #[test]
    fn test_element_text_nested_fragments() {
        let html = Html::parse_fragment("<li><span>A.</span> <b>Karachi</b></li>");
        let sel = Selector::parse("li").unwrap();
        let li = html.select(&sel).next().unwrap();
        assert_eq!(element_text(li), "A. Karachi");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dir() {
        let dir = std::env::temp_dir().join("mcq_harvest_probe_test");
        let path = dir.to_str().unwrap().to_string();
        let _ = stdfs::remove_dir_all(&dir);
        assert!(ensure_writable_dir(&path).await.is_ok());
        assert!(dir.is_dir());
        let _ = stdfs::remove_dir_all(&dir);
    }
}
