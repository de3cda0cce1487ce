//! Data models for normalized MCQ records and crawl output.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Mcq`]: one normalized multiple-choice question record
//! - [`AnswerOption`]: the closed set of correct-answer designations
//! - [`Skip`]: the reason a source container was not emitted as a record
//! - [`Harvest`]: the full output of one crawl, handed to the JSON writer
//!
//! Every emitted [`Mcq`] carries at least four options and exactly one
//! correct-answer designation. A container without a determinable correct
//! answer is skipped, never emitted with a guessed value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The correct-answer designation of an [`Mcq`].
///
/// Serialized as `option_a`..`option_e` to match the record field names.
/// `OptionE` only occurs for the one source variant that yields a genuine
/// fifth option; the overflow policy never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOption {
    OptionA,
    OptionB,
    OptionC,
    OptionD,
    OptionE,
}

impl AnswerOption {
    /// Map a zero-based option index to its letter designation.
    ///
    /// Indexes past `E` have no addressable letter in the fixed schema and
    /// return `None`; the overflow policy handles those separately.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::OptionA),
            1 => Some(Self::OptionB),
            2 => Some(Self::OptionC),
            3 => Some(Self::OptionD),
            4 => Some(Self::OptionE),
            _ => None,
        }
    }

    /// The option letter, e.g. `'A'` for `OptionA`.
    pub fn letter(&self) -> char {
        match self {
            Self::OptionA => 'A',
            Self::OptionB => 'B',
            Self::OptionC => 'C',
            Self::OptionD => 'D',
            Self::OptionE => 'E',
        }
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option_{}", self.letter().to_ascii_lowercase())
    }
}

/// A normalized multiple-choice question record.
///
/// This is the canonical output unit of every site extractor. The question
/// text is entity-decoded with leading question-number prefixes (`Q.12`,
/// `Q12:`) stripped. Options beyond the fourth are never silently dropped:
/// they either land in `option_e` (PakMCQs) or are folded into the
/// explanation by the overflow policy (see [`crate::overflow`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mcq {
    /// The question text, cleaned and entity-decoded.
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// A genuine fifth option; only the PakMCQs variant produces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_e: Option<String>,
    /// Exactly one correct-answer designation; never absent.
    pub correct_answer: AnswerOption,
    /// Markdown-formatted explanation, when one could be scraped or the
    /// overflow policy appended an additional-options block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Absolute URL of the source detail page, used as the
    /// explanation-scraping key and for provenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

impl Mcq {
    /// The text of the option designated correct.
    pub fn correct_text(&self) -> &str {
        match self.correct_answer {
            AnswerOption::OptionA => &self.option_a,
            AnswerOption::OptionB => &self.option_b,
            AnswerOption::OptionC => &self.option_c,
            AnswerOption::OptionD => &self.option_d,
            AnswerOption::OptionE => self.option_e.as_deref().unwrap_or(""),
        }
    }
}

/// Why a source container was skipped instead of emitted.
///
/// Skips are logged and counted per page; they never abort extraction of
/// the remaining containers. Making the reason an explicit value (rather
/// than catch-and-continue control flow) keeps the per-container isolation
/// guarantee visible in the extractor signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The designated question element could not be located.
    MissingQuestion,
    /// Question text was present but too short to be a real question.
    QuestionTooShort,
    /// The designated option list structure could not be located.
    MissingOptions,
    /// Fewer than four options were found.
    TooFewOptions(usize),
    /// No correct-option signal (class, style, or bold markup) was found.
    NoCorrectSignal,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::MissingQuestion => write!(f, "question text not found"),
            Skip::QuestionTooShort => write!(f, "question text too short"),
            Skip::MissingOptions => write!(f, "option list not found"),
            Skip::TooFewOptions(n) => write!(f, "only {n} options found (need 4)"),
            Skip::NoCorrectSignal => write!(f, "no correct-answer signal"),
        }
    }
}

/// The complete output of one crawl invocation.
///
/// Built once per run and written as a single JSON document; the records
/// have no further lifecycle inside this crate.
#[derive(Debug, Serialize, Deserialize)]
pub struct Harvest {
    /// The source site tag, e.g. `"testpoint"`.
    pub site: String,
    /// The listing URL the crawl started from.
    pub start_url: String,
    /// The date of the crawl in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time the crawl finished.
    pub local_time: String,
    /// How many listing pages the pagination walk discovered.
    pub pages_crawled: usize,
    /// The normalized records, in page-then-container order.
    pub mcqs: Vec<Mcq>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mcq() -> Mcq {
        Mcq {
            question_text: "Capital of Pakistan?".to_string(),
            option_a: "Karachi".to_string(),
            option_b: "Lahore".to_string(),
            option_c: "Islamabad".to_string(),
            option_d: "Peshawar".to_string(),
            option_e: None,
            correct_answer: AnswerOption::OptionC,
            explanation: None,
            detail_url: None,
        }
    }

    #[test]
    fn test_answer_option_serializes_snake_case() {
        let json = serde_json::to_string(&AnswerOption::OptionB).unwrap();
        assert_eq!(json, "\"option_b\"");
        let back: AnswerOption = serde_json::from_str("\"option_e\"").unwrap();
        assert_eq!(back, AnswerOption::OptionE);
    }

    #[test]
    fn test_answer_option_from_index() {
        assert_eq!(AnswerOption::from_index(0), Some(AnswerOption::OptionA));
        assert_eq!(AnswerOption::from_index(3), Some(AnswerOption::OptionD));
        assert_eq!(AnswerOption::from_index(4), Some(AnswerOption::OptionE));
        assert_eq!(AnswerOption::from_index(5), None);
    }

    #[test]
    fn test_answer_option_display() {
        assert_eq!(AnswerOption::OptionA.to_string(), "option_a");
        assert_eq!(AnswerOption::OptionD.letter(), 'D');
    }

    #[test]
    fn test_mcq_correct_text() {
        let mcq = sample_mcq();
        assert_eq!(mcq.correct_text(), "Islamabad");

        let mut with_e = sample_mcq();
        with_e.option_e = Some("Quetta".to_string());
        with_e.correct_answer = AnswerOption::OptionE;
        assert_eq!(with_e.correct_text(), "Quetta");
    }

    #[test]
    fn test_mcq_serialization_omits_absent_fields() {
        let json = serde_json::to_string(&sample_mcq()).unwrap();
        assert!(json.contains("\"correct_answer\":\"option_c\""));
        assert!(!json.contains("option_e"));
        assert!(!json.contains("explanation"));
        assert!(!json.contains("detail_url"));
    }

    #[test]
    fn test_mcq_roundtrip() {
        let mut mcq = sample_mcq();
        mcq.explanation = Some("**Correct Answer:** Islamabad".to_string());
        mcq.detail_url = Some("https://example.com/q/1".to_string());
        let json = serde_json::to_string(&mcq).unwrap();
        let back: Mcq = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mcq);
    }

    #[test]
    fn test_skip_display() {
        assert_eq!(
            Skip::TooFewOptions(2).to_string(),
            "only 2 options found (need 4)"
        );
        assert_eq!(Skip::NoCorrectSignal.to_string(), "no correct-answer signal");
    }

    #[test]
    fn test_harvest_serialization() {
        let harvest = Harvest {
            site: "testpoint".to_string(),
            start_url: "https://testpoint.pk/paper-mcqs/5622".to_string(),
            local_date: "2025-05-06".to_string(),
            local_time: "20:30:00".to_string(),
            pages_crawled: 3,
            mcqs: vec![sample_mcq()],
        };
        let json = serde_json::to_string(&harvest).unwrap();
        assert!(json.contains("\"pages_crawled\":3"));
        assert!(json.contains("Islamabad"));
    }
}
