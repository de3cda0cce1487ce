//! TestPoint-style MCQ extractor.
//!
//! TestPoint listing pages render each question as a direct `<div>` child
//! of `#content`: an `<h5>` holding the question link, an ordered list
//! `<ol type="A">` of options, and optionally an inline
//! `div.question-explanation`. The correct option's `<li>` carries a CSS
//! class from a small fixed set (`correct`, `right`, `answer`).
//!
//! Explanations live on the listing page itself, so this variant never
//! follows detail links. Questions with more than four options go through
//! the shared overflow policy.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::models::{Mcq, Skip};
use crate::overflow::fold_options;
use crate::utils::{element_text, strip_question_number, truncate_for_log};

static BLOCK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("#content > div").unwrap());
static QUESTION_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h5 a.theme-color").unwrap());
static OPTIONS_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"ol[type="A"]"#).unwrap());
static EXPLANATION_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.question-explanation").unwrap());

/// Classes that mark the correct `<li>`, compared case-insensitively.
const CORRECT_CLASSES: [&str; 3] = ["correct", "right", "answer"];

/// Extract every well-formed MCQ from a parsed TestPoint listing page.
pub fn extract_mcqs(doc: &Html) -> Vec<Mcq> {
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for block in doc.select(&BLOCK_SEL) {
        match extract_block(block) {
            Ok(mcq) => {
                debug!(
                    question = %truncate_for_log(&mcq.question_text, 60),
                    "Extracted TestPoint MCQ"
                );
                out.push(mcq);
            }
            Err(Skip::MissingQuestion) => {
                // Ad and navigation divs sit between question blocks.
                skipped += 1;
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "Skipping TestPoint container");
            }
        }
    }

    info!(extracted = out.len(), skipped, "TestPoint page extraction complete");
    out
}

fn extract_block(block: ElementRef) -> Result<Mcq, Skip> {
    let question = block
        .select(&QUESTION_SEL)
        .next()
        .ok_or(Skip::MissingQuestion)?;
    let question_text = strip_question_number(&element_text(question));

    let ol = block.select(&OPTIONS_SEL).next().ok_or(Skip::MissingOptions)?;
    let items: Vec<ElementRef> = ol
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "li")
        .collect();
    if items.len() < 4 {
        return Err(Skip::TooFewOptions(items.len()));
    }

    let options: Vec<String> = items.iter().map(|li| element_text(*li)).collect();

    let correct_idx = items
        .iter()
        .position(|li| {
            li.value()
                .classes()
                .any(|c| CORRECT_CLASSES.contains(&c.to_ascii_lowercase().as_str()))
        })
        .ok_or(Skip::NoCorrectSignal)?;

    let explanation = block
        .select(&EXPLANATION_SEL)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let folded = fold_options(&options, correct_idx, explanation);

    Ok(Mcq {
        question_text,
        option_a: folded.option_a,
        option_b: folded.option_b,
        option_c: folded.option_c,
        option_d: folded.option_d,
        option_e: None,
        correct_answer: folded.correct_answer,
        explanation: folded.explanation,
        detail_url: None,
    })
}
