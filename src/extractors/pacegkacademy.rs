//! PaceGKAcademy-style MCQ extractor.
//!
//! PaceGKAcademy renders each question as a `div.courses-item.content`:
//!
//! ```text
//! <div class="courses-item content">
//!   <div class="quizStatement"><a href="/mcq/70">Q.70 Question text</a></div>
//!   <div class="mcqOptions">
//!     <ol type="A">
//!       <li style="color: #21A7D0; font-weight: 600"><label>Correct option</label></li>
//!       <li><label>Wrong option</label></li>
//!     </ol>
//!   </div>
//! </div>
//! ```
//!
//! The correct option's `<li>` carries an inline style with the site's
//! accent color `#21A7D0`. The question anchor's href is the detail page,
//! resolved against the site base. Questions with more than four options go
//! through the shared overflow policy.

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::extractors::Site;
use crate::fetch::fetch_page;
use crate::models::{Mcq, Skip};
use crate::overflow::fold_options;
use crate::utils::{element_text, strip_question_number, truncate_for_log};

static CONTAINER_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.courses-item.content").unwrap());
static STATEMENT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.quizStatement").unwrap());
static ANCHOR_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static OPTIONS_DIV_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.mcqOptions").unwrap());
static OL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("ol").unwrap());
static LABEL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("label").unwrap());
static EXPLANATION_SELS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["div.explanation", "div.mcq-explanation"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static EXPLANATION_NOISE_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.ad, div.advertisement, ins.adsbygoogle, div.related-posts").unwrap()
});

/// Hex color (lowercased) that marks the correct option's inline style.
const CORRECT_STYLE_COLOR: &str = "#21a7d0";

/// Extract every well-formed MCQ from a parsed PaceGKAcademy listing page.
pub fn extract_mcqs(doc: &Html) -> Vec<Mcq> {
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for container in doc.select(&CONTAINER_SEL) {
        match extract_container(container) {
            Ok(mcq) => {
                debug!(
                    question = %truncate_for_log(&mcq.question_text, 60),
                    "Extracted PaceGKAcademy MCQ"
                );
                out.push(mcq);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "Skipping PaceGKAcademy container");
            }
        }
    }

    info!(
        extracted = out.len(),
        skipped,
        "PaceGKAcademy page extraction complete"
    );
    out
}

fn extract_container(container: ElementRef) -> Result<Mcq, Skip> {
    let statement = container
        .select(&STATEMENT_SEL)
        .next()
        .ok_or(Skip::MissingQuestion)?;

    // Prefer the anchor: it carries both the text and the detail link.
    let (raw_question, detail_url) = match statement.select(&ANCHOR_SEL).next() {
        Some(anchor) => {
            let detail = anchor.value().attr("href").and_then(|href| {
                Url::parse(Site::Pacegkacademy.base_url())
                    .ok()?
                    .join(href)
                    .ok()
                    .map(|u| u.to_string())
            });
            (element_text(anchor), detail)
        }
        None => (element_text(statement), None),
    };
    let question_text = strip_question_number(&raw_question);
    if question_text.is_empty() {
        return Err(Skip::MissingQuestion);
    }

    let options_div = container
        .select(&OPTIONS_DIV_SEL)
        .next()
        .ok_or(Skip::MissingOptions)?;
    let ol = options_div.select(&OL_SEL).next().ok_or(Skip::MissingOptions)?;

    let items: Vec<ElementRef> = ol
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "li")
        .collect();
    if items.len() < 4 {
        return Err(Skip::TooFewOptions(items.len()));
    }

    let options: Vec<String> = items.iter().map(|li| option_text(*li)).collect();

    let correct_idx = items
        .iter()
        .position(|li| {
            li.value()
                .attr("style")
                .map(|style| style.to_ascii_lowercase().contains(CORRECT_STYLE_COLOR))
                .unwrap_or(false)
        })
        .ok_or(Skip::NoCorrectSignal)?;

    let folded = fold_options(&options, correct_idx, None);

    Ok(Mcq {
        question_text,
        option_a: folded.option_a,
        option_b: folded.option_b,
        option_c: folded.option_c,
        option_d: folded.option_d,
        option_e: None,
        correct_answer: folded.correct_answer,
        explanation: folded.explanation,
        detail_url,
    })
}

/// Option text, preferring a nested `<label>` over the raw `<li>` text.
fn option_text(li: ElementRef) -> String {
    match li.select(&LABEL_SEL).next() {
        Some(label) => element_text(label),
        None => element_text(li),
    }
}

/// Scrape the explanation body from a PaceGKAcademy detail page.
///
/// Degrades to `None` on fetch failure or a missing explanation container.
pub async fn scrape_explanation(client: &Client, detail_url: &str) -> Option<String> {
    let body = match fetch_page(client, detail_url).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, url = %detail_url, "explanation fetch failed; continuing without");
            return None;
        }
    };

    let mut doc = Html::parse_document(&body);
    let explanation = explanation_from_doc(&mut doc);
    match &explanation {
        Some(text) => info!(chars = text.len(), url = %detail_url, "Scraped explanation"),
        None => debug!(url = %detail_url, "No explanation container on detail page"),
    }
    explanation
}

/// Extract the cleaned explanation from a parsed detail page.
///
/// Detaches advertisement and related-content subtrees, then converts the
/// remaining container markup to Markdown (ATX `#` headings).
fn explanation_from_doc(doc: &mut Html) -> Option<String> {
    let container_id = EXPLANATION_SELS
        .iter()
        .find_map(|sel| doc.select(sel).next())?
        .id();

    let noise_ids: Vec<_> = ElementRef::wrap(doc.tree.get(container_id)?)?
        .select(&EXPLANATION_NOISE_SEL)
        .map(|e| e.id())
        .collect();
    for id in noise_ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    let container = ElementRef::wrap(doc.tree.get(container_id)?)?;
    let markdown = html2md::parse_html(&container.html()).trim().to_string();
    if markdown.is_empty() {
        return None;
    }
    Some(markdown)
}
