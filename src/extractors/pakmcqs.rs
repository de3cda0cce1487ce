//! PakMCQs-style MCQ extractor.
//!
//! PakMCQs renders each question as an `<article>`:
//!
//! ```text
//! <article>
//!   <h2 class="post-title"><a>Question text?</a></h2>
//!   <div class="excerpt">
//!     <p>A. Option A<br/>
//!     <strong>B. Correct Option</strong><br/>
//!     C. Option C<br/>
//!     D. Option D</p>
//!     <a href="..." class="read-more-link">Read More Details about this Mcq:</a>
//!   </div>
//! </article>
//! ```
//!
//! Options live in a single paragraph split on `<br>` markers, each line
//! prefixed with its letter (`A.` .. `E.`); bold markup wrapping a line
//! marks it correct. This is the one variant that yields a genuine fifth
//! option, stored in `option_e`. Detail pages host fuller explanations
//! scraped by [`scrape_explanation`].

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::extractors::Site;
use crate::fetch::fetch_page;
use crate::models::{AnswerOption, Mcq, Skip};
use crate::utils::{element_text, strip_question_number, truncate_for_log};

static ARTICLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static TITLE_SELS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h2.post-title a", "h2 a", "h2"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static EXCERPT_SELS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["div.excerpt", "div.content"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static P_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static READ_MORE_SELS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["a.read-more-link", r#"a[href*="pakmcqs.com"]"#]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static POST_CONTENT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.post-content").unwrap());
static NOISE_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.a-wrap, ins.adsbygoogle, script, div.yarpp, div.correct-answer").unwrap()
});

/// Matches an option line: `A. text` or `a) text`.
static OPTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i)([A-E])[.)]\s*(.+)$").unwrap());
/// Matches a detail-page paragraph that merely restates the options.
static OPTION_PARA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-E]\.").unwrap());

/// Extract every well-formed MCQ from a parsed PakMCQs listing page.
pub fn extract_mcqs(doc: &Html) -> Vec<Mcq> {
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for article in doc.select(&ARTICLE_SEL) {
        match extract_article(article) {
            Ok(mcq) => {
                debug!(
                    question = %truncate_for_log(&mcq.question_text, 60),
                    "Extracted PakMCQs MCQ"
                );
                out.push(mcq);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "Skipping PakMCQs article");
            }
        }
    }

    info!(extracted = out.len(), skipped, "PakMCQs page extraction complete");
    out
}

fn extract_article(article: ElementRef) -> Result<Mcq, Skip> {
    let title = TITLE_SELS
        .iter()
        .find_map(|sel| article.select(sel).next())
        .ok_or(Skip::MissingQuestion)?;
    let question_text = strip_question_number(&element_text(title));
    if question_text.chars().count() < 5 {
        return Err(Skip::QuestionTooShort);
    }

    let excerpt = EXCERPT_SELS
        .iter()
        .find_map(|sel| article.select(sel).next())
        .ok_or(Skip::MissingOptions)?;
    let options_p = excerpt.select(&P_SEL).next().ok_or(Skip::MissingOptions)?;

    let mut options: [Option<String>; 5] = [None, None, None, None, None];
    let mut correct_answer: Option<AnswerOption> = None;

    for (line, is_bold) in option_lines(options_p) {
        let Some(caps) = OPTION_RE.captures(line.trim()) else {
            continue;
        };
        let letter = caps[1].as_bytes()[0].to_ascii_uppercase();
        let idx = (letter - b'A') as usize;

        options[idx] = Some(caps[2].trim().to_string());
        if is_bold {
            correct_answer = AnswerOption::from_index(idx);
        }
    }

    let found = options.iter().filter(|o| o.is_some()).count();
    let [a, b, c, d, e] = options;
    let (Some(option_a), Some(option_b), Some(option_c), Some(option_d)) = (a, b, c, d) else {
        return Err(Skip::TooFewOptions(found));
    };
    let correct_answer = correct_answer.ok_or(Skip::NoCorrectSignal)?;

    let detail_url = READ_MORE_SELS
        .iter()
        .find_map(|sel| article.select(sel).next())
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| {
            Url::parse(Site::Pakmcqs.base_url())
                .ok()?
                .join(href)
                .ok()
                .map(|u| u.to_string())
        });

    Ok(Mcq {
        question_text,
        option_a,
        option_b,
        option_c,
        option_d,
        option_e: e,
        correct_answer,
        explanation: None,
        detail_url,
    })
}

/// Split the option paragraph into its `<br>`-separated lines.
///
/// Returns each line's text alongside whether bold markup wrapped it.
/// `<br>` breaks a line at any nesting depth, so bold markup spanning a
/// break (`<strong>A. one<br>B. two</strong>`) still yields two lines.
/// Working on the parsed node tree (instead of the raw HTML) means entity
/// decoding has already happened.
fn option_lines(p: ElementRef) -> Vec<(String, bool)> {
    let mut lines: Vec<(String, bool)> = vec![(String::new(), false)];
    collect_lines(p, false, &mut lines);
    lines.retain(|(text, _)| !text.trim().is_empty());
    lines
}

fn collect_lines(el: ElementRef, in_bold: bool, lines: &mut Vec<(String, bool)>) {
    for node in el.children() {
        match node.value() {
            Node::Element(child_el) if child_el.name() == "br" => {
                lines.push((String::new(), false));
            }
            Node::Element(child_el) => {
                if let Some(child) = ElementRef::wrap(node) {
                    let bold = in_bold || matches!(child_el.name(), "strong" | "b");
                    collect_lines(child, bold, lines);
                }
            }
            Node::Text(t) => {
                let last = lines.last_mut().unwrap();
                last.0.push_str(&t.text);
                if in_bold && !t.text.trim().is_empty() {
                    last.1 = true;
                }
            }
            _ => {}
        }
    }
}

/// Scrape the explanation body from a PakMCQs detail page.
///
/// Degrades to `None` on fetch failure, missing containers, or when fewer
/// than two candidate paragraphs remain; none of these abort the parent
/// extraction.
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
        None => debug!(url = %detail_url, "No usable explanation on detail page"),
    }
    explanation
}

/// Extract the cleaned explanation from a parsed detail page.
///
/// Detaches advertisement, related-content, script, and correct-answer
/// confirmation subtrees, then collects every paragraph after the first
/// that is neither a `Submitted by:` line nor an option restatement,
/// converting each to Markdown.
fn explanation_from_doc(doc: &mut Html) -> Option<String> {
    let post_content_id = doc
        .select(&ARTICLE_SEL)
        .next()?
        .select(&POST_CONTENT_SEL)
        .next()?
        .id();

    let noise_ids: Vec<_> = ElementRef::wrap(doc.tree.get(post_content_id)?)?
        .select(&NOISE_SEL)
        .map(|e| e.id())
        .collect();
    for id in noise_ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    let post_content = ElementRef::wrap(doc.tree.get(post_content_id)?)?;
    let paragraphs: Vec<ElementRef> = post_content.select(&P_SEL).collect();
    if paragraphs.len() < 2 {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for (i, p) in paragraphs.iter().enumerate() {
        // The first paragraph restates the options.
        if i == 0 {
            continue;
        }
        let text = element_text(*p);
        if text.is_empty() {
            continue;
        }
        if text.to_lowercase().contains("submitted by:") {
            continue;
        }
        if OPTION_PARA_RE.is_match(&text) {
            continue;
        }
        parts.push(html2md::parse_html(&p.html()).trim().to_string());
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("\n\n").trim().to_string())
}
