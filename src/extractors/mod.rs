//! Per-site MCQ extractors for the supported listing sites.
//!
//! Each submodule handles one site's markup dialect. All of them share the
//! same contract: locate question containers on a parsed listing page,
//! extract text and options, determine the correct option, and normalize
//! into the fixed [`Mcq`](crate::models::Mcq) schema.
//!
//! # Supported Sites
//!
//! | Site | Module | Correct-answer signal | Detail pages |
//! |------|--------|----------------------|--------------|
//! | TestPoint | [`testpoint`] | CSS class (`correct`/`right`/`answer`) | no (inline explanations) |
//! | PakMCQs | [`pakmcqs`] | bold markup (`<strong>`/`<b>`) | yes |
//! | PaceGKAcademy | [`pacegkacademy`] | inline style color `#21A7D0` | yes |
//!
//! # Common Patterns
//!
//! Extractors expose:
//! - `extract_mcqs(&Html) -> Vec<Mcq>`: per-page extraction; malformed
//!   containers are logged and skipped, never raised
//! - `scrape_explanation(client, url)` (two variants): detail-page
//!   explanation scraping that degrades to `None` on any failure
//!
//! The set of sites is closed: dispatch is a tagged [`Site`] match, and
//! supporting a new markup dialect means writing a new extractor module.

use clap::ValueEnum;
use reqwest::Client;
use scraper::Html;
use std::fmt;
use tracing::{info, instrument};

use crate::models::Mcq;

pub mod pacegkacademy;
pub mod pakmcqs;
pub mod testpoint;

/// Identifies which site's markup dialect a crawl targets.
///
/// Supplied by the caller and used to select the extractor, the pagination
/// selectors, and the explanation scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Site {
    Testpoint,
    Pakmcqs,
    Pacegkacademy,
}

impl Site {
    /// Short tag used in logs and output file names.
    pub fn tag(&self) -> &'static str {
        match self {
            Site::Testpoint => "testpoint",
            Site::Pakmcqs => "pakmcqs",
            Site::Pacegkacademy => "pacegkacademy",
        }
    }

    /// Canonical base URL used to resolve per-question detail links.
    pub fn base_url(&self) -> &'static str {
        match self {
            Site::Testpoint => "https://testpoint.pk",
            Site::Pakmcqs => "https://pakmcqs.com",
            Site::Pacegkacademy => "https://www.pacegkacademy.com",
        }
    }

    /// CSS selector candidates for the "next page" link, in priority order.
    pub fn next_page_selectors(&self) -> &'static [&'static str] {
        match self {
            Site::Testpoint => &[r#"ul.pagination a.page-link[rel="next"]"#],
            Site::Pakmcqs => &["a.next", "a.page-numbers.next"],
            Site::Pacegkacademy => &["a.next", "a.page-numbers.next", r#"a[rel="next"]"#],
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Extract every well-formed MCQ from one parsed listing page.
///
/// Dispatches to the site's extractor. Containers that fail extraction are
/// skipped with a logged reason; the page's remaining containers are still
/// processed.
pub fn extract_mcqs(site: Site, doc: &Html) -> Vec<Mcq> {
    match site {
        Site::Testpoint => testpoint::extract_mcqs(doc),
        Site::Pakmcqs => pakmcqs::extract_mcqs(doc),
        Site::Pacegkacademy => pacegkacademy::extract_mcqs(doc),
    }
}

/// Fetch and attach detail-page explanations to extracted records.
///
/// Visits one detail URL at a time, in record order. A record without a
/// detail URL is left untouched; a failed scrape leaves the record's
/// existing explanation in place. Scraped text is merged in front of any
/// explanation the listing page already produced (such as the overflow
/// policy's additional-options block), separated by `---`.
#[instrument(level = "info", skip_all, fields(site = %site, records = records.len()))]
pub async fn scrape_explanations(client: &Client, site: Site, records: &mut [Mcq]) {
    // TestPoint explanations are inline on the listing page.
    if site == Site::Testpoint {
        return;
    }

    let mut scraped_count = 0usize;
    for record in records.iter_mut() {
        let Some(detail_url) = record.detail_url.clone() else {
            continue;
        };

        let scraped = match site {
            Site::Pakmcqs => pakmcqs::scrape_explanation(client, &detail_url).await,
            Site::Pacegkacademy => pacegkacademy::scrape_explanation(client, &detail_url).await,
            Site::Testpoint => None,
        };

        if let Some(text) = scraped {
            scraped_count += 1;
            record.explanation = merge_explanation(text, record.explanation.take());
        }
    }

    info!(scraped = scraped_count, "Attached detail-page explanations");
}

/// Merge a scraped explanation with whatever the listing page produced.
///
/// The scraped body comes first so the overflow policy's additional-options
/// block stays at the end of the record's explanation.
fn merge_explanation(scraped: String, existing: Option<String>) -> Option<String> {
    match existing {
        Some(existing) => Some(format!("{scraped}\n\n---\n{existing}")),
        None => Some(scraped),
    }
}
