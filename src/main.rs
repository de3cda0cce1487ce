//! # MCQ Harvest
//!
//! A crawler that walks paginated MCQ listing sites and normalizes their
//! heterogeneous question markup into one fixed record schema.
//!
//! ## Features
//!
//! - Three per-site extractors (TestPoint, PakMCQs, PaceGKAcademy), each
//!   decoding its own correct-answer signal (CSS class, bold markup,
//!   inline style color)
//! - Pagination walking with cycle guard and optional page cap
//! - Optional detail-page explanation scraping, converted to Markdown
//! - An overflow policy that folds more-than-four options into the fixed
//!   A-D schema without losing the true answer text
//!
//! ## Usage
//!
//! ```sh
//! mcq_harvest -s testpoint -u https://testpoint.pk/paper-mcqs/5622/ppsc-all-mcqs-2025
//! ```
//!
//! ## Architecture
//!
//! The pipeline runs strictly sequentially, one fetch at a time:
//! 1. **Pagination**: walk next-page links to build the list of page URLs
//! 2. **Extraction**: re-fetch each page and extract normalized records
//! 3. **Explanations**: optionally visit detail pages, one at a time
//! 4. **Output**: write the harvest as a JSON file

use chrono::Local;
use clap::Parser;
use scraper::Html;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod extractors;
mod fetch;
mod models;
mod outputs;
mod overflow;
mod pagination;
mod utils;

use cli::Cli;
use fetch::fetch_page;
use models::Harvest;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("mcq_harvest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.site, ?args.url, ?args.max_pages, args.scrape_explanations, "Parsed CLI arguments");

    // Early check: ensure JSON output dir is writable
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let client = fetch::build_client()?;

    // ---- Pagination walk ----
    let pages = pagination::crawl_pages(&client, args.site, &args.url, args.max_pages).await?;
    info!(count = pages.len(), site = %args.site, "Listing pages discovered");

    // ---- Extraction, one page at a time ----
    let mut mcqs = Vec::new();
    let mut failed_pages = 0usize;
    for page_url in &pages {
        let body = match fetch_page(&client, page_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %page_url, error = %e, "failed to fetch listing page; skipping");
                failed_pages += 1;
                continue;
            }
        };
        let records = {
            let doc = Html::parse_document(&body);
            extractors::extract_mcqs(args.site, &doc)
        };
        info!(url = %page_url, count = records.len(), "Extracted MCQs on page");
        mcqs.extend(records);
    }
    info!(
        total = mcqs.len(),
        pages = pages.len(),
        failed_pages,
        "Extraction complete"
    );

    // ---- Detail-page explanations (optional) ----
    if args.scrape_explanations {
        extractors::scrape_explanations(&client, args.site, &mut mcqs).await;
    }

    // ---- Write harvest ----
    let harvest = Harvest {
        site: args.site.tag().to_string(),
        start_url: args.url.clone(),
        local_date: Local::now().date_naive().to_string(),
        local_time: Local::now().time().to_string(),
        pages_crawled: pages.len(),
        mcqs,
    };
    let written_path = outputs::json::write_harvest(&harvest, &args.json_output_dir).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        records = harvest.mcqs.len(),
        path = %written_path,
        "Execution complete"
    );

    Ok(())
}
