//! Command-line interface definitions for MCQ Harvest.
//!
//! This module defines the CLI arguments and options using the `clap`
//! crate. Options can be provided via command-line flags or environment
//! variables.

use clap::Parser;

use crate::extractors::Site;

/// Command-line arguments for one crawl invocation.
///
/// # Examples
///
/// ```sh
/// # Crawl a TestPoint paper, unlimited pages
/// mcq_harvest -s testpoint -u https://testpoint.pk/paper-mcqs/5622/ppsc-all-mcqs-2025
///
/// # Crawl PakMCQs with a page cap and detail-page explanations
/// mcq_harvest -s pakmcqs -u https://pakmcqs.com/category/english-mcqs \
///     --max-pages 10 --scrape-explanations
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source site whose markup dialect to extract
    #[arg(short, long, value_enum)]
    pub site: Site,

    /// Listing page URL to start crawling from
    #[arg(short, long)]
    pub url: String,

    /// Maximum number of listing pages to crawl (unlimited when omitted)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Follow per-question detail links and scrape explanations
    #[arg(long, default_value_t = false)]
    pub scrape_explanations: bool,

    /// Output directory for the harvest JSON file
    #[arg(short, long, env = "MCQ_JSON_OUTPUT_DIR", default_value = "./json")]
    pub json_output_dir: String,
}
