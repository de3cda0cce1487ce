//! JSON output for harvested MCQ records.
//!
//! Serializes one [`Harvest`] per crawl into a date-based directory
//! structure: `{json_output_dir}/{date}/{site}.json`. Re-running a crawl
//! for the same site on the same day overwrites the previous file.

use crate::models::Harvest;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`Harvest`] to a JSON file under a date directory.
///
/// Creates the directory if needed; the file name is the site tag.
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing
/// fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_harvest(
    harvest: &Harvest,
    json_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string(harvest)?;

    let full_json_dir = format!("{}/{}", json_output_dir, harvest.local_date);
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{}/{}.json", full_json_dir, harvest.site);
    info!(path = %output_json_filename, records = harvest.mcqs.len(), "Writing JSON");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, "Wrote harvest JSON file");

    Ok(output_json_filename)
}
