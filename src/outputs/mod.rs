//! Output generation for harvested records.
//!
//! The crate's persistence boundary: extracted records are handed off here
//! as one [`Harvest`](crate::models::Harvest) per crawl. Identity
//! assignment and category association happen downstream, outside this
//! crate.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── testpoint.json
//!     └── pakmcqs.json
//! ```

pub mod json;
