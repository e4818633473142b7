//! # unscan
//!
//! Logical page-layout reconstruction from raw OCR and
//! handwriting-recognition output.
//!
//! The recognition layer supplies a hierarchy of physical regions
//! (scan, text region, line, word), each carrying only a pixel bounding
//! box and, for lines, a baseline polyline, recognized text and an
//! optional semantic label. This library recovers the logical structure:
//! it splits two-page scans, detects columns from pixel density, merges
//! spuriously overlapping regions, and cuts regions on vertical gaps and
//! incompatible labels. Content is strictly conserved throughout; no
//! line or word is ever created, duplicated or lost.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unscan::{parse_scan_json, reconstruct, LayoutConfig};
//!
//! fn main() -> unscan::Result<()> {
//!     let json = std::fs::read_to_string("scan.json").unwrap();
//!     let scan = parse_scan_json(&json)?;
//!
//!     let layout = reconstruct(&scan, &LayoutConfig::default())?;
//!     for page in &layout.pages {
//!         println!("{}: {} columns, {} lines", page.id, page.columns.len(), page.line_count());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two-page splitting**: assigns every region (and every line of a
//!   boundary-straddling region) to exactly one logical page
//! - **Column detection**: pixel-density histograms with a relaxation
//!   retry policy for hard-to-place lines
//! - **Overlap merging**: collapses transitively overlapping regions
//! - **Vertical-gap splitting**: region boundaries from spacing and
//!   semantic labels, with noise reattachment
//! - **Conservation checks**: line and word totals are verified after
//!   every step; violations fail the scan rather than corrupt its text
//! - **Parallel batches**: scans are processed independently with Rayon

pub mod config;
pub mod error;
pub mod geometry;
pub mod ingest;
pub mod layout;
pub mod model;
pub mod pipeline;

// Re-export commonly used types
pub use config::{ColumnGapConfig, LayoutConfig};
pub use error::{Error, Result};
pub use geometry::{BBox, Baseline, Point};
pub use ingest::{layout_to_json, parse_scan_json};
pub use layout::{
    candidate_column_ranges, detect_gaps, merge_overlapping, split_into_columns,
    split_on_vertical_gaps, split_pages, Gap,
};
pub use model::{
    Column, Layout, Line, LineClass, Page, RegionKind, RegionType, Scan, TextRegion, Word,
};
pub use pipeline::{reconstruct, reconstruct_batch};
