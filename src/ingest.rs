//! Ingestion of the recognition layer's serialized page tree.
//!
//! The recognition layer hands over a hierarchy of nodes carrying an id,
//! type tags, a bounding polygon, and for lines a baseline polyline plus
//! the recognized text. This module turns that tree into the typed model,
//! computing axis-aligned envelopes from the polygons. A line's semantic
//! label arrives as metadata key `line_class`; unrecognized values map to
//! [`LineClass::Unknown`].

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geometry::{BBox, Baseline, Point};
use crate::model::{Layout, Line, LineClass, RegionType, Scan, TextRegion, Word};

/// Metadata key carrying the classifier label.
const LINE_CLASS_KEY: &str = "line_class";

/// A serialized scan as produced by the recognition layer.
#[derive(Debug, Clone, Deserialize)]
pub struct RawScan {
    /// Scan identifier
    pub id: String,
    /// Bounding polygon of the scan
    pub coords: Vec<Point>,
    /// Top-level text regions
    #[serde(default)]
    pub regions: Vec<RawRegion>,
}

/// A serialized text region.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRegion {
    /// Region identifier (replaced by a derived id on ingest)
    #[serde(default)]
    pub id: String,
    /// Semantic type tags
    #[serde(default)]
    pub types: Vec<String>,
    /// Recognized lines
    #[serde(default)]
    pub lines: Vec<RawLine>,
}

/// A serialized line.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLine {
    /// Line identifier (replaced by a derived id on ingest)
    #[serde(default)]
    pub id: String,
    /// Bounding polygon
    pub coords: Vec<Point>,
    /// Baseline polyline
    #[serde(default)]
    pub baseline: Option<Vec<Point>>,
    /// Recognized text
    #[serde(default)]
    pub text: Option<String>,
    /// Free-form metadata; `line_class` is consumed here
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Recognized words
    #[serde(default)]
    pub words: Vec<RawWord>,
}

/// A serialized word.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWord {
    /// Bounding polygon
    pub coords: Vec<Point>,
    /// Recognized text
    #[serde(default)]
    pub text: Option<String>,
}

/// Parse a serialized scan tree from JSON.
pub fn parse_scan_json(json: &str) -> Result<Scan> {
    let raw: RawScan = serde_json::from_str(json)?;
    scan_from_raw(raw)
}

/// Serialize a reconstructed layout for downstream consumers.
pub fn layout_to_json(layout: &Layout) -> Result<String> {
    Ok(serde_json::to_string_pretty(layout)?)
}

/// Convert a deserialized raw scan into the typed model.
pub fn scan_from_raw(raw: RawScan) -> Result<Scan> {
    let bbox = envelope(&raw.coords, &raw.id)?;
    let mut scan = Scan::new(raw.id, bbox);
    for region in raw.regions {
        scan.add_region(region_from_raw(region)?);
    }
    Ok(scan)
}

fn region_from_raw(raw: RawRegion) -> Result<TextRegion> {
    let mut lines = Vec::with_capacity(raw.lines.len());
    for line in raw.lines {
        lines.push(line_from_raw(line)?);
    }

    let mut region = TextRegion::from_lines("raw", lines);
    for tag in &raw.types {
        match RegionType::from_tag(tag) {
            Some(region_type) => {
                region.types.insert(region_type);
            }
            None => log::warn!("ignoring unknown type tag '{tag}' on region {}", raw.id),
        }
    }
    Ok(region)
}

fn line_from_raw(raw: RawLine) -> Result<Line> {
    let bbox = envelope(&raw.coords, &raw.id)?;
    let mut line = Line::new("raw", bbox);

    if let Some(points) = raw.baseline {
        if !points.is_empty() {
            line.baseline = Some(Baseline::new(points));
        }
    }
    line.text = raw.text;
    line.class = raw
        .metadata
        .get(LINE_CLASS_KEY)
        .map(|label| LineClass::from_label(label));

    let words = raw
        .words
        .into_iter()
        .map(|word| word_from_raw(word, &raw.id))
        .collect::<Result<Vec<Word>>>()?;
    Ok(line.with_words(words))
}

fn word_from_raw(raw: RawWord, line_id: &str) -> Result<Word> {
    let bbox = envelope(&raw.coords, line_id)?;
    Ok(Word::new("raw", bbox, raw.text))
}

/// Axis-aligned envelope of a bounding polygon.
fn envelope(coords: &[Point], id: &str) -> Result<BBox> {
    BBox::from_points(coords).ok_or_else(|| Error::MissingCoordinates(id.to_string()))
}
