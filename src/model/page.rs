//! Scan, page and column containers.

use serde::{Deserialize, Serialize};

use super::region::{bbox_of_lines, derive_id, Line, RegionKind, TextRegion};
use crate::geometry::BBox;

/// A vertical column of text regions on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Deterministic identifier
    pub id: String,
    /// Identifier of the owning page (lookup key, not an owning reference)
    pub parent_id: String,
    /// Bounding box, always the union of the regions' boxes
    pub bbox: BBox,
    /// Text regions, ordered top to bottom
    pub regions: Vec<TextRegion>,
}

impl Column {
    /// Build a column from regions under the given parent.
    pub fn from_regions(parent_id: &str, regions: Vec<TextRegion>) -> Self {
        let bbox = bbox_of_regions(&regions);
        let id = derive_id(parent_id, RegionKind::Column, &bbox);
        let mut column = Self {
            id,
            parent_id: parent_id.to_string(),
            bbox,
            regions,
        };
        let column_id = column.id.clone();
        for region in &mut column.regions {
            region.reparent(&column_id);
        }
        column
    }

    /// Build a column holding a single region made of the given lines.
    pub fn from_lines(parent_id: &str, lines: Vec<Line>) -> Self {
        let bbox = bbox_of_lines(&lines);
        let id = derive_id(parent_id, RegionKind::Column, &bbox);
        let region = TextRegion::from_lines(&id, lines);
        Self {
            id,
            parent_id: parent_id.to_string(),
            bbox,
            regions: vec![region],
        }
    }

    /// Move the column under a new parent, recomputing identifiers all the
    /// way down.
    pub fn reparent(&mut self, parent_id: &str) {
        self.parent_id = parent_id.to_string();
        self.id = derive_id(parent_id, RegionKind::Column, &self.bbox);
        let column_id = self.id.clone();
        for region in &mut self.regions {
            region.reparent(&column_id);
        }
    }

    /// Number of lines reachable from the column.
    pub fn line_count(&self) -> usize {
        self.regions.iter().map(TextRegion::line_count).sum()
    }

    /// Number of words reachable from the column.
    pub fn word_count(&self) -> usize {
        self.regions.iter().map(TextRegion::word_count).sum()
    }
}

/// One logical printed page: columns of body text plus unassigned extra
/// regions (headers, titles, footers, noise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Deterministic identifier
    pub id: String,
    /// Identifier of the owning scan (lookup key, not an owning reference)
    pub parent_id: String,
    /// Bounding box
    pub bbox: BBox,
    /// Columns, ordered left to right
    pub columns: Vec<Column>,
    /// Regions not assigned to any column
    pub extra: Vec<TextRegion>,
}

impl Page {
    /// Create an empty page covering the given area of the scan.
    pub fn new(parent_id: &str, bbox: BBox) -> Self {
        Self {
            id: derive_id(parent_id, RegionKind::Page, &bbox),
            parent_id: parent_id.to_string(),
            bbox,
            columns: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Add a column, reparenting it under this page.
    pub fn add_column(&mut self, mut column: Column) {
        column.reparent(&self.id);
        self.columns.push(column);
    }

    /// Add an unassigned extra region, reparenting it under this page.
    pub fn add_extra(&mut self, mut region: TextRegion) {
        region.reparent(&self.id);
        self.extra.push(region);
    }

    /// Whether the page has no content at all.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.extra.is_empty()
    }

    /// Number of lines reachable from the page.
    pub fn line_count(&self) -> usize {
        let in_columns: usize = self.columns.iter().map(Column::line_count).sum();
        let in_extra: usize = self.extra.iter().map(TextRegion::line_count).sum();
        in_columns + in_extra
    }

    /// Number of words reachable from the page.
    pub fn word_count(&self) -> usize {
        let in_columns: usize = self.columns.iter().map(Column::word_count).sum();
        let in_extra: usize = self.extra.iter().map(TextRegion::word_count).sum();
        in_columns + in_extra
    }
}

/// A physical scan holding top-level text regions before page splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    /// Identifier supplied by the recognition layer
    pub id: String,
    /// Bounding box of the whole scan
    pub bbox: BBox,
    /// Top-level text regions
    pub regions: Vec<TextRegion>,
}

impl Scan {
    /// Create a scan with the given id and extent.
    pub fn new(id: impl Into<String>, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            bbox,
            regions: Vec::new(),
        }
    }

    /// Add a top-level region, reparenting it under this scan.
    pub fn add_region(&mut self, mut region: TextRegion) {
        region.reparent(&self.id);
        self.regions.push(region);
    }

    /// Scan width in pixels.
    pub fn width(&self) -> i32 {
        self.bbox.width()
    }

    /// Number of lines reachable from the scan.
    pub fn line_count(&self) -> usize {
        self.regions.iter().map(TextRegion::line_count).sum()
    }

    /// Number of words reachable from the scan.
    pub fn word_count(&self) -> usize {
        self.regions.iter().map(TextRegion::word_count).sum()
    }
}

/// The reconstructed layout of one scan: its two logical pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Identifier of the source scan
    pub scan_id: String,
    /// Logical pages, left then right
    pub pages: Vec<Page>,
}

impl Layout {
    /// Number of lines reachable from all pages.
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(Page::line_count).sum()
    }

    /// Number of words reachable from all pages.
    pub fn word_count(&self) -> usize {
        self.pages.iter().map(Page::word_count).sum()
    }
}

/// Union of the regions' bounding boxes, or a degenerate box at the
/// origin for an empty slice.
pub(crate) fn bbox_of_regions(regions: &[TextRegion]) -> BBox {
    regions
        .iter()
        .map(|region| region.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(BBox::new(0, 0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Line;

    fn region(parent: &str, top: i32) -> TextRegion {
        TextRegion::from_lines(
            parent,
            vec![Line::new("tmp", BBox::new(0, top, 100, top + 40))],
        )
    }

    #[test]
    fn test_column_from_regions() {
        let column = Column::from_regions("page-x", vec![region("tmp", 0), region("tmp", 100)]);
        assert_eq!(column.bbox, BBox::new(0, 0, 100, 140));
        assert_eq!(column.line_count(), 2);
        assert!(column.regions.iter().all(|r| r.parent_id == column.id));
    }

    #[test]
    fn test_page_counts() {
        let mut page = Page::new("scan-1", BBox::new(0, 0, 2420, 3000));
        assert!(page.is_empty());

        page.add_column(Column::from_regions("tmp", vec![region("tmp", 0)]));
        page.add_extra(region("tmp", 500));

        assert_eq!(page.line_count(), 2);
        assert_eq!(page.word_count(), 0);
        assert!(page.columns[0].parent_id == page.id);
        assert!(page.extra[0].parent_id == page.id);
    }

    #[test]
    fn test_scan_reparents_regions() {
        let mut scan = Scan::new("scan-7", BBox::new(0, 0, 4840, 3000));
        scan.add_region(region("tmp", 0));
        assert_eq!(scan.regions[0].parent_id, "scan-7");
        assert!(scan.regions[0].id.starts_with("scan-7-region-"));
        assert_eq!(scan.line_count(), 1);
    }
}
