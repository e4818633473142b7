//! Two-page splitting.
//!
//! Real scans frequently hold two printed pages side by side. This pass
//! assigns every region of such a scan to exactly one of two logical
//! pages; regions straddling the boundary are split per line, and a line
//! that itself crosses the boundary is cut into two fragments without
//! losing a single character or word.

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::geometry::BBox;
use crate::model::{Line, Page, Scan, TextRegion, Word};

/// Tolerated deviation of the scan width from twice the expected page
/// width before falling back to a ratio-based boundary.
const WIDTH_DEVIATION_LIMIT: f32 = 0.2;

/// Split a two-page scan into its left and right logical pages.
///
/// The boundary sits at the expected single-page width when the scan is
/// roughly twice that wide, and at half the actual width otherwise. The
/// returned pages hold their regions in the `extra` list; the orchestrator
/// regroups them into columns afterwards.
///
/// The post-condition is fatal: word counts must be conserved exactly,
/// and line counts may grow only by the number of boundary-cut lines
/// (each cut yields exactly two fragments).
pub fn split_pages(scan: &Scan, config: &LayoutConfig) -> Result<(Page, Page)> {
    let boundary = page_boundary(scan, config);

    let left_bbox = BBox::new(scan.bbox.left, scan.bbox.top, boundary, scan.bbox.bottom);
    let right_bbox = BBox::new(boundary, scan.bbox.top, scan.bbox.right, scan.bbox.bottom);
    let mut left = Page::new(&scan.id, left_bbox);
    let mut right = Page::new(&scan.id, right_bbox);

    let mut cut_lines = 0usize;
    for region in &scan.regions {
        match classify(&region.bbox, boundary, config.page_margin) {
            Side::Left => left.add_extra(region.clone()),
            Side::Right => right.add_extra(region.clone()),
            Side::Straddling => {
                let (left_part, right_part, cuts) = split_region(region, boundary);
                cut_lines += cuts;
                if let Some(part) = left_part {
                    left.add_extra(part);
                }
                if let Some(part) = right_part {
                    right.add_extra(part);
                }
            }
        }
    }

    let line_total = left.line_count() + right.line_count();
    let word_total = left.word_count() + right.word_count();
    if line_total != scan.line_count() + cut_lines || word_total != scan.word_count() {
        return Err(Error::structural(
            &scan.id,
            format!(
                "page split changed counts: lines {} -> {line_total} ({cut_lines} cuts), \
                 words {} -> {word_total}",
                scan.line_count(),
                scan.word_count()
            ),
        ));
    }

    log::debug!(
        "page split at x={boundary}: {} regions left, {} right, {} cut lines",
        left.extra.len(),
        right.extra.len(),
        cut_lines
    );

    Ok((left, right))
}

/// The boundary between the two logical pages.
fn page_boundary(scan: &Scan, config: &LayoutConfig) -> i32 {
    let expected = 2 * config.normal_scan_width;
    let deviation = (scan.width() - expected).abs() as f32 / expected as f32;
    if deviation > WIDTH_DEVIATION_LIMIT {
        log::warn!(
            "scan {} is {}px wide, expected ~{expected}px; using ratio-based boundary",
            scan.id,
            scan.width()
        );
        scan.bbox.left + scan.width() / 2
    } else {
        scan.bbox.left + config.normal_scan_width
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Straddling,
}

/// Classify a box against the boundary. A region poking at most `margin`
/// pixels past the boundary still counts as lying on one side.
fn classify(bbox: &BBox, boundary: i32, margin: i32) -> Side {
    if bbox.right <= boundary {
        return Side::Left;
    }
    if bbox.left >= boundary {
        return Side::Right;
    }
    let right_overhang = bbox.right - boundary;
    let left_overhang = boundary - bbox.left;
    if right_overhang <= margin {
        Side::Left
    } else if left_overhang <= margin {
        Side::Right
    } else {
        Side::Straddling
    }
}

/// Split a straddling region into left and right sub-regions by each
/// line's own position. Both sub-regions inherit the original's metadata.
/// When every line falls on one side, the whole region goes there.
fn split_region(
    region: &TextRegion,
    boundary: i32,
) -> (Option<TextRegion>, Option<TextRegion>, usize) {
    let mut left_lines: Vec<Line> = Vec::new();
    let mut right_lines: Vec<Line> = Vec::new();
    let mut cut_lines = 0usize;

    for line in &region.lines {
        match classify(&line.bbox, boundary, 0) {
            Side::Left => left_lines.push(line.clone()),
            Side::Right => right_lines.push(line.clone()),
            Side::Straddling => {
                let (left_fragment, right_fragment) = split_line(line, boundary);
                left_lines.push(left_fragment);
                right_lines.push(right_fragment);
                cut_lines += 1;
            }
        }
    }

    if right_lines.is_empty() {
        return (Some(region.clone()), None, 0);
    }
    if left_lines.is_empty() {
        return (None, Some(region.clone()), 0);
    }

    let build = |lines: Vec<Line>| {
        TextRegion::from_lines(&region.parent_id, lines).with_types(region.types.clone())
    };
    (
        Some(build(left_lines)),
        Some(build(right_lines)),
        cut_lines,
    )
}

/// Cut a boundary-crossing line into two fragments. Words go to the side
/// holding their center; wordless text splits proportionally at the
/// boundary so the combined length equals the original.
fn split_line(line: &Line, boundary: i32) -> (Line, Line) {
    let left_bbox = BBox::new(line.bbox.left, line.bbox.top, boundary, line.bbox.bottom);
    let right_bbox = BBox::new(boundary, line.bbox.top, line.bbox.right, line.bbox.bottom);

    let (left_words, right_words): (Vec<Word>, Vec<Word>) = line
        .words
        .iter()
        .cloned()
        .partition(|word| word.bbox.center_x() < boundary);

    let (left_text, right_text) = match &line.text {
        Some(text) => {
            let (a, b) = split_text(text, &line.bbox, boundary);
            (Some(a), Some(b))
        }
        None => (None, None),
    };

    let (left_baseline, right_baseline) = match &line.baseline {
        Some(baseline) => {
            let (a, b): (Vec<_>, Vec<_>) =
                baseline.points.iter().partition(|p| p.x < boundary);
            (
                (!a.is_empty()).then(|| crate::geometry::Baseline::new(a.into_iter().copied().collect())),
                (!b.is_empty()).then(|| crate::geometry::Baseline::new(b.into_iter().copied().collect())),
            )
        }
        None => (None, None),
    };

    let mut left_fragment = Line::new(&line.parent_id, left_bbox).with_words(left_words);
    left_fragment.baseline = left_baseline;
    left_fragment.text = left_text;
    left_fragment.class = line.class;
    left_fragment.types = line.types.clone();

    let mut right_fragment = Line::new(&line.parent_id, right_bbox).with_words(right_words);
    right_fragment.baseline = right_baseline;
    right_fragment.text = right_text;
    right_fragment.class = line.class;
    right_fragment.types = line.types.clone();

    (left_fragment, right_fragment)
}

/// Split text at the character index proportional to where the boundary
/// cuts the line's box. Fragment lengths always add up to the original.
fn split_text(text: &str, bbox: &BBox, boundary: i32) -> (String, String) {
    let chars = text.chars().count();
    let width = bbox.width().max(1);
    let cut = (chars as i64 * (boundary - bbox.left) as i64 / width as i64)
        .clamp(0, chars as i64) as usize;
    let byte_cut = text
        .char_indices()
        .nth(cut)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    (text[..byte_cut].to_string(), text[byte_cut..].to_string())
}
