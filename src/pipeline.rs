//! Reconstruction pipeline.
//!
//! Runs the layout algorithms in order for one scan: split across the
//! page boundary, then per page cut wide regions into columns, merge
//! overlapping regions, regroup into columns, and re-split each column's
//! regions on vertical gaps. The conservation invariant is checked after
//! every step; a violation aborts that scan only.

use rayon::prelude::*;

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::layout::{merge_overlapping, split_into_columns, split_on_vertical_gaps, split_pages};
use crate::model::{Column, Layout, Page, RegionType, Scan, TextRegion};

/// Minimum horizontal overlap for a region to join an existing column
/// when regrouping after the merge pass.
const COLUMN_GROUP_OVERLAP: f32 = 0.5;

/// Reconstruct the logical layout of one scan.
///
/// Pure with respect to the input: the scan is only read, and a fresh
/// [`Layout`] with two pages is returned. Any structural violation is
/// fatal for the whole scan; no partial output is produced.
pub fn reconstruct(scan: &Scan, config: &LayoutConfig) -> Result<Layout> {
    config.validate()?;

    let expected_words = scan.word_count();
    let (left, right) = split_pages(scan, config)?;

    let mut pages = vec![left, right];
    for page in &mut pages {
        process_page(page, config)?;
    }

    let layout = Layout {
        scan_id: scan.id.clone(),
        pages,
    };
    if layout.word_count() != expected_words {
        return Err(Error::structural(
            &scan.id,
            format!(
                "reconstruction changed word count: {} -> {}",
                expected_words,
                layout.word_count()
            ),
        ));
    }
    Ok(layout)
}

/// Reconstruct a batch of scans in parallel.
///
/// Scans are independent, so the batch is embarrassingly parallel. A
/// failing scan does not abort the others; its error (carrying the
/// offending region's id) is returned in place, in input order.
pub fn reconstruct_batch(scans: &[Scan], config: &LayoutConfig) -> Vec<Result<Layout>> {
    scans
        .par_iter()
        .map(|scan| {
            let outcome = reconstruct(scan, config);
            if let Err(error) = &outcome {
                log::warn!("scan {} failed: {error}", scan.id);
            }
            outcome
        })
        .collect()
}

/// Run the per-page passes. The page arrives with all its regions in the
/// `extra` list and leaves with them regrouped into columns, with noise
/// and leftover regions in `extra`.
fn process_page(page: &mut Page, config: &LayoutConfig) -> Result<()> {
    let expected_lines = page.line_count();
    let expected_words = page.word_count();

    // Pass 1: cut wide regions at column gaps.
    let mut regions: Vec<TextRegion> = Vec::new();
    for region in std::mem::take(&mut page.extra) {
        for column in split_into_columns(&region, config)? {
            regions.extend(column.regions);
        }
    }
    check_counts(page, expected_lines, expected_words, &regions, "column split")?;

    // Pass 2: merge spuriously overlapping regions.
    let regions = merge_overlapping(regions, config.overlap_threshold)?;
    check_counts(page, expected_lines, expected_words, &regions, "overlap merge")?;

    // Pass 3: re-split every region on vertical gaps.
    let mut split_regions: Vec<TextRegion> = Vec::new();
    for region in &regions {
        split_regions.extend(split_on_vertical_gaps(region)?);
    }
    check_counts(
        page,
        expected_lines,
        expected_words,
        &split_regions,
        "vertical split",
    )?;

    // Regroup into columns; noise and leftover regions become extras.
    let (assigned, extra): (Vec<TextRegion>, Vec<TextRegion>) = split_regions
        .into_iter()
        .partition(|region| !is_extra_region(region));
    for column in group_into_columns(&page.id, assigned) {
        page.add_column(column);
    }
    for region in extra {
        page.add_extra(region);
    }

    if page.line_count() != expected_lines || page.word_count() != expected_words {
        return Err(Error::structural(
            &page.id,
            format!(
                "page reassembly changed counts: lines {} -> {}, words {} -> {}",
                expected_lines,
                page.line_count(),
                expected_words,
                page.word_count()
            ),
        ));
    }

    log::debug!(
        "page {}: {} columns, {} extra regions, {} lines",
        page.id,
        page.columns.len(),
        page.extra.len(),
        expected_lines
    );
    Ok(())
}

/// Regions that do not belong to any body column: noise, empty content,
/// and unassigned leftovers from column splitting.
fn is_extra_region(region: &TextRegion) -> bool {
    region.types.contains(&RegionType::Noise)
        || region.types.contains(&RegionType::Empty)
        || region.types.contains(&RegionType::Extra)
}

/// Group regions into columns by horizontal overlap, left to right.
fn group_into_columns(page_id: &str, mut regions: Vec<TextRegion>) -> Vec<Column> {
    regions.sort_by_key(|region| (region.bbox.left, region.bbox.top));

    let mut groups: Vec<(i32, i32, Vec<TextRegion>)> = Vec::new();
    for region in regions {
        let slot = groups.iter_mut().find(|(left, right, _)| {
            let width = region.bbox.width().min(right - left).max(1);
            let covered = region.bbox.right.min(*right) - region.bbox.left.max(*left);
            covered as f32 / width as f32 >= COLUMN_GROUP_OVERLAP
        });
        match slot {
            Some((left, right, members)) => {
                *left = (*left).min(region.bbox.left);
                *right = (*right).max(region.bbox.right);
                members.push(region);
            }
            None => groups.push((region.bbox.left, region.bbox.right, vec![region])),
        }
    }

    groups
        .into_iter()
        .map(|(_, _, mut members)| {
            members.sort_by_key(|region| region.bbox.top);
            Column::from_regions(page_id, members)
        })
        .collect()
}

fn check_counts(
    page: &Page,
    expected_lines: usize,
    expected_words: usize,
    regions: &[TextRegion],
    step: &str,
) -> Result<()> {
    let lines: usize = regions.iter().map(TextRegion::line_count).sum();
    let words: usize = regions.iter().map(TextRegion::word_count).sum();
    if lines != expected_lines || words != expected_words {
        return Err(Error::structural(
            &page.id,
            format!(
                "{step} changed counts: lines {expected_lines} -> {lines}, \
                 words {expected_words} -> {words}"
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use crate::model::{Line, LineClass};

    fn line(left: i32, right: i32, top: i32, class: LineClass) -> Line {
        Line::new("tmp", BBox::new(left, top, right, top + 40)).with_class(class)
    }

    fn minutes_scan() -> Scan {
        let mut scan = Scan::new("scan-1", BBox::new(0, 0, 4840, 3000));
        // Left page: a date followed by a paragraph.
        let mut left_lines = vec![line(200, 1000, 100, LineClass::Date)];
        for i in 0..6 {
            let class = match i {
                0 => LineClass::ParaStart,
                5 => LineClass::ParaEnd,
                _ => LineClass::ParaMid,
            };
            left_lines.push(line(200, 2000, 200 + i * 50, class));
        }
        scan.add_region(TextRegion::from_lines("tmp", left_lines));
        // Right page: one paragraph.
        let right_lines: Vec<Line> = (0..4)
            .map(|i| line(2600, 4400, 100 + i * 50, LineClass::ParaMid))
            .collect();
        scan.add_region(TextRegion::from_lines("tmp", right_lines));
        scan
    }

    #[test]
    fn test_reconstruct_two_pages() {
        let scan = minutes_scan();
        let layout = reconstruct(&scan, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.scan_id, "scan-1");
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[0].line_count(), 7);
        assert_eq!(layout.pages[1].line_count(), 4);
    }

    #[test]
    fn test_reconstruct_conserves_counts() {
        let scan = minutes_scan();
        let layout = reconstruct(&scan, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.line_count(), scan.line_count());
        assert_eq!(layout.word_count(), scan.word_count());
    }

    #[test]
    fn test_date_separated_from_paragraph() {
        let scan = minutes_scan();
        let layout = reconstruct(&scan, &LayoutConfig::default()).unwrap();
        let left = &layout.pages[0];
        let date_regions: usize = left
            .columns
            .iter()
            .flat_map(|c| c.regions.iter())
            .filter(|r| r.types.contains(&RegionType::Date))
            .count();
        assert_eq!(date_regions, 1);
    }

    #[test]
    fn test_invalid_config_rejected_eagerly() {
        let scan = minutes_scan();
        let config = LayoutConfig::default().with_overlap_threshold(0.0);
        assert!(matches!(
            reconstruct(&scan, &config),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_scan_yields_empty_pages() {
        let scan = Scan::new("scan-empty", BBox::new(0, 0, 4840, 3000));
        let layout = reconstruct(&scan, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.pages.len(), 2);
        assert!(layout.pages.iter().all(Page::is_empty));
    }

    #[test]
    fn test_batch_isolates_failures() {
        // Batch order and count are preserved even when every scan succeeds.
        let scans = vec![minutes_scan(), Scan::new("scan-2", BBox::new(0, 0, 4840, 3000))];
        let outcomes = reconstruct_batch(&scans, &LayoutConfig::default());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(Result::is_ok));
        assert_eq!(outcomes[0].as_ref().unwrap().scan_id, "scan-1");
    }

    #[test]
    fn test_group_into_columns_by_overlap() {
        let left = TextRegion::from_lines("p", vec![line(100, 900, 0, LineClass::ParaMid)]);
        let also_left = TextRegion::from_lines("p", vec![line(120, 880, 200, LineClass::ParaMid)]);
        let right = TextRegion::from_lines("p", vec![line(1200, 2000, 0, LineClass::ParaMid)]);
        let columns = group_into_columns("page-1", vec![right, left, also_left]);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].regions.len(), 2);
        assert_eq!(columns[1].regions.len(), 1);
    }
}
