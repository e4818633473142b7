//! Column splitting.
//!
//! Partitions a text region's lines into columns using the pixel-density
//! gap detector, relaxing the frequency ratio for lines the initial split
//! could not place. Lines are never dropped: whatever remains unassigned
//! after the relaxation schedule is exhausted becomes a final extra column.

use crate::config::{LayoutConfig, RELAXED_FREQ_RATIOS};
use crate::error::{Error, Result};
use crate::layout::gaps::candidate_column_ranges;
use crate::model::{Column, Line, RegionType, TextRegion};

/// Split a text region into columns.
///
/// Columns are returned ordered left to right; each initially holds a
/// single text region with its lines sorted top to bottom. The split is
/// pure and conserves content: a diverging line or word total is a
/// structural error.
pub fn split_into_columns(region: &TextRegion, config: &LayoutConfig) -> Result<Vec<Column>> {
    if region.lines.is_empty() {
        return Ok(Vec::new());
    }

    let expected_lines = region.line_count();
    let expected_words = region.word_count();

    // (range start, assigned lines) per discovered column range.
    let mut buckets: Vec<(i32, Vec<Line>)> = Vec::new();
    let mut remainder: Vec<Line> = region.lines.clone();

    let initial_ratio = config.column_gap.gap_pixel_freq_ratio;
    let schedule = std::iter::once(initial_ratio)
        .chain(RELAXED_FREQ_RATIOS.iter().copied().filter(|r| *r < initial_ratio));

    for ratio in schedule {
        if remainder.is_empty() {
            break;
        }

        let gap_config = config.column_gap.with_freq_ratio(ratio);
        let ranges = candidate_column_ranges(&remainder, &gap_config);
        if ranges.is_empty() {
            continue;
        }

        let mut pass_buckets: Vec<(i32, Vec<Line>)> =
            ranges.iter().map(|(start, _)| (*start, Vec::new())).collect();
        let mut unassigned: Vec<Line> = Vec::new();

        for line in remainder.drain(..) {
            match best_range(&line, &ranges, config.overlap_threshold) {
                Some(index) => pass_buckets[index].1.push(line),
                None => unassigned.push(line),
            }
        }

        let assigned = pass_buckets.iter().map(|(_, lines)| lines.len()).sum::<usize>();
        if assigned == 0 {
            // No progress at this ratio; relax further.
            remainder = unassigned;
            continue;
        }

        log::debug!(
            "column split pass at ratio {:.2}: {} ranges, {} lines assigned, {} left",
            ratio,
            ranges.len(),
            assigned,
            unassigned.len()
        );

        buckets.extend(pass_buckets.into_iter().filter(|(_, lines)| !lines.is_empty()));
        remainder = unassigned;
    }

    buckets.sort_by_key(|(start, _)| *start);

    let mut columns: Vec<Column> = buckets
        .into_iter()
        .map(|(_, lines)| column_from_lines(&region.parent_id, lines))
        .collect();

    if !remainder.is_empty() {
        log::debug!(
            "{} lines unassigned after relaxation, emitting extra column",
            remainder.len()
        );
        let mut extra = column_from_lines(&region.parent_id, remainder);
        for extra_region in &mut extra.regions {
            extra_region.types.insert(RegionType::Extra);
        }
        columns.push(extra);
    }

    let actual_lines: usize = columns.iter().map(Column::line_count).sum();
    let actual_words: usize = columns.iter().map(Column::word_count).sum();
    if actual_lines != expected_lines || actual_words != expected_words {
        return Err(Error::structural(
            &region.id,
            format!(
                "column split changed counts: lines {expected_lines} -> {actual_lines}, \
                 words {expected_words} -> {actual_words}"
            ),
        ));
    }

    Ok(columns)
}

/// Index of the candidate range with the largest horizontal overlap
/// fraction, provided it reaches the threshold.
fn best_range(line: &Line, ranges: &[(i32, i32)], threshold: f32) -> Option<usize> {
    let (left, right) = line.horizontal_span();
    let width = (right - left).max(1) as f32;

    let mut best: Option<(usize, f32)> = None;
    for (index, (start, end)) in ranges.iter().enumerate() {
        let covered = right.min(*end) - left.max(*start);
        if covered <= 0 {
            continue;
        }
        let fraction = covered as f32 / width;
        if fraction >= threshold && best.map_or(true, |(_, f)| fraction > f) {
            best = Some((index, fraction));
        }
    }
    best.map(|(index, _)| index)
}

fn column_from_lines(parent_id: &str, lines: Vec<Line>) -> Column {
    let mut column = Column::from_lines(parent_id, lines);
    for region in &mut column.regions {
        region.sort_lines();
        region.recompute();
    }
    column
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn line(left: i32, right: i32, top: i32) -> Line {
        Line::new("tmp", BBox::new(left, top, right, top + 40))
    }

    fn region_of(lines: Vec<Line>) -> TextRegion {
        TextRegion::from_lines("scan-1", lines)
    }

    #[test]
    fn test_empty_region_yields_no_columns() {
        let region = region_of(vec![]);
        let columns = split_into_columns(&region, &LayoutConfig::default()).unwrap();
        assert!(columns.is_empty());
    }

    #[test]
    fn test_two_spans_split_via_relaxation() {
        // Two lines share [100, 300]; a third sits at [900, 1100]. The first
        // pass only finds the dense left range, the relaxed retry places the
        // remaining line in its own column.
        let region = region_of(vec![
            line(100, 300, 0),
            line(100, 300, 50),
            line(900, 1100, 0),
        ]);
        let columns = split_into_columns(&region, &LayoutConfig::default()).unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].line_count(), 2);
        assert_eq!(columns[1].line_count(), 1);
        assert!(columns[0].bbox.left < columns[1].bbox.left);
    }

    #[test]
    fn test_single_column_untouched() {
        let lines: Vec<Line> = (0..8).map(|i| line(100, 1100, i * 50)).collect();
        let region = region_of(lines);
        let columns = split_into_columns(&region, &LayoutConfig::default()).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].line_count(), 8);
    }

    #[test]
    fn test_balanced_two_column_layout() {
        let mut lines = Vec::new();
        for i in 0..12 {
            lines.push(line(100, 500, i * 50));
            lines.push(line(700, 1100, i * 50));
        }
        let region = region_of(lines);
        let columns = split_into_columns(&region, &LayoutConfig::default()).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].line_count(), 12);
        assert_eq!(columns[1].line_count(), 12);
    }

    #[test]
    fn test_conservation() {
        let mut lines = Vec::new();
        for i in 0..12 {
            lines.push(line(100, 500, i * 50));
            lines.push(line(700, 1100, i * 50));
        }
        lines.push(line(200, 1000, 600)); // straddles the gutter
        let region = region_of(lines);
        let expected = region.line_count();

        let columns = split_into_columns(&region, &LayoutConfig::default()).unwrap();
        let total: usize = columns.iter().map(Column::line_count).sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn test_columns_sorted_left_to_right() {
        let mut lines = Vec::new();
        for i in 0..12 {
            lines.push(line(700, 1100, i * 50));
            lines.push(line(100, 500, i * 50));
        }
        let region = region_of(lines);
        let columns = split_into_columns(&region, &LayoutConfig::default()).unwrap();
        assert_eq!(columns.len(), 2);
        assert!(columns[0].bbox.left < columns[1].bbox.left);
    }

    #[test]
    fn test_lines_sorted_top_to_bottom_within_column() {
        let region = region_of(vec![
            line(100, 500, 200),
            line(100, 500, 0),
            line(100, 500, 100),
        ]);
        let columns = split_into_columns(&region, &LayoutConfig::default()).unwrap();
        assert_eq!(columns.len(), 1);
        let tops: Vec<i32> = columns[0].regions[0]
            .lines
            .iter()
            .map(|l| l.bbox.top)
            .collect();
        assert_eq!(tops, vec![0, 100, 200]);
    }
}
