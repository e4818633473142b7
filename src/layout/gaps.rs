//! Pixel-density gap detection.
//!
//! Histograms how many line baselines cross each horizontal pixel column
//! and extracts low-coverage intervals as candidate column gaps. The
//! complement of the gaps, the densely covered intervals, are the
//! candidate column ranges consumed by the column splitter.

use crate::config::ColumnGapConfig;
use crate::model::Line;

/// Line counts beyond this no longer raise the coverage threshold.
const REFERENCE_LINE_CAP: f32 = 60.0;

/// A horizontal pixel interval `[start, end)` with line coverage below
/// threshold, interpreted as inter-column whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    /// Left edge (inclusive)
    pub start: i32,
    /// Right edge (exclusive)
    pub end: i32,
}

impl Gap {
    /// Gap width in pixels.
    pub fn width(&self) -> i32 {
        self.end - self.start
    }
}

/// Detect column gaps in a set of lines.
///
/// For every pixel column spanned by a line's baseline (bounding box when
/// no baseline exists) a counter is incremented. Pixel columns whose count
/// falls below `reference_line_count * gap_pixel_freq_ratio`, where the
/// reference is `min(line_count / 2, 60)`, form gap intervals. Gaps
/// separated by fewer than `gap_threshold` covered pixels merge; gaps
/// narrower than `min_gap_width` are discarded.
///
/// Empty input yields no gaps.
pub fn detect_gaps(lines: &[Line], config: &ColumnGapConfig) -> Vec<Gap> {
    let Some((span_start, span_end)) = horizontal_span(lines) else {
        return Vec::new();
    };

    let width = (span_end - span_start) as usize;
    if width == 0 {
        return Vec::new();
    }

    let mut histogram = vec![0u32; width];
    for line in lines {
        let (left, right) = line.horizontal_span();
        let from = (left - span_start).max(0) as usize;
        let to = ((right - span_start) as usize).min(width);
        for slot in &mut histogram[from..to] {
            *slot += 1;
        }
    }

    let reference = (lines.len() as f32 / 2.0).min(REFERENCE_LINE_CAP);
    let threshold = reference * config.gap_pixel_freq_ratio;

    // Maximal runs of pixel columns below the coverage threshold.
    let mut raw: Vec<Gap> = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, &count) in histogram.iter().enumerate() {
        if (count as f32) < threshold {
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take() {
            raw.push(Gap {
                start: span_start + start as i32,
                end: span_start + i as i32,
            });
        }
    }
    if let Some(start) = run_start {
        raw.push(Gap {
            start: span_start + start as i32,
            end: span_end,
        });
    }

    // Close gaps split by slivers of coverage narrower than gap_threshold.
    let mut merged: Vec<Gap> = Vec::new();
    for gap in raw {
        match merged.last_mut() {
            Some(prev) if gap.start - prev.end < config.gap_threshold => {
                prev.end = gap.end;
            }
            _ => merged.push(gap),
        }
    }

    let gaps: Vec<Gap> = merged
        .into_iter()
        .filter(|gap| gap.width() >= config.min_gap_width)
        .collect();

    log::debug!(
        "gap detection: {} lines, span [{}, {}), threshold {:.2}, {} gaps",
        lines.len(),
        span_start,
        span_end,
        threshold,
        gaps.len()
    );

    gaps
}

/// Candidate column ranges: the complement of the detected gaps within the
/// lines' horizontal span.
pub fn candidate_column_ranges(lines: &[Line], config: &ColumnGapConfig) -> Vec<(i32, i32)> {
    let Some((span_start, span_end)) = horizontal_span(lines) else {
        return Vec::new();
    };

    let gaps = detect_gaps(lines, config);
    let mut ranges = Vec::with_capacity(gaps.len() + 1);
    let mut cursor = span_start;
    for gap in &gaps {
        if gap.start > cursor {
            ranges.push((cursor, gap.start));
        }
        cursor = gap.end;
    }
    if cursor < span_end {
        ranges.push((cursor, span_end));
    }
    ranges
}

/// Combined horizontal span of all lines, or `None` when empty.
fn horizontal_span(lines: &[Line]) -> Option<(i32, i32)> {
    let mut iter = lines.iter().map(|line| line.horizontal_span());
    let first = iter.next()?;
    Some(iter.fold(first, |(min, max), (left, right)| {
        (min.min(left), max.max(right))
    }))
}
