//! Vertical-gap region splitting.
//!
//! Cuts a region's sorted lines wherever vertical spacing or incompatible
//! semantic labels indicate a region boundary, reattaching noise and empty
//! lines to the nearest surviving neighbor. Each maximal run of content
//! lines becomes one region typed by its majority label.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{Line, LineClass, RegionType, TextRegion};

/// Estimated glyph height when a region carries no usable observations.
const FALLBACK_TEXT_HEIGHT: i32 = 40;

/// Baseline distance beyond this multiple of the text height starts a new
/// region.
const GAP_HEIGHT_FACTOR: i32 = 2;

/// Tie-break priority when multiple labels are equally frequent within a
/// run. Labels missing from this list lose to every listed one; a tie
/// among unlisted labels resolves to resolution.
const TYPE_PRIORITY: [RegionType; 8] = [
    RegionType::Marginalia,
    RegionType::Date,
    RegionType::Attendance,
    RegionType::DateHeader,
    RegionType::PageNumber,
    RegionType::Resolution,
    RegionType::Noise,
    RegionType::Empty,
];

/// Split a region on vertical gaps and label boundaries.
///
/// Output regions are ordered top to bottom and parented where the input
/// region was. Content is conserved: every input line ends up in exactly
/// one output region.
pub fn split_on_vertical_gaps(region: &TextRegion) -> Result<Vec<TextRegion>> {
    if region.lines.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = region.lines.clone();
    lines.sort_by_key(|line| (line.vertical_position(), line.bbox.left));

    let (content, fillers): (Vec<Line>, Vec<Line>) = lines
        .into_iter()
        .partition(|line| !line.class_or_unknown().is_filler());

    // Without content there is nothing to attach to; every filler stands
    // alone as a noise region.
    if content.is_empty() {
        let regions = fillers
            .into_iter()
            .map(|line| {
                TextRegion::from_lines(&region.parent_id, vec![line])
                    .with_type(RegionType::Noise)
            })
            .collect();
        return check_conservation(region, regions);
    }

    // Filler lines indexed by the content line they attach to.
    let mut attached: HashMap<usize, Vec<Line>> = HashMap::new();
    for filler in fillers {
        let anchor = nearest_content_index(&filler, &content);
        attached.entry(anchor).or_default().push(filler);
    }

    let text_height = median_text_height(&content);
    let mut runs: Vec<Vec<usize>> = vec![vec![0]];
    for index in 1..content.len() {
        let previous = &content[index - 1];
        let current = &content[index];
        let distance = current.vertical_position() - previous.vertical_position();
        if distance > GAP_HEIGHT_FACTOR * text_height
            || disallowed_adjacency(previous.class_or_unknown(), current.class_or_unknown())
        {
            log::debug!(
                "vertical boundary before line {} (distance {distance}, height {text_height})",
                current.id
            );
            runs.push(Vec::new());
        }
        runs.last_mut().expect("runs never empty").push(index);
    }

    let mut content: Vec<Option<Line>> = content.into_iter().map(Some).collect();
    let mut regions = Vec::with_capacity(runs.len());
    for run in runs {
        let run_type = majority_type(run.iter().map(|&index| {
            content[index]
                .as_ref()
                .expect("line consumed once")
                .class_or_unknown()
        }));

        let mut run_lines: Vec<Line> = Vec::new();
        for index in run {
            run_lines.push(content[index].take().expect("line consumed once"));
            if let Some(extra) = attached.remove(&index) {
                run_lines.extend(extra);
            }
        }

        let mut new_region =
            TextRegion::from_lines(&region.parent_id, run_lines).with_type(run_type);
        new_region.sort_lines();
        regions.push(new_region);
    }

    check_conservation(region, regions)
}

/// Index of the content line the filler attaches to: the vertically closer
/// of the nearest preceding and nearest following content line, preferring
/// the preceding one on a tie.
fn nearest_content_index(filler: &Line, content: &[Line]) -> usize {
    let position = filler.vertical_position();
    let following = content
        .iter()
        .position(|line| line.vertical_position() >= position);

    match following {
        None => content.len() - 1,
        Some(0) => 0,
        Some(index) => {
            let preceding_distance = position - content[index - 1].vertical_position();
            let following_distance = content[index].vertical_position() - position;
            if preceding_distance <= following_distance {
                index - 1
            } else {
                index
            }
        }
    }
}

/// Median observed line height, as an estimate of the glyph height.
fn median_text_height(content: &[Line]) -> i32 {
    let mut heights: Vec<i32> = content
        .iter()
        .map(|line| line.bbox.height())
        .filter(|h| *h > 0)
        .collect();
    if heights.is_empty() {
        return FALLBACK_TEXT_HEIGHT;
    }
    heights.sort_unstable();
    heights[heights.len() / 2]
}

/// Labels that must never share a region: a date or attendance line next
/// to a paragraph line.
fn disallowed_adjacency(a: LineClass, b: LineClass) -> bool {
    let structured = |class: LineClass| matches!(class, LineClass::Date | LineClass::Attendance);
    (structured(a) && b.is_paragraph()) || (structured(b) && a.is_paragraph())
}

/// Region type a line class votes for. The three paragraph classes
/// collapse into resolution; the inserted placeholder stands in for a
/// date line.
fn vote(class: LineClass) -> RegionType {
    match class {
        LineClass::ParaStart | LineClass::ParaMid | LineClass::ParaEnd => RegionType::Resolution,
        LineClass::Date => RegionType::Date,
        LineClass::DateHeader => RegionType::DateHeader,
        LineClass::Attendance => RegionType::Attendance,
        LineClass::Marginalia => RegionType::Marginalia,
        LineClass::Noise => RegionType::Noise,
        LineClass::Empty => RegionType::Empty,
        LineClass::Title => RegionType::Title,
        LineClass::InsertedEmpty => RegionType::Date,
        LineClass::Unknown => RegionType::Resolution,
    }
}

/// Majority vote over a run's line classes, with the fixed tie-break
/// priority.
fn majority_type(classes: impl Iterator<Item = LineClass>) -> RegionType {
    let mut tally: HashMap<RegionType, usize> = HashMap::new();
    for class in classes {
        *tally.entry(vote(class)).or_insert(0) += 1;
    }
    let Some(max) = tally.values().copied().max() else {
        return RegionType::Resolution;
    };

    let tied: Vec<RegionType> = tally
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(region_type, _)| region_type)
        .collect();
    if tied.len() == 1 {
        return tied[0];
    }
    TYPE_PRIORITY
        .into_iter()
        .find(|candidate| tied.contains(candidate))
        .unwrap_or(RegionType::Resolution)
}

fn check_conservation(input: &TextRegion, output: Vec<TextRegion>) -> Result<Vec<TextRegion>> {
    let lines: usize = output.iter().map(TextRegion::line_count).sum();
    let words: usize = output.iter().map(TextRegion::word_count).sum();
    if lines != input.line_count() || words != input.word_count() {
        return Err(Error::structural(
            &input.id,
            format!(
                "vertical split changed counts: lines {} -> {lines}, words {} -> {words}",
                input.line_count(),
                input.word_count()
            ),
        ));
    }
    Ok(output)
}
