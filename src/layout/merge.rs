//! Overlap merging.
//!
//! Noisy recognition frequently produces regions whose bounding boxes
//! overlap even though they describe the same block of text. This pass
//! finds maximal connected sets of regions under a pairwise overlap
//! predicate and collapses each set into one region.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::model::TextRegion;

/// Merge every maximal connected set of overlapping regions.
///
/// Two regions are connected when their bounding-box overlap ratio
/// (intersection area over the smaller region's area) reaches
/// `overlap_threshold`. Connectivity is transitive: components are closed
/// iteratively over neighbor sets until stable, since the edge list is
/// built once up front. Singleton components pass through unchanged, so
/// merging an already non-overlapping list is the identity.
pub fn merge_overlapping(
    regions: Vec<TextRegion>,
    overlap_threshold: f32,
) -> Result<Vec<TextRegion>> {
    if regions.len() <= 1 {
        return Ok(regions);
    }

    let expected_lines: usize = regions.iter().map(TextRegion::line_count).sum();
    let expected_words: usize = regions.iter().map(TextRegion::word_count).sum();

    // Neighbor sets; every node is its own neighbor.
    let mut neighbors: Vec<BTreeSet<usize>> = (0..regions.len())
        .map(|i| BTreeSet::from([i]))
        .collect();
    for i in 0..regions.len() {
        for j in (i + 1)..regions.len() {
            if regions[i].bbox.overlap_ratio(&regions[j].bbox) >= overlap_threshold {
                neighbors[i].insert(j);
                neighbors[j].insert(i);
            }
        }
    }

    // Iterative transitive closure: union each node's neighbors' neighbor
    // sets until nothing changes.
    loop {
        let mut changed = false;
        for i in 0..neighbors.len() {
            let union: BTreeSet<usize> = neighbors[i]
                .iter()
                .flat_map(|&j| neighbors[j].iter().copied())
                .collect();
            if union.len() > neighbors[i].len() {
                for &j in &union {
                    neighbors[j].extend(union.iter().copied());
                }
                neighbors[i] = union;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Group by component, keyed by the smallest member index.
    let mut components: Vec<BTreeSet<usize>> = Vec::new();
    for (i, set) in neighbors.iter().enumerate() {
        if set.iter().next() == Some(&i) {
            components.push(set.clone());
        }
    }

    let member_total: usize = components.iter().map(BTreeSet::len).sum();
    if member_total != regions.len() {
        return Err(Error::structural(
            regions
                .first()
                .map(|r| r.parent_id.clone())
                .unwrap_or_default(),
            format!(
                "overlap components cover {member_total} regions, expected {}",
                regions.len()
            ),
        ));
    }

    let mut regions: Vec<Option<TextRegion>> = regions.into_iter().map(Some).collect();
    let mut merged: Vec<TextRegion> = Vec::with_capacity(components.len());
    for component in components {
        if component.len() == 1 {
            let index = *component.iter().next().expect("non-empty component");
            merged.push(regions[index].take().expect("region consumed once"));
            continue;
        }

        log::debug!("merging {} overlapping regions", component.len());
        let members: Vec<TextRegion> = component
            .iter()
            .map(|&index| regions[index].take().expect("region consumed once"))
            .collect();
        merged.push(merge_component(members));
    }

    let actual_lines: usize = merged.iter().map(TextRegion::line_count).sum();
    let actual_words: usize = merged.iter().map(TextRegion::word_count).sum();
    if actual_lines != expected_lines || actual_words != expected_words {
        return Err(Error::structural(
            merged
                .first()
                .map(|r| r.parent_id.clone())
                .unwrap_or_default(),
            format!(
                "overlap merge changed counts: lines {expected_lines} -> {actual_lines}, \
                 words {expected_words} -> {actual_words}"
            ),
        ));
    }

    Ok(merged)
}

/// Collapse a component of two or more regions into one. The box is the
/// union of the members' boxes, the lines are the members' lines re-sorted
/// vertically, the identifier is re-derived from the first member's parent,
/// and metadata is taken first-wins per field.
fn merge_component(members: Vec<TextRegion>) -> TextRegion {
    let parent_id = members[0].parent_id.clone();
    let types = members
        .iter()
        .map(|m| &m.types)
        .find(|types| !types.is_empty())
        .cloned()
        .unwrap_or_default();

    let lines = members
        .into_iter()
        .flat_map(|member| member.lines)
        .collect();

    let mut region = TextRegion::from_lines(&parent_id, lines).with_types(types);
    region.sort_lines();
    region
}
