//! Integration tests for the reconstruction pipeline.
//!
//! These exercise the public API end to end: column splitting, overlap
//! merging, page splitting and vertical-gap splitting, plus the
//! conservation invariant every step must preserve.

use unscan::{
    detect_gaps, merge_overlapping, reconstruct, reconstruct_batch, split_into_columns,
    split_pages, BBox, Column, ColumnGapConfig, LayoutConfig, Line, LineClass, Scan, TextRegion,
    Word,
};

fn line(left: i32, right: i32, top: i32) -> Line {
    Line::new("tmp", BBox::new(left, top, right, top + 40))
}

fn classified(left: i32, right: i32, top: i32, class: LineClass) -> Line {
    line(left, right, top).with_class(class)
}

fn worded(left: i32, right: i32, top: i32, words: &[&str]) -> Line {
    let step = (right - left) / words.len() as i32;
    let words = words
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let word_left = left + i as i32 * step;
            Word::new(
                "tmp",
                BBox::new(word_left, top, word_left + step - 10, top + 40),
                Some((*text).to_string()),
            )
        })
        .collect();
    line(left, right, top).with_words(words)
}

// ==================== Scenario A: column splitting ====================

#[test]
fn scenario_a_two_columns_from_three_lines() {
    // Three lines with x-spans [100,300], [100,300], [900,1100] on a wide
    // region split into 2 columns holding 2 and 1 lines.
    let region = TextRegion::from_lines(
        "scan-1",
        vec![line(100, 300, 0), line(100, 300, 50), line(900, 1100, 0)],
    );
    let columns = split_into_columns(&region, &LayoutConfig::default()).unwrap();

    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].line_count(), 2);
    assert_eq!(columns[1].line_count(), 1);
}

// ==================== Scenario B: overlap merging ====================

#[test]
fn scenario_b_overlap_ratio_against_thresholds() {
    // Boxes (0,0,100,100) and (50,50,150,150): overlap 2500 / 10000 = 0.25.
    let regions = || {
        vec![
            TextRegion::from_lines("scan-1", vec![line(0, 100, 0)]),
            TextRegion::from_lines("scan-1", vec![line(50, 150, 50)]),
        ]
    };

    // Force the exact boxes from the scenario.
    let with_boxes = |mut regions: Vec<TextRegion>| {
        regions[0].lines[0].bbox = BBox::new(0, 0, 100, 100);
        regions[1].lines[0].bbox = BBox::new(50, 50, 150, 150);
        for region in &mut regions {
            region.recompute();
        }
        regions
    };

    let kept = merge_overlapping(with_boxes(regions()), 0.3).unwrap();
    assert_eq!(kept.len(), 2);

    let merged = merge_overlapping(with_boxes(regions()), 0.2).unwrap();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].bbox, BBox::new(0, 0, 150, 150));
}

// ==================== Scenario C: page splitting ====================

#[test]
fn scenario_c_page_boundary_and_straddling_line() {
    // A 4840px scan splits at 2420; a line box (2400,0,2450,50) cuts into
    // fragments whose combined text length equals the original.
    let mut scan = Scan::new("scan-1", BBox::new(0, 0, 4840, 3000));
    let mut straddler = line(2400, 2450, 0).with_text("0123456789");
    straddler.bbox = BBox::new(2400, 0, 2450, 50);
    scan.add_region(TextRegion::from_lines(
        "tmp",
        vec![straddler, line(200, 1800, 100), line(2600, 4400, 100)],
    ));

    let (left, right) = split_pages(&scan, &LayoutConfig::default()).unwrap();
    assert_eq!(left.bbox, BBox::new(0, 0, 2420, 3000));
    assert_eq!(right.bbox, BBox::new(2420, 0, 4840, 3000));

    let total_text: usize = left
        .extra
        .iter()
        .chain(right.extra.iter())
        .flat_map(|region| region.lines.iter())
        .map(Line::text_len)
        .sum();
    assert_eq!(total_text, 10);
}

#[test]
fn page_split_completeness_for_straddling_region() {
    // N lines left, M lines right: exactly two regions with N and M lines.
    let mut scan = Scan::new("scan-1", BBox::new(0, 0, 4840, 3000));
    scan.add_region(TextRegion::from_lines(
        "tmp",
        vec![
            line(200, 1800, 0),
            line(200, 1800, 50),
            line(200, 1800, 100),
            line(2600, 4400, 0),
            line(2600, 4400, 50),
        ],
    ));

    let (left, right) = split_pages(&scan, &LayoutConfig::default()).unwrap();
    assert_eq!(left.extra.len(), 1);
    assert_eq!(right.extra.len(), 1);
    assert_eq!(left.extra[0].line_count(), 3);
    assert_eq!(right.extra[0].line_count(), 2);
}

// ==================== Properties ====================

#[test]
fn conservation_through_full_reconstruction() {
    let mut scan = Scan::new("scan-1", BBox::new(0, 0, 4840, 3000));
    let mut lines = vec![classified(200, 1400, 100, LineClass::Date)];
    for i in 0..8 {
        lines.push(worded(
            200,
            2200,
            200 + i * 50,
            &["the", "meeting", "was", "held"],
        ));
    }
    scan.add_region(TextRegion::from_lines("tmp", lines));
    scan.add_region(TextRegion::from_lines(
        "tmp",
        (0..5).map(|i| line(2600, 4400, 100 + i * 50)).collect(),
    ));

    let expected_lines = scan.line_count();
    let expected_words = scan.word_count();

    let layout = reconstruct(&scan, &LayoutConfig::default()).unwrap();
    assert_eq!(layout.line_count(), expected_lines);
    assert_eq!(layout.word_count(), expected_words);
}

#[test]
fn merger_is_idempotent_on_disjoint_input() {
    let regions = vec![
        TextRegion::from_lines("scan-1", vec![line(0, 100, 0)]),
        TextRegion::from_lines("scan-1", vec![line(0, 100, 200)]),
        TextRegion::from_lines("scan-1", vec![line(300, 400, 0)]),
    ];
    let merged = merge_overlapping(regions.clone(), 0.3).unwrap();
    assert_eq!(merged, regions);
}

#[test]
fn gap_count_monotone_in_freq_ratio() {
    // A sparse middle column: visible at a permissive ratio, swallowed by
    // the surrounding gaps at a strict one.
    let mut lines = Vec::new();
    for i in 0..20 {
        lines.push(line(0, 200, i * 50));
        lines.push(line(800, 1000, i * 50));
    }
    lines.push(line(400, 600, 0));
    lines.push(line(400, 600, 50));

    let mut previous = usize::MAX;
    for ratio in [0.05, 0.25, 0.75, 1.0] {
        let config = ColumnGapConfig::default().with_freq_ratio(ratio);
        let count = detect_gaps(&lines, &config).len();
        assert!(count <= previous, "ratio {ratio} increased gaps to {count}");
        previous = count;
    }
}

#[test]
fn label_boundary_beats_vertical_proximity() {
    // date next to para_mid always gets a region boundary, no matter how
    // close the lines sit.
    let mut scan = Scan::new("scan-1", BBox::new(0, 0, 4840, 3000));
    scan.add_region(TextRegion::from_lines(
        "tmp",
        vec![
            classified(200, 1400, 100, LineClass::Date),
            classified(200, 2200, 145, LineClass::ParaMid),
        ],
    ));

    let layout = reconstruct(&scan, &LayoutConfig::default()).unwrap();
    let regions: usize = layout.pages[0]
        .columns
        .iter()
        .map(|column| column.regions.len())
        .sum();
    assert_eq!(regions, 2);
}

#[test]
fn batch_reports_per_scan_results_in_order() {
    let mut good = Scan::new("scan-good", BBox::new(0, 0, 4840, 3000));
    good.add_region(TextRegion::from_lines(
        "tmp",
        vec![line(200, 1800, 100), line(200, 1800, 150)],
    ));
    let empty = Scan::new("scan-empty", BBox::new(0, 0, 4840, 3000));

    let outcomes = reconstruct_batch(&[good, empty], &LayoutConfig::default());
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].as_ref().unwrap().scan_id, "scan-good");
    assert_eq!(outcomes[1].as_ref().unwrap().scan_id, "scan-empty");
}

#[test]
fn relaxation_places_lines_the_strict_pass_rejects() {
    // At threshold 1.0 the offset line overlaps the dense range only
    // half-way and the first pass rejects it; the relaxed retry gives it
    // a range of its own instead of dropping it.
    let region = TextRegion::from_lines(
        "scan-1",
        vec![
            line(100, 500, 0),
            line(100, 500, 50),
            line(300, 700, 100),
        ],
    );
    let config = LayoutConfig::default().with_overlap_threshold(1.0);
    let columns = split_into_columns(&region, &config).unwrap();
    assert_eq!(columns.len(), 2);
    let total: usize = columns.iter().map(Column::line_count).sum();
    assert_eq!(total, 3);
}
