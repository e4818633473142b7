//! Line-level and region-level nodes of the physical layout tree.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Baseline};

/// The kind of a physical layout node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// A whole physical scan, possibly two printed pages wide
    Scan,
    /// One logical printed page
    Page,
    /// A vertical column of text regions
    Column,
    /// A block of consecutive lines
    TextRegion,
    /// A single recognized line
    Line,
    /// A single recognized word
    Word,
}

impl RegionKind {
    /// Stable lowercase name used inside region identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Scan => "scan",
            RegionKind::Page => "page",
            RegionKind::Column => "column",
            RegionKind::TextRegion => "region",
            RegionKind::Line => "line",
            RegionKind::Word => "word",
        }
    }
}

/// Derive the deterministic identifier of a region from its parent id,
/// kind and bounding box: `{parentId}-{kind}-{left}-{top}-{width}-{height}`.
pub fn derive_id(parent_id: &str, kind: RegionKind, bbox: &BBox) -> String {
    format!(
        "{}-{}-{}-{}-{}-{}",
        parent_id,
        kind.as_str(),
        bbox.left,
        bbox.top,
        bbox.width(),
        bbox.height()
    )
}

/// Semantic label of a line, assigned by an external classifier.
///
/// Values outside this vocabulary map to [`LineClass::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineClass {
    /// First line of a paragraph
    ParaStart,
    /// Interior line of a paragraph
    ParaMid,
    /// Last line of a paragraph
    ParaEnd,
    /// A date line
    Date,
    /// A header introducing a date
    DateHeader,
    /// An attendance list line
    Attendance,
    /// A note in the margin
    Marginalia,
    /// Recognition noise
    Noise,
    /// An empty line
    Empty,
    /// A title line
    Title,
    /// No usable classification
    Unknown,
    /// Placeholder inserted for a missing but logically required date line
    InsertedEmpty,
}

impl LineClass {
    /// Map a raw classifier label to a line class. Unrecognized values
    /// become [`LineClass::Unknown`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "para_start" => LineClass::ParaStart,
            "para_mid" => LineClass::ParaMid,
            "para_end" => LineClass::ParaEnd,
            "date" => LineClass::Date,
            "date_header" => LineClass::DateHeader,
            "attendance" => LineClass::Attendance,
            "marginalia" => LineClass::Marginalia,
            "noise" => LineClass::Noise,
            "empty" => LineClass::Empty,
            "title" => LineClass::Title,
            "inserted_empty" => LineClass::InsertedEmpty,
            _ => LineClass::Unknown,
        }
    }

    /// Whether this class is one of the paragraph classes
    /// (para_start, para_mid, para_end).
    pub fn is_paragraph(&self) -> bool {
        matches!(
            self,
            LineClass::ParaStart | LineClass::ParaMid | LineClass::ParaEnd
        )
    }

    /// Whether lines of this class carry no content and are reattached to
    /// a neighbor instead of forming regions of their own.
    pub fn is_filler(&self) -> bool {
        matches!(self, LineClass::Noise | LineClass::Empty)
    }
}

/// Semantic type tag of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    /// Main body content
    Main,
    /// A page header
    Header,
    /// A date region
    Date,
    /// A date header region
    DateHeader,
    /// An attendance list
    Attendance,
    /// Margin notes
    Marginalia,
    /// Recognition noise
    Noise,
    /// Unassigned leftover content
    Extra,
    /// A resolution paragraph (collapsed para_start/para_mid/para_end)
    Resolution,
    /// A page number
    PageNumber,
    /// Empty content
    Empty,
    /// A title
    Title,
}

impl RegionType {
    /// Map a raw tag to a region type, if recognized.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "main" => Some(RegionType::Main),
            "header" => Some(RegionType::Header),
            "date" => Some(RegionType::Date),
            "date_header" => Some(RegionType::DateHeader),
            "attendance" => Some(RegionType::Attendance),
            "marginalia" => Some(RegionType::Marginalia),
            "noise" => Some(RegionType::Noise),
            "extra" => Some(RegionType::Extra),
            "resolution" => Some(RegionType::Resolution),
            "page_number" => Some(RegionType::PageNumber),
            "empty" => Some(RegionType::Empty),
            "title" => Some(RegionType::Title),
            _ => None,
        }
    }
}

/// A single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Deterministic identifier
    pub id: String,
    /// Identifier of the owning line (lookup key, not an owning reference)
    pub parent_id: String,
    /// Bounding box
    pub bbox: BBox,
    /// Recognized text, if any
    pub text: Option<String>,
}

impl Word {
    /// Create a word under the given parent.
    pub fn new(parent_id: &str, bbox: BBox, text: Option<String>) -> Self {
        Self {
            id: derive_id(parent_id, RegionKind::Word, &bbox),
            parent_id: parent_id.to_string(),
            bbox,
            text,
        }
    }

    /// Move the word under a new parent, recomputing its identifier.
    pub fn reparent(&mut self, parent_id: &str) {
        self.parent_id = parent_id.to_string();
        self.id = derive_id(parent_id, RegionKind::Word, &self.bbox);
    }
}

/// A single recognized line with optional text, baseline and class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Deterministic identifier
    pub id: String,
    /// Identifier of the owning region (lookup key, not an owning reference)
    pub parent_id: String,
    /// Bounding box
    pub bbox: BBox,
    /// Writing baseline polyline, if recognized
    pub baseline: Option<Baseline>,
    /// Recognized text, if any
    pub text: Option<String>,
    /// Classifier label, if any
    pub class: Option<LineClass>,
    /// Words, ordered left to right
    pub words: Vec<Word>,
    /// Semantic type tags
    pub types: BTreeSet<RegionType>,
}

impl Line {
    /// Create an empty line under the given parent.
    pub fn new(parent_id: &str, bbox: BBox) -> Self {
        Self {
            id: derive_id(parent_id, RegionKind::Line, &bbox),
            parent_id: parent_id.to_string(),
            bbox,
            baseline: None,
            text: None,
            class: None,
            words: Vec::new(),
            types: BTreeSet::new(),
        }
    }

    /// Set the line text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the baseline polyline.
    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Set the classifier label.
    pub fn with_class(mut self, class: LineClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Set the words, reparenting them under this line.
    pub fn with_words(mut self, mut words: Vec<Word>) -> Self {
        for word in &mut words {
            word.reparent(&self.id);
        }
        self.words = words;
        self
    }

    /// Move the line under a new parent, recomputing its identifier and
    /// cascading to its words.
    pub fn reparent(&mut self, parent_id: &str) {
        self.parent_id = parent_id.to_string();
        self.id = derive_id(parent_id, RegionKind::Line, &self.bbox);
        for word in &mut self.words {
            word.reparent(&self.id);
        }
    }

    /// The classifier label, defaulting to [`LineClass::Unknown`].
    pub fn class_or_unknown(&self) -> LineClass {
        self.class.unwrap_or(LineClass::Unknown)
    }

    /// Number of words in the line.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Horizontal extent of the line: the baseline's span when present,
    /// the bounding box otherwise.
    pub fn horizontal_span(&self) -> (i32, i32) {
        if let Some(baseline) = &self.baseline {
            if let (Some(left), Some(right)) = (baseline.left(), baseline.right()) {
                if left < right {
                    return (left, right);
                }
            }
        }
        (self.bbox.left, self.bbox.right)
    }

    /// Vertical position of the writing baseline: the polyline's average y
    /// when present, the bounding box bottom otherwise.
    pub fn vertical_position(&self) -> i32 {
        self.baseline
            .as_ref()
            .and_then(|b| b.average_y())
            .unwrap_or(self.bbox.bottom)
    }

    /// Length in characters of the recognized text.
    pub fn text_len(&self) -> usize {
        self.text.as_deref().map(|t| t.chars().count()).unwrap_or(0)
    }
}

/// A block of consecutive lines sharing one semantic role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    /// Deterministic identifier
    pub id: String,
    /// Identifier of the owning node (lookup key, not an owning reference)
    pub parent_id: String,
    /// Bounding box, always the union of the lines' boxes
    pub bbox: BBox,
    /// Semantic type tags
    pub types: BTreeSet<RegionType>,
    /// Lines, ordered top to bottom
    pub lines: Vec<Line>,
}

impl TextRegion {
    /// Build a region from lines under the given parent. The bounding box
    /// is the union of the lines' boxes and the lines are reparented.
    pub fn from_lines(parent_id: &str, lines: Vec<Line>) -> Self {
        let bbox = bbox_of_lines(&lines);
        let id = derive_id(parent_id, RegionKind::TextRegion, &bbox);
        let mut region = Self {
            id,
            parent_id: parent_id.to_string(),
            bbox,
            types: BTreeSet::new(),
            lines,
        };
        let region_id = region.id.clone();
        for line in &mut region.lines {
            line.reparent(&region_id);
        }
        region
    }

    /// Add a semantic type tag.
    pub fn with_type(mut self, region_type: RegionType) -> Self {
        self.types.insert(region_type);
        self
    }

    /// Replace the type tags.
    pub fn with_types(mut self, types: BTreeSet<RegionType>) -> Self {
        self.types = types;
        self
    }

    /// Move the region under a new parent, recomputing identifiers all the
    /// way down.
    pub fn reparent(&mut self, parent_id: &str) {
        self.parent_id = parent_id.to_string();
        self.id = derive_id(parent_id, RegionKind::TextRegion, &self.bbox);
        let region_id = self.id.clone();
        for line in &mut self.lines {
            line.reparent(&region_id);
        }
    }

    /// Recompute the bounding box from the lines and re-derive identifiers.
    /// Call after any mutation of `lines`.
    pub fn recompute(&mut self) {
        self.bbox = bbox_of_lines(&self.lines);
        self.id = derive_id(&self.parent_id, RegionKind::TextRegion, &self.bbox);
        let region_id = self.id.clone();
        for line in &mut self.lines {
            line.reparent(&region_id);
        }
    }

    /// Sort lines top to bottom by baseline position.
    pub fn sort_lines(&mut self) {
        self.lines
            .sort_by_key(|line| (line.vertical_position(), line.bbox.left));
        let region_id = self.id.clone();
        for line in &mut self.lines {
            line.reparent(&region_id);
        }
    }

    /// Number of lines in the region.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of words reachable from the region.
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(Line::word_count).sum()
    }
}

/// Union of the lines' bounding boxes, or a degenerate box at the origin
/// for an empty slice.
pub(crate) fn bbox_of_lines(lines: &[Line]) -> BBox {
    lines
        .iter()
        .map(|line| line.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(BBox::new(0, 0, 0, 0))
}
