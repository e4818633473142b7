//! Layout reconstruction algorithms.
//!
//! Each algorithm is a pure function from an input tree to a new tree;
//! none of them mutates its input or performs I/O. They only regroup
//! existing lines, and every one of them checks the conservation
//! invariant on its own output.

pub mod columns;
pub mod gaps;
pub mod merge;
pub mod pages;
pub mod vertical;

pub use columns::split_into_columns;
pub use gaps::{candidate_column_ranges, detect_gaps, Gap};
pub use merge::merge_overlapping;
pub use pages::split_pages;
pub use vertical::split_on_vertical_gaps;
