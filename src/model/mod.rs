//! Physical region tree produced by layout reconstruction.

mod page;
mod region;

pub use page::{Column, Layout, Page, Scan};
pub use region::{derive_id, Line, LineClass, RegionKind, RegionType, TextRegion, Word};
