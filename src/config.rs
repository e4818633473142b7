//! Layout reconstruction configuration.

use crate::error::{Error, Result};

/// Ratio relaxation schedule used when column splitting leaves an
/// unassigned remainder. Each retry lowers the frequency ratio, making
/// the gap detector less eager to declare gaps.
pub const RELAXED_FREQ_RATIOS: [f32; 2] = [0.25, 0.01];

/// Configuration for the pixel-density gap detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnGapConfig {
    /// Gaps separated by fewer than this many covered pixels are merged.
    pub gap_threshold: i32,

    /// Fraction of the reference line count a pixel column must reach to
    /// count as covered. Must be in (0, 1].
    pub gap_pixel_freq_ratio: f32,

    /// Gaps narrower than this are discarded as noise.
    pub min_gap_width: i32,
}

impl ColumnGapConfig {
    /// Create gap detector settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap merge threshold in pixels.
    pub fn with_gap_threshold(mut self, px: i32) -> Self {
        self.gap_threshold = px;
        self
    }

    /// Set the pixel frequency ratio.
    pub fn with_freq_ratio(mut self, ratio: f32) -> Self {
        self.gap_pixel_freq_ratio = ratio;
        self
    }

    /// Set the minimum gap width in pixels.
    pub fn with_min_gap_width(mut self, px: i32) -> Self {
        self.min_gap_width = px;
        self
    }

    /// Validate all settings, rejecting out-of-range values eagerly.
    pub fn validate(&self) -> Result<()> {
        if self.gap_threshold < 0 {
            return Err(Error::Configuration(format!(
                "column_gap.gap_threshold must be non-negative, got {}",
                self.gap_threshold
            )));
        }
        if !(self.gap_pixel_freq_ratio > 0.0 && self.gap_pixel_freq_ratio <= 1.0) {
            return Err(Error::Configuration(format!(
                "column_gap.gap_pixel_freq_ratio must be in (0, 1], got {}",
                self.gap_pixel_freq_ratio
            )));
        }
        if self.min_gap_width <= 0 {
            return Err(Error::Configuration(format!(
                "column_gap.min_gap_width must be positive, got {}",
                self.min_gap_width
            )));
        }
        Ok(())
    }
}

impl Default for ColumnGapConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 50,
            gap_pixel_freq_ratio: 0.75,
            min_gap_width: 20,
        }
    }
}

/// Configuration for the whole reconstruction pipeline.
///
/// Threaded explicitly through every entry point; nothing reads ambient
/// global state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Gap detector settings
    pub column_gap: ColumnGapConfig,

    /// Minimum bounding-box overlap ratio (intersection over smaller area)
    /// for two regions to be merged, and minimum horizontal overlap for a
    /// line to be assigned to a column range. Must be in (0, 1].
    pub overlap_threshold: f32,

    /// Expected width of a single printed page in pixels. A two-page scan
    /// is expected to be roughly twice this wide.
    pub normal_scan_width: i32,

    /// Tolerance band around the page boundary when classifying regions
    /// as left, right or straddling.
    pub page_margin: i32,
}

impl LayoutConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap detector settings.
    pub fn with_column_gap(mut self, column_gap: ColumnGapConfig) -> Self {
        self.column_gap = column_gap;
        self
    }

    /// Set the overlap threshold.
    pub fn with_overlap_threshold(mut self, threshold: f32) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    /// Set the expected single-page width in pixels.
    pub fn with_normal_scan_width(mut self, px: i32) -> Self {
        self.normal_scan_width = px;
        self
    }

    /// Set the page boundary margin in pixels.
    pub fn with_page_margin(mut self, px: i32) -> Self {
        self.page_margin = px;
        self
    }

    /// Validate all settings, rejecting out-of-range values eagerly.
    pub fn validate(&self) -> Result<()> {
        self.column_gap.validate()?;
        if !(self.overlap_threshold > 0.0 && self.overlap_threshold <= 1.0) {
            return Err(Error::Configuration(format!(
                "overlap_threshold must be in (0, 1], got {}",
                self.overlap_threshold
            )));
        }
        if self.normal_scan_width <= 0 {
            return Err(Error::Configuration(format!(
                "normal_scan_width must be positive, got {}",
                self.normal_scan_width
            )));
        }
        if self.page_margin < 0 {
            return Err(Error::Configuration(format!(
                "page_margin must be non-negative, got {}",
                self.page_margin
            )));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_gap: ColumnGapConfig::default(),
            overlap_threshold: 0.5,
            normal_scan_width: 2420,
            page_margin: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LayoutConfig::new()
            .with_overlap_threshold(0.3)
            .with_normal_scan_width(2000)
            .with_column_gap(ColumnGapConfig::new().with_freq_ratio(0.25));

        assert_eq!(config.overlap_threshold, 0.3);
        assert_eq!(config.normal_scan_width, 2000);
        assert_eq!(config.column_gap.gap_pixel_freq_ratio, 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_freq_ratio_rejected() {
        let config =
            LayoutConfig::new().with_column_gap(ColumnGapConfig::new().with_freq_ratio(0.0));
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let config =
            LayoutConfig::new().with_column_gap(ColumnGapConfig::new().with_freq_ratio(1.5));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_overlap_threshold_rejected() {
        let config = LayoutConfig::new().with_overlap_threshold(-0.1);
        assert!(config.validate().is_err());

        let config = LayoutConfig::new().with_overlap_threshold(2.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_scan_width_rejected() {
        let config = LayoutConfig::new().with_normal_scan_width(0);
        assert!(config.validate().is_err());
    }
}
