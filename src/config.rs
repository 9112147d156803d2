const DEFAULT_GRADIENT_THRESHOLD: f32 = 40.0;
const DEFAULT_COVERAGE_RATIO: f32 = 0.3;
const DEFAULT_SPACING_TOLERANCE_RATIO: f32 = 0.05;
const DEFAULT_MAX_DIMENSION: u32 = 800;
const DEFAULT_MAX_GRID_COUNT: u32 = 10;
const DEFAULT_MIN_SPACING_OCCURRENCES: u32 = 2;
const DEFAULT_EDGE_MERGE_RATIO: f32 = 0.02;
const DEFAULT_MIN_EDGE_MERGE_DISTANCE: u32 = 2;

/// Configuration for grid line detection.
///
/// # Example
/// ```
/// use gridslice::DetectionConfig;
///
/// let config = DetectionConfig::default();
/// assert_eq!(config.gradient_threshold, 40.0);
/// assert_eq!(config.coverage_ratio, 0.3);
/// assert_eq!(config.spacing_tolerance_ratio, 0.05);
/// assert_eq!(config.max_dimension, 800);
/// assert_eq!(config.enable_parallel, true);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionConfig {
    /// Mean per-channel difference a pixel must exceed to count as edge evidence (default: 40)
    pub gradient_threshold: f32,
    /// Fraction of a line that must be edge evidence for it to be an edge (default: 0.3)
    pub coverage_ratio: f32,
    /// Spacing histogram tolerance, as a fraction of the axis length (default: 0.05)
    pub spacing_tolerance_ratio: f32,
    /// Longest side of the buffer the detector scans (default: 800)
    pub max_dimension: u32,
    /// Largest row or column count the detector accepts (default: 10)
    pub max_grid_count: u32,
    /// Occurrences the dominant spacing needs before it is trusted (default: 2)
    pub min_spacing_occurrences: u32,
    /// Edges closer than this fraction of the axis length collapse into one (default: 0.02)
    pub edge_merge_ratio: f32,
    /// Lower bound on the merge distance in pixels (default: 2)
    pub min_edge_merge_distance: u32,
    /// Scan both axes in parallel (default: true)
    pub enable_parallel: bool,
}

impl DetectionConfig {
    /// Creates a `DetectionConfig` with the given tuned thresholds and defaults for the rest.
    ///
    /// # Example
    /// ```
    /// use gridslice::DetectionConfig;
    ///
    /// let config = DetectionConfig::new(25.0, 0.5, 0.1);
    /// assert_eq!(config.gradient_threshold, 25.0);
    /// assert_eq!(config.coverage_ratio, 0.5);
    /// assert_eq!(config.spacing_tolerance_ratio, 0.1);
    /// assert_eq!(config.max_grid_count, 10);
    /// ```
    pub fn new(gradient_threshold: f32, coverage_ratio: f32, spacing_tolerance_ratio: f32) -> Self {
        Self {
            gradient_threshold: gradient_threshold.max(0.0),
            coverage_ratio: coverage_ratio.clamp(0.0, 1.0),
            spacing_tolerance_ratio: spacing_tolerance_ratio.max(0.0),
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_grid_count: DEFAULT_MAX_GRID_COUNT,
            min_spacing_occurrences: DEFAULT_MIN_SPACING_OCCURRENCES,
            edge_merge_ratio: DEFAULT_EDGE_MERGE_RATIO,
            min_edge_merge_distance: DEFAULT_MIN_EDGE_MERGE_DISTANCE,
            enable_parallel: true,
        }
    }

    /// Number of edge hits a line of `length` pixels must exceed to be an edge.
    pub fn coverage_threshold(&self, length: u32) -> f32 {
        length as f32 * self.coverage_ratio
    }

    /// Spacing tolerance in pixels along an axis of `dimension` pixels.
    pub fn spacing_tolerance(&self, dimension: u32) -> f32 {
        dimension as f32 * self.spacing_tolerance_ratio
    }

    /// Largest gap in pixels between edges that still belong to the same discontinuity.
    ///
    /// A solid line `t` pixels thick starting at `l` leaves edges at `l - 1`, `l`,
    /// `l + t - 1` and `l + t`, so lines up to `edge_merge_distance + 1` pixels
    /// thick (in the scanned buffer) merge into one edge. Thicker lines keep
    /// two edges each, and their width then competes with the cell spacing.
    ///
    /// ```
    /// use gridslice::DetectionConfig;
    ///
    /// let config = DetectionConfig::default();
    /// assert_eq!(config.edge_merge_distance(800), 16);
    /// assert_eq!(config.edge_merge_distance(50), 2);
    /// ```
    pub fn edge_merge_distance(&self, dimension: u32) -> u32 {
        let scaled = (dimension as f32 * self.edge_merge_ratio).round() as u32;
        scaled.max(self.min_edge_merge_distance)
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig::new(
            DEFAULT_GRADIENT_THRESHOLD,
            DEFAULT_COVERAGE_RATIO,
            DEFAULT_SPACING_TOLERANCE_RATIO,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_ratios() {
        let config = DetectionConfig::new(-5.0, 1.5, -0.1);
        assert_eq!(config.gradient_threshold, 0.0);
        assert_eq!(config.coverage_ratio, 1.0);
        assert_eq!(config.spacing_tolerance_ratio, 0.0);
    }

    #[test]
    fn test_merge_can_be_disabled() {
        let config = DetectionConfig {
            edge_merge_ratio: 0.0,
            min_edge_merge_distance: 0,
            ..DetectionConfig::default()
        };
        assert_eq!(config.edge_merge_distance(800), 0);
    }

    #[test]
    fn test_thresholds_scale_with_dimension() {
        let config = DetectionConfig::default();
        assert!((config.spacing_tolerance(300) - 15.0).abs() < 1e-3);
        assert!((config.coverage_threshold(300) - 90.0).abs() < 1e-3);
    }
}
