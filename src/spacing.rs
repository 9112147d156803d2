use crate::DetectionConfig;
use tracing::*;

/// A representative spacing and how many gaps fell within tolerance of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpacingBucket {
    pub spacing: u32,
    pub count: u32,
}

/// Histogram of gaps between consecutive edges, bucketed by tolerance.
///
/// Buckets keep their insertion order. A gap joins the first bucket whose key
/// is strictly within `tolerance` of it, otherwise it opens a new bucket keyed
/// by itself.
///
/// # Example
/// ```
/// use gridslice::{SpacingBucket, SpacingHistogram};
///
/// let histogram = SpacingHistogram::from_positions(&[10, 60, 108, 160, 170], 5.0);
/// assert_eq!(
///     histogram.dominant(),
///     Some(&SpacingBucket { spacing: 50, count: 3 })
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingHistogram {
    buckets: Vec<SpacingBucket>,
    tolerance: f32,
}

impl SpacingHistogram {
    pub fn new(tolerance: f32) -> Self {
        Self {
            buckets: Vec::new(),
            tolerance,
        }
    }

    /// Builds the histogram from the gaps between consecutive `positions`.
    pub fn from_positions(positions: &[u32], tolerance: f32) -> Self {
        let mut histogram = Self::new(tolerance);
        for pair in positions.windows(2) {
            histogram.insert(pair[1].saturating_sub(pair[0]));
        }
        histogram
    }

    pub fn insert(&mut self, gap: u32) {
        let tolerance = self.tolerance;
        match self
            .buckets
            .iter_mut()
            .find(|bucket| (gap as f32 - bucket.spacing as f32).abs() < tolerance)
        {
            Some(bucket) => bucket.count += 1,
            None => self.buckets.push(SpacingBucket {
                spacing: gap,
                count: 1,
            }),
        }
    }

    pub fn buckets(&self) -> &[SpacingBucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The bucket with the most gaps; the earliest one wins a tie.
    pub fn dominant(&self) -> Option<&SpacingBucket> {
        self.buckets.iter().fold(None, |best, bucket| match best {
            Some(b) if b.count >= bucket.count => Some(b),
            _ => Some(bucket),
        })
    }
}

/// Converts edge positions along an axis of `dimension` pixels into a cell count.
///
/// The dominant spacing is taken as the cell size, so the count is
/// `round(dimension / spacing)`. Returns 1 when there are fewer than two edges
/// or the dominant spacing occurs fewer than `min_spacing_occurrences` times.
/// The result is not capped; rejecting over-dense patterns is the caller's job.
///
/// # Example
/// ```
/// use gridslice::{estimate_cell_count, DetectionConfig};
///
/// let config = DetectionConfig::default();
/// // Three interior lines split 400px into four cells
/// assert_eq!(estimate_cell_count(&[100, 200, 300], 400, &config), 4);
/// assert_eq!(estimate_cell_count(&[200], 400, &config), 1);
/// ```
pub fn estimate_cell_count(positions: &[u32], dimension: u32, config: &DetectionConfig) -> u32 {
    if positions.len() < 2 {
        return 1;
    }

    let histogram = SpacingHistogram::from_positions(positions, config.spacing_tolerance(dimension));
    match histogram.dominant() {
        Some(bucket) if bucket.spacing > 0 && bucket.count >= config.min_spacing_occurrences => {
            let count = (dimension as f32 / bucket.spacing as f32).round() as u32;
            trace!(
                "Dominant spacing {} ({} gaps) over {} px gives {} cells",
                bucket.spacing,
                bucket.count,
                dimension,
                count
            );
            count.max(1)
        }
        _ => 1,
    }
}
