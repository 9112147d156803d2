//! Per-column and per-row edge extraction.
//!
//! A column (or row) is an edge when enough of its pixels sit on a strong
//! central-difference gradient across it. Runs of neighbouring edge positions
//! describe one discontinuity and are collapsed into a single position.

use crate::{channel_gradient, DetectionConfig, PixelBuffer, SmallVecLine};
use tracing::*;

/// Strictly increasing edge coordinates along one axis.
pub type EdgePositions = SmallVecLine<u32>;

/// Orientation of the edges being searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Axis {
    /// Vertical edges, reported as column indices.
    Vertical,
    /// Horizontal edges, reported as row indices.
    Horizontal,
}

impl Axis {
    /// Length of the axis edge positions are measured along.
    pub fn dimension(self, buffer: &PixelBuffer) -> u32 {
        match self {
            Axis::Vertical => buffer.width(),
            Axis::Horizontal => buffer.height(),
        }
    }

    /// Length of each scanned column or row.
    pub fn line_length(self, buffer: &PixelBuffer) -> u32 {
        match self {
            Axis::Vertical => buffer.height(),
            Axis::Horizontal => buffer.width(),
        }
    }
}

/// Counts the pixels of the line at `position` whose gradient across the line exceeds `threshold`.
///
/// Only interior coordinates, `1..dimension - 1`, have a neighbour on both
/// sides; any other `position` has no edge strength and yields 0.
///
/// # Example
/// ```
/// use gridslice::{edge_strength, Axis, PixelBuffer};
///
/// // Black left half, white right half
/// let buffer = PixelBuffer::from_fn(6, 4, |x, _| if x < 3 { [0, 0, 0, 255] } else { [255; 4] });
/// assert_eq!(edge_strength(&buffer, Axis::Vertical, 2, 40.0), 4);
/// assert_eq!(edge_strength(&buffer, Axis::Vertical, 4, 40.0), 0);
/// assert_eq!(edge_strength(&buffer, Axis::Vertical, 0, 40.0), 0);
/// ```
pub fn edge_strength(buffer: &PixelBuffer, axis: Axis, position: u32, threshold: f32) -> u32 {
    if position == 0 || position.saturating_add(1) >= axis.dimension(buffer) {
        return 0;
    }
    let length = axis.line_length(buffer);
    (0..length)
        .filter(|&s| {
            let (before, after) = match axis {
                Axis::Vertical => (buffer.rgb(position - 1, s), buffer.rgb(position + 1, s)),
                Axis::Horizontal => (buffer.rgb(s, position - 1), buffer.rgb(s, position + 1)),
            };
            channel_gradient(after, before) > threshold
        })
        .count() as u32
}

/// Finds the edge positions along `axis`.
///
/// # Example
/// ```
/// use gridslice::{detect_edges, Axis, DetectionConfig, PixelBuffer};
///
/// // A single black column at x=10
/// let buffer = PixelBuffer::from_fn(20, 20, |x, _| if x == 10 { [0, 0, 0, 255] } else { [255; 4] });
/// let edges = detect_edges(&buffer, Axis::Vertical, &DetectionConfig::default());
/// assert_eq!(edges.as_slice(), &[10]);
/// ```
pub fn detect_edges(buffer: &PixelBuffer, axis: Axis, config: &DetectionConfig) -> EdgePositions {
    let dimension = axis.dimension(buffer);
    let length = axis.line_length(buffer);
    if dimension < 3 || length == 0 {
        trace!("Axis {:?} too short to hold interior edges", axis);
        return EdgePositions::new();
    }

    let min_hits = config.coverage_threshold(length);
    let raw: EdgePositions = (1..dimension - 1)
        .filter(|&p| edge_strength(buffer, axis, p, config.gradient_threshold) as f32 > min_hits)
        .collect();

    let merged = merge_adjacent_edges(&raw, config.edge_merge_distance(dimension));
    debug!(
        "Axis {:?}: {} raw edges, {} after merging",
        axis,
        raw.len(),
        merged.len()
    );
    merged
}

/// Collapses runs of positions whose consecutive gap is at most `max_gap` into their rounded mean.
///
/// # Arguments
/// * `positions` - Strictly increasing edge positions.
/// * `max_gap` - Largest gap inside one run; 0 disables merging.
///
/// # Returns
/// Strictly increasing positions, one per run.
pub fn merge_adjacent_edges(positions: &[u32], max_gap: u32) -> EdgePositions {
    let mut merged = EdgePositions::new();
    let Some((&first, rest)) = positions.split_first() else {
        return merged;
    };

    let mut sum = first as u64;
    let mut count = 1u64;
    let mut last = first;
    for &position in rest {
        if position.saturating_sub(last) <= max_gap {
            sum += position as u64;
            count += 1;
        } else {
            merged.push(rounded_mean(sum, count));
            sum = position as u64;
            count = 1;
        }
        last = position;
    }
    merged.push(rounded_mean(sum, count));
    merged
}

fn rounded_mean(sum: u64, count: u64) -> u32 {
    ((sum + count / 2) / count) as u32
}
