use crate::{
    detect_edges, downsample_dimensions, estimate_cell_count, suggest_grid_dimensions, Axis,
    Confidence, DetectionConfig, EdgePositions, GridError, GridSuggestion, PixelBuffer,
    Rasterizer,
};
use image::DynamicImage;
use tracing::*;

/// Edge evidence and raw cell counts for one pixel buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridAnalysis {
    pub width: u32,
    pub height: u32,
    /// Columns holding a vertical edge, after merging.
    pub vertical_edges: EdgePositions,
    /// Rows holding a horizontal edge, after merging.
    pub horizontal_edges: EdgePositions,
    /// Uncapped row count implied by the horizontal edges.
    pub rows: u32,
    /// Uncapped column count implied by the vertical edges.
    pub cols: u32,
}

impl GridAnalysis {
    /// Whether both counts describe a real grid no larger than `max_grid_count`.
    pub fn is_grid(&self, max_grid_count: u32) -> bool {
        let accepted = |count: u32| count > 1 && count <= max_grid_count;
        accepted(self.rows) && accepted(self.cols)
    }

    /// Converts an accepted analysis into a high-confidence suggestion.
    pub fn to_suggestion(&self, max_grid_count: u32) -> Option<GridSuggestion> {
        if !self.is_grid(max_grid_count) {
            return None;
        }
        Some(GridSuggestion::new(
            self.rows,
            self.cols,
            Confidence::High,
            format!("Detected {}×{} grid lines", self.rows, self.cols),
        ))
    }
}

/// Detects a grid already drawn into an image from its gradient edges.
///
/// # Example
/// ```
/// use gridslice::{GridDetector, PixelBuffer};
///
/// let blank = PixelBuffer::from_fn(200, 100, |_, _| [255; 4]);
/// assert_eq!(GridDetector::default().detect(&blank), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridDetector {
    config: DetectionConfig,
}

impl GridDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Renders `source` at the capped size and looks for a grid.
    ///
    /// Returns `None` when no grid is found and also when rendering fails;
    /// failures are logged, never returned.
    pub fn detect<R: Rasterizer + ?Sized>(&self, source: &R) -> Option<GridSuggestion> {
        match self.try_detect(source) {
            Ok(suggestion) => suggestion,
            Err(e) => {
                warn!("Grid detection failed: {}", e);
                None
            }
        }
    }

    /// Like [`GridDetector::detect`], but reports rendering failures.
    ///
    /// # Errors
    /// Returns [`GridError`] if the source has no area or cannot be rendered.
    pub fn try_detect<R: Rasterizer + ?Sized>(
        &self,
        source: &R,
    ) -> Result<Option<GridSuggestion>, GridError> {
        let (width, height) = source.source_dimensions();
        if width == 0 || height == 0 {
            error!(
                "Invalid image dimensions: width={}, height={}",
                width, height
            );
            return Err(GridError::InvalidDimensions { width, height });
        }

        let (target_width, target_height) =
            downsample_dimensions(width, height, self.config.max_dimension);
        debug!(
            "Rendering {}x{} source at {}x{}",
            width, height, target_width, target_height
        );
        let buffer = source.render(target_width, target_height)?;
        if buffer.dimensions() != (target_width, target_height) {
            return Err(GridError::RasterizationError(format!(
                "asked for {}x{}, got {}x{}",
                target_width,
                target_height,
                buffer.width(),
                buffer.height()
            )));
        }

        Ok(self.detect_in_buffer(&buffer))
    }

    /// Looks for a grid in an already rendered buffer, without downsampling it.
    pub fn detect_in_buffer(&self, buffer: &PixelBuffer) -> Option<GridSuggestion> {
        let analysis = self.analyze(buffer);
        let suggestion = analysis.to_suggestion(self.config.max_grid_count);
        if suggestion.is_none() {
            debug!(
                "No grid accepted: rows={}, cols={}",
                analysis.rows, analysis.cols
            );
        }
        suggestion
    }

    /// Extracts edges on both axes and converts them into raw counts.
    pub fn analyze(&self, buffer: &PixelBuffer) -> GridAnalysis {
        trace!("Analyzing buffer with config: {:?}", self.config);
        let (width, height) = buffer.dimensions();
        let config = &self.config;

        let (vertical_edges, horizontal_edges) = if config.enable_parallel {
            rayon::join(
                || detect_edges(buffer, Axis::Vertical, config),
                || detect_edges(buffer, Axis::Horizontal, config),
            )
        } else {
            (
                detect_edges(buffer, Axis::Vertical, config),
                detect_edges(buffer, Axis::Horizontal, config),
            )
        };

        let cols = estimate_cell_count(&vertical_edges, width, config);
        let rows = estimate_cell_count(&horizontal_edges, height, config);

        GridAnalysis {
            width,
            height,
            vertical_edges,
            horizontal_edges,
            rows,
            cols,
        }
    }

    /// Detected grid if there is one, otherwise the aspect-ratio heuristic.
    pub fn suggest<R: Rasterizer + ?Sized>(&self, source: &R) -> GridSuggestion {
        let (width, height) = source.source_dimensions();
        self.detect(source)
            .unwrap_or_else(|| suggest_grid_dimensions(width, height))
    }
}

/// Runs the detector with the default configuration on a decoded image.
pub fn detect_grid_lines(image: &DynamicImage) -> Option<GridSuggestion> {
    GridDetector::default().detect(image)
}
