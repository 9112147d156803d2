//! This crate suggests how to slice an image into a grid of rows and columns.
//! It offers two paths that produce the same [`GridSuggestion`] shape:
//!
//! - [`suggest_grid_dimensions`]: a heuristic driven by the aspect ratio alone.
//! - [`GridDetector`]: a gradient based detector that finds a grid already drawn into the pixels.
//!
//! It uses the `image` and `imageproc` crates for image manipulation.
//!
//! # Example
//! ```
//! use gridslice::*;
//! use image::{DynamicImage, RgbaImage, Rgba};
//!
//! // A white sheet with black lines every 50px
//! let img = RgbaImage::from_fn(300, 300, |x, y| {
//!     if x % 50 == 0 || y % 50 == 0 {
//!         Rgba([0, 0, 0, 255])
//!     } else {
//!         Rgba([255, 255, 255, 255])
//!     }
//! });
//! let img = DynamicImage::ImageRgba8(img);
//!
//! let suggestion = GridDetector::default().suggest(&img);
//! assert_eq!((suggestion.rows, suggestion.cols), (6, 6));
//! assert_eq!(suggestion.confidence, Confidence::High);
//! ```

/// Debug helpers for saving an image with a grid overlay.
///
/// # Example
/// ```no_run
/// use gridslice::{drawing::GridDrawingConfig, GridLayout};
///
/// let img = image::open("sheet.png").unwrap();
/// let layout = GridLayout::new(img.width(), img.height(), 3, 4).unwrap();
/// gridslice::debug::save_image_with_grid(&img, &layout, "overlay.png", &GridDrawingConfig::default())
///     .unwrap();
/// ```
#[cfg(feature = "drawing")]
pub mod debug;
/// Drawing of grid layouts and cell selections on top of images.
#[cfg(feature = "drawing")]
pub mod drawing;

mod config;
mod detector;
mod edges;
mod heuristic;
mod layout;
mod pixels;
mod raster;
mod spacing;
mod suggestion;

pub use config::DetectionConfig;
pub use detector::{detect_grid_lines, GridAnalysis, GridDetector};
pub use edges::{detect_edges, edge_strength, merge_adjacent_edges, Axis, EdgePositions};
pub use heuristic::suggest_grid_dimensions;
pub use layout::{slice_image, CropMode, ExportFormat, GridLayout, Slice};
pub use pixels::{channel_gradient, PixelBuffer};
pub use raster::{downsample_dimensions, Rasterizer};
pub use spacing::{estimate_cell_count, SpacingBucket, SpacingHistogram};
pub use suggestion::{Confidence, GridSuggestion};

use smallvec::SmallVec;
use thiserror::Error;

// Edge lists rarely exceed a few dozen entries after merging
const DEFAULT_SMALLVEC_SIZE: usize = 32;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid image dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer of {width}x{height} needs {expected} samples, got {actual}")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to rasterize image: {0}")]
    RasterizationError(String),

    #[error("Invalid grid: {rows} rows x {cols} cols over {width}x{height} pixels")]
    InvalidGrid {
        rows: u32,
        cols: u32,
        width: u32,
        height: u32,
    },

    #[error("Cell {index} out of range for a grid of {count} cells")]
    CellOutOfRange { index: usize, count: usize },

    #[error("Failed to write image: {0}")]
    ImageWriteError(String),
}

/// A type alias for SmallVec with an optimized stack-allocated buffer size.
pub type SmallVecLine<T> = SmallVec<[T; DEFAULT_SMALLVEC_SIZE]>;
