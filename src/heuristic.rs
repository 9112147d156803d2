use crate::{Confidence, GridSuggestion};
use tracing::*;

const LARGE_SQUARE_PIXELS: u64 = 2000 * 2000;
const MAX_ELONGATED_COUNT: f64 = 8.0;

/// Suggests grid dimensions from the image size alone.
///
/// The rules are tried in order and the first match wins:
/// near-square, wide panorama, tall strip, 16:9 landscape, 9:16 portrait,
/// then an orientation based fallback. Zero-area images get the landscape
/// fallback.
///
/// # Example
/// ```
/// use gridslice::{suggest_grid_dimensions, Confidence};
///
/// let suggestion = suggest_grid_dimensions(1920, 1080);
/// assert_eq!((suggestion.rows, suggestion.cols), (3, 4));
/// assert_eq!(suggestion.confidence, Confidence::High);
/// ```
pub fn suggest_grid_dimensions(width: u32, height: u32) -> GridSuggestion {
    if width == 0 || height == 0 {
        warn!(
            "No area to suggest a grid for: width={}, height={}",
            width, height
        );
        return GridSuggestion::new(3, 4, Confidence::Low, "Image has no area, default 3×4 grid");
    }

    let aspect_ratio = width as f64 / height as f64;
    let total_pixels = width as u64 * height as u64;
    trace!(
        "Suggesting grid for aspect_ratio={:.3}, total_pixels={}",
        aspect_ratio,
        total_pixels
    );

    if (aspect_ratio - 1.0).abs() < 0.1 {
        if total_pixels > LARGE_SQUARE_PIXELS {
            return GridSuggestion::new(
                4,
                4,
                Confidence::High,
                "Large square image, 4×4 grid suggested",
            );
        }
        return GridSuggestion::new(3, 3, Confidence::High, "Square image, 3×3 grid suggested");
    }

    if aspect_ratio > 2.0 {
        let cols = (aspect_ratio * 2.0).round().min(MAX_ELONGATED_COUNT) as u32;
        return GridSuggestion::new(
            2,
            cols,
            Confidence::Medium,
            "Wide panorama, slice horizontally",
        );
    }

    if aspect_ratio < 0.5 {
        let rows = (2.0 / aspect_ratio).round().min(MAX_ELONGATED_COUNT) as u32;
        return GridSuggestion::new(rows, 2, Confidence::Medium, "Tall image, slice vertically");
    }

    if aspect_ratio > 1.3 && aspect_ratio < 1.8 {
        return GridSuggestion::new(
            3,
            4,
            Confidence::High,
            "16:9 landscape image, 3×4 grid suggested",
        );
    }

    if aspect_ratio > 0.5 && aspect_ratio < 0.8 {
        return GridSuggestion::new(
            4,
            3,
            Confidence::High,
            "9:16 portrait image, 4×3 grid suggested",
        );
    }

    if aspect_ratio > 1.0 {
        GridSuggestion::new(3, 4, Confidence::Low, "Landscape image, default 3×4 grid")
    } else {
        GridSuggestion::new(4, 3, Confidence::Low, "Portrait image, default 4×3 grid")
    }
}
