//! This module draws grid layouts and cell selections on images.
//! It is feature-gated under the `drawing` feature and uses `imageproc` for the primitives.
//!
//! # Examples
//!
//! ```rust
//! use gridslice::{drawing::*, GridLayout};
//! use image::{Rgba, RgbaImage};
//!
//! let mut img = RgbaImage::from_pixel(120, 90, Rgba([255, 255, 255, 255]));
//! let layout = GridLayout::new(120, 90, 3, 4).unwrap();
//!
//! let drawing_config = GridDrawingConfig {
//!     line_color: Rgba([255, 0, 0, 255]),         // Red grid lines
//!     selection_color: Rgba([0, 0, 255, 255]),    // Blue selected cells
//!     line_thickness: 1,
//!     line_color_provider: None,                  // Use uniform line color
//! };
//!
//! layout.draw(&mut img, &drawing_config).unwrap();
//! Selection::new(&layout, &[0, 5]).draw(&mut img, &drawing_config).unwrap();
//! assert_eq!(img.get_pixel(90, 45), &Rgba([255, 0, 0, 255]));
//! ```

use std::fmt;

use crate::{GridError, GridLayout};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

/// Configuration for drawing grid lines and selected cells.
///
/// Users can specify a uniform line color or provide a color provider
/// function keyed by the line index.
pub struct GridDrawingConfig {
    /// Default color for grid lines.
    pub line_color: Rgba<u8>,
    /// Outline color for selected cells.
    pub selection_color: Rgba<u8>,
    /// Thickness of grid lines and selection outlines.
    pub line_thickness: u32,
    /// Optional function to provide custom colors for lines based on their index.
    /// Columns come first, then rows.
    pub line_color_provider: Option<Box<dyn Fn(usize) -> Rgba<u8>>>,
}

// Manually implement Debug for GridDrawingConfig
impl fmt::Debug for GridDrawingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridDrawingConfig")
            .field("line_color", &self.line_color)
            .field("selection_color", &self.selection_color)
            .field("line_thickness", &self.line_thickness)
            .field("line_color_provider", &"<function>")
            .finish()
    }
}

impl Default for GridDrawingConfig {
    fn default() -> Self {
        GridDrawingConfig {
            line_color: Rgba([255, 0, 0, 255]),      // Red
            selection_color: Rgba([0, 0, 255, 255]), // Blue
            line_thickness: 2,
            line_color_provider: None,
        }
    }
}

impl GridDrawingConfig {
    fn color_for(&self, index: usize) -> Rgba<u8> {
        match self.line_color_provider {
            Some(ref provider) => provider(index),
            None => self.line_color,
        }
    }
}

/// Trait for types that can be drawn on an image.
pub trait Drawable {
    /// Draws the object on the provided image using the given configuration.
    ///
    /// # Errors
    /// Returns [`GridError`] if the image does not match the layout being drawn.
    fn draw(&self, image: &mut RgbaImage, config: &GridDrawingConfig) -> Result<(), GridError>;
}

fn check_image(image: &RgbaImage, layout: &GridLayout) -> Result<(), GridError> {
    let (width, height) = image.dimensions();
    if (width, height) != layout.image_dimensions() {
        return Err(GridError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Draws `thickness` nested outlines just inside `rect`.
fn draw_outline(image: &mut RgbaImage, rect: Rect, thickness: u32, color: Rgba<u8>) {
    for k in 0..thickness.max(1) {
        if rect.width() <= 2 * k || rect.height() <= 2 * k {
            break;
        }
        let inner = Rect::at(rect.left() + k as i32, rect.top() + k as i32)
            .of_size(rect.width() - 2 * k, rect.height() - 2 * k);
        draw_hollow_rect_mut(image, inner, color);
    }
}

impl Drawable for GridLayout {
    fn draw(&self, image: &mut RgbaImage, config: &GridDrawingConfig) -> Result<(), GridError> {
        check_image(image, self)?;
        let area = self.area();
        let thickness = config.line_thickness.max(1);
        let half = (thickness / 2) as i32;

        // Interior vertical lines
        let columns = self.column_boundaries();
        let interior_columns = &columns[1..columns.len() - 1];
        for (index, &x) in interior_columns.iter().enumerate() {
            let line = Rect::at(x as i32 - half, area.top()).of_size(thickness, area.height());
            draw_filled_rect_mut(image, line, config.color_for(index));
        }

        // Interior horizontal lines
        let rows = self.row_boundaries();
        for (index, &y) in rows[1..rows.len() - 1].iter().enumerate() {
            let line = Rect::at(area.left(), y as i32 - half).of_size(area.width(), thickness);
            draw_filled_rect_mut(
                image,
                line,
                config.color_for(interior_columns.len() + index),
            );
        }

        draw_outline(image, area, thickness, config.line_color);
        Ok(())
    }
}

/// A set of selected cells in a layout.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub layout: &'a GridLayout,
    pub indices: &'a [usize],
}

impl<'a> Selection<'a> {
    pub fn new(layout: &'a GridLayout, indices: &'a [usize]) -> Self {
        Self { layout, indices }
    }
}

impl Drawable for Selection<'_> {
    fn draw(&self, image: &mut RgbaImage, config: &GridDrawingConfig) -> Result<(), GridError> {
        check_image(image, self.layout)?;
        for cell in self.layout.select(self.indices) {
            let (_, rect) = cell?;
            draw_outline(image, rect, config.line_thickness, config.selection_color);
        }
        Ok(())
    }
}
