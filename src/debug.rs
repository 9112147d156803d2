use crate::drawing::*;
use crate::{GridError, GridLayout};
use image::DynamicImage;
use std::path::Path;

/// Saves the image with the grid drawn on it.
///
/// # Arguments
/// * `image` - The input image.
/// * `layout` - The grid to draw.
/// * `output_path` - The path to save the output image.
/// * `config` - The drawing configuration.
///
/// # Errors
/// Returns [`GridError`] if drawing or saving fails.
pub fn save_image_with_grid(
    image: &DynamicImage,
    layout: &GridLayout,
    output_path: impl AsRef<Path>,
    config: &GridDrawingConfig,
) -> Result<(), GridError> {
    save_image_with_selection(image, layout, &[], output_path, config)
}

/// Saves the image with the grid drawn on it and the selected cells outlined.
pub fn save_image_with_selection(
    image: &DynamicImage,
    layout: &GridLayout,
    selected: &[usize],
    output_path: impl AsRef<Path>,
    config: &GridDrawingConfig,
) -> Result<(), GridError> {
    let mut rgba_img = image.to_rgba8();
    layout.draw(&mut rgba_img, config)?;
    Selection::new(layout, selected).draw(&mut rgba_img, config)?;
    rgba_img
        .save(output_path)
        .map_err(|e| GridError::ImageWriteError(e.to_string()))
}
