use crate::{GridError, PixelBuffer};
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, Rgba, RgbaImage};
use tracing::*;

/// A raster source that can be drawn into an RGBA buffer of a requested size.
///
/// The detector only depends on this capability, so tests can feed it
/// synthetic buffers and applications can plug in their own decoders.
pub trait Rasterizer {
    /// Natural size of the source in pixels.
    fn source_dimensions(&self) -> (u32, u32);

    /// Draws the whole source scaled to `width` x `height`.
    ///
    /// # Errors
    /// Returns [`GridError`] if the source cannot be drawn at that size.
    fn render(&self, width: u32, height: u32) -> Result<PixelBuffer, GridError>;
}

/// Size to render a `width` x `height` source at so its longest side is at most `max_dimension`.
///
/// Sources that already fit are left alone; a `max_dimension` of 0 disables
/// the cap. Each side is rounded independently and kept at least 1.
///
/// # Example
/// ```
/// use gridslice::downsample_dimensions;
///
/// assert_eq!(downsample_dimensions(1600, 1200, 800), (800, 600));
/// assert_eq!(downsample_dimensions(2400, 800, 800), (800, 267));
/// assert_eq!(downsample_dimensions(640, 480, 800), (640, 480));
/// ```
pub fn downsample_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension || width == 0 || height == 0 {
        return (width, height);
    }
    let scale = max_dimension as f64 / longest as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dimension);
    (scaled(width), scaled(height))
}

fn check_render_size(
    (source_width, source_height): (u32, u32),
    width: u32,
    height: u32,
) -> Result<(), GridError> {
    if source_width == 0 || source_height == 0 {
        return Err(GridError::InvalidDimensions {
            width: source_width,
            height: source_height,
        });
    }
    if width == 0 || height == 0 {
        return Err(GridError::RasterizationError(format!(
            "cannot render at {}x{}",
            width, height
        )));
    }
    Ok(())
}

/// Copies or resamples any RGBA view into a buffer of exactly `width` x `height`.
fn resize_rgba<I>(image: &I, width: u32, height: u32) -> PixelBuffer
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    if image.dimensions() == (width, height) {
        return RgbaImage::from_fn(width, height, |x, y| image.get_pixel(x, y)).into();
    }
    trace!(
        "Resizing {}x{} to {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );
    imageops::resize(image, width, height, FilterType::Triangle).into()
}

impl Rasterizer for DynamicImage {
    fn source_dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn render(&self, width: u32, height: u32) -> Result<PixelBuffer, GridError> {
        check_render_size(self.source_dimensions(), width, height)?;
        Ok(resize_rgba(self, width, height))
    }
}

impl Rasterizer for RgbaImage {
    fn source_dimensions(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn render(&self, width: u32, height: u32) -> Result<PixelBuffer, GridError> {
        check_render_size(self.source_dimensions(), width, height)?;
        Ok(resize_rgba(self, width, height))
    }
}

impl Rasterizer for PixelBuffer {
    fn source_dimensions(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn render(&self, width: u32, height: u32) -> Result<PixelBuffer, GridError> {
        check_render_size(self.source_dimensions(), width, height)?;
        if self.dimensions() == (width, height) {
            return Ok(self.clone());
        }
        let image = RgbaImage::try_from(self.clone())?;
        Ok(resize_rgba(&image, width, height))
    }
}
