use crate::GridError;
use image::RgbaImage;

/// Interleaved RGBA samples of a rectangular image, row-major.
///
/// # Example
/// ```
/// use gridslice::PixelBuffer;
///
/// let buffer = PixelBuffer::from_fn(4, 2, |x, _y| [x as u8 * 60, 0, 0, 255]);
/// assert_eq!(buffer.dimensions(), (4, 2));
/// assert_eq!(buffer.rgb(3, 1), [180, 0, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Samples per pixel.
    pub const CHANNELS: usize = 4;

    /// Wraps raw RGBA samples, checking that the length matches the dimensions.
    ///
    /// ```
    /// use gridslice::PixelBuffer;
    ///
    /// assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
    /// assert!(PixelBuffer::from_raw(2, 2, vec![0; 12]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, GridError> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return Err(GridError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a buffer by evaluating `f` for every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * Self::CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Red, green and blue samples of the pixel at `(x, y)`.
    ///
    /// Panics if the coordinates are outside the buffer.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

impl TryFrom<PixelBuffer> for RgbaImage {
    type Error = GridError;

    fn try_from(buffer: PixelBuffer) -> Result<Self, Self::Error> {
        let (width, height) = buffer.dimensions();
        RgbaImage::from_raw(width, height, buffer.data)
            .ok_or(GridError::InvalidDimensions { width, height })
    }
}

/// Mean absolute per-channel difference between two pixels, ignoring alpha.
///
/// ```
/// use gridslice::channel_gradient;
///
/// assert_eq!(channel_gradient([255, 255, 255], [0, 0, 0]), 255.0);
/// assert_eq!(channel_gradient([90, 0, 0], [0, 0, 90]), 60.0);
/// ```
#[inline]
pub fn channel_gradient(a: [u8; 3], b: [u8; 3]) -> f32 {
    let sum: u32 = a
        .iter()
        .zip(b.iter())
        .map(|(&p, &q)| p.abs_diff(q) as u32)
        .sum();
    sum as f32 / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_raw_rejects_short_buffer() {
        let err = PixelBuffer::from_raw(3, 3, vec![0; 35]).unwrap_err();
        assert!(matches!(
            err,
            GridError::BufferSizeMismatch {
                expected: 36,
                actual: 35,
                ..
            }
        ));
    }

    #[test]
    fn test_rgba_image_round_trip() {
        let img = RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let buffer = PixelBuffer::from(img.clone());
        assert_eq!(buffer.rgb(4, 2), [4, 2, 7]);
        let back = RgbaImage::try_from(buffer).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_gradient_ignores_alpha_and_sign() {
        assert_eq!(channel_gradient([10, 20, 30], [40, 20, 0]), 20.0);
        assert_eq!(channel_gradient([40, 20, 0], [10, 20, 30]), 20.0);
    }
}
