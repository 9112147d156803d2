//! Cell geometry for a chosen grid, and slicing an image along it.

use crate::{GridError, GridSuggestion, SmallVecLine};
use image::{DynamicImage, GenericImageView, ImageFormat};
use imageproc::rect::Rect;
use rayon::prelude::*;
use std::path::Path;
use tracing::*;

/// Which part of the image the grid covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CropMode {
    /// The whole image.
    #[default]
    Original,
    /// The largest centered square.
    Square,
}

/// A `rows` x `cols` grid laid over an image, with cells addressed row-major.
///
/// Cell boundaries are `floor(i * size / count)`, so the cells tile the
/// covered area with no gaps and differ in size by at most one pixel.
///
/// # Example
/// ```
/// use gridslice::GridLayout;
///
/// let layout = GridLayout::new(100, 60, 2, 3).unwrap();
/// assert_eq!(layout.cell_count(), 6);
/// assert_eq!(layout.block_size(), (33, 30));
///
/// let cell = layout.cell(4).unwrap();
/// assert_eq!((cell.left(), cell.top(), cell.width(), cell.height()), (33, 30, 33, 30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridLayout {
    image_width: u32,
    image_height: u32,
    crop_mode: CropMode,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    rows: u32,
    cols: u32,
}

impl GridLayout {
    /// Lays a grid over the whole image.
    ///
    /// # Errors
    /// Returns [`GridError`] if the image has no area, or if `rows`/`cols` is
    /// zero or larger than the pixels available on that axis.
    pub fn new(width: u32, height: u32, rows: u32, cols: u32) -> Result<Self, GridError> {
        Self::with_crop_mode(width, height, rows, cols, CropMode::Original)
    }

    /// Lays a grid over the part of the image selected by `crop_mode`.
    ///
    /// ```
    /// use gridslice::{CropMode, GridLayout};
    ///
    /// let layout = GridLayout::with_crop_mode(400, 300, 2, 2, CropMode::Square).unwrap();
    /// let area = layout.area();
    /// assert_eq!((area.left(), area.top(), area.width(), area.height()), (50, 0, 300, 300));
    /// ```
    pub fn with_crop_mode(
        width: u32,
        height: u32,
        rows: u32,
        cols: u32,
        crop_mode: CropMode,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            error!(
                "Invalid image dimensions: width={}, height={}",
                width, height
            );
            return Err(GridError::InvalidDimensions { width, height });
        }

        let (left, top, area_width, area_height) = match crop_mode {
            CropMode::Original => (0, 0, width, height),
            CropMode::Square => {
                let side = width.min(height);
                ((width - side) / 2, (height - side) / 2, side, side)
            }
        };

        if rows == 0 || cols == 0 || rows > area_height || cols > area_width {
            return Err(GridError::InvalidGrid {
                rows,
                cols,
                width: area_width,
                height: area_height,
            });
        }

        Ok(Self {
            image_width: width,
            image_height: height,
            crop_mode,
            left,
            top,
            width: area_width,
            height: area_height,
            rows,
            cols,
        })
    }

    /// Lays the grid a suggestion proposes over an image.
    pub fn from_suggestion(
        suggestion: &GridSuggestion,
        width: u32,
        height: u32,
        crop_mode: CropMode,
    ) -> Result<Self, GridError> {
        Self::with_crop_mode(width, height, suggestion.rows, suggestion.cols, crop_mode)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn crop_mode(&self) -> CropMode {
        self.crop_mode
    }

    /// Size of the image the layout was built for.
    pub fn image_dimensions(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// The region of the image the grid covers.
    pub fn area(&self) -> Rect {
        Rect::at(self.left as i32, self.top as i32).of_size(self.width, self.height)
    }

    /// Nominal cell size, `(round(width / cols), round(height / rows))`.
    pub fn block_size(&self) -> (u32, u32) {
        (
            (self.width + self.cols / 2) / self.cols,
            (self.height + self.rows / 2) / self.rows,
        )
    }

    /// Image x coordinates of the `cols + 1` column boundaries.
    pub fn column_boundaries(&self) -> SmallVecLine<u32> {
        (0..=self.cols).map(|i| self.column_edge(i)).collect()
    }

    /// Image y coordinates of the `rows + 1` row boundaries.
    pub fn row_boundaries(&self) -> SmallVecLine<u32> {
        (0..=self.rows).map(|i| self.row_edge(i)).collect()
    }

    fn column_edge(&self, i: u32) -> u32 {
        self.left + (i as u64 * self.width as u64 / self.cols as u64) as u32
    }

    fn row_edge(&self, i: u32) -> u32 {
        self.top + (i as u64 * self.height as u64 / self.rows as u64) as u32
    }

    /// Row-major index of the cell at `row`, `col`.
    pub fn index_of(&self, row: u32, col: u32) -> Option<usize> {
        (row < self.rows && col < self.cols)
            .then(|| row as usize * self.cols as usize + col as usize)
    }

    /// Rectangle of the cell at `index`.
    ///
    /// # Errors
    /// Returns [`GridError::CellOutOfRange`] if `index >= cell_count()`.
    pub fn cell(&self, index: usize) -> Result<Rect, GridError> {
        if index >= self.cell_count() {
            return Err(GridError::CellOutOfRange {
                index,
                count: self.cell_count(),
            });
        }
        Ok(self.cell_rect(index))
    }

    fn cell_rect(&self, index: usize) -> Rect {
        let row = (index / self.cols as usize) as u32;
        let col = (index % self.cols as usize) as u32;
        let (x0, x1) = (self.column_edge(col), self.column_edge(col + 1));
        let (y0, y1) = (self.row_edge(row), self.row_edge(row + 1));
        Rect::at(x0 as i32, y0 as i32).of_size(x1 - x0, y1 - y0)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, Rect)> + '_ {
        (0..self.cell_count()).map(|index| (index, self.cell_rect(index)))
    }

    /// Cells for the given indices, in the order given.
    ///
    /// ```
    /// use gridslice::GridLayout;
    ///
    /// let layout = GridLayout::new(90, 90, 3, 3).unwrap();
    /// let picked: Vec<_> = layout.select(&[8, 9]).collect();
    /// assert!(picked[0].is_ok());
    /// assert!(picked[1].is_err());
    /// ```
    pub fn select<'a>(
        &'a self,
        indices: &'a [usize],
    ) -> impl Iterator<Item = Result<(usize, Rect), GridError>> + 'a {
        indices
            .iter()
            .map(move |&index| self.cell(index).map(|rect| (index, rect)))
    }
}

/// File format slices are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExportFormat {
    #[default]
    Png,
    Jpg,
    Webp,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Webp => "webp",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpg => ImageFormat::Jpeg,
            ExportFormat::Webp => ImageFormat::WebP,
        }
    }
}

/// One cell cut out of an image.
#[derive(Debug, Clone)]
pub struct Slice {
    pub index: usize,
    pub row: u32,
    pub col: u32,
    pub image: DynamicImage,
}

impl Slice {
    /// File name for this slice, numbered from 1 by row and column.
    ///
    /// ```
    /// use gridslice::Slice;
    /// use image::DynamicImage;
    ///
    /// let slice = Slice { index: 5, row: 1, col: 2, image: DynamicImage::new_rgba8(1, 1) };
    /// assert_eq!(slice.file_name("sheet", "png"), "sheet_2_3.png");
    /// ```
    pub fn file_name(&self, stem: &str, extension: &str) -> String {
        format!("{}_{}_{}.{}", stem, self.row + 1, self.col + 1, extension)
    }

    /// Writes the slice, with the format taken from the path's extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GridError> {
        self.image
            .save(path)
            .map_err(|e| GridError::ImageWriteError(e.to_string()))
    }

    /// Writes the slice in `format`, regardless of the path's extension.
    ///
    /// JPEG has no alpha channel, so JPEG slices are flattened to RGB first.
    pub fn save_as(&self, path: impl AsRef<Path>, format: ExportFormat) -> Result<(), GridError> {
        let result = match format {
            ExportFormat::Jpg => DynamicImage::ImageRgb8(self.image.to_rgb8())
                .save_with_format(path, format.image_format()),
            _ => self.image.save_with_format(path, format.image_format()),
        };
        result.map_err(|e| GridError::ImageWriteError(e.to_string()))
    }
}

/// Cuts the selected cells out of `image`; every cell when `selection` is `None`.
///
/// Slices come back in index order with duplicates removed.
///
/// # Errors
/// Returns [`GridError`] if the layout was built for a different image size
/// or a selected index is out of range.
pub fn slice_image(
    image: &DynamicImage,
    layout: &GridLayout,
    selection: Option<&[usize]>,
) -> Result<Vec<Slice>, GridError> {
    let (width, height) = image.dimensions();
    if (width, height) != layout.image_dimensions() {
        return Err(GridError::InvalidDimensions { width, height });
    }

    let mut indices: Vec<usize> = match selection {
        Some(selected) => selected.to_vec(),
        None => (0..layout.cell_count()).collect(),
    };
    indices.sort_unstable();
    indices.dedup();
    debug!("Slicing {} of {} cells", indices.len(), layout.cell_count());

    indices
        .into_par_iter()
        .map(|index| -> Result<Slice, GridError> {
            let rect = layout.cell(index)?;
            Ok(Slice {
                index,
                row: index as u32 / layout.cols(),
                col: index as u32 % layout.cols(),
                image: image.crop_imm(
                    rect.left() as u32,
                    rect.top() as u32,
                    rect.width(),
                    rect.height(),
                ),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn rect_parts(rect: Rect) -> (i32, i32, u32, u32) {
        (rect.left(), rect.top(), rect.width(), rect.height())
    }

    #[test]
    fn test_uneven_cells_tile_the_image() {
        let layout = GridLayout::new(100, 100, 3, 3).unwrap();
        assert_eq!(layout.column_boundaries().as_slice(), &[0, 33, 66, 100]);
        assert_eq!(rect_parts(layout.cell(2).unwrap()), (66, 0, 34, 33));
        assert_eq!(rect_parts(layout.cell(8).unwrap()), (66, 66, 34, 34));
    }

    #[test]
    fn test_block_size_rounds() {
        assert_eq!(GridLayout::new(1920, 1080, 3, 4).unwrap().block_size(), (480, 360));
        assert_eq!(GridLayout::new(100, 100, 3, 3).unwrap().block_size(), (33, 33));
        assert_eq!(GridLayout::new(101, 50, 4, 2).unwrap().block_size(), (51, 13));
    }

    #[test]
    fn test_square_crop_centers_cells() {
        let layout = GridLayout::with_crop_mode(400, 300, 2, 2, CropMode::Square).unwrap();
        assert_eq!(rect_parts(layout.cell(0).unwrap()), (50, 0, 150, 150));
        assert_eq!(rect_parts(layout.cell(3).unwrap()), (200, 150, 150, 150));
    }

    #[test]
    fn test_invalid_layouts() {
        assert!(matches!(
            GridLayout::new(0, 10, 1, 1),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            GridLayout::new(10, 10, 0, 2),
            Err(GridError::InvalidGrid { .. })
        ));
        assert!(matches!(
            GridLayout::new(10, 10, 2, 11),
            Err(GridError::InvalidGrid { .. })
        ));
        assert!(matches!(
            GridLayout::with_crop_mode(100, 5, 1, 6, CropMode::Square),
            Err(GridError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn test_cell_out_of_range() {
        let layout = GridLayout::new(10, 10, 2, 2).unwrap();
        assert!(matches!(
            layout.cell(4),
            Err(GridError::CellOutOfRange { index: 4, count: 4 })
        ));
        assert_eq!(layout.index_of(1, 1), Some(3));
        assert_eq!(layout.index_of(2, 0), None);
    }

    #[test]
    fn test_from_suggestion() {
        let suggestion = crate::suggest_grid_dimensions(1920, 1080);
        let layout =
            GridLayout::from_suggestion(&suggestion, 1920, 1080, CropMode::Original).unwrap();
        assert_eq!((layout.rows(), layout.cols()), (3, 4));
    }

    #[test]
    fn test_slice_selected_cells() {
        // Quadrants colored by cell index
        let img = RgbaImage::from_fn(4, 2, |x, y| {
            let index = (y * 2 + x / 2) as u8;
            Rgba([index * 60, 0, 0, 255])
        });
        let img = DynamicImage::ImageRgba8(img);
        let layout = GridLayout::new(4, 2, 2, 2).unwrap();

        let slices = slice_image(&img, &layout, Some(&[3, 0, 3])).unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!((slices[0].index, slices[1].index), (0, 3));
        assert_eq!((slices[1].row, slices[1].col), (1, 1));
        assert_eq!(slices[1].image.dimensions(), (2, 1));
        assert_eq!(slices[1].image.get_pixel(1, 0), Rgba([180, 0, 0, 255]));
    }

    #[test]
    fn test_slice_all_cells() {
        let img = DynamicImage::new_rgba8(30, 20);
        let layout = GridLayout::new(30, 20, 2, 3).unwrap();
        let slices = slice_image(&img, &layout, None).unwrap();
        assert_eq!(slices.len(), 6);
        assert!(slices.iter().all(|s| s.image.dimensions() == (10, 10)));
    }

    #[test]
    fn test_slice_rejects_mismatched_image() {
        let img = DynamicImage::new_rgba8(30, 20);
        let layout = GridLayout::new(20, 20, 2, 2).unwrap();
        assert!(slice_image(&img, &layout, None).is_err());
        let layout = GridLayout::new(30, 20, 2, 2).unwrap();
        assert!(matches!(
            slice_image(&img, &layout, Some(&[7])),
            Err(GridError::CellOutOfRange { .. })
        ));
    }

    #[test]
    fn test_slice_save() {
        let slice = Slice {
            index: 0,
            row: 0,
            col: 0,
            image: DynamicImage::new_rgba8(3, 3),
        };
        let path = std::env::temp_dir().join(slice.file_name("gridslice_test", "png"));
        slice.save(&path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(path).unwrap();
    }

    #[test_case(ExportFormat::Png, ImageFormat::Png ; "png")]
    #[test_case(ExportFormat::Jpg, ImageFormat::Jpeg ; "jpg")]
    #[test_case(ExportFormat::Webp, ImageFormat::WebP ; "webp")]
    fn test_slice_save_as(format: ExportFormat, expected: ImageFormat) {
        let slice = Slice {
            index: 1,
            row: 0,
            col: 1,
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 4, Rgba([20, 140, 60, 128]))),
        };
        let name = slice.file_name("gridslice_test_format", format.extension());
        assert_eq!(name, format!("gridslice_test_format_1_2.{}", format.extension()));

        let path = std::env::temp_dir().join(name);
        slice.save_as(&path, format).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), expected);
        assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (6, 4));
        std::fs::remove_file(path).unwrap();
    }

    proptest! {
        #[test]
        fn test_cells_tile_area_proptest(
            width in 1..500u32,
            height in 1..500u32,
            rows in 1..12u32,
            cols in 1..12u32,
            square in any::<bool>()
        ) {
            let crop = if square { CropMode::Square } else { CropMode::Original };
            let Ok(layout) = GridLayout::with_crop_mode(width, height, rows, cols, crop) else {
                return Ok(());
            };
            let area = layout.area();
            let total: u64 = layout
                .cells()
                .map(|(_, rect)| rect.width() as u64 * rect.height() as u64)
                .sum();
            prop_assert_eq!(total, area.width() as u64 * area.height() as u64);
            for (_, rect) in layout.cells() {
                prop_assert!(rect.left() >= area.left() && rect.right() <= area.right());
                prop_assert!(rect.top() >= area.top() && rect.bottom() <= area.bottom());
            }
        }
    }
}
