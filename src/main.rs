use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gridslice::{
    slice_image, suggest_grid_dimensions, CropMode, DetectionConfig, ExportFormat, GridDetector,
    GridLayout, GridSuggestion,
};
use tracing::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gridslice")]
#[command(about = "Suggest a grid for an image and cut it into cells")]
struct Args {
    /// Input image path
    image: PathBuf,

    /// Skip pixel analysis and use the aspect-ratio heuristic only
    #[arg(long)]
    heuristic_only: bool,

    /// Override the suggested row count
    #[arg(long)]
    rows: Option<u32>,

    /// Override the suggested column count
    #[arg(long)]
    cols: Option<u32>,

    /// Longest side the detector scans at
    #[arg(long, default_value_t = 800)]
    max_dimension: u32,

    /// Mean per-channel difference that counts as an edge
    #[arg(long, default_value_t = 40.0)]
    gradient_threshold: f32,

    /// Fraction of a column or row that must be edge pixels
    #[arg(long, default_value_t = 0.3)]
    coverage: f32,

    /// Spacing tolerance as a fraction of the image side
    #[arg(long, default_value_t = 0.05)]
    tolerance: f32,

    /// Scan both axes on the current thread
    #[arg(long)]
    sequential: bool,

    /// Slice the largest centered square instead of the whole image
    #[arg(long)]
    square: bool,

    /// Write an image with the grid drawn on it
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Write the cells as separate images into this directory
    #[arg(long)]
    slice_dir: Option<PathBuf>,

    /// Comma-separated cell indices to export (row-major, from 0); all cells when omitted
    #[arg(long, value_delimiter = ',')]
    select: Vec<usize>,

    /// Image format of the written slices
    #[arg(long, value_enum, default_value_t = FormatArg::Png)]
    format: FormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Png,
    Jpg,
    Webp,
}

impl FormatArg {
    fn to_core(self) -> ExportFormat {
        match self {
            Self::Png => ExportFormat::Png,
            Self::Jpg => ExportFormat::Jpg,
            Self::Webp => ExportFormat::Webp,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let suggestion = run(&args)?;
    println!("{}", suggestion);
    Ok(())
}

/// Suggests a grid for the input image, then writes whatever outputs were asked for.
fn run(args: &Args) -> Result<GridSuggestion> {
    let img = image::open(&args.image)
        .with_context(|| format!("Failed to open image {}", args.image.display()))?;
    let (width, height) = (img.width(), img.height());
    info!("Loaded {} ({}x{})", args.image.display(), width, height);

    let config = DetectionConfig {
        max_dimension: args.max_dimension,
        enable_parallel: !args.sequential,
        ..DetectionConfig::new(args.gradient_threshold, args.coverage, args.tolerance)
    };
    let suggestion = if args.heuristic_only {
        suggest_grid_dimensions(width, height)
    } else {
        GridDetector::new(config).suggest(&img)
    };

    let crop_mode = if args.square {
        CropMode::Square
    } else {
        CropMode::Original
    };
    let rows = args.rows.unwrap_or(suggestion.rows);
    let cols = args.cols.unwrap_or(suggestion.cols);
    let layout = GridLayout::with_crop_mode(width, height, rows, cols, crop_mode)
        .context("Failed to lay out grid")?;
    let (block_width, block_height) = layout.block_size();
    info!(
        "Grid {}x{}, cells of about {}x{} px",
        rows, cols, block_width, block_height
    );

    if let Some(overlay) = &args.overlay {
        write_overlay(&img, &layout, &args.select, overlay)?;
    }

    if let Some(dir) = &args.slice_dir {
        let selection = (!args.select.is_empty()).then_some(args.select.as_slice());
        let slices = slice_image(&img, &layout, selection).context("Failed to slice image")?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let stem = args
            .image
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("slice");
        let format = args.format.to_core();
        for slice in &slices {
            let path = dir.join(slice.file_name(stem, format.extension()));
            slice
                .save_as(&path, format)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        info!("Wrote {} slices to {}", slices.len(), dir.display());
    }

    Ok(suggestion)
}

#[cfg(feature = "drawing")]
fn write_overlay(
    img: &image::DynamicImage,
    layout: &GridLayout,
    selected: &[usize],
    path: &std::path::Path,
) -> Result<()> {
    use gridslice::{debug::save_image_with_selection, drawing::GridDrawingConfig};

    save_image_with_selection(img, layout, selected, path, &GridDrawingConfig::default())
        .with_context(|| format!("Failed to write overlay {}", path.display()))?;
    info!("Wrote overlay to {}", path.display());
    Ok(())
}

#[cfg(not(feature = "drawing"))]
fn write_overlay(
    _img: &image::DynamicImage,
    _layout: &GridLayout,
    _selected: &[usize],
    _path: &std::path::Path,
) -> Result<()> {
    anyhow::bail!("Overlay output needs the `drawing` feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridslice::Confidence;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    /// Writes a 300x300 sheet with black lines every 50px into a fresh temp directory.
    fn write_sheet(dir_name: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(dir_name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let img = RgbaImage::from_fn(300, 300, |x, y| {
            if x % 50 == 0 || y % 50 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let path = dir.join("sheet.png");
        img.save(&path).unwrap();
        (dir, path)
    }

    fn args_for(image: &Path, extra: &[&str]) -> Args {
        let image = image.to_str().unwrap();
        let mut argv = vec!["gridslice", image];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_args_parse_selection() {
        let args = Args::parse_from(["gridslice", "sheet.png", "--select", "0,3,5", "--square"]);
        assert_eq!(args.select, vec![0, 3, 5]);
        assert!(args.square);
        assert_eq!(args.max_dimension, 800);
        assert_eq!(args.format, FormatArg::Png);
    }

    #[test]
    fn test_args_defaults_match_detection_config() {
        let args = Args::parse_from(["gridslice", "sheet.png"]);
        let config = DetectionConfig::new(args.gradient_threshold, args.coverage, args.tolerance);
        assert_eq!(config, DetectionConfig::default());
    }

    #[test]
    fn test_run_detects_and_slices_selection() {
        let (dir, image) = write_sheet("gridslice_cli_select");
        let out = dir.join("cells");
        let out_arg = out.to_str().unwrap().to_owned();
        let args = args_for(&image, &["--slice-dir", &out_arg, "--select", "7,0,7"]);

        let suggestion = run(&args).unwrap();
        assert_eq!((suggestion.rows, suggestion.cols), (6, 6));
        assert_eq!(suggestion.confidence, Confidence::High);
        assert_eq!(file_names(&out), vec!["sheet_1_1.png", "sheet_2_2.png"]);

        let cell = image::open(out.join("sheet_2_2.png")).unwrap();
        assert_eq!((cell.width(), cell.height()), (50, 50));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_run_slices_in_chosen_format() {
        let (dir, image) = write_sheet("gridslice_cli_format");
        let out = dir.join("cells");
        let out_arg = out.to_str().unwrap().to_owned();
        let args = args_for(
            &image,
            &["--slice-dir", &out_arg, "--select", "0,35", "--format", "jpg"],
        );

        run(&args).unwrap();
        assert_eq!(file_names(&out), vec!["sheet_1_1.jpg", "sheet_6_6.jpg"]);
        let bytes = std::fs::read(out.join("sheet_6_6.jpg")).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_args_reject_unknown_format() {
        assert!(Args::try_parse_from(["gridslice", "sheet.png", "--format", "gif"]).is_err());
        let args = Args::parse_from(["gridslice", "sheet.png", "--format", "webp"]);
        assert_eq!(args.format.to_core(), ExportFormat::Webp);
    }

    #[test]
    fn test_run_heuristic_only_with_square_override() {
        let (dir, image) = write_sheet("gridslice_cli_heuristic");
        let out = dir.join("cells");
        let out_arg = out.to_str().unwrap().to_owned();
        let args = args_for(
            &image,
            &["--heuristic-only", "--square", "--rows", "2", "--slice-dir", &out_arg],
        );

        let suggestion = run(&args).unwrap();
        assert_eq!((suggestion.rows, suggestion.cols), (3, 3));
        assert_eq!(suggestion.confidence, Confidence::High);
        // Two rows of the suggested three columns
        assert_eq!(file_names(&out).len(), 6);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[cfg(feature = "drawing")]
    #[test]
    fn test_run_writes_overlay() {
        let (dir, image) = write_sheet("gridslice_cli_overlay");
        let overlay = dir.join("overlay.png");
        let overlay_arg = overlay.to_str().unwrap().to_owned();
        let args = args_for(&image, &["--sequential", "--overlay", &overlay_arg]);

        run(&args).unwrap();
        let drawn = image::open(&overlay).unwrap().to_rgba8();
        assert_eq!(drawn.dimensions(), (300, 300));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_run_reports_bad_input() {
        let missing = std::env::temp_dir().join("gridslice_cli_missing.png");
        let error = run(&args_for(&missing, &[])).unwrap_err();
        assert!(error.to_string().contains("Failed to open image"));

        let (dir, image) = write_sheet("gridslice_cli_bad_select");
        let out = dir.join("cells");
        let out_arg = out.to_str().unwrap().to_owned();
        let args = args_for(&image, &["--slice-dir", &out_arg, "--select", "99"]);
        assert!(run(&args).is_err());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
