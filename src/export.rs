use std::path::Path;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use rayon::prelude::*;

use crate::error::Result;
use crate::grid::{Field, Grid, Shape};

// =============================================================================
// GRAYSCALE INTERCHANGE
// =============================================================================

/// Map a noise value in [-1, 1] to an 8-bit gray level.
/// Out-of-range values saturate at 0 or 255.
#[inline]
pub fn gray_level(value: f64) -> u8 {
    let level = (value + 1.0) / 2.0 * 255.0;
    if level.is_nan() {
        return 0;
    }
    level.clamp(0.0, 255.0) as u8
}

/// Render a noise field as a grayscale image, one pixel per cell.
pub fn to_gray_image(field: &Field) -> GrayImage {
    ImageBuffer::from_fn(field.width as u32, field.height as u32, |x, y| {
        Luma([gray_level(*field.get(x as usize, y as usize))])
    })
}

/// Rebuild a height field from an image.
///
/// RGB channels are averaged, mapped from [0, 255] back to [-1, 1] and
/// multiplied by `height_scale`. Grayscale input behaves like three equal
/// channels.
pub fn field_from_image(image: &DynamicImage, height_scale: f64) -> Result<Field> {
    let rgb = image.to_rgb8();
    let shape = Shape::new(rgb.height() as usize, rgb.width() as usize)?;

    let data: Vec<f64> = rgb
        .as_raw()
        .par_chunks_exact(3)
        .map(|px| {
            let mean = (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0 / 255.0;
            (2.0 * mean - 1.0) * height_scale
        })
        .collect();

    Grid::from_vec(shape, data)
}

/// Save a noise field as a grayscale PNG.
pub fn save_gray_png(field: &Field, path: impl AsRef<Path>) -> Result<()> {
    to_gray_image(field).save(path.as_ref())?;
    Ok(())
}

/// Load an image file as a height field. See [`field_from_image`].
pub fn load_height_field(path: impl AsRef<Path>, height_scale: f64) -> Result<Field> {
    let image = image::open(path.as_ref())?;
    field_from_image(&image, height_scale)
}

// =============================================================================
// TERRAIN CLASSES
// =============================================================================

/// Coarse height bands used for preview coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TerrainClass {
    #[default]
    Water,
    Grass,
    Mountain,
    Snow,
}

impl TerrainClass {
    /// Band boundaries as fractions of the realized height range.
    pub const THRESHOLDS: [f64; 3] = [0.2, 0.5, 0.8];

    pub fn all() -> &'static [Self] {
        &[Self::Water, Self::Grass, Self::Mountain, Self::Snow]
    }

    /// Classify a height against the range `[min, max]`.
    pub fn classify(height: f64, min: f64, max: f64) -> Self {
        let range = max - min;
        let [t1, t2, t3] = Self::THRESHOLDS.map(|t| min + t * range);
        if height < t1 {
            Self::Water
        } else if height < t2 {
            Self::Grass
        } else if height < t3 {
            Self::Mountain
        } else {
            Self::Snow
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Water => [70, 130, 180],     // Steel blue
            Self::Grass => [34, 139, 34],      // Forest green
            Self::Mountain => [205, 133, 63],  // Peru
            Self::Snow => [255, 250, 250],     // Snow
        }
    }
}

impl std::fmt::Display for TerrainClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Water => write!(f, "water"),
            Self::Grass => write!(f, "grass"),
            Self::Mountain => write!(f, "mountain"),
            Self::Snow => write!(f, "snow"),
        }
    }
}

/// Classify every cell against the field's own height range.
pub fn classify(field: &Field) -> Grid<TerrainClass> {
    let (min, max) = field.min_max();
    field.map(|&h| TerrainClass::classify(h, min, max))
}

/// Fraction of cells in each class, in [`TerrainClass::all`] order.
pub fn class_coverage(classes: &Grid<TerrainClass>) -> [f64; 4] {
    let mut counts = [0usize; 4];
    for &class in classes.as_slice() {
        counts[class as usize] += 1;
    }
    let total = classes.as_slice().len().max(1) as f64;
    counts.map(|c| c as f64 / total)
}

/// Render a height field with the four-band terrain palette.
pub fn to_color_image(field: &Field) -> RgbImage {
    let classes = classify(field);
    ImageBuffer::from_fn(field.width as u32, field.height as u32, |x, y| {
        Rgb(classes.get(x as usize, y as usize).color())
    })
}

/// Save the terrain palette preview as a PNG.
pub fn save_color_png(field: &Field, path: impl AsRef<Path>) -> Result<()> {
    to_color_image(field).save(path.as_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerrainError;

    fn field(rows: &[&[f64]]) -> Field {
        let shape = Shape::new(rows.len(), rows[0].len()).unwrap();
        Grid::from_vec(shape, rows.iter().flat_map(|r| r.iter().copied()).collect()).unwrap()
    }

    #[test]
    fn test_gray_levels() {
        assert_eq!(gray_level(-1.0), 0);
        assert_eq!(gray_level(1.0), 255);
        assert_eq!(gray_level(0.0), 127);
        assert_eq!(gray_level(3.0), 255);
        assert_eq!(gray_level(-7.0), 0);
        assert_eq!(gray_level(f64::NAN), 0);
    }

    #[test]
    fn test_gray_image_layout() {
        let f = field(&[&[-1.0, 1.0, 0.0], &[1.0, -1.0, 1.0]]);
        let img = to_gray_image(&f);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(1, 0)[0], 255);
        assert_eq!(img.get_pixel(1, 1)[0], 0);
    }

    #[test]
    fn test_field_from_rgb_image_averages_channels() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([255, 0, 0]));
        let f = field_from_image(&DynamicImage::ImageRgb8(img), 10.0).unwrap();
        assert_eq!(f.shape(), Shape::new(1, 2).unwrap());
        assert!((f.get(0, 0) - 10.0).abs() < 1e-12);
        // mean 85/255 = 1/3 -> 2/3 - 1 = -1/3
        assert!((f.get(1, 0) + 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_gray_round_trip_within_quantization() {
        let f = field(&[&[-0.9, -0.25, 0.0], &[0.4, 0.75, 1.0]]);
        let back = field_from_image(&DynamicImage::ImageLuma8(to_gray_image(&f)), 1.0).unwrap();
        for (a, b) in f.as_slice().iter().zip(back.as_slice()) {
            assert!((a - b).abs() <= 2.0 / 255.0 + 1e-12);
        }
    }

    #[test]
    fn test_classification_bands() {
        let f = field(&[&[0.0, 0.19, 0.2, 0.49], &[0.5, 0.79, 0.8, 1.0]]);
        let classes = classify(&f);
        use TerrainClass::*;
        assert_eq!(
            classes.as_slice(),
            &[Water, Water, Grass, Grass, Mountain, Mountain, Snow, Snow]
        );
        assert_eq!(class_coverage(&classes), [0.25; 4]);
    }

    #[test]
    fn test_color_image_palette() {
        let f = field(&[&[-5.0, 5.0]]);
        let img = to_color_image(&f);
        assert_eq!(img.get_pixel(0, 0).0, [70, 130, 180]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 250, 250]);
    }

    #[test]
    fn test_png_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("terrain_forge_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("noise.png");

        let f = field(&[&[-1.0, 1.0], &[1.0, -1.0]]);
        save_gray_png(&f, &path).unwrap();
        let back = load_height_field(&path, 2.0).unwrap();
        assert_eq!(back.as_slice(), &[-2.0, 2.0, 2.0, -2.0]);

        assert!(matches!(
            load_height_field(dir.join("missing.png"), 1.0),
            Err(TerrainError::Image(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
