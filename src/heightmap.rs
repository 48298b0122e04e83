//! Terrain generation pipeline
//!
//! Data flow: sampling window -> optional domain warp -> kernel -> optional
//! octave sum -> optional erosion -> height scale. [`TerrainConfig`] holds
//! every knob and is loadable from JSON; [`TerrainConfig::generate`] runs the
//! whole chain and returns both the raw noise and the scaled heights.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::coords::SampleWindow;
use crate::erosion::{self, ErosionParams};
use crate::error::{Result, TerrainError};
use crate::grid::{Field, Shape};
use crate::noise::{FractalParams, Noise, NoiseKind, WarpParams};
use crate::seeds::SeedMode;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Full description of one terrain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Rows of the output field
    pub height: usize,
    /// Columns of the output field
    pub width: usize,
    /// Lattice units spanned by the window (higher = more features)
    pub scale: f64,
    /// Noise-space origin of the window (x, y)
    pub offset: (f64, f64),
    /// Zoom factor; >1 zooms in, <1 zooms out
    pub zoom: f64,
    /// Base kernel
    pub noise: NoiseKind,
    /// Octave stack; `None` samples the kernel once
    pub fractal: Option<FractalParams>,
    /// Domain warp applied before every kernel evaluation
    pub warp: Option<WarpParams>,
    /// Erosion filter applied to the finished noise
    pub erosion: Option<ErosionParams>,
    /// Multiplier from noise units to output heights
    pub height_scale: f64,
    /// Permutation seeding
    pub seed: SeedMode,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height: 100,
            width: 100,
            scale: 10.0,
            offset: (0.0, 0.0),
            zoom: 1.0,
            noise: NoiseKind::Perlin,
            fractal: None,
            warp: None,
            erosion: None,
            height_scale: 10.0,
            seed: SeedMode::Fixed(0),
        }
    }
}

impl TerrainConfig {
    pub fn shape(&self) -> Result<Shape> {
        Shape::new(self.height, self.width)
    }

    pub fn window(&self) -> Result<SampleWindow> {
        SampleWindow::new(self.shape()?, self.scale, self.offset, self.zoom)
    }

    /// Check every stage's parameters without generating anything.
    pub fn validate(&self) -> Result<()> {
        self.window()?;
        if let Some(fractal) = &self.fractal {
            fractal.validate()?;
        }
        if let Some(warp) = &self.warp {
            warp.validate()?;
        }
        if let Some(erosion) = &self.erosion {
            erosion.validate()?;
        }
        match self.noise {
            NoiseKind::Ridge { sharpness: p } | NoiseKind::Billow { softness: p }
                if !(p.is_finite() && p > 0.0) =>
            {
                return Err(TerrainError::InvalidShaping(p));
            }
            _ => {}
        }
        if !self.height_scale.is_finite() {
            return Err(TerrainError::InvalidHeightScale(self.height_scale));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON config file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json_string()?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Run the pipeline.
    pub fn generate(&self) -> Result<Terrain> {
        self.validate()?;
        let window = self.window()?;
        let start = Instant::now();

        let kernel = Noise::new(self.noise, self.seed);
        tracing::debug!(
            shape = %window.shape,
            kind = %self.noise,
            seed = kernel.table().seed(),
            fractal = self.fractal.is_some(),
            warp = self.warp.is_some(),
            "sampling noise"
        );

        let mut noise = match &self.fractal {
            Some(params) => kernel.sample_fractal(&window, params, self.warp.as_ref())?,
            None => kernel.sample(&window, self.warp.as_ref())?,
        };
        let noise_time = start.elapsed();

        let erosion_start = Instant::now();
        if let Some(params) = &self.erosion {
            erosion::erode(&mut noise, params)?;
        }
        let erosion_time = erosion_start.elapsed();

        let mut heights = noise.clone();
        heights.scale(self.height_scale);

        let (min, max) = heights.min_max();
        let stats = GenerationStats {
            seed: kernel.table().seed(),
            noise_time,
            erosion_time,
            total_time: start.elapsed(),
            min,
            max,
            mean: heights.mean(),
        };
        tracing::info!(
            shape = %window.shape,
            min = stats.min,
            max = stats.max,
            elapsed_ms = stats.total_time.as_millis() as u64,
            "terrain generated"
        );

        Ok(Terrain {
            config: self.clone(),
            noise,
            heights,
            stats,
        })
    }
}

// =============================================================================
// PRESETS
// =============================================================================

/// Ready-made terrain styles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TerrainPreset {
    /// Low, gentle rolling ground
    Plains,
    /// Balanced fractal Perlin with light erosion
    #[default]
    Hills,
    /// Sharp ridged ranges, heavily eroded
    Mountains,
    /// Warped billows carved into channels
    Canyons,
}

impl TerrainPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Plains, Self::Hills, Self::Mountains, Self::Canyons]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Plains => "Low, gentle rolling ground",
            Self::Hills => "Balanced hills with light erosion",
            Self::Mountains => "Sharp ridged ranges",
            Self::Canyons => "Warped, carved channels",
        }
    }

    /// Preset config; size, window and seed come from `base`.
    pub fn apply(&self, base: &TerrainConfig) -> TerrainConfig {
        let styled = match self {
            Self::Plains => TerrainConfig {
                noise: NoiseKind::Perlin,
                fractal: Some(FractalParams {
                    octaves: 3,
                    persistence: 0.4,
                    lacunarity: 2.0,
                }),
                warp: None,
                erosion: None,
                height_scale: 4.0,
                ..TerrainConfig::default()
            },
            Self::Hills => TerrainConfig {
                noise: NoiseKind::Perlin,
                fractal: Some(FractalParams::default()),
                warp: None,
                erosion: Some(ErosionParams::default()),
                height_scale: 10.0,
                ..TerrainConfig::default()
            },
            Self::Mountains => TerrainConfig {
                noise: NoiseKind::Ridge { sharpness: 2.0 },
                fractal: Some(FractalParams {
                    octaves: 6,
                    persistence: 0.5,
                    lacunarity: 2.0,
                }),
                warp: None,
                erosion: Some(ErosionParams { erosion_factor: 1.0 }),
                height_scale: 25.0,
                ..TerrainConfig::default()
            },
            Self::Canyons => TerrainConfig {
                noise: NoiseKind::Billow { softness: 0.6 },
                fractal: Some(FractalParams {
                    octaves: 5,
                    persistence: 0.55,
                    lacunarity: 2.0,
                }),
                warp: Some(WarpParams {
                    warp_count: 2,
                    strength: 0.8,
                    falloff: 0.5,
                    fractal: FractalParams {
                        octaves: 3,
                        ..FractalParams::default()
                    },
                }),
                erosion: Some(ErosionParams { erosion_factor: 1.2 }),
                height_scale: 18.0,
                ..TerrainConfig::default()
            },
        };
        TerrainConfig {
            height: base.height,
            width: base.width,
            scale: base.scale,
            offset: base.offset,
            zoom: base.zoom,
            seed: base.seed,
            ..styled
        }
    }
}

impl std::fmt::Display for TerrainPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plains => write!(f, "plains"),
            Self::Hills => write!(f, "hills"),
            Self::Mountains => write!(f, "mountains"),
            Self::Canyons => write!(f, "canyons"),
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Timing and range summary of one generation run
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationStats {
    /// Seed the kernel's permutation table was built from
    pub seed: u32,
    pub noise_time: Duration,
    pub erosion_time: Duration,
    pub total_time: Duration,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Result of [`TerrainConfig::generate`]
#[derive(Clone, Debug)]
pub struct Terrain {
    pub config: TerrainConfig,
    /// Unscaled noise after warp, octaves and erosion
    pub noise: Field,
    /// `noise * height_scale`; rows are noise-space Y, columns noise-space X
    pub heights: Field,
    pub stats: GenerationStats,
}

/// Equal-width bins over a field's realized range.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightHistogram {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub bins: Vec<usize>,
}

impl HeightHistogram {
    /// Bin count is clamped to 5..=50.
    pub fn new(field: &Field, num_bins: usize) -> Self {
        let num_bins = num_bins.clamp(5, 50);
        let mut heights: Vec<f64> = field.as_slice().to_vec();
        let count = heights.len();

        let (min, max) = field.min_max();
        let mean = field.mean();
        let variance = heights.iter().map(|h| (h - mean) * (h - mean)).sum::<f64>() / count as f64;

        heights.sort_by(|a, b| a.total_cmp(b));
        let median = if count % 2 == 0 {
            (heights[count / 2 - 1] + heights[count / 2]) / 2.0
        } else {
            heights[count / 2]
        };

        let range = max - min;
        let mut bins = vec![0usize; num_bins];
        for h in &heights {
            let idx = if range > 0.0 {
                ((h - min) / range * num_bins as f64) as usize
            } else {
                0
            };
            bins[idx.min(num_bins - 1)] += 1;
        }

        Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
            bins,
        }
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.bins.len() as f64
    }
}

impl std::fmt::Display for HeightHistogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count: usize = self.bins.iter().sum();
        let max_bin = self.bins.iter().copied().max().unwrap_or(1).max(1);
        let bar_max_width = 40;

        writeln!(f, "Min: {:>9.3}   Max: {:>9.3}   Range: {:>9.3}", self.min, self.max, self.max - self.min)?;
        writeln!(f, "Mean: {:>8.3}   Median: {:>6.3}   Std Dev: {:>7.3}", self.mean, self.median, self.std_dev)?;
        for (i, &n) in self.bins.iter().enumerate() {
            let start = self.min + i as f64 * self.bin_width();
            let bar = "█".repeat(n * bar_max_width / max_bin);
            let pct = 100.0 * n as f64 / count.max(1) as f64;
            writeln!(f, "{:>9.3} │{:<40}│{:>5.1}%", start, bar, pct)?;
        }
        Ok(())
    }
}

/// Print a height histogram to stdout.
pub fn print_height_histogram(field: &Field, num_bins: usize) {
    println!("\n=== Height Distribution ===");
    print!("{}", HeightHistogram::new(field, num_bins));
}

/// Write a plain-text summary of a generated terrain.
pub fn write_report(terrain: &Terrain, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    let config = &terrain.config;

    writeln!(file, "=== TERRAIN REPORT ===")?;
    writeln!(file, "Generated: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file, "Size: {}x{}", config.width, config.height)?;
    writeln!(file, "Noise: {}", config.noise)?;
    writeln!(file, "Seed: {} ({})", terrain.stats.seed, config.seed)?;
    writeln!(file, "Window: scale {} zoom {} offset ({}, {})", config.scale, config.zoom, config.offset.0, config.offset.1)?;
    if let Some(fractal) = &config.fractal {
        writeln!(
            file,
            "Fractal: {} octaves, persistence {}, lacunarity {}",
            fractal.octaves, fractal.persistence, fractal.lacunarity
        )?;
    }
    if let Some(warp) = &config.warp {
        writeln!(file, "Warp: {} passes, strength {}, falloff {}", warp.warp_count, warp.strength, warp.falloff)?;
    }
    if let Some(erosion) = &config.erosion {
        writeln!(file, "Erosion: factor {}", erosion.erosion_factor)?;
    }
    writeln!(file, "Timing: noise {:?}, erosion {:?}, total {:?}",
        terrain.stats.noise_time, terrain.stats.erosion_time, terrain.stats.total_time)?;
    writeln!(file)?;
    write!(file, "{}", HeightHistogram::new(&terrain.heights, 20))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(noise: NoiseKind) -> TerrainConfig {
        TerrainConfig {
            height: 24,
            width: 32,
            scale: 6.0,
            noise,
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_perlin_matches_kernel_times_height_scale() {
        let config = small(NoiseKind::Perlin);
        let terrain = config.generate().unwrap();
        let direct = Noise::new(NoiseKind::Perlin, SeedMode::Fixed(0))
            .sample(&config.window().unwrap(), None)
            .unwrap();
        assert_eq!(terrain.noise, direct);
        for (n, h) in terrain.noise.as_slice().iter().zip(terrain.heights.as_slice()) {
            assert_eq!(n * 10.0, *h);
        }
        assert_eq!(terrain.stats.seed, 0);
    }

    #[test]
    fn test_full_pipeline_reproducible_and_finite() {
        let config = TerrainConfig {
            fractal: Some(FractalParams::default()),
            warp: Some(WarpParams::default()),
            erosion: Some(ErosionParams::default()),
            ..small(NoiseKind::Simplex)
        };
        let a = config.generate().unwrap();
        let b = config.generate().unwrap();
        assert_eq!(a.heights, b.heights);
        assert!(a.heights.is_finite());
        assert_eq!(a.heights.shape(), Shape::new(24, 32).unwrap());
    }

    #[test]
    fn test_every_preset_generates() {
        let base = TerrainConfig {
            height: 16,
            width: 16,
            ..Default::default()
        };
        for preset in TerrainPreset::all() {
            let config = preset.apply(&base);
            assert_eq!((config.height, config.width), (16, 16));
            let terrain = config.generate().unwrap();
            assert!(terrain.heights.is_finite(), "{} produced non-finite heights", preset);
        }
    }

    #[test]
    fn test_rejects_invalid_config_before_work() {
        let bad = [
            TerrainConfig { width: 0, ..Default::default() },
            TerrainConfig { scale: 0.0, ..Default::default() },
            TerrainConfig { zoom: -1.0, ..Default::default() },
            TerrainConfig { height_scale: f64::NAN, ..Default::default() },
            TerrainConfig { noise: NoiseKind::Billow { softness: 0.0 }, ..Default::default() },
            TerrainConfig {
                erosion: Some(ErosionParams { erosion_factor: -1.0 }),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.generate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_json_defaults_and_round_trip() {
        let config = TerrainConfig::from_json_str(
            r#"{"width": 64, "noise": {"type": "ridge", "sharpness": 1.5}, "seed": {"fixed": 9}}"#,
        )
        .unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.height, 100);
        assert_eq!(config.noise, NoiseKind::Ridge { sharpness: 1.5 });
        assert_eq!(config.seed, SeedMode::Fixed(9));

        let json = config.to_json_string().unwrap();
        assert_eq!(TerrainConfig::from_json_str(&json).unwrap(), config);

        assert!(matches!(
            TerrainConfig::from_json_str(r#"{"scale": -3.0}"#),
            Err(TerrainError::InvalidScale(_))
        ));
        assert!(matches!(
            TerrainConfig::from_json_str("{not json"),
            Err(TerrainError::Config(_))
        ));
    }

    #[test]
    fn test_histogram() {
        let field = Field::from_vec(Shape::new(2, 5).unwrap(), (0..10).map(|v| v as f64).collect()).unwrap();
        let hist = HeightHistogram::new(&field, 5);
        assert_eq!(hist.bins, vec![2, 2, 2, 2, 2]);
        assert_eq!(hist.median, 4.5);
        assert_eq!(hist.mean, 4.5);

        let flat = Field::new_with(Shape::new(3, 3).unwrap(), 1.0);
        let hist = HeightHistogram::new(&flat, 1);
        assert_eq!(hist.bins.len(), 5);
        assert_eq!(hist.bins[0], 9);
        assert!(!hist.to_string().is_empty());
    }

    #[test]
    fn test_config_and_report_files() {
        let dir = std::env::temp_dir().join(format!("terrain_forge_heightmap_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let config = TerrainPreset::Hills.apply(&TerrainConfig {
            height: 12,
            width: 12,
            ..Default::default()
        });
        config.save(dir.join("config.json")).unwrap();
        assert_eq!(TerrainConfig::load(dir.join("config.json")).unwrap(), config);

        let terrain = config.generate().unwrap();
        write_report(&terrain, dir.join("report.txt")).unwrap();
        let report = std::fs::read_to_string(dir.join("report.txt")).unwrap();
        assert!(report.contains("Size: 12x12"));
        assert!(report.contains("Erosion: factor 0.8"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
