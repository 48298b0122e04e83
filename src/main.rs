use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use terrain_forge::erosion::ErosionParams;
use terrain_forge::export;
use terrain_forge::heightmap::{self, TerrainConfig, TerrainPreset};
use terrain_forge::noise::NoiseKind;
use terrain_forge::seeds::SeedMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum NoiseArg {
    Perlin,
    Simplex,
    Ridge,
    Billow,
}

#[derive(Parser, Debug)]
#[command(name = "terrain_forge")]
#[command(about = "Generate procedural height-field terrain from layered gradient noise")]
struct Args {
    /// Width of the field in samples
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the field in samples
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Lattice units spanned by the window (higher = more features)
    #[arg(long)]
    scale: Option<f64>,

    /// Zoom factor (>1 zooms in)
    #[arg(long)]
    zoom: Option<f64>,

    /// Noise-space X origin
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f64>,

    /// Noise-space Y origin
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f64>,

    /// Base noise kernel
    #[arg(long, value_enum)]
    noise: Option<NoiseArg>,

    /// Shaping exponent for ridge and billow noise
    #[arg(long, default_value = "1.0")]
    sharpness: f64,

    /// Number of fractal octaves (enables octave summation)
    #[arg(long)]
    octaves: Option<u32>,

    /// Amplitude decay per octave
    #[arg(long)]
    persistence: Option<f64>,

    /// Frequency growth per octave
    #[arg(long)]
    lacunarity: Option<f64>,

    /// Number of domain warp passes (enables warping)
    #[arg(long)]
    warp_count: Option<u32>,

    /// Displacement of the first warp pass
    #[arg(long)]
    warp_strength: Option<f64>,

    /// Warp strength decay per pass (0-1)
    #[arg(long)]
    warp_falloff: Option<f64>,

    /// Erosion factor (enables the erosion filter)
    #[arg(long)]
    erosion: Option<f64>,

    /// Multiplier from noise units to heights
    #[arg(long, allow_hyphen_values = true)]
    height_scale: Option<f64>,

    /// Fixed permutation seed (default 0)
    #[arg(short, long, conflicts_with = "time_seed")]
    seed: Option<u32>,

    /// Seed from the wall clock for fresh terrain on every run
    #[arg(long)]
    time_seed: bool,

    /// Start from a terrain preset
    #[arg(short, long, value_enum)]
    preset: Option<TerrainPreset>,

    /// Load the base configuration from a JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grayscale PNG of the noise field
    #[arg(short, long, default_value = "terrain.png")]
    output: PathBuf,

    /// Colored terrain-class preview PNG
    #[arg(long)]
    color_output: Option<PathBuf>,

    /// Write a plain-text generation report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print a height histogram after generation
    #[arg(long)]
    histogram: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    /// Resolve config file, preset and flag overrides, in that order.
    fn resolve_config(&self) -> terrain_forge::Result<TerrainConfig> {
        let mut config = match &self.config {
            Some(path) => TerrainConfig::load(path)?,
            None => TerrainConfig::default(),
        };

        if let Some(v) = self.width {
            config.width = v;
        }
        if let Some(v) = self.height {
            config.height = v;
        }
        if let Some(v) = self.scale {
            config.scale = v;
        }
        if let Some(v) = self.zoom {
            config.zoom = v;
        }
        if let Some(v) = self.offset_x {
            config.offset.0 = v;
        }
        if let Some(v) = self.offset_y {
            config.offset.1 = v;
        }
        if let Some(v) = self.seed {
            config.seed = SeedMode::Fixed(v);
        }
        if self.time_seed {
            config.seed = SeedMode::Time;
        }

        if let Some(preset) = self.preset {
            config = preset.apply(&config);
        }

        if let Some(noise) = self.noise {
            config.noise = match noise {
                NoiseArg::Perlin => NoiseKind::Perlin,
                NoiseArg::Simplex => NoiseKind::Simplex,
                NoiseArg::Ridge => NoiseKind::Ridge { sharpness: self.sharpness },
                NoiseArg::Billow => NoiseKind::Billow { softness: self.sharpness },
            };
        }

        if self.octaves.is_some() || self.persistence.is_some() || self.lacunarity.is_some() {
            let mut fractal = config.fractal.unwrap_or_default();
            if let Some(v) = self.octaves {
                fractal.octaves = v;
            }
            if let Some(v) = self.persistence {
                fractal.persistence = v;
            }
            if let Some(v) = self.lacunarity {
                fractal.lacunarity = v;
            }
            config.fractal = Some(fractal);
        }

        if self.warp_count.is_some() || self.warp_strength.is_some() || self.warp_falloff.is_some() {
            let mut warp = config.warp.unwrap_or_default();
            if let Some(v) = self.warp_count {
                warp.warp_count = v;
            }
            if let Some(v) = self.warp_strength {
                warp.strength = v;
            }
            if let Some(v) = self.warp_falloff {
                warp.falloff = v;
            }
            config.warp = Some(warp);
        }

        if let Some(v) = self.erosion {
            config.erosion = Some(ErosionParams { erosion_factor: v });
        }
        if let Some(v) = self.height_scale {
            config.height_scale = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> terrain_forge::Result<()> {
    let config = args.resolve_config()?;

    if args.dump_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    println!("Generating terrain with seed: {}", config.seed);
    println!("Map size: {}x{}", config.width, config.height);
    println!("Noise: {} ({})", config.noise, config.noise.description());
    if let Some(fractal) = &config.fractal {
        println!(
            "Fractal: {} octaves (persistence {}, lacunarity {})",
            fractal.octaves, fractal.persistence, fractal.lacunarity
        );
    }
    if let Some(warp) = &config.warp {
        println!(
            "Domain warp: {} passes (strength {}, falloff {})",
            warp.warp_count, warp.strength, warp.falloff
        );
    }
    if let Some(erosion) = &config.erosion {
        println!("Erosion factor: {}", erosion.erosion_factor);
    }

    let terrain = config.generate()?;
    let stats = &terrain.stats;
    println!("Permutation seed: {}", stats.seed);
    println!("Height range: {:.3} to {:.3} (mean {:.3})", stats.min, stats.max, stats.mean);
    println!(
        "Noise: {:?}, erosion: {:?}, total: {:?}",
        stats.noise_time, stats.erosion_time, stats.total_time
    );

    export::save_gray_png(&terrain.noise, &args.output)?;
    println!("Saved noise image to: {}", args.output.display());

    if let Some(path) = &args.color_output {
        export::save_color_png(&terrain.heights, path)?;
        let coverage = export::class_coverage(&export::classify(&terrain.heights));
        println!("Saved terrain preview to: {}", path.display());
        for (class, share) in export::TerrainClass::all().iter().zip(coverage) {
            println!("  {:<9} {:>5.1}%", class.to_string(), 100.0 * share);
        }
    }

    if let Some(path) = &args.report {
        heightmap::write_report(&terrain, path)?;
        println!("Saved report to: {}", path.display());
    }

    if args.histogram {
        heightmap::print_height_histogram(&terrain.heights, 20);
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_forge::noise::{FractalParams, WarpParams};

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("terrain_forge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_resolve_to_default_config() {
        let config = parse(&[]).resolve_config().unwrap();
        assert_eq!(config, TerrainConfig::default());
    }

    #[test]
    fn test_flags_override() {
        let config = parse(&[
            "-W", "64", "-H", "32", "--noise", "ridge", "--sharpness", "2.5", "--octaves", "6",
            "--erosion", "0.5", "--offset-x", "-3.5", "--seed", "7",
        ])
        .resolve_config()
        .unwrap();
        assert_eq!((config.width, config.height), (64, 32));
        assert_eq!(config.noise, NoiseKind::Ridge { sharpness: 2.5 });
        assert_eq!(config.fractal, Some(FractalParams { octaves: 6, ..Default::default() }));
        assert_eq!(config.erosion, Some(ErosionParams { erosion_factor: 0.5 }));
        assert_eq!(config.offset, (-3.5, 0.0));
        assert_eq!(config.seed, SeedMode::Fixed(7));
        assert_eq!(config.warp, None);
    }

    #[test]
    fn test_preset_then_overrides() {
        let config = parse(&["--preset", "mountains", "--warp-count", "2", "-W", "40"])
            .resolve_config()
            .unwrap();
        assert_eq!(config.width, 40);
        assert_eq!(config.noise, NoiseKind::Ridge { sharpness: 2.0 });
        assert_eq!(
            config.warp,
            Some(WarpParams {
                warp_count: 2,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse(&["--scale", "0"]).resolve_config().is_err());
        assert!(parse(&["--octaves", "0"]).resolve_config().is_err());
        assert!(parse(&["--warp-falloff", "2"]).resolve_config().is_err());
        assert!(Args::try_parse_from(["terrain_forge", "--seed", "1", "--time-seed"]).is_err());
    }
}
