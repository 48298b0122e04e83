//! Profiling tool to identify slow pipeline stages

use std::time::{Duration, Instant};

use terrain_forge::coords::{CoordGrid, SampleWindow};
use terrain_forge::erosion::{self, ErosionParams};
use terrain_forge::grid::Shape;
use terrain_forge::noise::{self, FractalParams, Noise, NoiseKind, PermutationTable, WarpParams};
use terrain_forge::seeds::SeedMode;

fn time<T>(label: &str, f: impl FnOnce() -> terrain_forge::Result<T>) -> terrain_forge::Result<(T, Duration)> {
    let start = Instant::now();
    let out = f()?;
    let elapsed = start.elapsed();
    println!("{:<22} {:?}", label, elapsed);
    Ok((out, elapsed))
}

fn main() -> terrain_forge::Result<()> {
    let size = 2048;
    let window = SampleWindow::new(Shape::new(size, size)?, 10.0, (0.0, 0.0), 1.0)?;

    println!("=== Performance Profiling ===");
    println!("Field size: {}x{} ({} cells)", size, size, size * size);
    println!("Rayon threads: {}", rayon::current_num_threads());
    println!();

    let (table, t_table) = time("Permutation table:", || Ok(PermutationTable::new(0)))?;
    let (coords, t_coords) = time("Linear grid:", || Ok(CoordGrid::linear(&window)))?;
    let (_, t_perlin) = time("Perlin:", || Ok(noise::perlin::perlin(&table, &coords)))?;
    let (_, t_simplex) = time("Simplex:", || Ok(noise::simplex::simplex(&table, &coords)))?;

    let fractal = FractalParams::default();
    let perlin = Noise::new(NoiseKind::Perlin, SeedMode::Fixed(0));
    let (mut field, t_fractal) = time("Fractal (4 octaves):", || perlin.sample_fractal(&window, &fractal, None))?;
    let (_, t_warp) = time("Domain warp (1 pass):", || {
        noise::domain_warp(&window, &WarpParams::default(), SeedMode::Fixed(0))
    })?;
    let (_, t_erosion) = time("Erosion:", || erosion::erode(&mut field, &ErosionParams::default()))?;

    let stages = [
        ("Permutation", t_table),
        ("Linear grid", t_coords),
        ("Perlin", t_perlin),
        ("Simplex", t_simplex),
        ("Fractal", t_fractal),
        ("Warp", t_warp),
        ("Erosion", t_erosion),
    ];
    let total: Duration = stages.iter().map(|(_, t)| *t).sum();

    println!("\n=== Summary ===");
    for (name, t) in stages {
        println!(
            "{:<12} {:>8.2}% ({:?})",
            name,
            100.0 * t.as_secs_f64() / total.as_secs_f64(),
            t
        );
    }
    println!("─────────────────────────────────");
    println!("Total:       {:?}", total);
    Ok(())
}
