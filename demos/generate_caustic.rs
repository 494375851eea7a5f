//! Complete workflow demonstration for toon_ocean
//!
//! Builds a caustic texture, writes it to `caustics.png` (or the path given
//! as the first argument) and shades a few ocean fragments with it.
//!
//! Run with `RUST_LOG=debug` to see the relax passes and build timings.

use toon_ocean::*;

fn main() -> Result<()> {
    env_logger::init();
    let output = std::env::args().nth(1).unwrap_or_else(|| "caustics.png".to_string());

    println!("=== toon_ocean Caustic Demo ===\n");

    // Step 1: Configure
    println!("Step 1: Configuring...");
    let config = CausticConfigBuilder::new()
        .seed(12345)
        .point_count(10)?
        .size(512, 512)?
        .build()?;

    println!("  Seed: {}", config.seed);
    println!("  Size: {}x{}", config.width, config.height);
    println!("  Gap: {:.2}px", config.target_gap());
    println!("  Relax passes: {}", config.relax_iterations);

    // Step 2: Inspect the mask
    println!("\nStep 2: Composing mask...");
    let mut generator = CausticGenerator::new(config);
    let mask = generator.compose(config.point_count)?;
    println!("  Polygons: {} ({} visible)", mask.polygon_count(), mask.visible_polygons().count());
    println!("  Filled area: {:.0}px²", mask.filled_area());
    for step in mask.steps() {
        println!("  Filter: {:?}", step);
    }

    // Step 3: Build the texture in the background
    println!("\nStep 3: Rendering texture...");
    let texture = generator.generate()?;
    println!("  Ready before wait: {}", texture.is_ready());
    texture.wait_ready()?;
    println!("  Ready: {} (update pending: {})", texture.is_ready(), texture.needs_update());

    let bitmap = texture.bitmap();
    let dark = bitmap.pixels().filter(|p| p[0] < 128).count();
    let pct = dark as f32 / (bitmap.width() * bitmap.height()) as f32 * 100.0;
    println!("  Caustic coverage: {:.1}%", pct);

    texture.save_png(&output)?;
    println!("  Saved {}", output);

    // Step 4: Shade a few fragments from shore to open water
    println!("\nStep 4: Ocean fragments:");
    let shader = OceanShader::new(OceanParams::toon_preset(), texture.clone());
    let depth = DepthFrame::uniform(64, 64, 12.0, 0.1, 50.0)?;
    for surface_depth in [11.95, 11.8, 10.0, 6.0, 2.0] {
        let frag = OceanFragment {
            uv: Vec2::new(0.25, 0.75),
            frag_coord: Vec2::new(32.0, 32.0),
            surface_depth,
            time_ms: 1000.0,
        };
        let color = shader.shade(&frag, &depth);
        println!(
            "  water {:>5.2} -> rgba({:.2}, {:.2}, {:.2}, {:.2})",
            12.0 - surface_depth,
            color.x,
            color.y,
            color.z,
            color.w
        );
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
