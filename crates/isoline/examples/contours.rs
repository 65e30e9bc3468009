//! Draw contours of a synthetic temperature field on a headless device.
//!
//! Run with `RUST_LOG=isoline=debug cargo run --example contours` to see the
//! texture and palette rebuilds.

use std::sync::Arc;

use isoline::prelude::*;
use tracing_subscriber::EnvFilter;

const WIDTH: u32 = 360;
const HEIGHT: u32 = 180;

/// Temperature falling off with latitude plus a zonal wave, in °C.
fn temperature_field() -> Result<TextureData, Box<dyn std::error::Error>> {
    let mut data = Vec::with_capacity((WIDTH * HEIGHT) as usize);
    for row in 0..HEIGHT {
        let lat = 89.5 - row as f32;
        for col in 0..WIDTH {
            let lon = -179.5 + col as f32;
            let base = 30.0 - 50.0 * (lat.to_radians().sin()).powi(2);
            data.push(base + 4.0 * (3.0 * lon.to_radians()).cos());
        }
    }
    Ok(TextureData::float32(WIDTH, HEIGHT, data)?)
}

const PALETTE: &str = "\
# °C
-20 navy
0 #4a90d9
15 white
30 orange
40 red
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("isoline=info")),
        )
        .init();

    let device = Arc::new(HeadlessDevice::new());
    let ctx = LayerContext::new(device.clone());

    let field = Arc::new(temperature_field()?);
    let props = ContourLayerProps::new("temperature")
        .with_image(Some(field))
        .with_palette(Some(Arc::new(PaletteSpec::from(PALETTE))))
        .with_interval(5.0)
        .with_major_interval(20.0)
        .with_width(1.5);

    let mut layer = LayerInstance::new(ContourLayer::new());
    layer.update(&ctx, props.clone())?;

    for (zoom, viewport) in [
        (2.0, Viewport::flat(2.0)),
        (4.0, Viewport::globe(4.0)),
        (12.0, Viewport::flat(12.0)),
    ] {
        let outcome = layer.draw(&ctx, &FrameContext::new(viewport))?;
        println!("zoom {zoom:>4}: {outcome:?}");
    }

    for (lon, lat) in [(0.0, 0.0), (90.0, 45.0), (-170.0, -70.0)] {
        match ContourLayer::raster_value_at(&props, lon, lat) {
            Some(picked) => println!("{lon:>7}, {lat:>5}: {:.1} °C", picked.value),
            None => println!("{lon:>7}, {lat:>5}: no data"),
        }
    }

    println!(
        "{} textures created, {} draw calls",
        device.textures_created(),
        device.draw_count()
    );
    Ok(())
}
