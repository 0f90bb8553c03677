//! Example: Render aurora frames headlessly and save snapshots.
//!
//! Run with:
//!     cargo run --example render_frames

use aurora_backdrop::{AuroraOptions, FrameRenderer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Aurora Backdrop - Headless Frame Example");
    println!("========================================\n");

    let width = 1280;
    let height = 720;
    let fps = 30.0;
    let seconds = 4.0;

    println!("Setting up renderer...");
    println!("  Resolution: {}x{}", width, height);
    println!("  Frames: {} at {} fps", (seconds * fps) as u32, fps as u32);

    let renderer = FrameRenderer::new(width, height, AuroraOptions::default()).await?;
    println!("  GPU: {}\n", renderer.adapter_info().name);

    let frame_count = (seconds * fps) as u32;
    let snapshot_every = frame_count / 4;

    for frame in 0..frame_count {
        let time = frame as f32 / fps;
        let pixels = renderer.render_frame(time);

        if frame % snapshot_every == 0 {
            let path = format!("aurora_{frame:04}.png");
            image::save_buffer(&path, &pixels, width, height, image::ExtendedColorType::Rgba8)?;
            println!("  t={time:>5.2}s -> {path}");
        }
    }

    println!("\nDone.");
    Ok(())
}
