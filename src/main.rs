use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{ info, LevelFilter };

use whitted::camera::Camera;
use whitted::canvas::PpmImage;
use whitted::color::Color;
use whitted::consts::DEFAULT_OUT_FILE;
use whitted::scene::SceneFile;
use whitted::tracer::SimpleRayTracer;

/// Renders a JSON scene description to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Scene description file
    #[clap(parse(from_os_str))]
    scene: PathBuf,

    /// Output image
    #[clap(short, long, parse(from_os_str), default_value = DEFAULT_OUT_FILE)]
    output: PathBuf,

    /// Render threads, 0 renders on the main thread (overrides the scene)
    #[clap(short, long)]
    threads: Option<usize>,

    /// Anti-aliasing rays per pixel side (overrides the scene)
    #[clap(short, long)]
    rays: Option<usize>,

    /// Draw a white grid every N pixels over the render
    #[clap(long)]
    grid: Option<usize>,

    /// Log level; RUST_LOG takes precedence
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    let SceneFile { scene, camera: settings } = SceneFile::load(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;

    let camera = Camera::builder()
        .location(settings.location)
        .direction(settings.to, settings.up)
        .vp_size(settings.vp_width, settings.vp_height)
        .vp_distance(settings.vp_distance)
        .image_writer(PpmImage::new(args.output.clone(), settings.width, settings.height))
        .ray_tracer(SimpleRayTracer::new(scene))
        .number_of_rays(args.rays.unwrap_or(settings.rays))
        .threads(args.threads.unwrap_or(settings.threads))
        .build()
        .context("invalid camera settings")?;

    camera.render_image()?;

    if let Some(interval) = args.grid {
        camera.print_grid(interval, Color::white())?;
    }

    camera.write_to_image()
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("saved render to {}", args.output.display());

    Ok(())
}
