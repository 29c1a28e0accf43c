use std::fs;

use whitted::camera::Camera;
use whitted::canvas::PpmImage;
use whitted::scene::SceneFile;
use whitted::tracer::SimpleRayTracer;
use whitted::TracerError;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenes/sample.json");

#[test]
fn load_sample_scene() {
    let file = SceneFile::load(SAMPLE).unwrap();

    assert_eq!(file.scene.name, "mirrors and glass");
    assert_eq!(file.scene.geometries.len(), 6);
    assert_eq!(file.scene.lights.len(), 3);
    assert_eq!(file.camera.rays, 2);
    assert_eq!(file.camera.threads, 4);
}

#[test]
fn missing_scene_file_is_io_error() {
    assert!(matches!(
        SceneFile::load("/definitely/not/a/scene.json"),
        Err(TracerError::Io(_))
    ));
}

#[test]
fn render_sample_scene_to_ppm() {
    let SceneFile { scene, camera: settings } = SceneFile::load(SAMPLE).unwrap();
    let out = std::env::temp_dir().join(format!("whitted-sample-{}.ppm", std::process::id()));

    let camera = Camera::builder()
        .location(settings.location)
        .direction(settings.to, settings.up)
        .vp_size(settings.vp_width, settings.vp_height)
        .vp_distance(settings.vp_distance)
        .image_writer(PpmImage::new(out.clone(), 30, 20))
        .ray_tracer(SimpleRayTracer::new(scene))
        .threads(settings.threads)
        .build()
        .unwrap();

    camera.render_image().unwrap();
    camera.write_to_image().unwrap();

    let text = fs::read_to_string(&out).unwrap();
    fs::remove_file(&out).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("30 20"));
    assert_eq!(lines.next(), Some("255"));
    assert_eq!(text.split_whitespace().skip(4).count(), 30 * 20 * 3);
}
