use std::sync::{ Arc, Mutex };

use whitted::camera::Camera;
use whitted::canvas::Canvas;
use whitted::color::Color;
use whitted::intersect::Geometries;
use whitted::light::{ AmbientLight, DirectionalLight, PointLight, SpotLight };
use whitted::material::Material;
use whitted::ray::Ray;
use whitted::scene::Scene;
use whitted::shape::Shape;
use whitted::tracer::SimpleRayTracer;
use whitted::tuple::{ Point, Vector };

const WIDTH: usize = 40;
const HEIGHT: usize = 30;

fn showcase_scene() -> Scene {
    let mut geometries = Geometries::new();
    geometries
        .add(Shape::plane(Point::new(0.0, -1.0, 0.0), Vector::Y)
            .with_material(Material::default().with_kd(0.6).with_kr(0.3)))
        .add(Shape::sphere(Point::new(0.0, 0.0, -6.0), 1.0).unwrap()
            .with_emission(Color::rgb(0.2, 0.0, 0.0))
            .with_material(Material::default().with_kd(0.4).with_ks(0.5).with_shininess(40).with_kt(0.4)))
        .add(Shape::triangle(
            Point::new(-3.0, -1.0, -9.0), Point::new(3.0, -1.0, -9.0), Point::new(0.0, 3.0, -9.0)
        ).unwrap()
            .with_emission(Color::rgb(0.0, 0.1, 0.2))
            .with_material(Material::default().with_kd(0.3).with_kr(0.5)))
        .add(Shape::cylinder(
            Ray::new(Point::new(2.0, -1.0, -5.0), Vector::Y), 0.4, 1.5
        ).unwrap()
            .with_material(Material::default().with_kd(0.5).with_ks(0.3).with_shininess(10)));

    let mut scene = Scene::new("threads")
        .with_background(Color::rgb(0.05, 0.05, 0.1))
        .with_ambient_light(AmbientLight::uniform(Color::white(), 0.1))
        .with_geometries(geometries);
    scene
        .add_light(DirectionalLight::new(Color::rgb(0.5, 0.5, 0.5), Vector::new(1.0, -1.0, -1.0).unwrap()))
        .add_light(PointLight::new(Color::white(), Point::new(-2.0, 3.0, -2.0)).with_kl(0.05))
        .add_light(SpotLight::new(Color::white(), Point::new(3.0, 3.0, -3.0), Vector::new(-1.0, -1.0, -1.0).unwrap())
            .with_narrow_beam(4.0));

    scene
}

fn render(threads: usize, rays: usize) -> Canvas {
    let canvas = Arc::new(Mutex::new(Canvas::new(WIDTH, HEIGHT)));

    let camera = Camera::builder()
        .location(Point::ORIGIN)
        .direction(-Vector::Z, Vector::Y)
        .vp_size(4.0, 3.0)
        .vp_distance(2.0)
        .image_writer(Arc::clone(&canvas))
        .ray_tracer(SimpleRayTracer::new(showcase_scene()))
        .number_of_rays(rays)
        .threads(threads)
        .build()
        .unwrap();

    camera.render_image().unwrap();
    camera.write_to_image().unwrap();
    drop(camera);

    Arc::try_unwrap(canvas).unwrap().into_inner().unwrap()
}

fn assert_identical(a: &Canvas, b: &Canvas) {
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let (l, r) = (a.read_pixel(x, y).unwrap(), b.read_pixel(x, y).unwrap());
            assert!(
                l.r.to_bits() == r.r.to_bits()
                    && l.g.to_bits() == r.g.to_bits()
                    && l.b.to_bits() == r.b.to_bits(),
                "pixel ({}, {}) differs: {:?} vs {:?}", x, y, l, r
            );
        }
    }
}

#[test]
fn threaded_render_matches_single_threaded() {
    let single = render(0, 1);

    for threads in 1..=4 {
        assert_identical(&single, &render(threads, 1));
    }
}

#[test]
fn threaded_supersampled_render_matches_single_threaded() {
    assert_identical(&render(0, 3), &render(4, 3));
}

#[test]
fn render_is_not_blank() {
    let image = render(2, 1);
    let background = Color::rgb(0.05, 0.05, 0.1);

    let center = image.read_pixel(WIDTH / 2, HEIGHT / 2).unwrap();
    assert_ne!(center, background);

    let top_left = image.read_pixel(0, 0).unwrap();
    assert_eq!(top_left, background);
}
