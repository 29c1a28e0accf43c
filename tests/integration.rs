use whitted::camera::Camera;
use whitted::canvas::Canvas;
use whitted::intersect::Intersectable;
use whitted::scene::Scene;
use whitted::shape::{ Plane, Shape, ShapeType };
use whitted::tracer::SimpleRayTracer;
use whitted::tuple::{ Point, Vector };

fn camera_at(location: Point) -> Camera {
    Camera::builder()
        .location(location)
        .direction(-Vector::Z, Vector::Y)
        .vp_distance(1.0)
        .vp_size(3.0, 3.0)
        .image_writer(Canvas::new(1, 1))
        .ray_tracer(SimpleRayTracer::new(Scene::new("test")))
        .build()
        .unwrap()
}

/// Counts the intersections of every ray of a 3x3 view plane with `shape`.
fn count_intersections(camera: &Camera, shape: &dyn Intersectable) -> usize {
    let mut count = 0;
    for i in 0..3 {
        for j in 0..3 {
            let ray = camera.construct_ray(3, 3, j, i).unwrap();
            count += shape.find_all_intersections(&ray).len();
        }
    }

    count
}

fn vector(x: f64, y: f64, z: f64) -> Vector {
    Vector::new(x, y, z).unwrap()
}

#[test]
fn camera_rays_through_spheres() {
    let camera = camera_at(Point::new(0.0, 0.0, 0.5));
    let sphere = |z, r| Shape::sphere(Point::new(0.0, 0.0, z), r).unwrap();

    // only the center ray
    assert_eq!(count_intersections(&camera, &sphere(-3.0, 1.0)), 2);
    // larger than the view plane
    assert_eq!(count_intersections(&camera, &sphere(-2.5, 2.5)), 18);
    // view plane inside the sphere
    assert_eq!(count_intersections(&camera, &sphere(-2.0, 2.0)), 10);
    // camera inside the sphere
    assert_eq!(count_intersections(&camera, &sphere(-2.0, 4.0)), 9);
    // behind the camera
    assert_eq!(count_intersections(&camera, &sphere(1.0, 0.5)), 0);
}

#[test]
fn camera_rays_through_planes() {
    let camera = camera_at(Point::ORIGIN);
    let q0 = Point::new(0.0, 0.0, -3.0);

    // parallel to the view plane
    assert_eq!(count_intersections(&camera, &Shape::plane(q0, vector(0.0, 0.0, 1.0))), 9);
    // slightly slanted
    assert_eq!(count_intersections(&camera, &Shape::plane(q0, vector(0.0, 1.0, 2.0))), 9);
    // very slanted, the bottom row is parallel or points away
    assert_eq!(count_intersections(&camera, &Shape::plane(q0, vector(0.0, 1.0, 1.0))), 6);

    // behind the camera
    let behind: Shape = ShapeType::Plane(Plane::from_points(
        Point::new(1.0, 1.0, 2.0), Point::new(-1.0, 1.0, 2.0), Point::new(0.0, -10.0, 2.0)
    ).unwrap()).into();
    assert_eq!(count_intersections(&camera, &behind), 0);
}

#[test]
fn camera_rays_through_triangles() {
    let camera = camera_at(Point::ORIGIN);
    let triangle = |a: [f64; 3], b: [f64; 3], c: [f64; 3]| {
        Shape::triangle(a.into(), b.into(), c.into()).unwrap()
    };

    // small triangle in front of the view plane
    assert_eq!(
        count_intersections(&camera, &triangle([0.0, 10.0, -2.0], [1.0, 1.0, -2.0], [-1.0, -1.0, -2.0])),
        1
    );
    // tall triangle
    assert_eq!(
        count_intersections(&camera, &triangle([0.0, 20.0, -2.0], [1.0, -1.0, -2.0], [-1.0, -1.0, -2.0])),
        2
    );
    // behind the camera
    assert_eq!(
        count_intersections(&camera, &triangle([1.0, 1.0, 2.0], [-1.0, 1.0, 2.0], [0.0, -20.0, 2.0])),
        0
    );
}

#[test]
fn camera_rays_through_cylinder() {
    let camera = camera_at(Point::ORIGIN);

    // Axis along the view direction: every ray enters the bottom cap of a
    // wide cylinder and leaves through the top one.
    let wide = Shape::cylinder(
        whitted::ray::Ray::new(Point::new(0.0, 0.0, -2.0), -Vector::Z), 10.0, 2.0
    ).unwrap();
    assert_eq!(count_intersections(&camera, &wide), 18);

    // A thin one is only hit by the center ray.
    let thin = Shape::cylinder(
        whitted::ray::Ray::new(Point::new(0.0, 0.0, -2.0), -Vector::Z), 0.5, 2.0
    ).unwrap();
    assert_eq!(count_intersections(&camera, &thin), 2);
}
