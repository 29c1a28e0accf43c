use std::sync::{ Mutex, MutexGuard };
use std::time::Instant;

use log::{ debug, info };

use crate::is_zero;
use crate::color::Color;
use crate::canvas::PixelSink;
use crate::consts::{ MAX_THREADS, PROGRESS_INTERVAL_PERCENT };
use crate::error::{ Result, TracerError };
use crate::parallel::{ for_each_pixel, Pixel, PixelManager };
use crate::ray::Ray;
use crate::tracer::RayTracer;
use crate::tuple::{ Point, Vector };

/// A camera looking at a scene through a view plane.
///
/// The view plane is a `width` by `height` rectangle centered `distance` in
/// front of the camera, perpendicular to `to`. It is split into as many
/// pixels as the image writer has, and every pixel is colored by tracing one
/// or more rays from the camera location through it.
///
/// Cameras are created with `Camera::builder()`.
pub struct Camera {
    p0: Point,
    to: Vector,
    up: Vector,
    right: Vector,

    width: f64,
    height: f64,
    distance: f64,

    image_writer: Mutex<Box<dyn PixelSink>>,
    ray_tracer: Box<dyn RayTracer>,

    /// Rays per side of a pixel; a pixel is sampled by `rays * rays` rays.
    rays: usize,
    threads: usize,
}

impl Camera {
    pub fn builder() -> CameraBuilder {
        CameraBuilder::new()
    }

    pub fn location(&self) -> &Point { &self.p0 }
    pub fn to(&self) -> &Vector { &self.to }
    pub fn up(&self) -> &Vector { &self.up }
    pub fn right(&self) -> &Vector { &self.right }

    fn image_writer(&self) -> Result<MutexGuard<'_, Box<dyn PixelSink>>> {
        self.image_writer.lock()
            .map_err(|_| TracerError::RenderFailed("image writer lock poisoned".into()))
    }

    /// The center of pixel `(j, i)` (column, row) of an `nx` by `ny` grid,
    /// moved by `(dx, dy)` in view plane units. Rows grow downward.
    fn view_plane_point(&self, nx: usize, ny: usize, j: usize, i: usize, dx: f64, dy: f64)
        -> Point {
        let rx = self.width / nx as f64;
        let ry = self.height / ny as f64;

        let xj = (j as f64 - (nx as f64 - 1.0) / 2.0) * rx + dx;
        let yi = -(i as f64 - (ny as f64 - 1.0) / 2.0) * ry + dy;

        let mut p = self.p0.xyz + self.to.xyz() * self.distance;
        if !is_zero(xj) {
            p = p + self.right.xyz() * xj;
        }
        if !is_zero(yi) {
            p = p + self.up.xyz() * yi;
        }

        Point { xyz: p }
    }

    fn ray_through(&self, p: Point) -> Result<Ray> {
        Ok(Ray::new(self.p0, p.subtract(&self.p0)?))
    }

    /// Creates the ray from the camera location through the center of pixel
    /// `(j, i)` of an `nx` by `ny` image.
    pub fn construct_ray(&self, nx: usize, ny: usize, j: usize, i: usize) -> Result<Ray> {
        self.ray_through(self.view_plane_point(nx, ny, j, i, 0.0, 0.0))
    }

    /// Creates the rays sampling pixel `(j, i)`.
    ///
    /// With more than one ray per side, the pixel is split into a square grid
    /// of sub-pixels and one ray passes through the center of each, rows
    /// first, top to bottom.
    pub fn construct_rays(&self, nx: usize, ny: usize, j: usize, i: usize) -> Result<Vec<Ray>> {
        if self.rays <= 1 {
            return Ok(vec![self.construct_ray(nx, ny, j, i)?]);
        }

        let k = self.rays as f64;
        let sub_width = self.width / nx as f64 / k;
        let sub_height = self.height / ny as f64 / k;
        let center = (k - 1.0) / 2.0;

        let mut rays = Vec::with_capacity(self.rays * self.rays);
        for sy in 0..self.rays {
            for sx in 0..self.rays {
                let dx = (sx as f64 - center) * sub_width;
                let dy = -(sy as f64 - center) * sub_height;
                rays.push(self.ray_through(self.view_plane_point(nx, ny, j, i, dx, dy))?);
            }
        }

        Ok(rays)
    }

    /// Colors one pixel: the average color of its rays.
    fn cast_rays(&self, nx: usize, ny: usize, pixel: Pixel) -> Result<Color> {
        let colors = self.construct_rays(nx, ny, pixel.col, pixel.row)?
            .iter()
            .map(|ray| self.ray_tracer.trace_ray(ray))
            .collect::<Result<Vec<Color>>>()?;

        Ok(Color::average(&colors))
    }

    /// Renders every pixel of the image writer.
    ///
    /// Pixels are rendered on the calling thread in row-major order when the
    /// camera has no threads, otherwise on a pool of worker threads. Both give
    /// the same image. If a pixel fails the render stops with `RenderFailed`;
    /// pixels already written are kept.
    pub fn render_image(&self) -> Result<()> {
        let (nx, ny) = {
            let writer = self.image_writer()?;
            (writer.width(), writer.height())
        };

        info!(
            "rendering {}x{} pixels, {} rays per pixel, {} threads",
            nx, ny, self.rays * self.rays, self.threads
        );
        let start = Instant::now();

        let manager = PixelManager::new(nx, ny, PROGRESS_INTERVAL_PERCENT);
        for_each_pixel(&manager, self.threads, |pixel| {
            let color = self.cast_rays(nx, ny, pixel)?;
            self.image_writer()?.write_pixel(pixel.col, pixel.row, &color);
            Ok(())
        })?;

        info!("render finished in {:.2?}", start.elapsed());
        Ok(())
    }

    /// Draws grid lines every `interval` pixels, over whatever was rendered.
    pub fn print_grid(&self, interval: usize, color: Color) -> Result<()> {
        if interval == 0 {
            return Err(TracerError::InvalidCameraConfig(
                "grid interval must be positive".into()
            ));
        }

        let mut writer = self.image_writer()?;
        let (nx, ny) = (writer.width(), writer.height());
        for i in 0..ny {
            for j in 0..nx {
                if j % interval == 0 || i % interval == 0 {
                    writer.write_pixel(j, i, &color);
                }
            }
        }

        Ok(())
    }

    /// Commits the image writer.
    pub fn write_to_image(&self) -> Result<()> {
        self.image_writer()?.commit()
    }
}

/// Collects camera settings; everything is checked at once by `build`.
pub struct CameraBuilder {
    location: Option<Point>,
    direction: Option<(Vector, Vector)>,
    vp_size: Option<(f64, f64)>,
    vp_distance: Option<f64>,
    image_writer: Option<Box<dyn PixelSink>>,
    ray_tracer: Option<Box<dyn RayTracer>>,
    rays: usize,
    threads: usize,
}

impl Default for CameraBuilder {
    fn default() -> CameraBuilder {
        CameraBuilder::new()
    }
}

impl CameraBuilder {
    pub fn new() -> CameraBuilder {
        CameraBuilder {
            location: None,
            direction: None,
            vp_size: None,
            vp_distance: None,
            image_writer: None,
            ray_tracer: None,
            rays: 1,
            threads: 0,
        }
    }

    pub fn location(mut self, p0: Point) -> CameraBuilder {
        self.location = Some(p0);
        self
    }

    /// Sets where the camera looks and which way is up. The two vectors must
    /// be orthogonal.
    pub fn direction(mut self, to: Vector, up: Vector) -> CameraBuilder {
        self.direction = Some((to, up));
        self
    }

    pub fn vp_size(mut self, width: f64, height: f64) -> CameraBuilder {
        self.vp_size = Some((width, height));
        self
    }

    pub fn vp_distance(mut self, distance: f64) -> CameraBuilder {
        self.vp_distance = Some(distance);
        self
    }

    pub fn image_writer<S: PixelSink + 'static>(mut self, sink: S) -> CameraBuilder {
        self.image_writer = Some(Box::new(sink));
        self
    }

    pub fn ray_tracer<T: RayTracer + 'static>(mut self, tracer: T) -> CameraBuilder {
        self.ray_tracer = Some(Box::new(tracer));
        self
    }

    /// Rays per side of a pixel. 1 disables anti-aliasing.
    pub fn number_of_rays(mut self, rays: usize) -> CameraBuilder {
        self.rays = rays;
        self
    }

    /// Render worker threads, 0 to render on the calling thread.
    pub fn threads(mut self, threads: usize) -> CameraBuilder {
        self.threads = threads;
        self
    }

    pub fn build(self) -> Result<Camera> {
        let invalid = |msg: String| Err(TracerError::InvalidCameraConfig(msg));

        let p0 = self.location.ok_or(TracerError::IncompleteCameraConfig("location"))?;
        let (to, up) = self.direction.ok_or(TracerError::IncompleteCameraConfig("direction"))?;
        let (width, height) = self.vp_size.ok_or(TracerError::IncompleteCameraConfig("vp_size"))?;
        let distance = self.vp_distance.ok_or(TracerError::IncompleteCameraConfig("vp_distance"))?;
        let image_writer = self.image_writer
            .ok_or(TracerError::IncompleteCameraConfig("image_writer"))?;
        let ray_tracer = self.ray_tracer
            .ok_or(TracerError::IncompleteCameraConfig("ray_tracer"))?;

        let to = to.normalize();
        let up = up.normalize();
        if !is_zero(to.dot(&up)) {
            return invalid(format!("direction vectors must be orthogonal, to.up = {}", to.dot(&up)));
        }
        if width <= 0.0 || height <= 0.0 {
            return invalid(format!("view plane size must be positive, got {}x{}", width, height));
        }
        if distance <= 0.0 {
            return invalid(format!("view plane distance must be positive, got {}", distance));
        }
        if self.rays == 0 {
            return invalid("number of rays must be at least 1".into());
        }
        if self.threads > MAX_THREADS {
            return invalid(format!(
                "threads must be between 0 and {}, got {}", MAX_THREADS, self.threads
            ));
        }
        if image_writer.width() == 0 || image_writer.height() == 0 {
            return invalid("image writer has no pixels".into());
        }

        let right = to.cross(&up)?.normalize();

        debug!(
            "camera at {:?} looking {:?}: view plane {}x{} at {}, image {}x{}, {} rays, {} threads",
            p0.xyz, to.xyz(), width, height, distance,
            image_writer.width(), image_writer.height(), self.rays, self.threads
        );

        Ok(Camera {
            p0,
            to,
            up,
            right,
            width,
            height,
            distance,
            image_writer: Mutex::new(image_writer),
            ray_tracer,
            rays: self.rays,
            threads: self.threads,
        })
    }
}

/* Tests */

#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use crate::canvas::Canvas;
#[cfg(test)]
use crate::scene::Scene;
#[cfg(test)]
use crate::tracer::SimpleRayTracer;

#[cfg(test)]
fn test_builder() -> CameraBuilder {
    Camera::builder()
        .location(Point::ORIGIN)
        .direction(-Vector::Z, Vector::Y)
        .vp_distance(10.0)
        .vp_size(6.0, 6.0)
        .image_writer(Canvas::new(1, 1))
        .ray_tracer(SimpleRayTracer::new(Scene::new("empty")))
}

#[cfg(test)]
fn direction_of(r: &Ray, x: f64, y: f64, z: f64) -> bool {
    *r.direction() == Vector::new(x, y, z).unwrap().normalize() && *r.head() == Point::ORIGIN
}

#[test]
fn construct_ray_through_unit_view_plane() {
    let camera = test_builder().vp_size(1.0, 1.0).vp_distance(1.0).build().unwrap();

    assert!(direction_of(&camera.construct_ray(1, 1, 0, 0).unwrap(), 0.0, 0.0, -1.0));
}

#[test]
fn construct_ray_grid() {
    let camera = test_builder().build().unwrap();

    assert_eq!(*camera.right(), Vector::X);

    // 3x3: center and top left corner
    assert!(direction_of(&camera.construct_ray(3, 3, 1, 1).unwrap(), 0.0, 0.0, -10.0));
    assert!(direction_of(&camera.construct_ray(3, 3, 0, 0).unwrap(), -2.0, 2.0, -10.0));
    assert!(direction_of(&camera.construct_ray(3, 3, 2, 1).unwrap(), 2.0, 0.0, -10.0));

    // 4x4: inner pixels
    assert!(direction_of(&camera.construct_ray(4, 4, 1, 1).unwrap(), -0.75, 0.75, -10.0));
    assert!(direction_of(&camera.construct_ray(4, 4, 3, 2).unwrap(), 2.25, -0.75, -10.0));
}

#[test]
fn construct_sub_rays() {
    let camera = test_builder()
        .vp_size(2.0, 2.0)
        .vp_distance(1.0)
        .number_of_rays(2)
        .build()
        .unwrap();

    let rays = camera.construct_rays(1, 1, 0, 0).unwrap();
    assert_eq!(rays.len(), 4);
    assert!(direction_of(&rays[0], -0.5, 0.5, -1.0));
    assert!(direction_of(&rays[1], 0.5, 0.5, -1.0));
    assert!(direction_of(&rays[2], -0.5, -0.5, -1.0));
    assert!(direction_of(&rays[3], 0.5, -0.5, -1.0));
}

#[test]
fn builder_reports_missing_fields() {
    let missing = |b: CameraBuilder| match b.build() {
        Err(TracerError::IncompleteCameraConfig(field)) => field,
        _ => "",
    };

    assert_eq!(missing(Camera::builder()), "location");
    assert_eq!(missing(Camera::builder().location(Point::ORIGIN)), "direction");
    assert_eq!(
        missing(Camera::builder().location(Point::ORIGIN).direction(-Vector::Z, Vector::Y)),
        "vp_size"
    );
    assert_eq!(
        missing(Camera::builder()
            .location(Point::ORIGIN)
            .direction(-Vector::Z, Vector::Y)
            .vp_size(1.0, 1.0)
            .vp_distance(1.0)
            .image_writer(Canvas::new(1, 1))),
        "ray_tracer"
    );
}

#[test]
fn builder_rejects_invalid_settings() {
    let invalid = |b: CameraBuilder| matches!(b.build(), Err(TracerError::InvalidCameraConfig(_)));

    assert!(invalid(test_builder().direction(-Vector::Z, Vector::new(0.0, 1.0, 1.0).unwrap())));
    assert!(invalid(test_builder().vp_size(0.0, 1.0)));
    assert!(invalid(test_builder().vp_size(1.0, -1.0)));
    assert!(invalid(test_builder().vp_distance(0.0)));
    assert!(invalid(test_builder().number_of_rays(0)));
    assert!(invalid(test_builder().threads(MAX_THREADS + 1)));
    assert!(invalid(test_builder().image_writer(Canvas::new(0, 3))));
    assert!(test_builder().threads(MAX_THREADS).build().is_ok());
}

#[test]
fn builder_normalizes_direction() {
    let camera = test_builder()
        .direction(Vector::new(0.0, 0.0, -5.0).unwrap(), Vector::new(0.0, 3.0, 0.0).unwrap())
        .build()
        .unwrap();

    assert_eq!(*camera.to(), -Vector::Z);
    assert_eq!(*camera.up(), Vector::Y);
    assert_eq!(*camera.right(), Vector::X);
}

#[test]
fn render_empty_scene_is_background() {
    let canvas = Arc::new(Mutex::new(Canvas::new(4, 3)));
    let blue = Color::rgb(0.0, 0.0, 0.4);

    let camera = test_builder()
        .image_writer(Arc::clone(&canvas))
        .ray_tracer(SimpleRayTracer::new(Scene::new("empty").with_background(blue)))
        .threads(2)
        .build()
        .unwrap();
    camera.render_image().unwrap();
    camera.write_to_image().unwrap();

    let canvas = canvas.lock().unwrap();
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(canvas.read_pixel(x, y), Some(blue));
        }
    }
}

#[test]
fn print_grid_lines() {
    let canvas = Arc::new(Mutex::new(Canvas::new(5, 5)));
    let camera = test_builder().image_writer(Arc::clone(&canvas)).build().unwrap();

    camera.print_grid(2, Color::red()).unwrap();
    assert!(camera.print_grid(0, Color::red()).is_err());

    let canvas = canvas.lock().unwrap();
    assert_eq!(canvas.read_pixel(0, 3), Some(Color::red()));
    assert_eq!(canvas.read_pixel(3, 4), Some(Color::red()));
    assert_eq!(canvas.read_pixel(1, 1), Some(Color::black()));
    assert_eq!(canvas.read_pixel(3, 3), Some(Color::black()));
}
