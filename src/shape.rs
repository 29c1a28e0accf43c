use crate::{ align_zero, is_zero };
use crate::color::Color;
use crate::error::{ Result, TracerError };
use crate::material::Material;
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

/// Keeps the distances which lie strictly ahead of the ray head and strictly
/// before `max_distance`.
fn within(ts: &[f64], max_distance: f64) -> Vec<f64> {
    ts.iter()
        .copied()
        .filter(|t| *t > 0.0 && align_zero(*t - max_distance) < 0.0)
        .collect()
}

/// An infinite plane through `q0` with a unit normal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    q0: Point,
    normal: Vector,
}

impl Plane {
    pub fn new(q0: Point, normal: Vector) -> Plane {
        Plane { q0, normal: normal.normalize() }
    }

    /// Creates the plane through three points.
    ///
    /// The normal is `(p2 - p1) x (p3 - p1)`, so coincident or collinear
    /// points fail with `InvalidGeometry`.
    pub fn from_points(p1: Point, p2: Point, p3: Point) -> Result<Plane> {
        let u = p2.subtract(&p1)?;
        let v = p3.subtract(&p1)?;
        let normal = u.cross(&v)?;

        Ok(Plane::new(p1, normal))
    }

    pub fn normal(&self) -> &Vector {
        &self.normal
    }

    fn distances(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        let nv = align_zero(self.normal.dot(ray.direction()));
        if nv == 0.0 {
            return Vec::new();
        }

        // A ray starting on the reference point sits on the plane.
        let qp = match self.q0.subtract(ray.head()) {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };

        let t = align_zero(self.normal.dot(&qp) / nv);
        within(&[t], max_distance)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    center: Point,
    radius: f64,
}

impl Sphere {
    /// Creates a sphere. The radius must be positive.
    pub fn new(center: Point, radius: f64) -> Result<Sphere> {
        if align_zero(radius) <= 0.0 {
            return Err(TracerError::InvalidGeometry(
                format!("sphere radius must be positive, got {}", radius)
            ));
        }

        Ok(Sphere { center, radius })
    }

    fn normal_at(&self, p: &Point) -> Result<Vector> {
        Ok(p.subtract(&self.center)?.normalize())
    }

    fn distances(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        let u = match self.center.subtract(ray.head()) {
            Ok(u) => u,
            // Head at the center: the only forward hit is one radius away.
            Err(_) => return within(&[self.radius], max_distance),
        };

        let tm = align_zero(ray.direction().dot(&u));
        let d2 = align_zero(u.length_squared() - tm * tm);
        let th2 = align_zero(self.radius * self.radius - d2);
        if th2 <= 0.0 {
            return Vec::new();
        }

        let th = th2.sqrt();
        within(&[align_zero(tm - th), align_zero(tm + th)], max_distance)
    }
}

/// An infinite tube around an axis ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tube {
    axis: Ray,
    radius: f64,
}

impl Tube {
    pub fn new(axis: Ray, radius: f64) -> Result<Tube> {
        if align_zero(radius) <= 0.0 {
            return Err(TracerError::InvalidGeometry(
                format!("tube radius must be positive, got {}", radius)
            ));
        }

        Ok(Tube { axis, radius })
    }

    pub fn axis(&self) -> &Ray {
        &self.axis
    }

    /// Signed distance along the axis of the projection of `p`.
    fn axial_offset(&self, p: &Point) -> f64 {
        align_zero(self.axis.direction().xyz().dot(&(p.xyz - self.axis.head().xyz)))
    }

    fn normal_at(&self, p: &Point) -> Result<Vector> {
        let o = self.axis.point_at(self.axial_offset(p));
        Ok(p.subtract(&o)?.normalize())
    }

    /// Solves `|(d - (d.va)va)|^2 = r^2` for the lateral surface, where `d`
    /// is the offset of a ray point from the axis head.
    fn distances(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        let va = self.axis.direction().xyz();
        let v = ray.direction().xyz();
        let dp = ray.head().xyz - self.axis.head().xyz;

        let vp = v - va * v.dot(&va);
        let dpp = dp - va * dp.dot(&va);

        let a = vp.magnitude_squared();
        if is_zero(a) {
            // Parallel to the axis.
            return Vec::new();
        }

        let b = 2.0 * vp.dot(&dpp);
        let c = dpp.magnitude_squared() - self.radius * self.radius;
        let discriminant = align_zero(b * b - 4.0 * a * c);
        if discriminant <= 0.0 {
            return Vec::new();
        }

        let root = discriminant.sqrt();
        within(
            &[align_zero((-b - root) / (2.0 * a)), align_zero((-b + root) / (2.0 * a))],
            max_distance
        )
    }
}

/// A tube cut to a finite height, closed by two caps.
///
/// The bottom cap is centered on the axis head; the top cap lies `height`
/// further along the axis direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cylinder {
    tube: Tube,
    height: f64,
}

impl Cylinder {
    pub fn new(axis: Ray, radius: f64, height: f64) -> Result<Cylinder> {
        if align_zero(height) <= 0.0 {
            return Err(TracerError::InvalidGeometry(
                format!("cylinder height must be positive, got {}", height)
            ));
        }

        Ok(Cylinder { tube: Tube::new(axis, radius)?, height })
    }

    fn normal_at(&self, p: &Point) -> Result<Vector> {
        let s = self.tube.axial_offset(p);
        let va = *self.tube.axis.direction();

        if s == 0.0 {
            Ok(-va)
        } else if is_zero(s - self.height) {
            Ok(va)
        } else {
            self.tube.normal_at(p)
        }
    }

    fn distances(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        let axis = self.tube.axis;
        let r2 = self.tube.radius * self.tube.radius;

        let mut ts: Vec<f64> = self.tube.distances(ray, max_distance)
            .into_iter()
            .filter(|t| {
                let s = self.tube.axial_offset(&ray.point_at(*t));
                s > 0.0 && align_zero(s - self.height) < 0.0
            })
            .collect();

        let bottom = axis.head();
        let top = axis.point_at(self.height);
        for center in [*bottom, top] {
            let cap = Plane::new(center, *axis.direction());
            for t in cap.distances(ray, max_distance) {
                let q = ray.point_at(t);
                if align_zero(q.distance_squared(&center) - r2) < 0.0 {
                    ts.push(t);
                }
            }
        }

        ts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        ts
    }
}

/// A convex polygon, given as an ordered ring of coplanar vertices.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
    plane: Plane,
}

impl Polygon {
    /// Creates a polygon, validating its vertices.
    ///
    /// Fails with `InvalidPolygon` when there are fewer than three vertices,
    /// when two consecutive vertices (including the last and the first)
    /// coincide, when the vertices are not coplanar, or when the ring is not
    /// convex and consistently wound.
    pub fn new(vertices: Vec<Point>) -> Result<Polygon> {
        let invalid = |msg: &str| TracerError::InvalidPolygon(msg.to_string());

        if vertices.len() < 3 {
            return Err(invalid("a polygon needs at least 3 vertices"));
        }

        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])
            .map_err(|_| invalid("the first three vertices must not be collinear"))?;

        if vertices.len() == 3 {
            return Ok(Polygon { vertices, plane });
        }

        let n = *plane.normal();
        let size = vertices.len();
        let edge = |from: usize, to: usize| {
            vertices[to].subtract(&vertices[from])
                .map_err(|_| invalid("consecutive vertices must not coincide"))
        };

        let mut edge1 = edge(size - 2, size - 1)?;
        let mut edge2 = edge(size - 1, 0)?;
        let turn = |e1: &Vector, e2: &Vector| -> Result<bool> {
            let c = e1.cross(e2)
                .map_err(|_| invalid("a vertex must not lie on the side of the polygon"))?;
            Ok(c.dot(&n) > 0.0)
        };

        let positive = turn(&edge1, &edge2)?;
        for i in 1..size {
            if !is_zero(vertices[i].xyz.dot(&n.xyz()) - vertices[0].xyz.dot(&n.xyz())) {
                return Err(invalid("all vertices must lie in the same plane"));
            }

            edge1 = edge2;
            edge2 = edge(i - 1, i)?;
            if turn(&edge1, &edge2)? != positive {
                return Err(invalid("vertices must be ordered and the polygon convex"));
            }
        }

        Ok(Polygon { vertices, plane })
    }

    pub fn triangle(p1: Point, p2: Point, p3: Point) -> Result<Polygon> {
        Polygon::new(vec![p1, p2, p3])
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    fn distances(&self, ray: &Ray, max_distance: f64) -> Vec<f64> {
        let ts = self.plane.distances(ray, max_distance);
        if ts.is_empty() {
            return ts;
        }

        let head = ray.head().xyz;
        let v = ray.direction().xyz();
        let size = self.vertices.len();

        let signs: Vec<f64> = (0..size)
            .map(|i| {
                let a = self.vertices[i].xyz - head;
                let b = self.vertices[(i + 1) % size].xyz - head;
                align_zero(a.cross(&b).dot(&v))
            })
            .collect();

        if signs.iter().all(|s| *s > 0.0) || signs.iter().all(|s| *s < 0.0) {
            ts
        } else {
            Vec::new()
        }
    }
}

/// The geometric variant of a `Shape`.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeType {
    Plane(Plane),
    Sphere(Sphere),
    Tube(Tube),
    Cylinder(Cylinder),
    Polygon(Polygon),
}

/// A surface in a scene: some geometry, the material it is made of and the
/// light it emits.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub ty: ShapeType,
    pub material: Material,
    pub emission: Color,
}

impl From<ShapeType> for Shape {
    fn from(ty: ShapeType) -> Shape {
        Shape { ty, material: Material::default(), emission: Color::black() }
    }
}

impl Shape {
    pub fn plane(q0: Point, normal: Vector) -> Shape {
        ShapeType::Plane(Plane::new(q0, normal)).into()
    }

    pub fn sphere(center: Point, radius: f64) -> Result<Shape> {
        Ok(ShapeType::Sphere(Sphere::new(center, radius)?).into())
    }

    pub fn tube(axis: Ray, radius: f64) -> Result<Shape> {
        Ok(ShapeType::Tube(Tube::new(axis, radius)?).into())
    }

    pub fn cylinder(axis: Ray, radius: f64, height: f64) -> Result<Shape> {
        Ok(ShapeType::Cylinder(Cylinder::new(axis, radius, height)?).into())
    }

    pub fn polygon(vertices: Vec<Point>) -> Result<Shape> {
        Ok(ShapeType::Polygon(Polygon::new(vertices)?).into())
    }

    pub fn triangle(p1: Point, p2: Point, p3: Point) -> Result<Shape> {
        Ok(ShapeType::Polygon(Polygon::triangle(p1, p2, p3)?).into())
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    pub fn with_emission(mut self, emission: Color) -> Shape {
        self.emission = emission;
        self
    }

    /// The unit normal at a point on the surface.
    ///
    /// `p` is expected to come from this shape's own intersections. Points
    /// which make the normal degenerate (a sphere center, a tube axis point)
    /// fail with `InvalidGeometry`.
    pub fn normal_at(&self, p: &Point) -> Result<Vector> {
        match &self.ty {
            ShapeType::Plane(plane) => Ok(plane.normal),
            ShapeType::Sphere(s) => s.normal_at(p),
            ShapeType::Tube(t) => t.normal_at(p),
            ShapeType::Cylinder(c) => c.normal_at(p),
            ShapeType::Polygon(poly) => Ok(poly.plane.normal),
        }
    }

    /// Every point where `ray` crosses the surface strictly between its head
    /// and `max_distance`.
    pub fn intersection_points(&self, ray: &Ray, max_distance: f64) -> Vec<Point> {
        let ts = match &self.ty {
            ShapeType::Plane(plane) => plane.distances(ray, max_distance),
            ShapeType::Sphere(s) => s.distances(ray, max_distance),
            ShapeType::Tube(t) => t.distances(ray, max_distance),
            ShapeType::Cylinder(c) => c.distances(ray, max_distance),
            ShapeType::Polygon(poly) => poly.distances(ray, max_distance),
        };

        ts.into_iter().map(|t| ray.point_at(t)).collect()
    }
}

/* Tests */

#[cfg(test)]
fn ray(head: [f64; 3], dir: [f64; 3]) -> Ray {
    Ray::new(head.into(), Vector::new(dir[0], dir[1], dir[2]).unwrap())
}

#[cfg(test)]
fn assert_unit_normals(s: &Shape, points: &[Point]) {
    for p in points {
        let n = s.normal_at(p).unwrap();
        assert!(crate::feq(n.length(), 1.0), "normal at {:?} is {:?}", p, n);
    }
}

#[test]
fn sphere_rejects_non_positive_radius() {
    assert!(Sphere::new(Point::ORIGIN, 0.0).is_err());
    assert!(Sphere::new(Point::ORIGIN, -1.0).is_err());
}

#[test]
fn sphere_missed_by_ray() {
    let s = Shape::sphere(Point::new(1.0, 0.0, 0.0), 1.0).unwrap();
    let r = ray([-1.0, 0.0, 0.0], [1.0, 1.0, 0.0]);

    assert!(s.intersection_points(&r, f64::INFINITY).is_empty());
}

#[test]
fn sphere_crossed_twice() {
    let s = Shape::sphere(Point::new(1.0, 0.0, 0.0), 1.0).unwrap();
    let r = ray([-1.0, 0.0, 0.0], [3.0, 1.0, 0.0]);
    let hits = s.intersection_points(&r, f64::INFINITY);

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0], Point::new(0.0651530771650466, 0.355051025721682, 0.0));
    assert_eq!(hits[1], Point::new(1.53484692283495, 0.844948974278318, 0.0));
    assert_unit_normals(&s, &hits);
}

#[test]
fn sphere_ray_from_inside_and_center() {
    let s = Shape::sphere(Point::new(1.0, 0.0, 0.0), 1.0).unwrap();

    let inside = ray([0.5, 0.5, 0.0], [3.0, 1.0, 0.0]);
    assert_eq!(s.intersection_points(&inside, f64::INFINITY).len(), 1);

    let center = ray([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
    assert_eq!(
        s.intersection_points(&center, f64::INFINITY),
        vec![Point::new(1.0, 0.0, 1.0)]
    );

    let behind = ray([2.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
    assert!(s.intersection_points(&behind, f64::INFINITY).is_empty());
}

#[test]
fn sphere_clipped_by_max_distance() {
    let s = Shape::sphere(Point::new(0.0, 0.0, 5.0), 1.0).unwrap();
    let r = ray([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);

    assert_eq!(s.intersection_points(&r, 5.0), vec![Point::new(0.0, 0.0, 4.0)]);
    assert!(s.intersection_points(&r, 4.0).is_empty());
}

#[test]
fn plane_from_three_points() {
    let p = Plane::from_points(
        Point::new(1.0, 0.0, 0.0), Point::new(0.0, 1.0, 0.0), Point::new(0.0, 0.0, 1.0)
    ).unwrap();
    let k = 1.0 / 3.0f64.sqrt();

    assert_eq!(*p.normal(), Vector::new(k, k, k).unwrap());

    assert!(Plane::from_points(
        Point::new(1.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0), Point::new(0.0, 0.0, 1.0)
    ).is_err());
    assert!(Plane::from_points(
        Point::new(1.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0), Point::new(3.0, 0.0, 0.0)
    ).is_err());
}

#[test]
fn plane_intersections() {
    let s: Shape = ShapeType::Plane(Plane::from_points(
        Point::new(1.0, 0.0, 0.0), Point::new(0.0, 1.0, 0.0), Point::new(0.0, 0.0, 1.0)
    ).unwrap()).into();

    let toward = ray([1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]);
    let third = 1.0 / 3.0;
    assert_eq!(
        s.intersection_points(&toward, f64::INFINITY),
        vec![Point::new(third, third, third)]
    );

    let away = ray([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
    assert!(s.intersection_points(&away, f64::INFINITY).is_empty());

    let parallel = ray([1.0, 1.0, 1.0], [1.0, -1.0, 0.0]);
    assert!(s.intersection_points(&parallel, f64::INFINITY).is_empty());
}

#[test]
fn triangle_intersections() {
    let s = Shape::triangle(
        Point::ORIGIN, Point::new(1.0, 0.0, 0.0), Point::new(0.0, 1.0, 0.0)
    ).unwrap();

    let inside = ray([0.2, 0.2, -1.0], [0.0, 0.0, 1.0]);
    let hits = s.intersection_points(&inside, f64::INFINITY);
    assert_eq!(hits, vec![Point::new(0.2, 0.2, 0.0)]);
    assert_unit_normals(&s, &hits);

    let outside = ray([1.5, 0.5, -1.0], [0.0, 0.0, 1.0]);
    assert!(s.intersection_points(&outside, f64::INFINITY).is_empty());

    // Exactly on an edge
    let edge = ray([0.5, 0.0, -1.0], [0.0, 0.0, 1.0]);
    assert!(s.intersection_points(&edge, f64::INFINITY).is_empty());
}

#[test]
fn polygon_construction() {
    let p = |x, y, z| Point::new(x, y, z);

    assert!(Polygon::new(vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(-1.0, 1.0, 1.0)]).is_ok());

    let cases = vec![
        // too few
        vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0)],
        // wrong order
        vec![p(0.0, 0.0, 1.0), p(0.0, 1.0, 0.0), p(1.0, 0.0, 0.0), p(-1.0, 1.0, 1.0)],
        // not in the same plane
        vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 2.0, 2.0)],
        // concave
        vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.5, 0.25, 0.5)],
        // vertex on a side
        vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.5, 0.5)],
        // last point equals first
        vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)],
        // co-located points
        vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 1.0, 0.0)],
    ];

    for vertices in cases {
        match Polygon::new(vertices.clone()) {
            Err(TracerError::InvalidPolygon(_)) => (),
            other => panic!("{:?} should be rejected, got {:?}", vertices, other),
        }
    }
}

#[test]
fn polygon_normal_is_plane_normal() {
    let s = Shape::polygon(vec![
        Point::new(0.0, 0.0, 1.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(-1.0, 1.0, 1.0),
    ]).unwrap();
    let k = 1.0 / 3.0f64.sqrt();

    assert_eq!(s.normal_at(&Point::new(0.0, 0.0, 1.0)).unwrap(), Vector::new(k, k, k).unwrap());
}

#[test]
fn tube_normal_and_intersections() {
    let s = Shape::tube(Ray::new(Point::ORIGIN, Vector::Z), 1.0).unwrap();

    assert_eq!(s.normal_at(&Point::new(0.0, 1.0, 3.0)).unwrap(), Vector::Y);
    assert_eq!(s.normal_at(&Point::new(-1.0, 0.0, 0.0)).unwrap(), -Vector::X);

    let across = ray([-2.0, 0.0, 5.0], [1.0, 0.0, 0.0]);
    let hits = s.intersection_points(&across, f64::INFINITY);
    assert_eq!(hits, vec![Point::new(-1.0, 0.0, 5.0), Point::new(1.0, 0.0, 5.0)]);
    assert_unit_normals(&s, &hits);

    let along = ray([0.5, 0.0, 0.0], [0.0, 0.0, 1.0]);
    assert!(s.intersection_points(&along, f64::INFINITY).is_empty());

    let tangent = ray([-2.0, 1.0, 0.0], [1.0, 0.0, 0.0]);
    assert!(s.intersection_points(&tangent, f64::INFINITY).is_empty());
}

#[test]
fn cylinder_normals() {
    let s = Shape::cylinder(Ray::new(Point::ORIGIN, Vector::Z), 2.0, 10.0).unwrap();

    assert_eq!(s.normal_at(&Point::new(2.0, 0.0, 5.0)).unwrap(), Vector::X);
    assert_eq!(s.normal_at(&Point::new(1.0, 1.0, 10.0)).unwrap(), Vector::Z);
    assert_eq!(s.normal_at(&Point::new(0.0, 0.0, 10.0)).unwrap(), Vector::Z);
    assert_eq!(s.normal_at(&Point::new(1.0, 1.0, 0.0)).unwrap(), -Vector::Z);
    assert_eq!(s.normal_at(&Point::new(0.0, 0.0, 0.0)).unwrap(), -Vector::Z);
}

#[test]
fn cylinder_intersections() {
    let s = Shape::cylinder(Ray::new(Point::ORIGIN, Vector::Z), 1.0, 2.0).unwrap();

    let through_caps = ray([0.5, 0.0, -1.0], [0.0, 0.0, 1.0]);
    let hits = s.intersection_points(&through_caps, f64::INFINITY);
    assert_eq!(hits, vec![Point::new(0.5, 0.0, 0.0), Point::new(0.5, 0.0, 2.0)]);
    assert_unit_normals(&s, &hits);

    let through_side = ray([-2.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
    let hits = s.intersection_points(&through_side, f64::INFINITY);
    assert_eq!(hits, vec![Point::new(-1.0, 0.0, 1.0), Point::new(1.0, 0.0, 1.0)]);
    assert_unit_normals(&s, &hits);

    let above = ray([-2.0, 0.0, 3.0], [1.0, 0.0, 0.0]);
    assert!(s.intersection_points(&above, f64::INFINITY).is_empty());

    let side_then_cap = ray([-2.0, 0.0, 1.0], [1.0, 0.0, 0.5]);
    let hits = s.intersection_points(&side_then_cap, f64::INFINITY);
    assert_eq!(hits, vec![Point::new(-1.0, 0.0, 1.5), Point::new(0.0, 0.0, 2.0)]);
    assert_unit_normals(&s, &hits);
}

#[test]
fn cylinder_rejects_bad_dimensions() {
    let axis = Ray::new(Point::ORIGIN, Vector::Z);

    assert!(Cylinder::new(axis, 1.0, 0.0).is_err());
    assert!(Cylinder::new(axis, 0.0, 1.0).is_err());
}
