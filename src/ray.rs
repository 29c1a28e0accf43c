use crate::{ align_zero, is_zero };
use crate::consts::RAY_DELTA;
use crate::intersect::Intersection;
use crate::tuple::{ Point, Vector };

/// A half-line with a head point and a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    head: Point,
    direction: Vector,
}

impl Ray {
    /// Creates a ray. The direction is normalized.
    pub fn new(head: Point, direction: Vector) -> Ray {
        Ray { head, direction: direction.normalize() }
    }

    /// Creates a secondary ray leaving a surface.
    ///
    /// The head is pushed by `RAY_DELTA` along `normal`, toward the side of
    /// the surface the ray travels into, so the ray does not immediately hit
    /// the surface it starts on. A direction tangent to the surface leaves
    /// the head where it is.
    pub fn offset(head: Point, direction: Vector, normal: &Vector) -> Ray {
        let nv = align_zero(normal.dot(&direction));
        let head = if nv == 0.0 {
            head
        } else {
            let delta = if nv > 0.0 { RAY_DELTA } else { -RAY_DELTA };
            Point { xyz: head.xyz + normal.xyz() * delta }
        };

        Ray::new(head, direction)
    }

    pub fn head(&self) -> &Point {
        &self.head
    }

    pub fn direction(&self) -> &Vector {
        &self.direction
    }

    /// The point at distance `t` along the ray. `t ~ 0` yields the head.
    pub fn point_at(&self, t: f64) -> Point {
        if is_zero(t) {
            self.head
        } else {
            Point { xyz: self.head.xyz + self.direction.xyz() * t }
        }
    }

    /// Finds the point nearest to the ray head, if any.
    pub fn find_closest_point(&self, points: &[Point]) -> Option<Point> {
        self.closest_by(points, |p| p).copied()
    }

    /// Finds the intersection whose point is nearest to the ray head.
    pub fn find_closest_intersection<'a>(&self, intersections: &[Intersection<'a>])
        -> Option<Intersection<'a>> {
        self.closest_by(intersections, |i| &i.point).copied()
    }

    fn closest_by<'t, T, F>(&self, items: &'t [T], point: F) -> Option<&'t T>
    where
        F: Fn(&T) -> &Point,
    {
        items.iter().min_by(|a, b| {
            let da = self.head.distance_squared(point(a));
            let db = self.head.distance_squared(point(b));
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

#[test]
fn ray_direction_is_normalized() {
    let r = Ray::new(Point::ORIGIN, Vector::new(0.0, 3.0, 4.0).unwrap());

    assert_eq!(*r.direction(), Vector::new(0.0, 0.6, 0.8).unwrap());
}

#[test]
fn ray_position() {
    let r = Ray::new(Point::new(2.0, 3.0, 4.0), Vector::X);

    assert_eq!(r.point_at(0.0), Point::new(2.0, 3.0, 4.0));
    assert_eq!(r.point_at(1.0), Point::new(3.0, 3.0, 4.0));
    assert_eq!(r.point_at(-1.0), Point::new(1.0, 3.0, 4.0));
    assert_eq!(r.point_at(2.5), Point::new(4.5, 3.0, 4.0));
}

#[test]
fn offset_moves_head_toward_direction_side() {
    let n = Vector::Z;
    let up = Ray::offset(Point::ORIGIN, Vector::new(1.0, 0.0, 1.0).unwrap(), &n);
    let down = Ray::offset(Point::ORIGIN, Vector::new(1.0, 0.0, -1.0).unwrap(), &n);
    let flat = Ray::offset(Point::ORIGIN, Vector::X, &n);

    assert_eq!(*up.head(), Point::new(0.0, 0.0, RAY_DELTA));
    assert_eq!(*down.head(), Point::new(0.0, 0.0, -RAY_DELTA));
    assert_eq!(*flat.head(), Point::ORIGIN);
}

#[test]
fn closest_point() {
    let r = Ray::new(Point::ORIGIN, Vector::X);
    let points = vec![
        Point::new(5.0, 0.0, 0.0),
        Point::new(-1.0, 0.0, 0.0),
        Point::new(3.0, 0.0, 0.0),
    ];

    assert_eq!(r.find_closest_point(&points), Some(Point::new(-1.0, 0.0, 0.0)));
    assert_eq!(r.find_closest_point(&[]), None);
}
