use std::fmt::Debug;

use crate::ray::Ray;
use crate::shape::Shape;
use crate::tuple::Point;

/// An intersection.
///
/// Associates the point where some ray crossed a surface with the `Shape`
/// which produced it, so that the material and emission of the surface can be
/// recovered when shading the point.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub shape: &'a Shape,
    pub point: Point,
}

/// Two intersections are equal if their points are equal and they refer to
/// the very same shape.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.point == other.point && std::ptr::eq(self.shape, other.shape)
    }
}

/// A collection of intersections.
///
/// Mostly a wrapper for a vector of `Intersection` objects. No intersections
/// and an empty collection are the same thing.
#[derive(Clone, Debug, Default)]
pub struct Intersections<'a> {
    pub intersections: Vec<Intersection<'a>>,
}

impl<'a> Intersections<'a> {
    pub fn new() -> Intersections<'a> {
        Intersections { intersections: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// Appends all intersections of `other`.
    pub fn extend(&mut self, other: Intersections<'a>) {
        self.intersections.extend(other.intersections);
    }

    /// Finds the intersection nearest to the head of `ray`.
    pub fn closest(&self, ray: &Ray) -> Option<Intersection<'a>> {
        ray.find_closest_intersection(&self.intersections)
    }
}

/// Anything a ray can be intersected with.
pub trait Intersectable: Debug + Send + Sync {
    /// Finds every intersection with `ray` strictly between its head and
    /// `max_distance`.
    fn find_intersections(&self, ray: &Ray, max_distance: f64) -> Intersections<'_>;

    /// Finds every intersection with `ray`, however far.
    fn find_all_intersections(&self, ray: &Ray) -> Intersections<'_> {
        self.find_intersections(ray, f64::INFINITY)
    }
}

impl Intersectable for Shape {
    fn find_intersections(&self, ray: &Ray, max_distance: f64) -> Intersections<'_> {
        Intersections {
            intersections: self.intersection_points(ray, max_distance)
                .into_iter()
                .map(|point| Intersection { shape: self, point })
                .collect(),
        }
    }
}

/// A composite of surfaces.
///
/// Intersecting the collection yields the union of the intersections of its
/// children, in insertion order. Collections may be nested.
#[derive(Debug, Default)]
pub struct Geometries {
    children: Vec<Box<dyn Intersectable>>,
}

impl Geometries {
    pub fn new() -> Geometries {
        Geometries { children: Vec::new() }
    }

    pub fn add<T: Intersectable + 'static>(&mut self, child: T) -> &mut Geometries {
        self.children.push(Box::new(child));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Intersectable for Geometries {
    fn find_intersections(&self, ray: &Ray, max_distance: f64) -> Intersections<'_> {
        let mut all = Intersections::new();
        for child in self.children.iter() {
            all.extend(child.find_intersections(ray, max_distance));
        }

        all
    }
}

/* Tests */

#[cfg(test)]
use crate::tuple::Vector;

#[test]
fn empty_geometries_never_intersect() {
    let g = Geometries::new();
    let r = Ray::new(Point::ORIGIN, Vector::Z);

    assert!(g.is_empty());
    assert!(g.find_all_intersections(&r).is_empty());
}

#[test]
fn geometries_union_children() {
    let r = Ray::new(Point::new(0.0, 0.0, -10.0), Vector::Z);
    let sphere = Shape::sphere(Point::ORIGIN, 1.0).unwrap();
    let plane = Shape::plane(Point::new(0.0, 0.0, 5.0), Vector::Z);
    let triangle = Shape::triangle(
        Point::new(0.0, 5.0, 0.0), Point::new(1.0, 6.0, 0.0), Point::new(-1.0, 6.0, 0.0)
    ).unwrap();

    let expected = sphere.find_all_intersections(&r).len()
        + plane.find_all_intersections(&r).len()
        + triangle.find_all_intersections(&r).len();

    let mut inner = Geometries::new();
    inner.add(triangle);

    let mut g = Geometries::new();
    g.add(sphere).add(plane).add(inner);

    assert_eq!(expected, 3);
    assert_eq!(g.find_all_intersections(&r).len(), expected);
    assert_eq!(g.find_intersections(&r, 10.0).len(), 1);
}

#[test]
fn closest_intersection() {
    let r = Ray::new(Point::new(0.0, 0.0, -10.0), Vector::Z);
    let sphere = Shape::sphere(Point::ORIGIN, 1.0).unwrap();
    let xs = sphere.find_all_intersections(&r);

    let hit = xs.closest(&r).unwrap();
    assert_eq!(hit.point, Point::new(0.0, 0.0, -1.0));
    assert!(std::ptr::eq(hit.shape, &sphere));
    assert!(Intersections::new().closest(&r).is_none());
}
