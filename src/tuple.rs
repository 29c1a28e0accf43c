use std::ops::{ Add, Sub, Neg, Mul };

use crate::{ feq, is_zero };
use crate::error::{ Result, TracerError };

/// A raw triple of real numbers.
///
/// `Tuple3D` carries no meaning by itself. It is the storage behind `Point`
/// and `Vector`, and doubles as the per-channel attenuation triple used by
/// materials (`kD`, `kS`, `kT`, `kR`) and the recursive shading engine.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple3D {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

impl PartialEq for Tuple3D {
    fn eq(&self, other: &Tuple3D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl From<[f64; 3]> for Tuple3D {
    fn from(v: [f64; 3]) -> Tuple3D {
        Tuple3D { x: v[0], y: v[1], z: v[2] }
    }
}

impl From<f64> for Tuple3D {
    fn from(v: f64) -> Tuple3D {
        Tuple3D::uniform(v)
    }
}

impl Tuple3D {
    pub const ZERO: Tuple3D = Tuple3D { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Tuple3D = Tuple3D { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Tuple3D {
        Tuple3D { x, y, z }
    }

    /// Creates a triple with the same value in every component.
    pub fn uniform(v: f64) -> Tuple3D {
        Tuple3D { x: v, y: v, z: v }
    }

    /// Checks whether every component is zero within `ALIGN_EPSILON`.
    pub fn is_zero(&self) -> bool {
        is_zero(self.x) && is_zero(self.y) && is_zero(self.z)
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.x.powi(2) + self.y.powi(2) + self.z.powi(2)
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn dot(&self, other: &Tuple3D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn cross(&self, other: &Tuple3D) -> Tuple3D {
        Tuple3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Multiplies two triples component by component.
    pub fn product(&self, other: &Tuple3D) -> Tuple3D {
        Tuple3D {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    /// Checks whether every component is strictly lower than `k`.
    ///
    /// Used to decide when an attenuation triple has become too weak to be
    /// worth following any further.
    pub fn lower_than(&self, k: f64) -> bool {
        self.x < k && self.y < k && self.z < k
    }
}

impl Add for Tuple3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z
        }
    }
}

impl Sub for Tuple3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z
        }
    }
}

impl Neg for Tuple3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z
        }
    }
}

impl Mul<f64> for Tuple3D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other
        }
    }
}

impl Mul<Tuple3D> for f64 {
    type Output = Tuple3D;

    fn mul(self, other: Tuple3D) -> Tuple3D {
        other * self
    }
}

/// A location in 3D space.
///
/// Subtracting two points yields a `Vector` (a displacement); adding a vector
/// to a point yields another point. Points are never added to each other.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub xyz: Tuple3D,
}

impl From<[f64; 3]> for Point {
    fn from(v: [f64; 3]) -> Point {
        Point { xyz: v.into() }
    }
}

impl Point {
    pub const ORIGIN: Point = Point { xyz: Tuple3D::ZERO };

    pub fn new(x: f64, y: f64, z: f64) -> Point {
        Point { xyz: Tuple3D { x, y, z } }
    }

    pub fn x(&self) -> f64 { self.xyz.x }
    pub fn y(&self) -> f64 { self.xyz.y }
    pub fn z(&self) -> f64 { self.xyz.z }

    /// Computes the displacement from `other` to `self`.
    ///
    /// Fails with `InvalidGeometry` when both points coincide, since the
    /// result would be the zero vector.
    pub fn subtract(&self, other: &Point) -> Result<Vector> {
        Vector::from_tuple(self.xyz - other.xyz)
    }

    /// Moves this point by a vector.
    pub fn translate(&self, v: &Vector) -> Point {
        Point { xyz: self.xyz + v.xyz }
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        (self.xyz - other.xyz).magnitude_squared()
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, other: Vector) -> Point {
        Point { xyz: self.xyz + other.xyz }
    }
}

/// A non-zero displacement in 3D space.
///
/// The zero vector cannot be represented: every constructor and every
/// operation which could produce it returns `Err(InvalidGeometry)` instead.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vector {
    xyz: Tuple3D,
}

impl Vector {
    pub const X: Vector = Vector { xyz: Tuple3D { x: 1.0, y: 0.0, z: 0.0 } };
    pub const Y: Vector = Vector { xyz: Tuple3D { x: 0.0, y: 1.0, z: 0.0 } };
    pub const Z: Vector = Vector { xyz: Tuple3D { x: 0.0, y: 0.0, z: 1.0 } };

    pub fn new(x: f64, y: f64, z: f64) -> Result<Vector> {
        Vector::from_tuple(Tuple3D { x, y, z })
    }

    /// Wraps a raw triple, rejecting the zero vector.
    pub fn from_tuple(xyz: Tuple3D) -> Result<Vector> {
        if xyz.is_zero() {
            return Err(TracerError::InvalidGeometry(
                "vector cannot be the zero vector".into()
            ));
        }

        Ok(Vector { xyz })
    }

    pub fn x(&self) -> f64 { self.xyz.x }
    pub fn y(&self) -> f64 { self.xyz.y }
    pub fn z(&self) -> f64 { self.xyz.z }

    pub fn xyz(&self) -> Tuple3D {
        self.xyz
    }

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        Vector::from_tuple(self.xyz + other.xyz)
    }

    pub fn subtract(&self, other: &Vector) -> Result<Vector> {
        Vector::from_tuple(self.xyz - other.xyz)
    }

    pub fn scale(&self, k: f64) -> Result<Vector> {
        Vector::from_tuple(self.xyz * k)
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.xyz.dot(&other.xyz)
    }

    /// Cross product; fails for parallel vectors.
    pub fn cross(&self, other: &Vector) -> Result<Vector> {
        Vector::from_tuple(self.xyz.cross(&other.xyz))
    }

    pub fn length_squared(&self) -> f64 {
        self.xyz.magnitude_squared()
    }

    pub fn length(&self) -> f64 {
        self.xyz.magnitude()
    }

    pub fn normalize(&self) -> Vector {
        Vector { xyz: self.xyz * (1.0 / self.length()) }
    }

    /// Reflects this vector across a unit normal: `v - n * 2(v.n)`.
    pub fn reflect(&self, normal: &Vector) -> Result<Vector> {
        let nv = self.dot(normal);
        Vector::from_tuple(self.xyz - normal.xyz * (2.0 * nv))
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector { xyz: -self.xyz }
    }
}

/* Tests */

#[test]
fn zero_vector_is_rejected() {
    assert!(Vector::new(0.0, 0.0, 0.0).is_err());
    assert!(Vector::new(1e-12, 0.0, -1e-12).is_err());
    assert!(Vector::new(0.0, 0.0, 1.0).is_ok());
}

#[test]
fn sub_points() {
    let p1 = Point::new(3.0, 2.0, 1.0);
    let p2 = Point::new(5.0, 6.0, 7.0);

    assert_eq!(p1.subtract(&p2).unwrap(), Vector::new(-2.0, -4.0, -6.0).unwrap());
    assert!(p1.subtract(&p1).is_err());
}

#[test]
fn add_vector_to_point() {
    let p = Point::new(1.0, 2.0, 3.0);
    let v = Vector::new(-1.0, -3.0, -2.0).unwrap();

    assert_eq!(p.translate(&v), Point::new(0.0, -1.0, 1.0));
    assert_eq!(p + v, Point::new(0.0, -1.0, 1.0));
}

#[test]
fn opposite_vectors_do_not_sum() {
    let v = Vector::new(1.0, 2.0, 3.0).unwrap();

    assert!(v.add(&-v).is_err());
    assert_eq!(v.add(&v).unwrap(), Vector::new(2.0, 4.0, 6.0).unwrap());
}

#[test]
fn scale_by_zero_fails() {
    let v = Vector::new(1.0, 2.0, 3.0).unwrap();

    assert!(v.scale(0.0).is_err());
    assert_eq!(v.scale(-2.0).unwrap(), Vector::new(-2.0, -4.0, -6.0).unwrap());
}

#[test]
fn normalize_dirty() {
    let v = Vector::new(1.0, 2.0, 3.0).unwrap();
    let e = Vector::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    ).unwrap();

    assert_eq!(v.normalize(), e);
    assert!(crate::feq(v.normalize().length(), 1.0));
}

#[test]
fn dot_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0).unwrap();
    let b = Vector::new(2.0, 3.0, 4.0).unwrap();

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0).unwrap();
    let b = Vector::new(2.0, 3.0, 4.0).unwrap();

    assert_eq!(a.cross(&b).unwrap(), Vector::new(-1.0, 2.0, -1.0).unwrap());
    assert_eq!(b.cross(&a).unwrap(), Vector::new(1.0, -2.0, 1.0).unwrap());
}

#[test]
fn cross_parallel_vectors_fails() {
    let a = Vector::new(1.0, 2.0, 3.0).unwrap();
    let b = Vector::new(-2.0, -4.0, -6.0).unwrap();

    assert!(a.cross(&b).is_err());
}

#[test]
fn reflect_45() {
    let v = Vector::new(1.0, -1.0, 0.0).unwrap();
    let n = Vector::Y;

    assert_eq!(v.reflect(&n).unwrap(), Vector::new(1.0, 1.0, 0.0).unwrap());
}

#[test]
fn point_distance() {
    let p1 = Point::new(1.0, 2.0, 3.0);
    let p2 = Point::new(4.0, 6.0, 3.0);

    assert_eq!(p1.distance_squared(&p2), 25.0);
    assert_eq!(p1.distance(&p2), 5.0);
}

#[test]
fn attenuation_lower_than() {
    assert!(Tuple3D::uniform(0.0009).lower_than(0.001));
    assert!(!Tuple3D::new(0.0009, 0.5, 0.0).lower_than(0.001));
    assert_eq!(
        Tuple3D::new(0.5, 0.2, 1.0).product(&Tuple3D::uniform(0.5)),
        Tuple3D::new(0.25, 0.1, 0.5)
    );
}
