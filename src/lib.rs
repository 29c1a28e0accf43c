pub mod consts;
pub mod error;

pub mod tuple;
pub mod ray;
pub mod color;

pub mod material;
pub mod light;

pub mod shape;
pub mod intersect;
pub mod scene;
pub mod tracer;

pub mod canvas;
pub mod parallel;
pub mod camera;

pub use error::{ Result, TracerError };

use consts::{ ALIGN_EPSILON, FEQ_EPSILON };

/// Checks whether a number is zero within the shared geometric tolerance.
pub fn is_zero(number: f64) -> bool {
    number.abs() < ALIGN_EPSILON
}

/// Snaps a number to exactly `0.0` when it is within the shared tolerance.
///
/// Every sign comparison in the intersection and shading code goes through
/// this function, so a value "almost zero" is treated identically everywhere
/// (a tangent ray is neither a crossing nor a contribution).
pub fn align_zero(number: f64) -> f64 {
    if is_zero(number) { 0.0 } else { number }
}

/// Loose floating point equality, used by `PartialEq` on value types.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}

#[test]
fn align_zero_snaps_tiny_values() {
    assert_eq!(align_zero(1e-12), 0.0);
    assert_eq!(align_zero(-1e-12), 0.0);
    assert_eq!(align_zero(0.5), 0.5);
    assert!(is_zero(-1e-11));
    assert!(!is_zero(1e-6));
}
