use std::ops::{ Add, Sub, Mul };

use crate::feq;
use crate::tuple::Tuple3D;

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. Channels are
/// light intensities, so unlike a display color they are not bounded by 1.0;
/// clamping only happens when a `Canvas` is written out.
///
/// # Examples
///
/// Blend two colors:
///
/// ```
/// # use whitted::color::Color;
/// let green = Color::green();
/// let blue = Color::blue();
/// let blend = Color::average(&[green, blue]);
/// assert_eq!(blend, Color::rgb(0.0, 0.5, 0.5));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating point
/// error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(v: [f64; 3]) -> Color {
        Color { r: v[0], g: v[1], b: v[2] }
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    /// The color white.
    pub fn white() -> Color {
        Color { r: 1.0, g: 1.0, b: 1.0 }
    }

    pub fn red() -> Color {
        Color { r: 1.0, g: 0.0, b: 0.0 }
    }

    pub fn green() -> Color {
        Color { r: 0.0, g: 1.0, b: 0.0 }
    }

    pub fn blue() -> Color {
        Color { r: 0.0, g: 0.0, b: 1.0 }
    }

    /// Attenuates each channel by the matching component of a triple.
    ///
    /// This is how material coefficients (`kD`, `kR`, ...) and accumulated
    /// transparency factors are applied to light intensities.
    ///
    /// ```
    /// # use whitted::color::Color;
    /// # use whitted::tuple::Tuple3D;
    /// let c = Color::rgb(100.0, 50.0, 10.0);
    /// let k = Tuple3D::new(0.5, 0.0, 1.0);
    /// assert_eq!(c.scale_by(&k), Color::rgb(50.0, 0.0, 10.0));
    /// ```
    pub fn scale_by(&self, k: &Tuple3D) -> Color {
        Color {
            r: self.r * k.x,
            g: self.g * k.y,
            b: self.b * k.z,
        }
    }

    /// Divides every channel by `n`.
    pub fn reduce(&self, n: usize) -> Color {
        *self * (1.0 / n as f64)
    }

    /// Computes the Hadamard product of two colors.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// Averages any number of colors channel by channel, unweighted.
    ///
    /// An empty slice averages to black.
    pub fn average(colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::black();
        }

        colors.iter()
            .fold(Color::black(), |acc, c| acc + *c)
            .reduce(colors.len())
    }
}

/// Adds two colors together.
///
/// Components are added together individually.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

/// Multiplies a color by a scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c1 * 2.0, Color::rgb(0.4, 0.6, 0.8));
}

#[test]
fn average_of_many() {
    let colors = [
        Color::rgb(1.0, 0.0, 0.0),
        Color::rgb(0.0, 1.0, 0.0),
        Color::rgb(0.0, 0.0, 1.0),
        Color::rgb(1.0, 1.0, 1.0),
    ];

    assert_eq!(Color::average(&colors), Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(Color::average(&[]), Color::black());
}

#[test]
fn reduce_color() {
    assert_eq!(Color::rgb(3.0, 6.0, 9.0).reduce(3), Color::rgb(1.0, 2.0, 3.0));
}
