use crate::color::Color;
use crate::tuple::{ Point, Tuple3D, Vector };

/// Ambient light, added once to the color of every ray that hits a surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmbientLight {
    intensity: Color,
}

impl Default for AmbientLight {
    fn default() -> AmbientLight {
        AmbientLight::NONE
    }
}

impl AmbientLight {
    /// No ambient light at all.
    pub const NONE: AmbientLight = AmbientLight {
        intensity: Color { r: 0.0, g: 0.0, b: 0.0 },
    };

    /// Creates an ambient light from an original intensity `ia` attenuated by
    /// the per-channel coefficient `ka`.
    pub fn new(ia: Color, ka: Tuple3D) -> AmbientLight {
        AmbientLight { intensity: ia.scale_by(&ka) }
    }

    pub fn uniform(ia: Color, ka: f64) -> AmbientLight {
        AmbientLight { intensity: ia * ka }
    }

    pub fn intensity(&self) -> Color {
        self.intensity
    }
}

/// A light infinitely far away, lighting every point from the same direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub intensity: Color,
    direction: Vector,
}

impl DirectionalLight {
    pub fn new(intensity: Color, direction: Vector) -> DirectionalLight {
        DirectionalLight { intensity, direction: direction.normalize() }
    }
}

/// A point light.
///
/// Provides a color and a position where light is produced from. Intensity
/// falls off with distance `d` as `I / (kc + kl * d + kq * d^2)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Point,
    pub kc: f64,
    pub kl: f64,
    pub kq: f64,
}

impl PointLight {
    /// Creates a point light with no distance attenuation.
    pub fn new(intensity: Color, position: Point) -> PointLight {
        PointLight { intensity, position, kc: 1.0, kl: 0.0, kq: 0.0 }
    }

    pub fn with_kc(mut self, kc: f64) -> PointLight {
        self.kc = kc;
        self
    }

    pub fn with_kl(mut self, kl: f64) -> PointLight {
        self.kl = kl;
        self
    }

    pub fn with_kq(mut self, kq: f64) -> PointLight {
        self.kq = kq;
        self
    }

    fn intensity_at(&self, p: &Point) -> Color {
        let d2 = self.position.distance_squared(p);
        self.intensity * (1.0 / (self.kc + self.kl * d2.sqrt() + self.kq * d2))
    }

    fn direction_at(&self, p: &Point) -> Option<Vector> {
        p.subtract(&self.position).ok().map(|v| v.normalize())
    }
}

/// A point light which only shines around a central direction.
///
/// The point light intensity is scaled by `max(0, dir . l)^narrow_beam`, so
/// a larger `narrow_beam` gives a tighter spot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub light: PointLight,
    direction: Vector,
    pub narrow_beam: f64,
}

impl SpotLight {
    pub fn new(intensity: Color, position: Point, direction: Vector)
        -> SpotLight {
        SpotLight {
            light: PointLight::new(intensity, position),
            direction: direction.normalize(),
            narrow_beam: 1.0,
        }
    }

    pub fn with_attenuation(mut self, kc: f64, kl: f64, kq: f64) -> SpotLight {
        self.light = self.light.with_kc(kc).with_kl(kl).with_kq(kq);
        self
    }

    pub fn with_narrow_beam(mut self, narrow_beam: f64) -> SpotLight {
        self.narrow_beam = narrow_beam;
        self
    }

    fn intensity_at(&self, p: &Point) -> Color {
        let factor = match self.light.direction_at(p) {
            Some(l) => self.direction.dot(&l).max(0.0).powf(self.narrow_beam),
            None => 0.0,
        };

        self.light.intensity_at(p) * factor
    }
}

/// A light source illuminating the surfaces of a scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LightSource {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl From<DirectionalLight> for LightSource {
    fn from(light: DirectionalLight) -> LightSource {
        LightSource::Directional(light)
    }
}

impl From<PointLight> for LightSource {
    fn from(light: PointLight) -> LightSource {
        LightSource::Point(light)
    }
}

impl From<SpotLight> for LightSource {
    fn from(light: SpotLight) -> LightSource {
        LightSource::Spot(light)
    }
}

impl LightSource {
    /// The attenuated intensity of this light arriving at `p`.
    pub fn intensity_at(&self, p: &Point) -> Color {
        match self {
            LightSource::Directional(d) => d.intensity,
            LightSource::Point(pl) => pl.intensity_at(p),
            LightSource::Spot(s) => s.intensity_at(p),
        }
    }

    /// The unit direction in which light travels when it arrives at `p`.
    ///
    /// The vector points from the light toward the point. `None` is returned
    /// when `p` coincides with a positional light, which then contributes
    /// nothing at that point.
    pub fn direction_at(&self, p: &Point) -> Option<Vector> {
        match self {
            LightSource::Directional(d) => Some(d.direction),
            LightSource::Point(pl) => pl.direction_at(p),
            LightSource::Spot(s) => s.light.direction_at(p),
        }
    }

    /// Distance from `p` to the light; infinite for directional lights.
    pub fn distance_to(&self, p: &Point) -> f64 {
        match self {
            LightSource::Directional(_) => f64::INFINITY,
            LightSource::Point(pl) => pl.position.distance(p),
            LightSource::Spot(s) => s.light.position.distance(p),
        }
    }
}

#[test]
fn ambient_light_is_attenuated() {
    let a = AmbientLight::new(
        Color::rgb(255.0, 191.0, 191.0), Tuple3D::new(1.0, 0.5, 0.0)
    );

    assert_eq!(a.intensity(), Color::rgb(255.0, 95.5, 0.0));
    assert_eq!(AmbientLight::default().intensity(), Color::black());
}

#[test]
fn directional_light_is_uniform() {
    let light: LightSource = DirectionalLight::new(
        Color::white(), Vector::new(0.0, 0.0, -2.0).unwrap()
    ).into();
    let p = Point::new(10.0, -3.0, 7.0);

    assert_eq!(light.intensity_at(&p), Color::white());
    assert_eq!(light.direction_at(&p), Some(Vector::new(0.0, 0.0, -1.0).unwrap()));
    assert!(light.distance_to(&p).is_infinite());
}

#[test]
fn point_light_attenuates_with_distance() {
    let light: LightSource = PointLight::new(
        Color::rgb(100.0, 100.0, 100.0), Point::new(0.0, 0.0, 10.0)
    ).with_kl(0.1).with_kq(0.01).into();
    let p = Point::ORIGIN;

    // 1 + 0.1 * 10 + 0.01 * 100 = 3
    assert_eq!(light.intensity_at(&p), Color::rgb(100.0 / 3.0, 100.0 / 3.0, 100.0 / 3.0));
    assert_eq!(light.direction_at(&p), Some(Vector::new(0.0, 0.0, -1.0).unwrap()));
    assert_eq!(light.distance_to(&p), 10.0);
}

#[test]
fn point_light_at_the_point_has_no_direction() {
    let light: LightSource = PointLight::new(Color::white(), Point::ORIGIN).into();

    assert_eq!(light.direction_at(&Point::ORIGIN), None);
}

#[test]
fn spot_light_only_lights_forward() {
    let light: LightSource = SpotLight::new(
        Color::white(), Point::new(0.0, 0.0, 10.0), Vector::new(0.0, 0.0, -1.0).unwrap()
    ).into();

    assert_eq!(light.intensity_at(&Point::ORIGIN), Color::white());
    assert_eq!(light.intensity_at(&Point::new(0.0, 0.0, 20.0)), Color::black());

    // 45 degrees off axis
    let side = light.intensity_at(&Point::new(10.0, 0.0, 0.0));
    assert_eq!(side, Color::white() * (0.5f64.sqrt()));
}
