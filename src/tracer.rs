use crate::align_zero;
use crate::color::Color;
use crate::consts::{ MAX_CALC_COLOR_LEVEL, MIN_CALC_COLOR_K };
use crate::error::Result;
use crate::intersect::{ Intersectable, Intersection };
use crate::light::LightSource;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::tuple::{ Tuple3D, Vector };

/// Colors rays.
///
/// Implementations must not mutate any shared state: the camera calls
/// `trace_ray` concurrently from its worker threads.
pub trait RayTracer: Send + Sync {
    fn trace_ray(&self, ray: &Ray) -> Result<Color>;
}

/// A recursive Whitted-style ray tracer.
///
/// The color at a hit is the emission of the surface, the Phong diffuse and
/// specular light of every unshadowed light, and the colors carried by the
/// reflected and transmitted rays. Transmitted rays keep the direction of the
/// incoming ray; there is no refraction.
#[derive(Debug)]
pub struct SimpleRayTracer {
    scene: Scene,
}

impl SimpleRayTracer {
    pub fn new(scene: Scene) -> SimpleRayTracer {
        SimpleRayTracer { scene }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn find_closest(&self, ray: &Ray) -> Option<Intersection<'_>> {
        self.scene.geometries.find_all_intersections(ray).closest(ray)
    }

    /// Colors a hit, recursing at most `level - 1` more times.
    ///
    /// `k` is the product of every coefficient applied on the way to this hit.
    fn calc_color(&self, hit: &Intersection, ray: &Ray, level: usize, k: Tuple3D)
        -> Result<Color> {
        let n = hit.shape.normal_at(&hit.point)?;
        let v = ray.direction();

        let color = hit.shape.emission + self.local_effects(hit, v, &n, k)?;
        if level <= 1 {
            return Ok(color);
        }

        Ok(color + self.global_effects(hit, v, &n, level, k)?)
    }

    fn local_effects(&self, hit: &Intersection, v: &Vector, n: &Vector, k: Tuple3D)
        -> Result<Color> {
        let nv = align_zero(n.dot(v));
        if nv == 0.0 {
            return Ok(Color::black());
        }

        let material = &hit.shape.material;
        let mut color = Color::black();

        for light in self.scene.lights.iter() {
            let l = match light.direction_at(&hit.point) {
                Some(l) => l,
                None => continue,
            };

            // The light has to be on the same side of the surface as the eye.
            let nl = align_zero(n.dot(&l));
            if nl * nv <= 0.0 {
                continue;
            }

            let ktr = self.transparency(hit, light, &l, n);
            if ktr.product(&k).lower_than(MIN_CALC_COLOR_K) {
                continue;
            }

            let il = light.intensity_at(&hit.point).scale_by(&ktr);
            let diffuse = material.kd * nl.abs();

            let r = l.reflect(n)?;
            let vr = align_zero(v.dot(&r));
            let shininess = i32::try_from(material.shininess).unwrap_or(i32::MAX);
            let specular = material.ks * (-vr).max(0.0).powi(shininess);

            color = color + il.scale_by(&(diffuse + specular));
        }

        Ok(color)
    }

    /// How much of `light` reaches the hit through the surfaces in between.
    ///
    /// Every surface crossed by the shadow ray before the light attenuates it
    /// by its transparency. Fully blocked is `Tuple3D::ZERO`.
    fn transparency(&self, hit: &Intersection, light: &LightSource, l: &Vector, n: &Vector)
        -> Tuple3D {
        let shadow_ray = Ray::offset(hit.point, -*l, n);
        let distance = light.distance_to(&hit.point);

        let mut ktr = Tuple3D::ONE;
        let blockers = self.scene.geometries.find_intersections(&shadow_ray, distance);
        for blocker in blockers.intersections.iter() {
            ktr = ktr.product(&blocker.shape.material.kt);
            if ktr.lower_than(MIN_CALC_COLOR_K) {
                return Tuple3D::ZERO;
            }
        }

        ktr
    }

    fn global_effects(&self, hit: &Intersection, v: &Vector, n: &Vector, level: usize,
        k: Tuple3D) -> Result<Color> {
        let material = &hit.shape.material;

        let reflected = Ray::offset(hit.point, v.reflect(n)?, n);
        let transmitted = Ray::offset(hit.point, *v, n);

        Ok(self.global_effect(&reflected, level, k, &material.kr)?
            + self.global_effect(&transmitted, level, k, &material.kt)?)
    }

    fn global_effect(&self, ray: &Ray, level: usize, k: Tuple3D, kx: &Tuple3D)
        -> Result<Color> {
        let kkx = k.product(kx);
        if kkx.lower_than(MIN_CALC_COLOR_K) {
            return Ok(Color::black());
        }

        let color = match self.find_closest(ray) {
            Some(hit) => self.calc_color(&hit, ray, level - 1, kkx)?,
            None => self.scene.background,
        };

        Ok(color.scale_by(kx))
    }
}

impl RayTracer for SimpleRayTracer {
    /// Colors a ray with the background, or with the color of its nearest hit
    /// plus the ambient light.
    fn trace_ray(&self, ray: &Ray) -> Result<Color> {
        match self.find_closest(ray) {
            Some(hit) => Ok(
                self.calc_color(&hit, ray, MAX_CALC_COLOR_LEVEL, Tuple3D::ONE)?
                    + self.scene.ambient_light.intensity()
            ),
            None => Ok(self.scene.background),
        }
    }
}

/* Tests */

#[cfg(test)]
use crate::intersect::Geometries;
#[cfg(test)]
use crate::light::{ AmbientLight, DirectionalLight };
#[cfg(test)]
use crate::material::Material;
#[cfg(test)]
use crate::shape::Shape;
#[cfg(test)]
use crate::tuple::Point;

#[cfg(test)]
fn floor_scene(light_direction: Vector, occluder_kt: Option<f64>) -> Scene {
    let floor = Shape::plane(Point::ORIGIN, Vector::Z)
        .with_material(Material::default().with_kd(0.5).with_ks(0.5).with_shininess(20))
        .with_emission(Color::rgb(0.1, 0.0, 0.0));

    let mut geometries = Geometries::new();
    geometries.add(floor);

    if let Some(kt) = occluder_kt {
        let occluder = Shape::triangle(
            Point::new(-10.0, -10.0, 5.0), Point::new(10.0, -10.0, 5.0), Point::new(0.0, 10.0, 5.0)
        ).unwrap().with_material(Material::default().with_kt(kt));
        geometries.add(occluder);
    }

    let mut scene = Scene::new("floor")
        .with_background(Color::rgb(0.0, 0.0, 0.3))
        .with_ambient_light(AmbientLight::uniform(Color::white(), 0.1))
        .with_geometries(geometries);
    scene.add_light(DirectionalLight::new(Color::white(), light_direction));

    scene
}

#[test]
fn trace_ray_miss_is_background() {
    let tracer = SimpleRayTracer::new(floor_scene(-Vector::Z, None));
    let up = Ray::new(Point::new(0.0, 0.0, 3.0), Vector::Z);

    assert_eq!(tracer.trace_ray(&up).unwrap(), Color::rgb(0.0, 0.0, 0.3));
}

#[test]
fn opaque_surface_only_local_effects() {
    let tracer = SimpleRayTracer::new(floor_scene(-Vector::Z, None));
    let down = Ray::new(Point::new(0.0, 0.0, 3.0), -Vector::Z);

    // emission + diffuse 0.5 + specular 0.5 + ambient 0.1
    assert_eq!(tracer.trace_ray(&down).unwrap(), Color::rgb(1.2, 1.1, 1.1));
}

#[test]
fn light_behind_surface_contributes_nothing() {
    let tracer = SimpleRayTracer::new(floor_scene(Vector::Z, None));
    let down = Ray::new(Point::new(0.0, 0.0, 3.0), -Vector::Z);

    assert_eq!(tracer.trace_ray(&down).unwrap(), Color::rgb(0.2, 0.1, 0.1));
}

#[test]
fn shadow_attenuated_by_transparency() {
    let down = Ray::new(Point::new(0.0, 0.0, 3.0), -Vector::Z);

    let half = SimpleRayTracer::new(floor_scene(-Vector::Z, Some(0.5)));
    assert_eq!(half.trace_ray(&down).unwrap(), Color::rgb(0.7, 0.6, 0.6));

    let opaque = SimpleRayTracer::new(floor_scene(-Vector::Z, Some(0.0)));
    assert_eq!(opaque.trace_ray(&down).unwrap(), Color::rgb(0.2, 0.1, 0.1));
}

#[test]
fn transparent_surface_shows_what_is_behind() {
    // Looking down through the occluder at the floor.
    let tracer = SimpleRayTracer::new(floor_scene(Vector::Z, Some(0.5)));
    let down = Ray::new(Point::new(0.0, 0.0, 8.0), -Vector::Z);

    // The occluder is black and unlit; half of the floor color (emission
    // only, the light is below it) comes through, plus ambient once.
    assert_eq!(tracer.trace_ray(&down).unwrap(), Color::rgb(0.15, 0.1, 0.1));
}

#[test]
fn zero_shininess_with_grazing_reflection_stays_finite() {
    // The mirrored light direction is perpendicular to the view, so the
    // specular base is exactly zero.
    let floor = Shape::plane(Point::ORIGIN, Vector::Z)
        .with_material(Material::default().with_kd(0.5).with_shininess(0));
    let mut geometries = Geometries::new();
    geometries.add(floor);

    let mut scene = Scene::new("grazing").with_geometries(geometries);
    scene.add_light(DirectionalLight::new(Color::white(), Vector::new(1.0, 0.0, -1.0).unwrap()));
    let tracer = SimpleRayTracer::new(scene);

    let ray = Ray::new(Point::new(-3.0, 0.0, 3.0), Vector::new(1.0, 0.0, -1.0).unwrap());
    let color = tracer.trace_ray(&ray).unwrap();

    assert!(color.r.is_finite() && color.g.is_finite() && color.b.is_finite());
    assert_eq!(color, Color::white() * (0.5 / 2.0_f64.sqrt()));
}
