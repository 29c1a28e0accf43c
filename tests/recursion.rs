use whitted::color::Color;
use whitted::consts::{ MAX_CALC_COLOR_LEVEL, MIN_CALC_COLOR_K };
use whitted::intersect::Geometries;
use whitted::material::Material;
use whitted::ray::Ray;
use whitted::scene::Scene;
use whitted::shape::Shape;
use whitted::tracer::{ RayTracer, SimpleRayTracer };
use whitted::tuple::{ Point, Vector };

const GLOW: f64 = 0.3;

/// Two facing glowing mirrors with reflectivity `kr`. A ray bouncing between
/// them collects `GLOW * kr^i` at its i-th bounce.
fn mirror_corridor(kr: f64, gap: f64) -> SimpleRayTracer {
    let mirror = |z: f64| {
        Shape::plane(Point::new(0.0, 0.0, z), Vector::Z)
            .with_material(Material::default().with_kr(kr))
            .with_emission(Color::white() * GLOW)
    };

    let mut geometries = Geometries::new();
    geometries.add(mirror(0.0)).add(mirror(gap));

    SimpleRayTracer::new(Scene::new("mirrors").with_geometries(geometries))
}

fn bounce(tracer: &SimpleRayTracer, gap: f64) -> Color {
    let ray = Ray::new(Point::new(0.0, 0.0, gap / 2.0), -Vector::Z);
    tracer.trace_ray(&ray).unwrap()
}

/// The number of terms the recursion keeps for reflectivity `kr`: stops at
/// the depth limit, or as soon as `kr^i` drops under the threshold.
fn expected_terms(kr: f64) -> usize {
    let mut terms = 1;
    while terms < MAX_CALC_COLOR_LEVEL && kr.powi(terms as i32) >= MIN_CALC_COLOR_K {
        terms += 1;
    }

    terms
}

fn partial_sum(kr: f64, terms: usize) -> Color {
    let sum: f64 = (0..terms).map(|i| kr.powi(i as i32)).sum();
    Color::white() * (GLOW * sum)
}

#[test]
fn depth_limit_stops_strong_mirrors() {
    // 0.5^9 is still above the threshold; the depth limit ends the chain.
    let kr = 0.5;
    assert_eq!(expected_terms(kr), MAX_CALC_COLOR_LEVEL);

    let color = bounce(&mirror_corridor(kr, 10.0), 10.0);
    assert_eq!(color, partial_sum(kr, MAX_CALC_COLOR_LEVEL));
}

#[test]
fn attenuation_threshold_stops_weak_mirrors() {
    // 0.4^8 falls under the threshold before the depth limit is reached.
    let kr = 0.4;
    let terms = expected_terms(kr);
    assert_eq!(terms, 8);

    let color = bounce(&mirror_corridor(kr, 10.0), 10.0);
    assert_eq!(color, partial_sum(kr, terms));
    assert_ne!(color, partial_sum(kr, MAX_CALC_COLOR_LEVEL));
}

#[test]
fn color_stabilizes_past_cutoff_depth() {
    // Whatever the corridor looks like, no contribution beyond the cutoff
    // depth is ever added, so the color is the same truncated series.
    let kr = 0.4;
    let narrow = bounce(&mirror_corridor(kr, 2.0), 2.0);
    let wide = bounce(&mirror_corridor(kr, 50.0), 50.0);

    assert_eq!(narrow, wide);
    assert_eq!(narrow, partial_sum(kr, expected_terms(kr)));
}

#[test]
fn opaque_mirrorless_surface_has_no_global_effects() {
    let color = bounce(&mirror_corridor(0.0, 10.0), 10.0);

    assert_eq!(color, Color::white() * GLOW);
}
