use std::fs;
use std::path::Path;

use log::info;
use serde::{ Serialize, Deserialize };

use crate::is_zero;
use crate::color::Color;
use crate::consts::{ DEFAULT_HEIGHT, DEFAULT_WIDTH };
use crate::error::{ Result, TracerError };
use crate::intersect::Geometries;
use crate::light::{ AmbientLight, DirectionalLight, LightSource, PointLight, SpotLight };
use crate::material::Material;
use crate::ray::Ray;
use crate::shape::{ Plane, Shape, ShapeType };
use crate::tuple::{ Point, Tuple3D, Vector };

/// Everything a ray tracer needs to color rays: the surfaces, the lights and
/// what to show when nothing is hit.
///
/// A scene is assembled once and only read while rendering.
#[derive(Debug, Default)]
pub struct Scene {
    pub name: String,
    pub background: Color,
    pub ambient_light: AmbientLight,
    pub geometries: Geometries,
    pub lights: Vec<LightSource>,
}

impl Scene {
    pub fn new(name: &str) -> Scene {
        Scene { name: name.to_string(), ..Default::default() }
    }

    pub fn with_background(mut self, background: Color) -> Scene {
        self.background = background;
        self
    }

    pub fn with_ambient_light(mut self, ambient_light: AmbientLight) -> Scene {
        self.ambient_light = ambient_light;
        self
    }

    pub fn with_geometries(mut self, geometries: Geometries) -> Scene {
        self.geometries = geometries;
        self
    }

    pub fn with_lights(mut self, lights: Vec<LightSource>) -> Scene {
        self.lights = lights;
        self
    }

    pub fn add_light<L: Into<LightSource>>(&mut self, light: L) -> &mut Scene {
        self.lights.push(light.into());
        self
    }
}

/// Camera settings read from a scene description.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    pub width: usize,
    pub height: usize,
    pub location: Point,
    pub to: Vector,
    pub up: Vector,
    pub vp_width: f64,
    pub vp_height: f64,
    pub vp_distance: f64,
    pub rays: usize,
    pub threads: usize,
}

/// A scene description file: the scene and how to look at it.
pub struct SceneFile {
    pub scene: Scene,
    pub camera: CameraSettings,
}

impl SceneFile {
    /// Reads and validates a JSON scene description.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SceneFile> {
        let text = fs::read_to_string(path.as_ref())?;
        let scene_json: SceneJson = serde_json::from_str(&text)?;
        let scene_file = SceneFile::try_from(scene_json)?;

        info!(
            "loaded scene \"{}\" from {}: {} shapes, {} lights",
            scene_file.scene.name,
            path.as_ref().display(),
            scene_file.scene.geometries.len(),
            scene_file.scene.lights.len()
        );

        Ok(scene_file)
    }
}

/// A coefficient given either as one value for all channels or per channel.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoefficientJson {
    Uniform(f64),
    PerChannel([f64; 3]),
}

impl From<CoefficientJson> for Tuple3D {
    fn from(k: CoefficientJson) -> Tuple3D {
        match k {
            CoefficientJson::Uniform(v) => Tuple3D::uniform(v),
            CoefficientJson::PerChannel(v) => v.into(),
        }
    }
}

impl Default for CoefficientJson {
    fn default() -> CoefficientJson {
        CoefficientJson::Uniform(0.0)
    }
}

fn default_width() -> usize { DEFAULT_WIDTH }
fn default_height() -> usize { DEFAULT_HEIGHT }
fn default_rays() -> usize { 1 }
fn default_shininess() -> u32 { 1 }
fn default_kc() -> f64 { 1.0 }
fn default_narrow_beam() -> f64 { 1.0 }
fn default_name() -> String { "scene".to_string() }

#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    #[serde(default = "default_name")]
    name: String,

    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,

    camera: CameraJson,

    #[serde(default)]
    background: [f64; 3],
    #[serde(default)]
    ambient: Option<AmbientJson>,

    #[serde(default)]
    lights: Vec<LightJson>,
    shapes: Vec<ShapeJson>,
}

#[derive(Serialize, Deserialize)]
struct CameraJson {
    location: [f64; 3],
    to: [f64; 3],
    up: [f64; 3],
    vp_width: f64,
    vp_height: f64,
    vp_distance: f64,

    #[serde(default = "default_rays")]
    rays: usize,
    #[serde(default)]
    threads: usize,
}

#[derive(Serialize, Deserialize)]
struct AmbientJson {
    color: [f64; 3],
    ka: CoefficientJson,
}

#[derive(Serialize, Deserialize)]
struct MaterialJson {
    #[serde(default)]
    kd: CoefficientJson,
    #[serde(default)]
    ks: CoefficientJson,
    #[serde(default)]
    kt: CoefficientJson,
    #[serde(default)]
    kr: CoefficientJson,
    #[serde(default = "default_shininess")]
    shininess: u32,
}

impl From<MaterialJson> for Material {
    fn from(m: MaterialJson) -> Material {
        Material {
            kd: m.kd.into(),
            ks: m.ks.into(),
            kt: m.kt.into(),
            kr: m.kr.into(),
            shininess: m.shininess,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LightJson {
    Directional {
        color: [f64; 3],
        direction: [f64; 3],
    },
    Point {
        color: [f64; 3],
        position: [f64; 3],
        #[serde(default = "default_kc")]
        kc: f64,
        #[serde(default)]
        kl: f64,
        #[serde(default)]
        kq: f64,
    },
    Spot {
        color: [f64; 3],
        position: [f64; 3],
        direction: [f64; 3],
        #[serde(default = "default_kc")]
        kc: f64,
        #[serde(default)]
        kl: f64,
        #[serde(default)]
        kq: f64,
        #[serde(default = "default_narrow_beam")]
        narrow_beam: f64,
    },
}

fn vector(v: [f64; 3]) -> Result<Vector> {
    Vector::new(v[0], v[1], v[2])
}

/// Attenuation factors must be non-negative and not all zero so the light
/// intensity stays finite.
fn attenuation(kc: f64, kl: f64, kq: f64) -> Result<(f64, f64, f64)> {
    if kc < 0.0 || kl < 0.0 || kq < 0.0 {
        return Err(TracerError::InvalidGeometry(
            format!("negative light attenuation ({}, {}, {})", kc, kl, kq)
        ));
    }
    if is_zero(kc) && is_zero(kl) && is_zero(kq) {
        return Err(TracerError::InvalidGeometry("light attenuation is all zero".to_string()));
    }

    Ok((kc, kl, kq))
}

impl TryFrom<LightJson> for LightSource {
    type Error = TracerError;

    fn try_from(light_json: LightJson) -> Result<LightSource> {
        let light = match light_json {
            LightJson::Directional { color, direction } =>
                DirectionalLight::new(color.into(), vector(direction)?).into(),

            LightJson::Point { color, position, kc, kl, kq } => {
                let (kc, kl, kq) = attenuation(kc, kl, kq)?;
                PointLight::new(color.into(), position.into())
                    .with_kc(kc)
                    .with_kl(kl)
                    .with_kq(kq)
                    .into()
            }

            LightJson::Spot { color, position, direction, kc, kl, kq, narrow_beam } => {
                let (kc, kl, kq) = attenuation(kc, kl, kq)?;
                SpotLight::new(color.into(), position.into(), vector(direction)?)
                    .with_attenuation(kc, kl, kq)
                    .with_narrow_beam(narrow_beam)
                    .into()
            }
        };

        Ok(light)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum GeometryJson {
    Plane {
        point: [f64; 3],
        normal: [f64; 3],
    },
    Plane3 {
        points: [[f64; 3]; 3],
    },
    Sphere {
        center: [f64; 3],
        radius: f64,
    },
    Tube {
        origin: [f64; 3],
        axis: [f64; 3],
        radius: f64,
    },
    Cylinder {
        origin: [f64; 3],
        axis: [f64; 3],
        radius: f64,
        height: f64,
    },
    Polygon {
        vertices: Vec<[f64; 3]>,
    },
    Triangle {
        vertices: [[f64; 3]; 3],
    },
}

#[derive(Serialize, Deserialize)]
struct ShapeJson {
    #[serde(flatten)]
    geometry: GeometryJson,

    #[serde(default)]
    material: Option<MaterialJson>,
    #[serde(default)]
    emission: [f64; 3],
}

impl TryFrom<ShapeJson> for Shape {
    type Error = TracerError;

    fn try_from(shape_json: ShapeJson) -> Result<Shape> {
        let shape = match shape_json.geometry {
            GeometryJson::Plane { point, normal } =>
                Shape::plane(point.into(), vector(normal)?),
            GeometryJson::Plane3 { points: [p1, p2, p3] } =>
                ShapeType::Plane(Plane::from_points(p1.into(), p2.into(), p3.into())?).into(),
            GeometryJson::Sphere { center, radius } =>
                Shape::sphere(center.into(), radius)?,
            GeometryJson::Tube { origin, axis, radius } =>
                Shape::tube(Ray::new(origin.into(), vector(axis)?), radius)?,
            GeometryJson::Cylinder { origin, axis, radius, height } =>
                Shape::cylinder(Ray::new(origin.into(), vector(axis)?), radius, height)?,
            GeometryJson::Polygon { vertices } =>
                Shape::polygon(vertices.into_iter().map(Point::from).collect())?,
            GeometryJson::Triangle { vertices: [p1, p2, p3] } =>
                Shape::triangle(p1.into(), p2.into(), p3.into())?,
        };

        let material = shape_json.material.map(Material::from).unwrap_or_default();
        Ok(shape.with_material(material).with_emission(shape_json.emission.into()))
    }
}

impl TryFrom<SceneJson> for SceneFile {
    type Error = TracerError;

    fn try_from(scene_json: SceneJson) -> Result<SceneFile> {
        let c = scene_json.camera;
        let camera = CameraSettings {
            width: scene_json.width,
            height: scene_json.height,
            location: c.location.into(),
            to: vector(c.to)?,
            up: vector(c.up)?,
            vp_width: c.vp_width,
            vp_height: c.vp_height,
            vp_distance: c.vp_distance,
            rays: c.rays,
            threads: c.threads,
        };

        let mut geometries = Geometries::new();
        for shape_json in scene_json.shapes {
            geometries.add(Shape::try_from(shape_json)?);
        }

        let lights = scene_json.lights.into_iter()
            .map(LightSource::try_from)
            .collect::<Result<Vec<_>>>()?;

        let ambient_light = match scene_json.ambient {
            Some(a) => AmbientLight::new(a.color.into(), a.ka.into()),
            None => AmbientLight::NONE,
        };

        let scene = Scene::new(&scene_json.name)
            .with_background(scene_json.background.into())
            .with_ambient_light(ambient_light)
            .with_geometries(geometries)
            .with_lights(lights);

        Ok(SceneFile { scene, camera })
    }
}

impl std::str::FromStr for SceneFile {
    type Err = TracerError;

    fn from_str(s: &str) -> Result<SceneFile> {
        let scene_json: SceneJson = serde_json::from_str(s)?;
        SceneFile::try_from(scene_json)
    }
}

#[cfg(test)]
const TEST_SCENE: &str = r#"{
    "name": "test",
    "width": 20,
    "height": 10,
    "camera": {
        "location": [0, 0, 10],
        "to": [0, 0, -1],
        "up": [0, 1, 0],
        "vp_width": 2, "vp_height": 1, "vp_distance": 5,
        "threads": 2
    },
    "background": [0.1, 0.1, 0.1],
    "ambient": { "color": [1, 1, 1], "ka": 0.15 },
    "lights": [
        { "type": "directional", "color": [1, 1, 1], "direction": [0, 0, -1] },
        { "type": "point", "color": [1, 1, 1], "position": [0, 5, 5], "kl": 0.01 },
        { "type": "spot", "color": [1, 1, 1], "position": [0, 5, 5], "direction": [0, -1, -1], "narrow_beam": 5 }
    ],
    "shapes": [
        { "type": "sphere", "center": [0, 0, 0], "radius": 1,
          "material": { "kd": 0.5, "ks": [0.5, 0.4, 0.3], "shininess": 30 },
          "emission": [0.2, 0, 0] },
        { "type": "plane", "point": [0, -1, 0], "normal": [0, 1, 0] },
        { "type": "plane3", "points": [[1, 0, -5], [0, 1, -5], [0, 0, -5]] },
        { "type": "triangle", "vertices": [[-1, 0, 0], [1, 0, 0], [0, 1, 0]] },
        { "type": "polygon", "vertices": [[0, 0, 1], [1, 0, 0], [0, 1, 0], [-1, 1, 1]] },
        { "type": "tube", "origin": [0, 0, 0], "axis": [0, 1, 0], "radius": 0.2 },
        { "type": "cylinder", "origin": [2, 0, 0], "axis": [0, 1, 0], "radius": 0.5, "height": 2 }
    ]
}"#;

#[test]
fn parse_scene_description() {
    let file: SceneFile = TEST_SCENE.parse().unwrap();

    assert_eq!(file.scene.name, "test");
    assert_eq!(file.scene.background, Color::rgb(0.1, 0.1, 0.1));
    assert_eq!(file.scene.ambient_light.intensity(), Color::rgb(0.15, 0.15, 0.15));
    assert_eq!(file.scene.geometries.len(), 7);
    assert_eq!(file.scene.lights.len(), 3);

    assert_eq!(file.camera.width, 20);
    assert_eq!(file.camera.height, 10);
    assert_eq!(file.camera.rays, 1);
    assert_eq!(file.camera.threads, 2);
    assert_eq!(file.camera.location, Point::new(0.0, 0.0, 10.0));
}

#[test]
fn scene_shape_materials() {
    let shape: Shape = Shape::try_from(ShapeJson {
        geometry: GeometryJson::Sphere { center: [0.0, 0.0, 0.0], radius: 2.0 },
        material: Some(MaterialJson {
            kd: CoefficientJson::Uniform(0.5),
            ks: CoefficientJson::PerChannel([0.1, 0.2, 0.3]),
            kt: CoefficientJson::default(),
            kr: CoefficientJson::default(),
            shininess: 40,
        }),
        emission: [0.0, 0.0, 1.0],
    }).unwrap();

    assert_eq!(shape.material.kd, Tuple3D::uniform(0.5));
    assert_eq!(shape.material.ks, Tuple3D::new(0.1, 0.2, 0.3));
    assert_eq!(shape.material.kt, Tuple3D::ZERO);
    assert_eq!(shape.material.shininess, 40);
    assert_eq!(shape.emission, Color::blue());
}

#[test]
fn invalid_scene_geometry_is_rejected() {
    let bad_sphere = TEST_SCENE.replace("\"radius\": 1,", "\"radius\": -1,");
    assert!(matches!(
        bad_sphere.parse::<SceneFile>(),
        Err(TracerError::InvalidGeometry(_))
    ));

    let bad_polygon = TEST_SCENE.replace("[-1, 1, 1]]", "[0, 2, 2]]");
    assert!(matches!(
        bad_polygon.parse::<SceneFile>(),
        Err(TracerError::InvalidPolygon(_))
    ));

    assert!(matches!(
        "{ \"width\": 1 }".parse::<SceneFile>(),
        Err(TracerError::SceneParse(_))
    ));
}

#[test]
fn unbounded_point_light_is_rejected() {
    let no_attenuation = TEST_SCENE.replace("\"kl\": 0.01", "\"kc\": 0, \"kl\": 0");
    assert!(matches!(
        no_attenuation.parse::<SceneFile>(),
        Err(TracerError::InvalidGeometry(_))
    ));

    let negative = TEST_SCENE.replace("\"narrow_beam\": 5", "\"narrow_beam\": 5, \"kq\": -1");
    assert!(matches!(
        negative.parse::<SceneFile>(),
        Err(TracerError::InvalidGeometry(_))
    ));
}

#[test]
fn negative_shininess_is_rejected() {
    let bad = TEST_SCENE.replace("\"shininess\": 30", "\"shininess\": -2");
    assert!(matches!(bad.parse::<SceneFile>(), Err(TracerError::SceneParse(_))));
}
