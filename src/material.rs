use crate::tuple::Tuple3D;

/// A material record.
///
/// Materials use attributes from the Phong reflection model (diffuse,
/// specular and shininess) plus the two coefficients driving global effects:
/// transparency `kt` and reflectivity `kr`. Every coefficient is a
/// per-channel attenuation triple in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub kd: Tuple3D,
    pub ks: Tuple3D,
    pub kt: Tuple3D,
    pub kr: Tuple3D,
    pub shininess: u32,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            kd: Tuple3D::ZERO,
            ks: Tuple3D::ZERO,
            kt: Tuple3D::ZERO,
            kr: Tuple3D::ZERO,
            shininess: 1,
        }
    }
}

/// The coefficient setters take either one value for all channels or a
/// per-channel `[r, g, b]` triple.
impl Material {
    pub fn with_kd<T: Into<Tuple3D>>(mut self, kd: T) -> Material {
        self.kd = kd.into();
        self
    }

    pub fn with_ks<T: Into<Tuple3D>>(mut self, ks: T) -> Material {
        self.ks = ks.into();
        self
    }

    pub fn with_kt<T: Into<Tuple3D>>(mut self, kt: T) -> Material {
        self.kt = kt.into();
        self
    }

    pub fn with_kr<T: Into<Tuple3D>>(mut self, kr: T) -> Material {
        self.kr = kr.into();
        self
    }

    pub fn with_shininess(mut self, shininess: u32) -> Material {
        self.shininess = shininess;
        self
    }
}

/* Tests */

#[test]
fn coefficients_from_scalars_and_triples() {
    let m = Material::default()
        .with_kd(0.5)
        .with_ks([0.1, 0.2, 0.3])
        .with_kr(Tuple3D::new(0.0, 0.5, 1.0))
        .with_shininess(12);

    assert_eq!(m.kd, Tuple3D::new(0.5, 0.5, 0.5));
    assert_eq!(m.ks, Tuple3D::new(0.1, 0.2, 0.3));
    assert_eq!(m.kr, Tuple3D::new(0.0, 0.5, 1.0));
    assert_eq!(m.kt, Tuple3D::ZERO);
    assert_eq!(m.shininess, 12);
}
