//! Ellipsoïde WGS84 et conversions géodésique ↔ ECEF

use crate::types::{EcefPosition, GeodeticPosition};

/// Ellipsoïde WGS84
pub struct WGS84;

impl WGS84 {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub const A: f64 = 6378137.0;

    /// Aplatissement
    pub const F: f64 = 1.0 / 298.257223563;

    /// Demi-petit axe (rayon polaire) en mètres
    pub const B: f64 = Self::A * (1.0 - Self::F);

    /// Première excentricité au carré : 1 - (b/a)²
    pub const E2: f64 = 1.0 - (Self::B * Self::B) / (Self::A * Self::A);

    /// Deuxième excentricité au carré : (a² - b²) / b²
    pub const EP2: f64 = (Self::A * Self::A - Self::B * Self::B) / (Self::B * Self::B);

    /// Grande normale (rayon de courbure dans le premier vertical)
    pub fn prime_vertical_radius(lat_rad: f64) -> f64 {
        let sin_lat = lat_rad.sin();
        Self::A / (1.0 - Self::E2 * sin_lat * sin_lat).sqrt()
    }
}

/// Convertit une position géodésique (degrés, mètres) en ECEF
///
/// Forme fermée, définie pour toute entrée finie. NaN en entrée donne NaN en sortie.
pub fn lla_to_ecef(lon_deg: f64, lat_deg: f64, height_m: f64) -> EcefPosition {
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    let n = WGS84::prime_vertical_radius(lat);

    EcefPosition {
        x: (n + height_m) * cos_lat * cos_lon,
        y: (n + height_m) * cos_lat * sin_lon,
        z: (n * (1.0 - WGS84::E2) + height_m) * sin_lat,
    }
}

/// Convertit une position ECEF en géodésique (formule fermée de Bowring, non itérative)
///
/// Précision sub-millimétrique pour des hauteurs terrestres. Limite connue :
/// la hauteur est calculée par `p / cos(lat) - N` et se dégrade près des pôles
/// quand `cos(lat) → 0` (au pôle exact, `h` vaut `-N`).
pub fn ecef_to_lla(x: f64, y: f64, z: f64) -> GeodeticPosition {
    let a = WGS84::A;
    let b = WGS84::B;

    let lon = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    // Latitude paramétrique auxiliaire
    let theta = (z * a).atan2(p * b);
    let (sin_theta, cos_theta) = theta.sin_cos();

    let lat = (z + WGS84::EP2 * b * sin_theta.powi(3))
        .atan2(p - WGS84::E2 * a * cos_theta.powi(3));

    let n = WGS84::prime_vertical_radius(lat);
    let height = p / lat.cos() - n;

    GeodeticPosition::new(lon.to_degrees(), lat.to_degrees(), height)
}

impl GeodeticPosition {
    /// Position ECEF correspondante
    pub fn to_ecef(self) -> EcefPosition {
        lla_to_ecef(self.lon_deg, self.lat_deg, self.height_m)
    }
}

impl EcefPosition {
    /// Position géodésique correspondante
    pub fn to_geodetic(self) -> GeodeticPosition {
        ecef_to_lla(self.x, self.y, self.z)
    }
}
