//! Types de données pour le crate camgeo
//!
//! Tous les types sont des valeurs `Copy` créées à chaque conversion. Les
//! unités font partie du nom des champs pour éviter les confusions
//! degrés/radians.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CamgeoError;

/// Position géodésique WGS84
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodeticPosition {
    /// Longitude en degrés
    pub lon_deg: f64,
    /// Latitude en degrés
    pub lat_deg: f64,
    /// Hauteur ellipsoïdale en mètres
    pub height_m: f64,
}

impl GeodeticPosition {
    pub fn new(lon_deg: f64, lat_deg: f64, height_m: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            height_m,
        }
    }
}

/// Position cartésienne ECEF en mètres
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EcefPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EcefPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn from_vector(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Décalage East-North-Up en mètres, relatif à une origine géodésique
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalOffset {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl LocalOffset {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.east, self.north, self.up)
    }
}

/// Angles photogrammétriques Omega-Phi-Kappa en degrés
///
/// Composés en `Rz(κ)·Ry(φ)·Rx(ω)` (caméra → monde).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EulerOpk {
    pub omega_deg: f64,
    pub phi_deg: f64,
    pub kappa_deg: f64,
}

impl EulerOpk {
    pub fn new(omega_deg: f64, phi_deg: f64, kappa_deg: f64) -> Self {
        Self {
            omega_deg,
            phi_deg,
            kappa_deg,
        }
    }
}

/// Cap / tangage / roulis pour le viewer, en radians
///
/// Convention `east-radians` : cap mesuré depuis l'Est, tangage dans
/// [-π/2, π/2], roulis ramené dans [-π, π].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeadingPitchRoll {
    pub heading_rad: f64,
    pub pitch_rad: f64,
    pub roll_rad: f64,
}

impl HeadingPitchRoll {
    /// Convention des angles produits par le convertisseur OPK
    pub const CONVENTION: AngleConvention = AngleConvention::EastRadians;

    pub fn new(heading_rad: f64, pitch_rad: f64, roll_rad: f64) -> Self {
        Self {
            heading_rad,
            pitch_rad,
            roll_rad,
        }
    }
}

/// Quaternion unitaire (x, y, z, w) : axes caméra → repère ECEF
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// Repère dans lequel le quaternion est exprimé
    pub const FRAME: &'static str = "ecef";

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

/// Libellé de convention attaché aux angles exportés
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AngleConvention {
    /// Degrés, cap depuis le Nord (défaut des CSV génériques)
    #[default]
    NorthDegrees,
    /// Degrés, cap depuis l'Est
    EastDegrees,
    /// Radians, cap depuis l'Est (sortie du convertisseur OPK)
    EastRadians,
}

impl AngleConvention {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NorthDegrees => "north-degrees",
            Self::EastDegrees => "east-degrees",
            Self::EastRadians => "east-radians",
        }
    }

    /// Vrai pour les conventions exprimées en degrés
    pub fn is_degrees(self) -> bool {
        !matches!(self, Self::EastRadians)
    }

    /// Valide le libellé attaché à des angles génériques, qui restent en degrés
    ///
    /// # Errors
    ///
    /// `CamgeoError::GenericConventionNotDegrees` pour `east-radians`.
    pub fn for_generic_angles(self) -> Result<Self, CamgeoError> {
        if self.is_degrees() {
            Ok(self)
        } else {
            Err(CamgeoError::GenericConventionNotDegrees(self))
        }
    }
}

impl fmt::Display for AngleConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AngleConvention {
    type Err = CamgeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north-degrees" | "north" => Ok(Self::NorthDegrees),
            "east-degrees" | "east" => Ok(Self::EastDegrees),
            "east-radians" => Ok(Self::EastRadians),
            other => Err(CamgeoError::UnknownConvention(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_labels() {
        assert_eq!(AngleConvention::NorthDegrees.to_string(), "north-degrees");
        assert_eq!(AngleConvention::EastDegrees.as_str(), "east-degrees");
        assert_eq!(HeadingPitchRoll::CONVENTION.as_str(), "east-radians");
        assert!(!HeadingPitchRoll::CONVENTION.is_degrees());
    }

    #[test]
    fn test_convention_from_str() {
        assert_eq!(
            "North-Degrees".parse::<AngleConvention>().unwrap(),
            AngleConvention::NorthDegrees
        );
        assert_eq!(
            " east ".parse::<AngleConvention>().unwrap(),
            AngleConvention::EastDegrees
        );
        assert!(matches!(
            "south".parse::<AngleConvention>(),
            Err(CamgeoError::UnknownConvention(_))
        ));
    }

    #[test]
    fn test_generic_angles_reject_radians() {
        assert_eq!(
            AngleConvention::NorthDegrees.for_generic_angles(),
            Ok(AngleConvention::NorthDegrees)
        );
        assert_eq!(
            AngleConvention::EastDegrees.for_generic_angles(),
            Ok(AngleConvention::EastDegrees)
        );

        let err = "east-radians"
            .parse::<AngleConvention>()
            .unwrap()
            .for_generic_angles()
            .unwrap_err();
        assert_eq!(
            err,
            CamgeoError::GenericConventionNotDegrees(AngleConvention::EastRadians)
        );
        assert!(err.to_string().contains("east-radians"));
    }

    #[test]
    fn test_quaternion_norm() {
        let q = Quaternion::new(0.5, 0.5, 0.5, 0.5);
        assert!((q.norm() - 1.0).abs() < 1e-15);
        assert!(!Quaternion::new(f64::NAN, 0.0, 0.0, 1.0).is_finite());
    }
}
