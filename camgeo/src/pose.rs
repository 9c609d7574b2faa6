//! Conversion d'une ligne caméra complète (position + orientation)
//!
//! Couche frontière entre le lecteur de lignes et le noyau : la position
//! passe par le plan tangent local ou est reprise telle quelle, l'orientation
//! OPK est convertie en cap/tangage/roulis et en quaternion ECEF. Les deux
//! chemins sont indépendants.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enu::local_enu_to_geodetic;
use crate::orientation::opk_to_hpr;
use crate::quaternion::opk_to_ecef_quaternion;
use crate::types::{AngleConvention, EulerOpk, GeodeticPosition, HeadingPitchRoll, Quaternion};
use crate::CamgeoError;

/// Interprétation des colonnes x / y / alt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateMode {
    /// x = longitude (°), y = latitude (°), alt = hauteur ellipsoïdale (m)
    Geodetic,
    /// x = Est, y = Nord, alt = Haut, en mètres depuis `origin`
    Local { origin: GeodeticPosition },
}

impl CoordinateMode {
    pub fn kind(&self) -> CoordinateModeKind {
        match self {
            Self::Geodetic => CoordinateModeKind::Wgs84,
            Self::Local { .. } => CoordinateModeKind::Local,
        }
    }

    /// Position géodésique d'une ligne
    pub fn resolve(&self, x: f64, y: f64, alt: f64) -> GeodeticPosition {
        match self {
            Self::Geodetic => GeodeticPosition::new(x, y, alt),
            Self::Local { origin } => local_enu_to_geodetic(x, y, alt, *origin),
        }
    }

    /// Description lisible du mode
    pub fn describe(&self) -> &'static str {
        self.kind().describe()
    }
}

/// Nom du mode de coordonnées, sans l'origine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CoordinateModeKind {
    #[default]
    Wgs84,
    Local,
}

impl CoordinateModeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wgs84 => "wgs84",
            Self::Local => "local",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Wgs84 => "WGS84 (x=lon, y=lat, alt=height), exported as-is",
            Self::Local => "LOCAL ENU (meters), converted using the project origin",
        }
    }
}

impl fmt::Display for CoordinateModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateModeKind {
    type Err = CamgeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wgs84" | "geodetic" | "lla" => Ok(Self::Wgs84),
            "local" | "enu" => Ok(Self::Local),
            other => Err(CamgeoError::UnknownCoordinateMode(other.to_string())),
        }
    }
}

/// Angles portés par une ligne
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowAngles {
    /// Colonnes omega / phi / kappa reconnues
    Opk(EulerOpk),
    /// Triplet cap/tangage/roulis générique, en degrés, sans ordre de rotation garanti
    Generic {
        heading_deg: f64,
        pitch_deg: f64,
        roll_deg: f64,
    },
}

/// Entrée brute d'une ligne caméra
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseInput {
    pub x: f64,
    pub y: f64,
    pub alt: f64,
    pub angles: RowAngles,
}

/// Options de conversion, communes à tout un lot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionOptions {
    pub mode: CoordinateMode,
    /// Exporter le triplet `east-radians` pour les lignes OPK
    pub include_hpr: bool,
    /// Libellé attaché aux angles génériques (non convertis)
    pub generic_convention: AngleConvention,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            mode: CoordinateMode::Geodetic,
            include_hpr: true,
            generic_convention: AngleConvention::NorthDegrees,
        }
    }
}

/// Orientation exportée, selon la représentation disponible
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseOrientation {
    /// Ligne photogrammétrique : OPK d'origine et ses conversions
    Photogrammetric {
        opk: EulerOpk,
        hpr: Option<HeadingPitchRoll>,
        quaternion: Option<Quaternion>,
    },
    /// Angles génériques transmis sans conversion
    PassThrough {
        heading_deg: f64,
        pitch_deg: f64,
        roll_deg: f64,
        convention: AngleConvention,
    },
}

impl PoseOrientation {
    /// Libellé de convention des angles cap/tangage/roulis exportés
    pub fn convention(&self) -> Option<AngleConvention> {
        match self {
            Self::Photogrammetric { hpr: Some(_), .. } => Some(HeadingPitchRoll::CONVENTION),
            Self::Photogrammetric { hpr: None, .. } => None,
            Self::PassThrough { convention, .. } => Some(*convention),
        }
    }
}

/// Pose caméra prête pour l'export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: GeodeticPosition,
    pub orientation: PoseOrientation,
}

impl CameraPose {
    pub fn is_photogrammetric(&self) -> bool {
        matches!(self.orientation, PoseOrientation::Photogrammetric { .. })
    }

    /// Faux si un NaN/∞ d'entrée s'est propagé dans la position ou l'orientation
    pub fn is_finite(&self) -> bool {
        let p = self.position;
        let position_ok = p.lon_deg.is_finite() && p.lat_deg.is_finite() && p.height_m.is_finite();

        let orientation_ok = match self.orientation {
            PoseOrientation::Photogrammetric { hpr, quaternion, .. } => {
                hpr.map_or(true, |h| {
                    h.heading_rad.is_finite() && h.pitch_rad.is_finite() && h.roll_rad.is_finite()
                }) && quaternion.map_or(true, |q| q.is_finite())
            }
            PoseOrientation::PassThrough {
                heading_deg,
                pitch_deg,
                roll_deg,
                ..
            } => heading_deg.is_finite() && pitch_deg.is_finite() && roll_deg.is_finite(),
        };

        position_ok && orientation_ok
    }

    pub fn has_quaternion(&self) -> bool {
        matches!(
            self.orientation,
            PoseOrientation::Photogrammetric {
                quaternion: Some(_),
                ..
            }
        )
    }
}

/// Convertit une ligne caméra. Fonction pure, appelable depuis n'importe quel thread.
pub fn convert_pose(input: &PoseInput, options: &ConversionOptions) -> CameraPose {
    let position = options.mode.resolve(input.x, input.y, input.alt);

    let orientation = match input.angles {
        RowAngles::Opk(opk) => PoseOrientation::Photogrammetric {
            opk,
            hpr: options.include_hpr.then(|| opk_to_hpr(opk)),
            quaternion: opk_to_ecef_quaternion(opk, position.lon_deg, position.lat_deg),
        },
        RowAngles::Generic {
            heading_deg,
            pitch_deg,
            roll_deg,
        } => PoseOrientation::PassThrough {
            heading_deg,
            pitch_deg,
            roll_deg,
            convention: options.generic_convention,
        },
    };

    CameraPose {
        position,
        orientation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opk_row(x: f64, y: f64, alt: f64) -> PoseInput {
        PoseInput {
            x,
            y,
            alt,
            angles: RowAngles::Opk(EulerOpk::new(5.0, -3.0, 120.0)),
        }
    }

    #[test]
    fn test_geodetic_passthrough_position() {
        let pose = convert_pose(&opk_row(5.9, 45.6, 250.0), &ConversionOptions::default());
        assert_eq!(pose.position, GeodeticPosition::new(5.9, 45.6, 250.0));
        assert!(pose.is_photogrammetric());
        assert!(pose.has_quaternion());
        assert_eq!(pose.orientation.convention(), Some(AngleConvention::EastRadians));
    }

    #[test]
    fn test_local_mode_uses_origin() {
        let origin = GeodeticPosition::new(5.9, 45.6, 250.0);
        let options = ConversionOptions {
            mode: CoordinateMode::Local { origin },
            ..ConversionOptions::default()
        };
        let pose = convert_pose(&opk_row(0.0, 0.0, 0.0), &options);

        assert!((pose.position.lon_deg - 5.9).abs() < 1e-9);
        assert!((pose.position.lat_deg - 45.6).abs() < 1e-9);
        assert!((pose.position.height_m - 250.0).abs() < 1e-4);
    }

    #[test]
    fn test_hpr_toggle() {
        let options = ConversionOptions {
            include_hpr: false,
            ..ConversionOptions::default()
        };
        let pose = convert_pose(&opk_row(5.9, 45.6, 250.0), &options);

        match pose.orientation {
            PoseOrientation::Photogrammetric { hpr, quaternion, .. } => {
                assert!(hpr.is_none());
                assert!(quaternion.is_some());
            }
            other => panic!("unexpected orientation: {:?}", other),
        }
        assert_eq!(pose.orientation.convention(), None);
    }

    #[test]
    fn test_generic_angles_untouched() {
        let input = PoseInput {
            x: 1.0,
            y: 2.0,
            alt: 3.0,
            angles: RowAngles::Generic {
                heading_deg: 270.0,
                pitch_deg: -45.0,
                roll_deg: 1.5,
            },
        };
        let options = ConversionOptions {
            generic_convention: AngleConvention::EastDegrees,
            ..ConversionOptions::default()
        };
        let pose = convert_pose(&input, &options);

        assert_eq!(
            pose.orientation,
            PoseOrientation::PassThrough {
                heading_deg: 270.0,
                pitch_deg: -45.0,
                roll_deg: 1.5,
                convention: AngleConvention::EastDegrees,
            }
        );
        assert!(!pose.has_quaternion());
    }

    #[test]
    fn test_nan_position_propagates_to_quaternion() {
        let pose = convert_pose(&opk_row(f64::NAN, 45.0, 0.0), &ConversionOptions::default());
        assert!(pose.position.lon_deg.is_nan());
        assert!(pose.is_photogrammetric());
        assert!(pose.has_quaternion());
        assert!(!pose.is_finite());

        let pose = convert_pose(&opk_row(5.9, 45.6, 250.0), &ConversionOptions::default());
        assert!(pose.is_finite());
    }

    #[test]
    fn test_mode_kind_from_str() {
        assert_eq!("WGS84".parse::<CoordinateModeKind>().unwrap(), CoordinateModeKind::Wgs84);
        assert_eq!("enu".parse::<CoordinateModeKind>().unwrap(), CoordinateModeKind::Local);
        assert!(matches!(
            "utm".parse::<CoordinateModeKind>(),
            Err(CamgeoError::UnknownCoordinateMode(_))
        ));
        let origin = GeodeticPosition::default();
        assert_eq!(CoordinateMode::Local { origin }.kind(), CoordinateModeKind::Local);
    }
}
