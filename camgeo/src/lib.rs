//! # camgeo
//!
//! Conversions de poses caméra photogrammétriques vers un viewer de globe 3D.
//!
//! ## Features
//!
//! - Ellipsoïde WGS84, conversions géodésique ↔ ECEF (Bowring non itératif)
//! - Plan tangent local East-North-Up → position géodésique
//! - Omega-Phi-Kappa → cap/tangage/roulis (`east-radians`), branche nadir incluse
//! - Omega-Phi-Kappa → quaternion unitaire dans le repère ECEF
//! - Feature `serde` pour (dé)sérialiser les types de valeur
//!
//! Toutes les fonctions sont pures et sans état : elles peuvent être appelées
//! en parallèle, ligne par ligne, sans synchronisation.
//!
//! ## Usage
//!
//! ```rust
//! use camgeo::{local_enu_to_geodetic, opk_to_ecef_quaternion, opk_to_hpr, EulerOpk, GeodeticPosition};
//!
//! let origin = GeodeticPosition::new(6.8652, 45.8326, 1035.0);
//! let position = local_enu_to_geodetic(120.0, -45.0, 12.5, origin);
//!
//! let opk = EulerOpk::new(2.1, -1.4, 87.0);
//! let hpr = opk_to_hpr(opk);
//! let quaternion = opk_to_ecef_quaternion(opk, position.lon_deg, position.lat_deg);
//!
//! assert!(hpr.pitch_rad.abs() <= std::f64::consts::FRAC_PI_2);
//! assert!(quaternion.is_some());
//! ```

pub mod ellipsoid;
pub mod enu;
pub mod error;
pub mod orientation;
pub mod pose;
pub mod quaternion;
pub mod rotation;
pub mod types;

pub use ellipsoid::{ecef_to_lla, lla_to_ecef, WGS84};
pub use enu::{enu_to_ecef_rotation, local_enu_to_geodetic};
pub use error::CamgeoError;
pub use orientation::{opk_to_hpr, NADIR_THRESHOLD};
pub use pose::{
    convert_pose, CameraPose, ConversionOptions, CoordinateMode, CoordinateModeKind,
    PoseInput, PoseOrientation, RowAngles,
};
pub use quaternion::{opk_to_ecef_quaternion, try_opk_to_ecef_quaternion};
pub use types::{
    AngleConvention, EcefPosition, EulerOpk, GeodeticPosition, HeadingPitchRoll, LocalOffset,
    Quaternion,
};
