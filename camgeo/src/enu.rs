//! Plan tangent local East-North-Up
//!
//! Les offsets locaux (mètres) sont tournés dans le repère ECEF à partir de
//! l'origine du projet, puis reconvertis en géodésique.

use nalgebra::Matrix3;

use crate::ellipsoid::{ecef_to_lla, lla_to_ecef};
use crate::types::{EcefPosition, GeodeticPosition, LocalOffset};

/// Rotation ENU → ECEF à une longitude/latitude donnée (degrés)
///
/// Colonnes : East, North, Up exprimés dans le repère ECEF.
///
/// ```text
/// East  = (-sinλ,       cosλ,      0   )
/// North = (-sinφ·cosλ, -sinφ·sinλ, cosφ)
/// Up    = ( cosφ·cosλ,  cosφ·sinλ, sinφ)
/// ```
pub fn enu_to_ecef_rotation(lon_deg: f64, lat_deg: f64) -> Matrix3<f64> {
    let (sin_lon, cos_lon) = lon_deg.to_radians().sin_cos();
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();

    #[rustfmt::skip]
    let m = Matrix3::new(
        -sin_lon, -sin_lat * cos_lon, cos_lat * cos_lon,
         cos_lon, -sin_lat * sin_lon, cos_lat * sin_lon,
         0.0,      cos_lat,           sin_lat,
    );
    m
}

/// Convertit un offset ENU en position ECEF absolue
pub fn local_enu_to_ecef(offset: LocalOffset, origin: GeodeticPosition) -> EcefPosition {
    let origin_ecef = lla_to_ecef(origin.lon_deg, origin.lat_deg, origin.height_m);
    let delta = enu_to_ecef_rotation(origin.lon_deg, origin.lat_deg) * offset.to_vector();

    EcefPosition::from_vector(origin_ecef.to_vector() + delta)
}

/// Convertit un offset ENU (mètres) relatif à `origin` en position géodésique
///
/// Seul chemin du mode "local" ; les lignes déjà géodésiques ne passent pas ici.
pub fn local_enu_to_geodetic(
    east: f64,
    north: f64,
    up: f64,
    origin: GeodeticPosition,
) -> GeodeticPosition {
    let ecef = local_enu_to_ecef(LocalOffset::new(east, north, up), origin);
    ecef_to_lla(ecef.x, ecef.y, ecef.z)
}
