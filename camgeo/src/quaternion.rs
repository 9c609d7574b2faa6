//! Conversion Omega-Phi-Kappa → quaternion global (repère ECEF)
//!
//! `R_corps→ECEF = (ENU→ECEF) · R_cam→ENU · D` avec `D = diag(1, 1, -1)`,
//! puis extraction d'un quaternion par l'algorithme classique à quatre cas
//! (trace, puis plus grand élément diagonal).

use nalgebra::Matrix3;
use tracing::debug;

use crate::enu::enu_to_ecef_rotation;
use crate::error::CamgeoError;
use crate::rotation::{matrix_from_rows, opk_rotation, QUATERNION_BODY_REMAP};
use crate::types::{EulerOpk, Quaternion};

/// Matrice corps → ECEF à la position (lon, lat) en degrés
pub fn opk_to_ecef_matrix(opk: EulerOpk, lon_deg: f64, lat_deg: f64) -> Matrix3<f64> {
    let body_to_enu = opk_rotation(opk) * matrix_from_rows(&QUATERNION_BODY_REMAP);
    enu_to_ecef_rotation(lon_deg, lat_deg) * body_to_enu
}

/// Extrait un quaternion (x, y, z, w) d'une matrice 3×3
///
/// Le cas est choisi sur la trace puis sur le plus grand élément diagonal
/// pour éviter de diviser par un nombre proche de zéro. Le résultat est
/// normalisé ; si la norme n'est pas strictement positive (matrice
/// dégénérée, NaN), les composantes brutes sont renvoyées.
pub fn rotation_to_quaternion(m: &Matrix3<f64>) -> Quaternion {
    let (m00, m01, m02) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
    let (m10, m11, m12) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
    let (m20, m21, m22) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);

    let trace = m00 + m11 + m22;

    let q = if trace > 0.0 {
        let s = 0.5 / (trace + 1.0).sqrt();
        Quaternion::new((m21 - m12) * s, (m02 - m20) * s, (m10 - m01) * s, 0.25 / s)
    } else if m00 > m11 && m00 > m22 {
        let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
        Quaternion::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
    } else if m11 > m22 {
        let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
        Quaternion::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
    } else {
        let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
        Quaternion::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
    };

    let norm = q.norm();
    if norm > 0.0 {
        Quaternion::new(q.x / norm, q.y / norm, q.z / norm, q.w / norm)
    } else {
        q
    }
}

/// Convertit des angles OPK (degrés) et une position (lon, lat en degrés)
/// en quaternion ECEF
///
/// # Errors
///
/// Retourne `CamgeoError::NonFiniteRotation` si la matrice ou le quaternion
/// contient des valeurs non finies.
pub fn try_opk_to_ecef_quaternion(
    opk: EulerOpk,
    lon_deg: f64,
    lat_deg: f64,
) -> Result<Quaternion, CamgeoError> {
    let m = opk_to_ecef_matrix(opk, lon_deg, lat_deg);
    if m.iter().any(|v| !v.is_finite()) {
        return Err(CamgeoError::non_finite("body-to-ecef matrix"));
    }

    let q = rotation_to_quaternion(&m);
    if !q.is_finite() {
        return Err(CamgeoError::non_finite("quaternion extraction"));
    }

    Ok(q)
}

/// Variante utilisée à l'export : pas de contrôle de finitude
///
/// Les NaN/∞ d'entrée se propagent dans les composantes du quaternion, comme
/// pour les positions ; le contrôle reste disponible via
/// [`try_opk_to_ecef_quaternion`]. L'extraction étant en forme close, elle ne
/// peut pas échouer et la fonction renvoie toujours `Some`.
pub fn opk_to_ecef_quaternion(opk: EulerOpk, lon_deg: f64, lat_deg: f64) -> Option<Quaternion> {
    let m = opk_to_ecef_matrix(opk, lon_deg, lat_deg);
    if m.iter().any(|v| !v.is_finite()) {
        debug!(?opk, lon_deg, lat_deg, "Non-finite input propagated to quaternion");
    }
    Some(rotation_to_quaternion(&m))
}
