//! Matrices de rotation Omega-Phi-Kappa et remappages d'axes caméra
//!
//! Axes photogrammétriques de la caméra : X droite, Y bas, Z avant.
//!
//! Les deux conversions d'orientation utilisent chacune leur propre
//! remappage vers les axes "corps". Ils ne sont volontairement pas unifiés :
//! - [`HPR_BODY_REMAP`] : permutation vers (X avant, Y droite, Z haut) ;
//! - [`QUATERNION_BODY_REMAP`] : simple inversion de Z.

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::types::EulerOpk;

/// Remappage caméra → corps pour la conversion cap/tangage/roulis (lignes)
///
/// `corps = C · caméra` : X corps = Z caméra, Y corps = X caméra, Z corps = -Y caméra.
#[rustfmt::skip]
pub const HPR_BODY_REMAP: [[f64; 3]; 3] = [
    [0.0,  0.0, 1.0],
    [1.0,  0.0, 0.0],
    [0.0, -1.0, 0.0],
];

/// Remappage caméra → corps pour le quaternion ECEF : diag(1, 1, -1)
#[rustfmt::skip]
pub const QUATERNION_BODY_REMAP: [[f64; 3]; 3] = [
    [1.0, 0.0,  0.0],
    [0.0, 1.0,  0.0],
    [0.0, 0.0, -1.0],
];

/// Construit une matrice nalgebra depuis un tableau ligne par ligne
pub fn matrix_from_rows(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::from_fn(|i, j| rows[i][j])
}

/// Rotation élémentaire autour de X (radians)
pub fn rot_x(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle).into_inner()
}

/// Rotation élémentaire autour de Y (radians)
pub fn rot_y(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle).into_inner()
}

/// Rotation élémentaire autour de Z (radians)
pub fn rot_z(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle).into_inner()
}

/// Rotation caméra → monde `Rz(κ)·Ry(φ)·Rx(ω)`
pub fn opk_rotation(opk: EulerOpk) -> Matrix3<f64> {
    rot_z(opk.kappa_deg.to_radians())
        * rot_y(opk.phi_deg.to_radians())
        * rot_x(opk.omega_deg.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_opk_is_identity() {
        let r = opk_rotation(EulerOpk::default());
        assert_relative_eq!(r, Matrix3::identity(), epsilon = 1e-15);
    }

    #[test]
    fn test_elementary_rotations() {
        let half_pi = std::f64::consts::FRAC_PI_2;
        // Rz(90°) envoie X sur Y
        assert_relative_eq!(rot_z(half_pi) * Vector3::x(), Vector3::y(), epsilon = 1e-15);
        // Ry(90°) envoie Z sur X
        assert_relative_eq!(rot_y(half_pi) * Vector3::z(), Vector3::x(), epsilon = 1e-15);
        // Rx(90°) envoie Y sur Z
        assert_relative_eq!(rot_x(half_pi) * Vector3::y(), Vector3::z(), epsilon = 1e-15);
    }

    #[test]
    fn test_composition_order() {
        // κ appliqué en dernier : Rx d'abord, puis Ry, puis Rz
        let opk = EulerOpk::new(10.0, 20.0, 30.0);
        let expected =
            rot_z(30f64.to_radians()) * rot_y(20f64.to_radians()) * rot_x(10f64.to_radians());
        assert_relative_eq!(opk_rotation(opk), expected, epsilon = 1e-15);
        assert_relative_eq!(opk_rotation(opk).determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_remaps() {
        let c = matrix_from_rows(&HPR_BODY_REMAP);
        // Avant caméra (Z) devient X corps
        assert_relative_eq!(c * Vector3::z(), Vector3::x());
        // Bas caméra (Y) devient -Z corps
        assert_relative_eq!(c * Vector3::y(), -Vector3::z());

        let d = matrix_from_rows(&QUATERNION_BODY_REMAP);
        assert_relative_eq!(d * d, Matrix3::identity());
        assert_relative_eq!(d.determinant(), -1.0);
    }
}
