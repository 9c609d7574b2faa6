//! Conversion Omega-Phi-Kappa → cap/tangage/roulis (convention viewer)
//!
//! 1. Rotation caméra → monde `Rz(κ)·Ry(φ)·Rx(ω)`.
//! 2. Remappage vers les axes corps : `R_corps = R_cam · Cᵗ`, dont les
//!    colonnes sont l'avant, la droite et le haut de la caméra dans le repère
//!    ENU.
//! 3. Extraction des angles d'Euler :
//!
//! ```text
//! cap      = -atan2(R[1,0], R[0,0])
//! tangage  =  asin(clamp(R[2,0], -1, 1))
//! roulis   =  atan2(R[2,1], R[2,2])
//! ```
//!
//! 4. Branche nadir : quand la composante verticale de l'avant dépasse
//!    [`NADIR_THRESHOLD`], le cap est mal conditionné. Le triplet est alors
//!    remplacé par `(cap + π, -tangage, roulis + π)`, cap et roulis ramenés
//!    dans [-π, π]. Ce n'est pas une erreur mais une politique fixe.

use std::f64::consts::{PI, TAU};

use nalgebra::{Matrix3, Vector3};

use crate::rotation::{matrix_from_rows, opk_rotation, HPR_BODY_REMAP};
use crate::types::{EulerOpk, HeadingPitchRoll};

/// Seuil de la branche nadir sur `R[2,0]` (cos 60°)
pub const NADIR_THRESHOLD: f64 = 0.5;

/// Ramène un angle dans [-π, π]
///
/// ±π sont conservés tels quels (pas de bascule π → -π).
pub fn wrap_pi(angle: f64) -> f64 {
    let wrapped = angle % TAU;
    if wrapped > PI {
        wrapped - TAU
    } else if wrapped < -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Matrice corps → ENU utilisée pour l'extraction cap/tangage/roulis
pub fn hpr_body_rotation(opk: EulerOpk) -> Matrix3<f64> {
    opk_rotation(opk) * matrix_from_rows(&HPR_BODY_REMAP).transpose()
}

/// Extraction brute des angles d'Euler, sans correction de branche
pub fn extract_hpr(r: &Matrix3<f64>) -> HeadingPitchRoll {
    HeadingPitchRoll {
        heading_rad: -r[(1, 0)].atan2(r[(0, 0)]),
        pitch_rad: r[(2, 0)].clamp(-1.0, 1.0).asin(),
        roll_rad: r[(2, 1)].atan2(r[(2, 2)]),
    }
}

/// Solution équivalente utilisée dans la branche nadir
fn canonicalize_nadir(hpr: HeadingPitchRoll) -> HeadingPitchRoll {
    HeadingPitchRoll {
        heading_rad: wrap_pi(hpr.heading_rad + PI),
        pitch_rad: -hpr.pitch_rad,
        roll_rad: wrap_pi(hpr.roll_rad + PI),
    }
}

/// Vrai si l'orientation tombe dans la branche nadir
pub fn uses_nadir_branch(opk: EulerOpk) -> bool {
    hpr_body_rotation(opk)[(2, 0)] > NADIR_THRESHOLD
}

/// Convertit des angles OPK (degrés) en cap/tangage/roulis (radians, `east-radians`)
///
/// NaN en entrée donne NaN en sortie ; aucun contrôle de plausibilité.
pub fn opk_to_hpr(opk: EulerOpk) -> HeadingPitchRoll {
    let r = hpr_body_rotation(opk);
    let hpr = extract_hpr(&r);

    if r[(2, 0)] > NADIR_THRESHOLD {
        canonicalize_nadir(hpr)
    } else {
        hpr
    }
}

/// Direction avant (repère ENU) décrite par un triplet `east-radians`
///
/// Pour un triplet issu de la branche nadir, le vecteur obtenu est l'opposé
/// de l'axe optique de la caméra (tangage inversé, cap retourné).
pub fn forward_from_hpr(hpr: HeadingPitchRoll) -> Vector3<f64> {
    let (sin_h, cos_h) = hpr.heading_rad.sin_cos();
    let (sin_p, cos_p) = hpr.pitch_rad.sin_cos();
    Vector3::new(cos_p * cos_h, -cos_p * sin_h, sin_p)
}
