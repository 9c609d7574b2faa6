//! Types d'erreurs pour le crate camgeo
//!
//! Les conversions numériques ne renvoient jamais d'erreur : les entrées
//! dégénérées suivent une politique de repli documentée et les NaN/∞ se
//! propagent tels quels. Seuls le chemin quaternion (variante `try_`) et le
//! parsing et la validation des libellés de convention produisent un `CamgeoError`.

use thiserror::Error;

use crate::types::AngleConvention;

/// Erreurs pouvant survenir lors des conversions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CamgeoError {
    /// Matrice de rotation non finie (NaN ou ∞ en entrée)
    #[error("Non-finite rotation matrix at stage: {stage}")]
    NonFiniteRotation { stage: &'static str },

    /// Libellé de convention d'angles inconnu
    #[error("Unknown angle convention: {0}. Use: north-degrees, east-degrees, east-radians")]
    UnknownConvention(String),

    /// Libellé en radians pour des angles génériques (toujours en degrés)
    #[error("Generic heading/pitch/roll are degrees, convention {0} is not allowed. Use: north-degrees, east-degrees")]
    GenericConventionNotDegrees(AngleConvention),

    /// Mode de coordonnées inconnu
    #[error("Unknown coordinate mode: {0}. Use: wgs84, local")]
    UnknownCoordinateMode(String),
}

impl CamgeoError {
    /// Crée une erreur de rotation non finie pour une étape donnée
    pub fn non_finite(stage: &'static str) -> Self {
        Self::NonFiniteRotation { stage }
    }
}
