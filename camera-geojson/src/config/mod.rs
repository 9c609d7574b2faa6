//! Configuration de l'export
//!
//! Ordre de priorité : valeurs par défaut < fichier JSON (`--config`)
//! < variables d'environnement (`CAMGEO_*`, `.env` compris) < options CLI.

use std::path::Path;

use anyhow::{Context, Result};
use camgeo::{
    AngleConvention, ConversionOptions, CoordinateMode, CoordinateModeKind, GeodeticPosition,
};
use serde::{Deserialize, Serialize};

pub const ENV_IMAGES_BASE_URL: &str = "CAMGEO_IMAGES_BASE_URL";
pub const ENV_THUMBS_BASE_URL: &str = "CAMGEO_THUMBS_BASE_URL";
pub const ENV_PIN_ICON: &str = "CAMGEO_PIN_ICON";
pub const ENV_ORIGIN: &str = "CAMGEO_ORIGIN";

/// Configuration complète d'un export
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Interprétation des colonnes x / y / alt
    pub mode: CoordinateModeKind,

    /// Origine du plan tangent (mode `local` uniquement)
    pub origin: Option<GeodeticPosition>,

    /// Préfixe des URL d'images
    pub images_base_url: String,

    /// Préfixe des URL de vignettes
    pub thumbs_base_url: String,

    /// Icône du marqueur caméra
    pub pin_icon: String,

    /// URL `file://` vers les images locales au lieu du préfixe
    pub use_file_scheme: bool,

    /// N'exporter que les caméras dont l'image a été trouvée
    pub only_matched: bool,

    /// Exporter cap/tangage/roulis `east-radians` pour les lignes OPK
    pub include_hpr: bool,

    /// Exporter nom, taille et date des fichiers images
    pub include_file_props: bool,

    /// Libellé des angles génériques (`north-degrees` ou `east-degrees`)
    pub heading_convention: AngleConvention,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            mode: CoordinateModeKind::Wgs84,
            origin: None,
            images_base_url: String::new(),
            thumbs_base_url: String::new(),
            pin_icon: "/icons/camera-pin.png".to_string(),
            use_file_scheme: false,
            only_matched: false,
            include_hpr: true,
            include_file_props: false,
            heading_convention: AngleConvention::NorthDegrees,
        }
    }
}

impl ExportConfig {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Applique les variables d'environnement `CAMGEO_*`
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Applique des variables depuis une source quelconque
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_IMAGES_BASE_URL) {
            self.images_base_url = url;
        }
        if let Some(url) = lookup(ENV_THUMBS_BASE_URL) {
            self.thumbs_base_url = url;
        }
        if let Some(icon) = lookup(ENV_PIN_ICON) {
            self.pin_icon = icon;
        }
        if let Some(origin) = lookup(ENV_ORIGIN) {
            self.origin =
                Some(parse_origin(&origin).with_context(|| format!("Invalid {}", ENV_ORIGIN))?);
        }
        Ok(())
    }

    /// Options du noyau de conversion
    pub fn conversion_options(&self) -> Result<ConversionOptions> {
        let mode = match self.mode {
            CoordinateModeKind::Wgs84 => CoordinateMode::Geodetic,
            CoordinateModeKind::Local => {
                let origin = self.origin.context(
                    "Local coordinate mode requires an origin (--origin, CAMGEO_ORIGIN or config)",
                )?;
                CoordinateMode::Local { origin }
            }
        };

        let generic_convention = self
            .heading_convention
            .for_generic_angles()
            .context("Invalid heading_convention")?;

        Ok(ConversionOptions {
            mode,
            include_hpr: self.include_hpr,
            generic_convention,
        })
    }
}

/// Parse une origine `lon,lat,h` (degrés, degrés, mètres)
pub fn parse_origin(raw: &str) -> Result<GeodeticPosition> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        anyhow::bail!("Expected origin as lon,lat,h, got: {}", raw);
    }

    let value = |i: usize, label: &str| -> Result<f64> {
        parts[i]
            .parse::<f64>()
            .with_context(|| format!("Invalid origin {}: {}", label, parts[i]))
    };
    let origin = GeodeticPosition::new(value(0, "lon")?, value(1, "lat")?, value(2, "h")?);

    if !(-180.0..=180.0).contains(&origin.lon_deg) || !(-90.0..=90.0).contains(&origin.lat_deg) {
        anyhow::bail!("Origin out of range: {}", raw);
    }
    Ok(origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.mode, CoordinateModeKind::Wgs84);
        assert!(config.include_hpr);
        assert_eq!(config.pin_icon, "/icons/camera-pin.png");

        let options = config.conversion_options().unwrap();
        assert_eq!(options.mode, CoordinateMode::Geodetic);
    }

    #[test]
    fn test_partial_json() {
        let config: ExportConfig = serde_json::from_str(
            r#"{"mode": "local", "origin": {"lon_deg": 6.86, "lat_deg": 45.83, "height_m": 1035.0},
                "heading_convention": "east-degrees"}"#,
        )
        .unwrap();

        assert_eq!(config.mode, CoordinateModeKind::Local);
        assert_eq!(config.heading_convention, AngleConvention::EastDegrees);
        assert!(config.include_hpr);

        let options = config.conversion_options().unwrap();
        assert_eq!(
            options.mode,
            CoordinateMode::Local {
                origin: GeodeticPosition::new(6.86, 45.83, 1035.0)
            }
        );
    }

    #[test]
    fn test_local_without_origin() {
        let config = ExportConfig {
            mode: CoordinateModeKind::Local,
            ..ExportConfig::default()
        };
        assert!(config.conversion_options().is_err());
    }

    #[test]
    fn test_radian_label_rejected_for_generic_angles() {
        let config: ExportConfig =
            serde_json::from_str(r#"{"heading_convention": "east-radians"}"#).unwrap();

        let err = config.conversion_options().unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("heading_convention"), "{}", message);
        assert!(message.contains("east-radians"), "{}", message);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_IMAGES_BASE_URL, "https://cdn.example/photos"),
            (ENV_ORIGIN, "2.35, 48.85, 35"),
        ]
        .into_iter()
        .collect();

        let mut config = ExportConfig::default();
        config
            .apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.images_base_url, "https://cdn.example/photos");
        assert!(config.thumbs_base_url.is_empty());
        assert_eq!(config.origin, Some(GeodeticPosition::new(2.35, 48.85, 35.0)));
    }

    #[test]
    fn test_parse_origin_errors() {
        assert!(parse_origin("1,2").is_err());
        assert!(parse_origin("a,2,3").is_err());
        assert!(parse_origin("200,2,3").is_err());
        assert!(parse_origin("-1.5,-2,-30").is_ok());
    }
}
