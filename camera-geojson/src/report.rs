//! Rapport d'export
//!
//! Compteurs par ligne (OPK, quaternions, images trouvées) et statut final,
//! affichables sur la console ou sauvegardés en JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use camgeo::CameraPose;
use serde::Serialize;

/// Statut global de l'export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportStatus {
    /// Toutes les caméras exportées avec leur orientation complète
    Success,
    /// Export écrit, mais certains quaternions n'ont pas pu être produits
    PartialSuccess,
    /// Rien n'a été exporté
    Failed,
}

/// Avertissement rattaché à une caméra
#[derive(Debug, Clone, Serialize)]
pub struct ExportWarning {
    pub camera: String,
    pub message: String,
}

/// Rapport complet d'export
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Fichier CSV source
    pub source: String,
    /// Fichier GeoJSON produit
    pub output: Option<String>,
    /// Mode de coordonnées
    pub coordinate_mode: String,
    /// Durée de l'export
    pub duration_secs: f64,
    /// Statut global
    pub status: ExportStatus,

    /// Lignes lues
    pub rows: usize,
    /// Lignes CSV ignorées (trop courtes)
    pub rows_skipped: usize,
    /// Features écrites
    pub exported: usize,
    /// Lignes écartées faute d'image (`--only-matched`)
    pub filtered_unmatched: usize,
    /// Lignes photogrammétriques
    pub opk_rows: usize,
    /// Quaternions produits
    pub quaternions: usize,
    /// Lignes OPK sans quaternion
    pub quaternions_unavailable: usize,
    /// Poses avec NaN/∞ propagés depuis l'entrée
    pub non_finite_rows: usize,
    /// Images indexées
    pub images: usize,
    /// Caméras avec image
    pub matched: usize,

    /// Liste des warnings
    pub warnings: Vec<ExportWarning>,
}

impl Default for ExportReport {
    fn default() -> Self {
        Self {
            source: String::new(),
            output: None,
            coordinate_mode: String::new(),
            duration_secs: 0.0,
            status: ExportStatus::Success,
            rows: 0,
            rows_skipped: 0,
            exported: 0,
            filtered_unmatched: 0,
            opk_rows: 0,
            quaternions: 0,
            quaternions_unavailable: 0,
            non_finite_rows: 0,
            images: 0,
            matched: 0,
            warnings: Vec::new(),
        }
    }
}

impl ExportReport {
    /// Crée un rapport pour un fichier source
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    /// Enregistre une pose convertie
    pub fn record_pose(&mut self, camera: &str, pose: &CameraPose) {
        self.rows += 1;
        if !pose.is_finite() {
            self.non_finite_rows += 1;
            self.warnings.push(ExportWarning {
                camera: camera.to_string(),
                message: "Non-finite values propagated from input".to_string(),
            });
        }
        if !pose.is_photogrammetric() {
            return;
        }

        self.opk_rows += 1;
        if pose.has_quaternion() {
            self.quaternions += 1;
        } else {
            self.quaternions_unavailable += 1;
            self.warnings.push(ExportWarning {
                camera: camera.to_string(),
                message: "Quaternion unavailable (non-finite rotation)".to_string(),
            });
        }
    }

    /// Enregistre le résultat de l'appariement avec les images
    pub fn record_matches(&mut self, images: usize, matched: usize) {
        self.images = images;
        self.matched = matched;
    }

    /// Définit la durée de l'export
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.exported == 0 {
            ExportStatus::Failed
        } else if self.quaternions_unavailable > 0 || self.non_finite_rows > 0 {
            ExportStatus::PartialSuccess
        } else {
            ExportStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("EXPORT REPORT - {}", self.source);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Coordinate mode: {}", self.coordinate_mode);
        if let Some(ref output) = self.output {
            println!("Output: {}", output);
        }

        println!("\n--- SUMMARY ---");
        println!(
            "Rows: {} read, {} skipped, {} exported, {} filtered (no image)",
            self.rows, self.rows_skipped, self.exported, self.filtered_unmatched
        );
        println!(
            "Images: {} indexed, {} matched, {} missing",
            self.images,
            self.matched,
            self.rows.saturating_sub(self.matched)
        );
        println!(
            "Orientation: {} OPK rows, {} quaternions, {} unavailable",
            self.opk_rows, self.quaternions, self.quaternions_unavailable
        );
        if self.non_finite_rows > 0 {
            println!("Non-finite poses: {}", self.non_finite_rows);
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}", w.camera, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} exported, {} quaternions, {} matched images",
            self.source, self.exported, self.quaternions, self.matched
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camgeo::{
        convert_pose, AngleConvention, ConversionOptions, EulerOpk, GeodeticPosition,
        HeadingPitchRoll, PoseInput, PoseOrientation, Quaternion, RowAngles,
    };

    fn opk_pose(quaternion: Option<Quaternion>) -> CameraPose {
        CameraPose {
            position: GeodeticPosition::default(),
            orientation: PoseOrientation::Photogrammetric {
                opk: EulerOpk::default(),
                hpr: Some(HeadingPitchRoll::default()),
                quaternion,
            },
        }
    }

    fn generic_pose() -> CameraPose {
        CameraPose {
            position: GeodeticPosition::default(),
            orientation: PoseOrientation::PassThrough {
                heading_deg: 0.0,
                pitch_deg: 0.0,
                roll_deg: 0.0,
                convention: AngleConvention::NorthDegrees,
            },
        }
    }

    #[test]
    fn test_export_report_default() {
        let report = ExportReport::default();
        assert_eq!(report.status, ExportStatus::Success);
        assert_eq!(report.rows, 0);
        assert_eq!(report.exported, 0);
    }

    #[test]
    fn test_record_pose() {
        let mut report = ExportReport::new("cameras.csv");
        report.record_pose("a", &opk_pose(Some(Quaternion::new(0.0, 0.0, 0.0, 1.0))));
        report.record_pose("b", &opk_pose(None));
        report.record_pose("c", &generic_pose());

        assert_eq!(report.rows, 3);
        assert_eq!(report.opk_rows, 2);
        assert_eq!(report.quaternions, 1);
        assert_eq!(report.quaternions_unavailable, 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].camera, "b");
    }

    #[test]
    fn test_finalize_success() {
        let mut report = ExportReport::new("cameras.csv");
        report.record_pose("a", &opk_pose(Some(Quaternion::new(0.0, 0.0, 0.0, 1.0))));
        report.exported = 1;
        report.finalize();

        assert_eq!(report.status, ExportStatus::Success);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = ExportReport::new("cameras.csv");
        report.record_pose("a", &opk_pose(None));
        report.exported = 1;
        report.finalize();

        assert_eq!(report.status, ExportStatus::PartialSuccess);
    }

    #[test]
    fn test_nan_row_propagates_and_is_reported() {
        let input = PoseInput {
            x: f64::NAN,
            y: 45.0,
            alt: 0.0,
            angles: RowAngles::Opk(EulerOpk::new(1.0, 2.0, 3.0)),
        };
        let pose = convert_pose(&input, &ConversionOptions::default());

        let mut report = ExportReport::new("cameras.csv");
        report.record_pose("nan", &pose);
        report.exported = 1;
        report.finalize();

        assert_eq!(report.quaternions, 1);
        assert_eq!(report.quaternions_unavailable, 0);
        assert_eq!(report.non_finite_rows, 1);
        assert_eq!(report.warnings[0].camera, "nan");
        assert_eq!(report.status, ExportStatus::PartialSuccess);
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = ExportReport::new("cameras.csv");
        report.record_pose("a", &generic_pose());
        report.finalize();

        assert_eq!(report.status, ExportStatus::Failed);
    }

    #[test]
    fn test_summary() {
        let mut report = ExportReport::new("cameras.csv");
        report.exported = 42;
        report.record_matches(50, 40);

        let summary = report.summary();
        assert!(summary.contains("cameras.csv"));
        assert!(summary.contains("42 exported"));
        assert!(summary.contains("40 matched"));
    }

    #[test]
    fn test_save_to_file() {
        let mut report = ExportReport::new("cameras.csv");
        report.exported = 1;
        report.finalize();

        let path = std::env::temp_dir()
            .join(format!("camera_geojson_report_{}.json", std::process::id()));
        report.save_to_file(&path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["status"], "Success");
        assert_eq!(parsed["exported"], 1);

        std::fs::remove_file(&path).ok();
    }
}
