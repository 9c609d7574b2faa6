//! # camera-geojson
//!
//! Export de caméras photogrammétriques (CSV) vers GeoJSON pour un viewer de globe 3D.
//!
//! ## Features
//!
//! - Lecture CSV tolérante (alias de colonnes, commentaires, Windows-1252)
//! - Appariement avec les images (jpg/jpeg/png/webp) par nom de fichier
//! - Positions WGS84 directes ou plan tangent local (ENU) depuis une origine
//! - Orientation OPK → cap/tangage/roulis et quaternion ECEF via `camgeo`
//! - Rapport d'export (console ou JSON)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Export GeoJSON, coordonnées locales
//! camera-geojson export --csv cameras.csv --images ./photos --output cameras.geojson \
//!     --mode local --origin 6.8652,45.8326,1035
//!
//! # Statistiques d'appariement, sans écriture
//! camera-geojson stats --csv cameras.csv --images ./photos
//! ```

pub mod config;
pub mod export;
pub mod input;
pub mod pipeline;
pub mod report;

pub use config::ExportConfig;
pub use pipeline::{collect_stats, run_export, ExportRequest};
pub use report::{ExportReport, ExportStatus};
