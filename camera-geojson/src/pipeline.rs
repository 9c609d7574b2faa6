//! Chaîne d'export : CSV → poses → GeoJSON

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use camgeo::{convert_pose, CameraPose, ConversionOptions};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::export::{write_geojson, FeatureBuilder};
use crate::input::{read_csv, CameraRow, CsvData, ImageCatalog, MatchStats};
use crate::report::ExportReport;

/// Fichiers d'un export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub csv: PathBuf,
    pub images: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Construit le catalogue à partir de fichiers et dossiers
pub fn build_catalog(paths: &[PathBuf]) -> Result<ImageCatalog> {
    let mut catalog = ImageCatalog::new();
    for path in paths {
        let added = catalog.add_path(path)?;
        debug!(path = %path.display(), added, "Images indexed");
    }
    Ok(catalog)
}

/// Charge le CSV et l'apparie avec les images, sans rien écrire
pub fn collect_stats(csv: &Path, images: &[PathBuf]) -> Result<(CsvData, MatchStats)> {
    let data = read_csv(csv).context(format!("Failed to read CSV: {}", csv.display()))?;
    let catalog = build_catalog(images)?;
    let stats = MatchStats::compute(data.rows.iter().map(|r| r.name.as_str()), &catalog);
    Ok((data, stats))
}

/// Convertit toutes les lignes en parallèle (ordre d'entrée conservé)
pub fn convert_rows(rows: &[CameraRow], options: &ConversionOptions) -> Vec<CameraPose> {
    rows.par_iter()
        .map(|row| convert_pose(&row.pose_input(), options))
        .collect()
}

/// Exécute un export complet et retourne son rapport
pub fn run_export(request: &ExportRequest, config: &ExportConfig) -> Result<ExportReport> {
    let start = Instant::now();

    // Origine vérifiée avant toute lecture
    let options = config.conversion_options()?;

    let data = read_csv(&request.csv)
        .context(format!("Failed to read CSV: {}", request.csv.display()))?;
    if data.rows.is_empty() {
        anyhow::bail!("CSV contains no camera rows: {}", request.csv.display());
    }

    let catalog = build_catalog(&request.images)?;
    let stats = MatchStats::compute(data.rows.iter().map(|r| r.name.as_str()), &catalog);
    if config.only_matched && stats.matched == 0 {
        anyhow::bail!("No rows to export with current filters (no camera matched an image)");
    }

    info!(
        rows = data.rows.len(),
        layout = ?data.layout,
        images = stats.images,
        matched = stats.matched,
        mode = options.mode.describe(),
        "Converting camera poses"
    );

    let poses = convert_rows(&data.rows, &options);

    let mut report = ExportReport::new(&request.csv.display().to_string());
    report.coordinate_mode = options.mode.describe().to_string();
    report.rows_skipped = data.skipped;
    report.record_matches(stats.images, stats.matched);
    for (row, pose) in data.rows.iter().zip(&poses) {
        report.record_pose(&row.name, pose);
    }

    let collection = FeatureBuilder::new(config, &catalog).collection(&data.rows, &poses);
    report.exported = collection.features.len();
    report.filtered_unmatched = data.rows.len() - report.exported;

    write_geojson(&collection, &request.output)?;
    report.output = Some(request.output.display().to_string());

    report.set_duration(start.elapsed());
    report.finalize();

    info!(
        output = %request.output.display(),
        exported = report.exported,
        status = ?report.status,
        "GeoJSON written"
    );

    Ok(report)
}
