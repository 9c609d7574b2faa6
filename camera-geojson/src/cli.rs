//! Définition et implémentation des commandes CLI
//!
//! - `export` : CSV de caméras → GeoJSON
//! - `stats` : lignes, images et appariement, sans écriture

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use camera_geojson::config::parse_origin;
use camera_geojson::{collect_stats, run_export, ExportConfig, ExportRequest};
use camgeo::{AngleConvention, CoordinateModeKind};
use clap::{Args, Subcommand};
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum Commands {
    /// Export camera poses from a CSV to a GeoJSON FeatureCollection
    Export(ExportArgs),

    /// Print row / image / match statistics without writing anything
    Stats {
        /// Camera CSV (RealityCapture-style export)
        #[arg(short, long)]
        csv: PathBuf,

        /// Image files or directories (scanned recursively)
        #[arg(short, long, num_args = 1..)]
        images: Vec<PathBuf>,

        /// Coordinate mode: wgs84 or local
        #[arg(long)]
        mode: Option<String>,

        /// Show the names of cameras without an image
        #[arg(long)]
        list_missing: bool,
    },
}

#[derive(Args)]
pub struct ExportArgs {
    /// Camera CSV (RealityCapture-style export)
    #[arg(short, long)]
    pub csv: PathBuf,

    /// Image files or directories (scanned recursively)
    #[arg(short, long, num_args = 1..)]
    pub images: Vec<PathBuf>,

    /// Output GeoJSON file
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON config file (overridden by env and flags)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Coordinate mode: wgs84 (x=lon, y=lat) or local (ENU meters)
    #[arg(long)]
    pub mode: Option<String>,

    /// Project origin for local mode, as lon,lat,h (défaut : env CAMGEO_ORIGIN)
    #[arg(long, allow_hyphen_values = true)]
    pub origin: Option<String>,

    /// Base URL for images (défaut : env CAMGEO_IMAGES_BASE_URL)
    #[arg(long)]
    pub images_base_url: Option<String>,

    /// Base URL for thumbnails (défaut : env CAMGEO_THUMBS_BASE_URL)
    #[arg(long)]
    pub thumbs_base_url: Option<String>,

    /// Pin icon URL (défaut : env CAMGEO_PIN_ICON / /icons/camera-pin.png)
    #[arg(long)]
    pub pin_icon: Option<String>,

    /// Use file:// URLs for images found locally
    #[arg(long)]
    pub use_file_scheme: bool,

    /// Export only cameras whose image was found
    #[arg(long)]
    pub only_matched: bool,

    /// Do not export heading/pitch/roll for OPK rows (quaternion only)
    #[arg(long)]
    pub no_hpr: bool,

    /// Export file properties and EXIF (camera, lens, exposure, GPS) of matched images
    #[arg(long, alias = "include-exif")]
    pub include_file_props: bool,

    /// Label for generic heading/pitch/roll columns (degrees): north-degrees, east-degrees
    #[arg(long)]
    pub heading_convention: Option<String>,

    /// Write the export report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Configuration finale : défauts < fichier < environnement < options
fn resolve_config(args: &ExportArgs) -> Result<ExportConfig> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };
    config.apply_env()?;
    apply_overrides(&mut config, args)?;
    Ok(config)
}

/// Applique les options CLI sur la configuration
fn apply_overrides(config: &mut ExportConfig, args: &ExportArgs) -> Result<()> {
    if let Some(ref mode) = args.mode {
        config.mode = mode.parse::<CoordinateModeKind>()?;
    }
    if let Some(ref origin) = args.origin {
        config.origin = Some(parse_origin(origin).context("Invalid --origin")?);
    }
    if let Some(ref url) = args.images_base_url {
        config.images_base_url = url.clone();
    }
    if let Some(ref url) = args.thumbs_base_url {
        config.thumbs_base_url = url.clone();
    }
    if let Some(ref icon) = args.pin_icon {
        config.pin_icon = icon.clone();
    }
    if let Some(ref label) = args.heading_convention {
        config.heading_convention = label
            .parse::<AngleConvention>()?
            .for_generic_angles()
            .context("Invalid --heading-convention")?;
    }

    config.use_file_scheme |= args.use_file_scheme;
    config.only_matched |= args.only_matched;
    config.include_file_props |= args.include_file_props;
    if args.no_hpr {
        config.include_hpr = false;
    }
    Ok(())
}

/// Exécute la commande export
pub fn cmd_export(args: &ExportArgs) -> Result<()> {
    let config = resolve_config(args)?;

    if config.mode == CoordinateModeKind::Wgs84 && config.origin.is_some() {
        warn!("Origin ignored in wgs84 mode");
    }

    let request = ExportRequest {
        csv: args.csv.clone(),
        images: args.images.clone(),
        output: args.output.clone(),
    };
    let report = run_export(&request, &config)?;

    report.display();
    if let Some(ref path) = args.report {
        report
            .save_to_file(path)
            .context(format!("Failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }

    println!("\n{}", report.summary());
    Ok(())
}

/// Exécute la commande stats
pub fn cmd_stats(
    csv: &Path,
    images: &[PathBuf],
    mode: Option<&str>,
    list_missing: bool,
) -> Result<()> {
    let kind = match mode {
        Some(m) => m.parse::<CoordinateModeKind>()?,
        None => CoordinateModeKind::default(),
    };
    let (data, stats) = collect_stats(csv, images)?;

    println!("\n{}", "=".repeat(60));
    println!("CAMERA STATS - {}", csv.display());
    println!("{}", "=".repeat(60));
    println!("CSV rows:       {}", stats.rows);
    println!("Skipped lines:  {}", data.skipped);
    println!("Angle layout:   {:?}", data.layout);
    println!("Images:         {}", stats.images);
    println!("Matched:        {} ({:.1}%)", stats.matched, stats.match_rate());
    println!("Missing:        {}", stats.missing.len());
    println!("Coordinate mode: {}", kind.describe());

    if list_missing && !stats.missing.is_empty() {
        println!("\n--- MISSING IMAGES ---");
        for name in &stats.missing {
            println!("  {}", name);
        }
    }
    println!("{}", "=".repeat(60));

    Ok(())
}
