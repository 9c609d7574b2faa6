//! Point d'entrée CLI pour camera-geojson

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Exporter des caméras photogrammétriques vers GeoJSON
#[derive(Parser)]
#[command(name = "camera-geojson")]
#[command(author, version)]
#[command(about = "Exporter des poses caméra (CSV) vers GeoJSON pour un viewer de globe 3D")]
#[command(long_about = "Convertit un export CSV de caméras (positions WGS84 ou locales ENU, angles OPK ou cap/tangage/roulis) en FeatureCollection GeoJSON avec URL d'images, cap/tangage/roulis et quaternion ECEF.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Export(args) => {
            info!(csv = %args.csv.display(), output = %args.output.display(), "Export vers GeoJSON");
            cli::cmd_export(&args)?;
        }
        Commands::Stats {
            csv,
            images,
            mode,
            list_missing,
        } => {
            cli::cmd_stats(&csv, &images, mode.as_deref(), list_missing)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
