//! Lecture des CSV de caméras (export RealityCapture et équivalents)
//!
//! - Ligne d'en-tête : première ligne non vide, hors commentaires `#` sans virgule
//! - Noms de colonnes normalisés (trim, `#` initial retiré, minuscules)
//! - Colonnes `omega/phi/kappa` → lignes photogrammétriques (OPK)
//! - Champs entre guillemets avec échappement `""`

use std::path::Path;

use camgeo::{EulerOpk, PoseInput, RowAngles};
use thiserror::Error;
use tracing::{debug, warn};

/// Noms acceptés pour chaque colonne logique
const NAME_ALIASES: &[&str] = &["name", "_name"];
const X_ALIASES: &[&str] = &["x", "lon", "longitude"];
const Y_ALIASES: &[&str] = &["y", "lat", "latitude"];
const ALT_ALIASES: &[&str] = &["alt", "z", "height", "h"];
const HEADING_ALIASES: &[&str] = &["heading", "yaw", "kappa"];
const PITCH_ALIASES: &[&str] = &["pitch", "phi"];
const ROLL_ALIASES: &[&str] = &["roll", "omega"];

/// Erreurs de lecture CSV
#[derive(Debug, Error)]
pub enum CsvError {
    /// Erreur d'I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Aucun en-tête trouvé
    #[error("CSV appears empty")]
    Empty,

    /// Colonnes obligatoires absentes
    #[error(
        "CSV is missing required columns: {}. Accepted names: name → #name/name/_name, \
         x → x/lon/longitude, y → y/lat/latitude, alt → alt/z/height/h, \
         heading → heading/yaw/kappa, pitch → pitch/phi, roll → roll/omega",
        .missing.join(", ")
    )]
    MissingColumns { missing: Vec<&'static str> },
}

/// Représentation des angles dans le fichier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleLayout {
    /// Colonnes omega / phi / kappa
    Opk,
    /// Colonnes cap / tangage / roulis génériques
    Generic,
}

/// Une ligne caméra
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRow {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub alt: f64,
    pub angles: RowAngles,
}

impl CameraRow {
    /// Entrée pour le noyau de conversion
    pub fn pose_input(&self) -> PoseInput {
        PoseInput {
            x: self.x,
            y: self.y,
            alt: self.alt,
            angles: self.angles,
        }
    }
}

/// Contenu d'un CSV de caméras
#[derive(Debug, Clone)]
pub struct CsvData {
    pub rows: Vec<CameraRow>,
    pub layout: AngleLayout,
    /// Lignes ignorées (moins de champs que l'en-tête)
    pub skipped: usize,
}

/// Index des colonnes résolues
#[derive(Debug)]
struct Columns {
    count: usize,
    name: usize,
    x: usize,
    y: usize,
    alt: usize,
    heading: usize,
    pitch: usize,
    roll: usize,
    layout: AngleLayout,
}

/// Lit un fichier CSV de caméras
pub fn read_csv(path: &Path) -> Result<CsvData, CsvError> {
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes);
    let data = parse_csv(&text)?;

    debug!(
        path = %path.display(),
        rows = data.rows.len(),
        layout = ?data.layout,
        "CSV loaded"
    );
    Ok(data)
}

/// Parse le contenu texte d'un CSV de caméras
pub fn parse_csv(text: &str) -> Result<CsvData, CsvError> {
    let mut lines = text.lines();

    // 1. Trouver l'en-tête (lignes vides et commentaires sans virgule ignorés)
    let header = lines
        .by_ref()
        .find(|line| !line.trim().is_empty() && !(line.starts_with('#') && !line.contains(',')))
        .ok_or(CsvError::Empty)?;

    let names: Vec<String> = header.split(',').map(normalize_header).collect();
    let columns = resolve_columns(&names)?;

    // 2. Lire les données
    let mut rows = Vec::new();
    let mut skipped = 0;

    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let parts = split_csv_line(line, columns.count);
        if parts.len() < columns.count {
            warn!(
                line = line_no + 2,
                fields = parts.len(),
                expected = columns.count,
                "Skipping short CSV line"
            );
            skipped += 1;
            continue;
        }

        rows.push(build_row(&parts, &columns));
    }

    Ok(CsvData {
        rows,
        layout: columns.layout,
        skipped,
    })
}

fn build_row(parts: &[String], columns: &Columns) -> CameraRow {
    let heading = parse_number(&parts[columns.heading]);
    let pitch = parse_number(&parts[columns.pitch]);
    let roll = parse_number(&parts[columns.roll]);

    let angles = match columns.layout {
        // kappa ↔ heading, phi ↔ pitch, omega ↔ roll
        AngleLayout::Opk => RowAngles::Opk(EulerOpk::new(roll, pitch, heading)),
        AngleLayout::Generic => RowAngles::Generic {
            heading_deg: heading,
            pitch_deg: pitch,
            roll_deg: roll,
        },
    };

    CameraRow {
        name: parts[columns.name].trim().to_string(),
        x: parse_number(&parts[columns.x]),
        y: parse_number(&parts[columns.y]),
        alt: parse_number(&parts[columns.alt]),
        angles,
    }
}

/// Normalise un nom de colonne : trim, `#` initial retiré, minuscules
fn normalize_header(raw: &str) -> String {
    raw.trim().trim_start_matches('#').to_lowercase()
}

fn resolve_columns(names: &[String]) -> Result<Columns, CsvError> {
    let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));

    let found = [
        ("name", find(NAME_ALIASES)),
        ("x", find(X_ALIASES)),
        ("y", find(Y_ALIASES)),
        ("alt", find(ALT_ALIASES)),
        ("heading", find(HEADING_ALIASES)),
        ("pitch", find(PITCH_ALIASES)),
        ("roll", find(ROLL_ALIASES)),
    ];

    let missing: Vec<&'static str> = found
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(label, _)| *label)
        .collect();
    if !missing.is_empty() {
        return Err(CsvError::MissingColumns { missing });
    }

    let idx = found.map(|(_, idx)| idx.unwrap_or_default());
    let [name, x, y, alt, heading, pitch, roll] = idx;

    let layout = if names[heading] == "kappa" && names[pitch] == "phi" && names[roll] == "omega" {
        AngleLayout::Opk
    } else {
        AngleLayout::Generic
    };

    Ok(Columns {
        count: names.len(),
        name,
        x,
        y,
        alt,
        heading,
        pitch,
        roll,
        layout,
    })
}

/// Découpe une ligne CSV, guillemets et `""` gérés
pub fn split_csv_line(line: &str, expected: usize) -> Vec<String> {
    // Chemin rapide : pas de guillemets
    if memchr::memchr(b'"', line.as_bytes()).is_none() {
        return line.split(',').map(str::to_string).collect();
    }

    let mut fields = Vec::with_capacity(expected);
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parse un nombre (point décimal) ; 0 si illisible
fn parse_number(raw: &str) -> f64 {
    fast_float::parse(raw.trim()).unwrap_or(0.0)
}

/// Décode les octets : UTF-8 (BOM ignoré), sinon Windows-1252
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match simdutf8::basic::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}
