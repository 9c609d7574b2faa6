//! Catalogue des images et construction des URL

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::metadata::ExifProperties;

/// Extensions reconnues comme images
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Propriétés de fichier et EXIF exportées avec chaque caméra
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProperties {
    pub file_name: String,
    pub file_size_bytes: u64,
    pub created_unix: Option<u64>,
    pub modified_unix: Option<u64>,
    #[serde(flatten)]
    pub exif: ExifProperties,
}

/// Images disponibles, indexées par nom de fichier (insensible à la casse)
#[derive(Debug, Default)]
pub struct ImageCatalog {
    by_name: HashMap<String, PathBuf>,
    /// Propriétés déjà lues, par chemin (partagé entre threads d'export)
    properties: Mutex<HashMap<PathBuf, FileProperties>>,
}

impl ImageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute un fichier image ou un dossier (parcours récursif)
    pub fn add_path(&mut self, path: &Path) -> Result<usize> {
        if path.is_file() {
            return Ok(usize::from(self.insert(path.to_path_buf())));
        }
        if !path.is_dir() {
            anyhow::bail!("Image path not found: {}", path.display());
        }

        let mut added = 0;
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry.with_context(|| format!("Walking {}", path.display()))?;
            let is_file = entry.file_type().is_file();
            if is_file && is_image(entry.path()) && self.insert(entry.into_path()) {
                added += 1;
            }
        }

        debug!(path = %path.display(), added, "Image directory scanned");
        Ok(added)
    }

    /// Enregistre une image (un doublon remplace l'entrée précédente) ; `false` si ignorée
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if !is_image(&path) {
            return false;
        }
        let Some(key) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
            return false;
        };

        if let Some(previous) = self.by_name.insert(key, path) {
            warn!(replaced = %previous.display(), "Duplicate image name, later file kept");
        }
        true
    }

    /// Chemin de l'image associée à un nom de caméra
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.by_name.get(&name.to_lowercase()).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Propriétés du fichier associé (taille, dates, EXIF), lues une fois par chemin
    pub fn file_properties(&self, name: &str) -> Option<FileProperties> {
        let path = self.get(name)?;
        if let Some(cached) = self.properties.lock().ok()?.get(path) {
            return Some(cached.clone());
        }

        let props = read_file_properties(path)?;
        if let Ok(mut cache) = self.properties.lock() {
            cache.insert(path.to_path_buf(), props.clone());
        }
        Some(props)
    }
}

fn unix_secs(time: std::io::Result<SystemTime>) -> Option<u64> {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
}

fn read_file_properties(path: &Path) -> Option<FileProperties> {
    let meta = std::fs::metadata(path).ok()?;
    debug!(path = %path.display(), "Reading file properties");

    Some(FileProperties {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_size_bytes: meta.len(),
        created_unix: unix_secs(meta.created()),
        modified_unix: unix_secs(meta.modified()),
        exif: ExifProperties::read(path),
    })
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Joint une base et une fin d'URL avec un seul `/`
pub fn combine_url(base: &str, tail: &str) -> String {
    if base.is_empty() {
        return tail.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        tail.trim_start_matches('/')
    )
}

/// Octets gardés tels quels dans un chemin d'URI
fn is_uri_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-._~/:!$&'()*+,;=@".contains(&b)
}

/// URI `file://` d'un chemin local (absolu), non-ASCII encodé en UTF-8 `%XX`
pub fn file_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let raw = absolute.to_string_lossy().replace('\\', "/");

    let mut encoded = String::with_capacity(raw.len() + 8);
    for b in raw.bytes() {
        if is_uri_path_byte(b) {
            encoded.push(char::from(b));
        } else {
            encoded.push_str(&format!("%{:02X}", b));
        }
    }

    if encoded.starts_with('/') {
        format!("file://{}", encoded)
    } else {
        format!("file:///{}", encoded)
    }
}

/// Statistiques d'appariement caméras / images
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub rows: usize,
    pub images: usize,
    pub matched: usize,
    pub missing: Vec<String>,
}

impl MatchStats {
    pub fn compute<'a>(names: impl IntoIterator<Item = &'a str>, catalog: &ImageCatalog) -> Self {
        let mut stats = Self {
            images: catalog.len(),
            ..Self::default()
        };
        for name in names {
            stats.rows += 1;
            if catalog.contains(name) {
                stats.matched += 1;
            } else {
                stats.missing.push(name.to_string());
            }
        }
        stats
    }

    pub fn match_rate(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        self.matched as f64 / self.rows as f64 * 100.0
    }
}
