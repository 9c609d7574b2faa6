//! Métadonnées EXIF des images (boîtier, optique, exposition, GPS)

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Reader, Tag, Value};
use serde::Serialize;
use tracing::debug;

/// Champs EXIF exportés, absents du JSON quand le tag manque
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExifProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lens_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_number: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_seconds: Option<f64>,
    /// `1/250 s` sous la seconde, `2.5 s` au-delà
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,
    /// Heure locale de prise de vue, `YYYY-MM-DDTHH:MM:SS` (EXIF ne porte pas de fuseau)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_alt: Option<f64>,
}

impl ExifProperties {
    /// Lit les EXIF d'un fichier image. Sans EXIF lisible, tous les champs sont vides.
    pub fn read(path: &Path) -> Self {
        match read_exif(path) {
            Ok(exif) => Self::from_exif(&exif),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No readable EXIF");
                Self::default()
            }
        }
    }

    pub fn from_exif(exif: &Exif) -> Self {
        let exposure_seconds = rational(exif, Tag::ExposureTime);
        let gps = gps_location(exif);

        Self {
            image_width: uint(exif, Tag::ImageWidth)
                .or_else(|| uint(exif, Tag::PixelXDimension)),
            image_height: uint(exif, Tag::ImageLength)
                .or_else(|| uint(exif, Tag::PixelYDimension)),
            camera_make: ascii(exif, Tag::Make),
            camera_model: ascii(exif, Tag::Model),
            lens_model: ascii(exif, Tag::LensModel),
            f_number: rational(exif, Tag::FNumber).map(round3),
            focal_length_mm: rational(exif, Tag::FocalLength).map(round3),
            exposure_seconds,
            exposure_display: exposure_seconds.and_then(exposure_display),
            iso: uint(exif, Tag::PhotographicSensitivity),
            date_time_original: date_time(exif, Tag::DateTimeOriginal),
            gps_lon: gps.map(|(lon, _, _)| lon),
            gps_lat: gps.map(|(_, lat, _)| lat),
            gps_alt: gps.and_then(|(_, _, alt)| alt),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn read_exif(path: &Path) -> anyhow::Result<Exif> {
    let file = File::open(path)?;
    let exif = Reader::new().read_from_container(&mut BufReader::new(file))?;
    Ok(exif)
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn exposure_display(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    if seconds >= 1.0 {
        let text = format!("{:.3}", seconds);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        Some(format!("{} s", text))
    } else {
        Some(format!("1/{} s", (1.0 / seconds).round()))
    }
}

fn uint(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

fn rational(exif: &Exif, tag: Tag) -> Option<f64> {
    match exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(ref v) => v.first().map(|r| r.to_f64()).filter(|v| v.is_finite()),
        _ => None,
    }
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let Value::Ascii(ref parts) = exif.get_field(tag, In::PRIMARY)?.value else {
        return None;
    };
    let text = parts
        .iter()
        .map(|p| String::from_utf8_lossy(p))
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!text.is_empty()).then(|| text.to_string())
}

fn date_time(exif: &Exif, tag: Tag) -> Option<String> {
    let Value::Ascii(ref parts) = exif.get_field(tag, In::PRIMARY)?.value else {
        return None;
    };
    let dt = exif::DateTime::from_ascii(parts.first()?).ok()?;
    Some(format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
    ))
}

/// Degrés/minutes/secondes → degrés décimaux
fn dms(exif: &Exif, tag: Tag) -> Option<f64> {
    match exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(ref v) if v.len() >= 3 => {
            Some(v[0].to_f64() + v[1].to_f64() / 60.0 + v[2].to_f64() / 3600.0)
        }
        _ => None,
    }
}

/// -1 pour l'hémisphère `negative` (S ou W), +1 sinon
fn hemisphere(exif: &Exif, tag: Tag, negative: u8) -> f64 {
    let is_negative = match exif.get_field(tag, In::PRIMARY).map(|f| &f.value) {
        Some(Value::Ascii(parts)) => parts.first().and_then(|p| p.first()) == Some(&negative),
        _ => false,
    };
    if is_negative {
        -1.0
    } else {
        1.0
    }
}

/// (lon, lat, altitude) ; l'altitude n'est lue qu'avec une position valide
fn gps_location(exif: &Exif) -> Option<(f64, f64, Option<f64>)> {
    let lat = dms(exif, Tag::GPSLatitude)? * hemisphere(exif, Tag::GPSLatitudeRef, b'S');
    let lon = dms(exif, Tag::GPSLongitude)? * hemisphere(exif, Tag::GPSLongitudeRef, b'W');
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }

    // AltitudeRef 1 : sous le niveau de la mer
    let alt = rational(exif, Tag::GPSAltitude).map(|a| {
        if uint(exif, Tag::GPSAltitudeRef) == Some(1) {
            -a
        } else {
            a
        }
    });
    Some((lon, lat, alt))
}
