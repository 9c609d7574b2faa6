//! Entrées : CSV de caméras, images associées et leurs métadonnées

pub mod csv;
pub mod images;
pub mod metadata;

pub use csv::{read_csv, AngleLayout, CameraRow, CsvData, CsvError};
pub use images::{combine_url, file_uri, FileProperties, ImageCatalog, MatchStats};
pub use metadata::ExifProperties;
