//! Export des poses caméra en GeoJSON (points 3D + bloc d'orientation)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use camgeo::{CameraPose, PoseOrientation, Quaternion};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::config::ExportConfig;
use crate::input::{combine_url, file_uri, CameraRow, ImageCatalog};

/// Contexte commun à toutes les features d'un export
pub struct FeatureBuilder<'a> {
    config: &'a ExportConfig,
    catalog: &'a ImageCatalog,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(config: &'a ExportConfig, catalog: &'a ImageCatalog) -> Self {
        Self { config, catalog }
    }

    /// URL de l'image : `file://` si demandé et disponible, sinon préfixe + nom
    pub fn image_url(&self, name: &str) -> String {
        if self.config.use_file_scheme {
            if let Some(path) = self.catalog.get(name) {
                return file_uri(path);
            }
        }
        combine_url(&self.config.images_base_url, name)
    }

    pub fn thumb_url(&self, name: &str) -> String {
        combine_url(&self.config.thumbs_base_url, name)
    }

    /// Construit la feature d'une caméra
    pub fn build(&self, row: &CameraRow, pose: &CameraPose) -> Feature {
        let has_image = self.catalog.contains(&row.name);

        let mut properties = JsonObject::new();
        properties.insert("id".into(), json!(row.name));
        insert_orientation(&mut properties, &pose.orientation);
        properties.insert("imageUrl".into(), json!(self.image_url(&row.name)));
        properties.insert("thumbUrl".into(), json!(self.thumb_url(&row.name)));
        properties.insert("pinIcon".into(), json!(self.config.pin_icon));
        properties.insert("hasImage".into(), json!(has_image));

        if self.config.include_file_props && has_image {
            if let Some(props) = self.catalog.file_properties(&row.name) {
                properties.insert("file".into(), json!(props));
            }
        }

        let p = pose.position;
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![p.lon_deg, p.lat_deg, p.height_m]))),
            id: Some(Id::String(row.name.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }

    /// Construit la collection, filtrée sur les images trouvées si demandé
    pub fn collection(&self, rows: &[CameraRow], poses: &[CameraPose]) -> FeatureCollection {
        let features = rows
            .iter()
            .zip(poses)
            .filter(|(row, _)| !self.config.only_matched || self.catalog.contains(&row.name))
            .map(|(row, pose)| self.build(row, pose))
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Ajoute le bloc d'orientation selon la représentation de la pose
fn insert_orientation(properties: &mut JsonObject, orientation: &PoseOrientation) {
    match orientation {
        PoseOrientation::Photogrammetric {
            opk,
            hpr,
            quaternion,
        } => {
            properties.insert("omega".into(), json!(opk.omega_deg));
            properties.insert("phi".into(), json!(opk.phi_deg));
            properties.insert("kappa".into(), json!(opk.kappa_deg));

            if let Some(hpr) = hpr {
                properties.insert("heading".into(), json!(hpr.heading_rad));
                properties.insert("pitch".into(), json!(hpr.pitch_rad));
                properties.insert("roll".into(), json!(hpr.roll_rad));
            }
            if let Some(convention) = orientation.convention() {
                properties.insert("hprConvention".into(), json!(convention.as_str()));
            }
            if let Some(q) = quaternion {
                properties.insert("quaternion".into(), quaternion_json(q));
            }
        }
        PoseOrientation::PassThrough {
            heading_deg,
            pitch_deg,
            roll_deg,
            convention,
        } => {
            properties.insert("heading".into(), json!(heading_deg));
            properties.insert("pitch".into(), json!(pitch_deg));
            properties.insert("roll".into(), json!(roll_deg));
            properties.insert("hprConvention".into(), json!(convention.as_str()));
        }
    }
}

fn quaternion_json(q: &Quaternion) -> serde_json::Value {
    json!({
        "x": q.x,
        "y": q.y,
        "z": q.z,
        "w": q.w,
        "frame": Quaternion::FRAME,
    })
}

/// Écrit la collection en JSON indenté
pub fn write_geojson(collection: &FeatureCollection, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, collection)
        .context(format!("Failed to write GeoJSON: {}", output_path.display()))?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camgeo::{
        convert_pose, AngleConvention, ConversionOptions, EulerOpk, PoseInput, RowAngles,
    };
    use std::path::PathBuf;

    fn row(name: &str, angles: RowAngles) -> CameraRow {
        CameraRow {
            name: name.to_string(),
            x: 6.86,
            y: 45.83,
            alt: 1035.0,
            angles,
        }
    }

    fn pose_for(row: &CameraRow, options: &ConversionOptions) -> CameraPose {
        let input: PoseInput = row.pose_input();
        convert_pose(&input, options)
    }

    #[test]
    fn test_opk_feature_properties() {
        let config = ExportConfig {
            images_base_url: "https://cdn.example/img/".into(),
            thumbs_base_url: "https://cdn.example/thumbs".into(),
            ..ExportConfig::default()
        };
        let mut catalog = ImageCatalog::new();
        catalog.insert(PathBuf::from("/photos/IMG_1.JPG"));

        let r = row("IMG_1.JPG", RowAngles::Opk(EulerOpk::new(1.0, 2.0, 30.0)));
        let pose = pose_for(&r, &ConversionOptions::default());
        let feature = FeatureBuilder::new(&config, &catalog).build(&r, &pose);

        let props = feature.properties.unwrap();
        assert_eq!(props["id"], "IMG_1.JPG");
        assert_eq!(props["omega"], 1.0);
        assert_eq!(props["kappa"], 30.0);
        assert_eq!(props["hprConvention"], "east-radians");
        assert_eq!(props["imageUrl"], "https://cdn.example/img/IMG_1.JPG");
        assert_eq!(props["thumbUrl"], "https://cdn.example/thumbs/IMG_1.JPG");
        assert_eq!(props["pinIcon"], "/icons/camera-pin.png");
        assert_eq!(props["hasImage"], true);
        assert_eq!(props["quaternion"]["frame"], "ecef");
        assert!(props["heading"].as_f64().is_some());
        assert!(!props.contains_key("file"));

        match feature.geometry.unwrap().value {
            Value::Point(coords) => assert_eq!(coords, vec![6.86, 45.83, 1035.0]),
            other => panic!("unexpected geometry: {:?}", other),
        }
    }

    #[test]
    fn test_generic_feature_keeps_degrees() {
        let config = ExportConfig {
            heading_convention: AngleConvention::EastDegrees,
            ..ExportConfig::default()
        };
        let catalog = ImageCatalog::new();
        let r = row(
            "cam",
            RowAngles::Generic {
                heading_deg: 270.0,
                pitch_deg: -10.0,
                roll_deg: 0.5,
            },
        );
        let options = config.conversion_options().unwrap();
        let pose = pose_for(&r, &options);
        let props = FeatureBuilder::new(&config, &catalog)
            .build(&r, &pose)
            .properties
            .unwrap();

        assert_eq!(props["heading"], 270.0);
        assert_eq!(props["pitch"], -10.0);
        assert_eq!(props["hprConvention"], "east-degrees");
        assert_eq!(props["hasImage"], false);
        assert!(!props.contains_key("quaternion"));
        assert!(!props.contains_key("omega"));
    }

    #[test]
    fn test_hpr_disabled_omits_convention() {
        let config = ExportConfig {
            include_hpr: false,
            ..ExportConfig::default()
        };
        let catalog = ImageCatalog::new();
        let r = row("cam", RowAngles::Opk(EulerOpk::default()));
        let pose = pose_for(&r, &config.conversion_options().unwrap());
        let props = FeatureBuilder::new(&config, &catalog)
            .build(&r, &pose)
            .properties
            .unwrap();

        assert!(!props.contains_key("heading"));
        assert!(!props.contains_key("hprConvention"));
        assert!(props.contains_key("quaternion"));
    }

    #[test]
    fn test_file_scheme_url() {
        let config = ExportConfig {
            images_base_url: "https://cdn.example".into(),
            use_file_scheme: true,
            ..ExportConfig::default()
        };
        let mut catalog = ImageCatalog::new();
        catalog.insert(PathBuf::from("/photos/a.jpg"));
        let builder = FeatureBuilder::new(&config, &catalog);

        assert_eq!(builder.image_url("A.JPG"), "file:///photos/a.jpg");
        assert_eq!(builder.image_url("b.jpg"), "https://cdn.example/b.jpg");
    }

    #[test]
    fn test_only_matched_filter() {
        let config = ExportConfig {
            only_matched: true,
            ..ExportConfig::default()
        };
        let mut catalog = ImageCatalog::new();
        catalog.insert(PathBuf::from("/photos/b.jpg"));

        let rows = vec![
            row("a.jpg", RowAngles::Opk(EulerOpk::default())),
            row("b.jpg", RowAngles::Opk(EulerOpk::default())),
        ];
        let options = ConversionOptions::default();
        let poses: Vec<_> = rows.iter().map(|r| pose_for(r, &options)).collect();

        let collection = FeatureBuilder::new(&config, &catalog).collection(&rows, &poses);
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].id, Some(Id::String("b.jpg".into())));
    }

    #[test]
    fn test_write_geojson() {
        let config = ExportConfig::default();
        let catalog = ImageCatalog::new();
        let rows = vec![row("a.jpg", RowAngles::Opk(EulerOpk::new(0.0, 0.0, 45.0)))];
        let poses = vec![pose_for(&rows[0], &ConversionOptions::default())];
        let collection = FeatureBuilder::new(&config, &catalog).collection(&rows, &poses);

        let path = std::env::temp_dir()
            .join(format!("camera_geojson_unit_{}.geojson", std::process::id()));
        write_geojson(&collection, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(parsed["features"][0]["geometry"]["type"], "Point");

        std::fs::remove_file(&path).ok();
    }
}
