//! Persistence: the JSON layout format and PNG export.
//!
//! A layout file is a single JSON object `{config, zones, exportedAt}` with
//! camelCase keys throughout. `exportedAt` is written on save and ignored on
//! load, so a file can round-trip through hand edits without the timestamp
//! mattering.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use image::codecs::png::PngEncoder;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::sheet::{Document, SheetConfig, TrimZone};

/// Error type for layout/raster file operations.
#[derive(Debug)]
pub enum TrimError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
}

impl std::fmt::Display for TrimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrimError::Io(e) => write!(f, "I/O error: {}", e),
            TrimError::Serialize(e) => write!(f, "Serialization error: {}", e),
            TrimError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
        }
    }
}

impl std::error::Error for TrimError {}

impl From<std::io::Error> for TrimError {
    fn from(e: std::io::Error) -> Self {
        TrimError::Io(e)
    }
}

impl From<serde_json::Error> for TrimError {
    fn from(e: serde_json::Error) -> Self {
        TrimError::Serialize(e.to_string())
    }
}

impl From<image::ImageError> for TrimError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => TrimError::Io(io),
            other => TrimError::Serialize(other.to_string()),
        }
    }
}

/// On-disk layout file shape.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetFile {
    config: SheetConfig,
    zones: Vec<TrimZone>,
    exported_at: String,
}

/// Serialize a document to the pretty-printed layout JSON, stamped with the
/// current UTC time.
pub fn to_json_string(doc: &Document) -> Result<String, TrimError> {
    let file = SheetFile {
        config: doc.config.clone(),
        zones: doc.zones.clone(),
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Write the layout JSON to `path`.
pub fn save_json(doc: &Document, path: &Path) -> Result<(), TrimError> {
    let json = to_json_string(doc)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Parse a layout JSON string back into a document.
///
/// Both `config` and `zones` must be present as the right JSON shapes; a file
/// missing either is rejected outright rather than patched with defaults, so
/// a truncated or foreign file never silently becomes an empty sheet. Every
/// strip's subdivision color list is re-synced after load to absorb
/// hand-edited files where the two fields drifted apart.
pub fn from_json_str(json: &str) -> Result<Document, TrimError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| TrimError::InvalidFormat(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| TrimError::InvalidFormat("Top level is not a JSON object".into()))?;
    if !obj.contains_key("config") {
        return Err(TrimError::InvalidFormat("Missing 'config' key".into()));
    }
    if !obj.get("zones").map(|z| z.is_array()).unwrap_or(false) {
        return Err(TrimError::InvalidFormat("Missing or non-array 'zones' key".into()));
    }

    #[derive(Deserialize)]
    struct ImportFile {
        config: SheetConfig,
        zones: Vec<TrimZone>,
    }
    let parsed: ImportFile =
        serde_json::from_value(value).map_err(|e| TrimError::InvalidFormat(e.to_string()))?;

    let mut doc = Document { config: parsed.config, zones: parsed.zones };
    for zone in &mut doc.zones {
        for strip in &mut zone.strips {
            strip.sync_subdivision_colors();
        }
    }
    Ok(doc)
}

/// Load a layout file from disk.
pub fn load_json(path: &Path) -> Result<Document, TrimError> {
    let json = std::fs::read_to_string(path)?;
    from_json_str(&json)
}

/// PNG-encode a rendered buffer into memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, TrimError> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(Cursor::new(&mut bytes));
    #[allow(deprecated)]
    encoder.encode(image.as_raw(), image.width(), image.height(), image::ColorType::Rgba8)?;
    Ok(bytes)
}

/// Write a rendered buffer to `path` as PNG.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), TrimError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new(writer);
    #[allow(deprecated)]
    encoder.encode(image.as_raw(), image.width(), image.height(), image::ColorType::Rgba8)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trips_the_document() {
        let doc = Document::default();
        let json = to_json_string(&doc).unwrap();
        let back = from_json_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn exported_at_is_stamped_rfc3339() {
        let doc = Document::default();
        let json = to_json_string(&doc).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let stamp = value["exportedAt"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "bad stamp {stamp}");
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn wire_keys_are_camel_case() {
        let doc = Document::default();
        let json = to_json_string(&doc).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["config"]["renderStyle"].is_string());
        assert!(value["config"]["texelDensityTarget"].is_number());
        let strip = &value["zones"][0]["strips"][0];
        assert!(strip["baseColor"].is_string());
        assert!(strip["subdivisionColors"].is_array());
    }

    #[test]
    fn missing_config_key_is_rejected() {
        let err = from_json_str(r#"{"zones": []}"#).unwrap_err();
        assert!(matches!(err, TrimError::InvalidFormat(_)));
    }

    #[test]
    fn missing_zones_key_is_rejected() {
        let json = serde_json::json!({"config": SheetConfig::default()}).to_string();
        let err = from_json_str(&json).unwrap_err();
        assert!(matches!(err, TrimError::InvalidFormat(_)));
    }

    #[test]
    fn non_json_input_is_rejected() {
        assert!(matches!(from_json_str("not json"), Err(TrimError::InvalidFormat(_))));
        assert!(matches!(from_json_str("[1,2,3]"), Err(TrimError::InvalidFormat(_))));
    }

    #[test]
    fn load_resyncs_drifted_subdivision_colors() {
        let mut doc = Document::default();
        doc.zones[0].strips[0].subdivisions = 4;
        // Serialize with the invariant deliberately broken.
        let mut value = serde_json::to_value(SheetFileProbe(&doc)).unwrap();
        value["zones"][0]["strips"][0]["subdivisionColors"] = serde_json::json!(["#112233"]);
        let back = from_json_str(&value.to_string()).unwrap();
        let strip = &back.zones[0].strips[0];
        assert_eq!(strip.subdivision_colors.len(), 4);
        assert_eq!(strip.subdivision_color(0), "#112233");
    }

    #[test]
    fn encode_png_produces_a_png_header() {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn save_and_load_via_disk() {
        let doc = Document::default();
        let dir = std::env::temp_dir().join(format!("trimforge-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("layout.json");
        save_json(&doc, &path).unwrap();
        let back = load_json(&path).unwrap();
        assert_eq!(back, doc);
        std::fs::remove_dir_all(&dir).ok();
    }

    // Serializer that mirrors the on-disk shape for test fixture building.
    struct SheetFileProbe<'a>(&'a Document);

    impl serde::Serialize for SheetFileProbe<'_> {
        fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            use serde::ser::SerializeMap;
            let mut map = s.serialize_map(Some(3))?;
            map.serialize_entry("config", &self.0.config)?;
            map.serialize_entry("zones", &self.0.zones)?;
            map.serialize_entry("exportedAt", "2026-01-01T00:00:00.000Z")?;
            map.end()
        }
    }
}
