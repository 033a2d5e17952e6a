//! Scene metadata returned to callers.
//!
//! These types decode the provider's GeoJSON features and re-expose a
//! trimmed, stable shape. Unknown upstream fields are ignored so that schema
//! additions on the provider side never break decoding.

use serde::{Deserialize, Serialize};

/// GeoJSON type tag of a single scene.
const FEATURE: &str = "Feature";

/// GeoJSON type tag of a scene collection.
const FEATURE_COLLECTION: &str = "FeatureCollection";

fn feature() -> String {
    FEATURE.to_string()
}

fn feature_collection() -> String {
    FEATURE_COLLECTION.to_string()
}

/// One satellite capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub geometry: SceneGeometry,
    pub properties: SceneProperties,
    /// Always `"Feature"`; the upstream value is not trusted.
    #[serde(rename = "type", default = "feature", skip_deserializing)]
    pub kind: String,
}

/// Scene footprint.
///
/// Coordinates are passed through untouched, so any GeoJSON geometry type
/// the provider returns is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: serde_json::Value,
}

/// Capture metadata.
///
/// The serde shape is one-way: deserialization reads the provider's field
/// names and serialization writes the caller names, so serialized output
/// does not deserialize back into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UpstreamProperties")]
pub struct SceneProperties {
    /// Acquisition timestamp as reported by the provider.
    pub acquired_on: String,
    /// Cloud cover fraction (0.0 to 1.0).
    pub cloud_cover: f64,
    /// Ground resolution in meters per pixel, kept as the provider sent it.
    pub resolution: serde_json::Number,
    /// WRS-2 path, zero-padded to three digits.
    pub wrs_path: String,
    /// WRS-2 row, zero-padded to three digits.
    pub wrs_row: String,
}

/// Provider field names for [`SceneProperties`].
#[derive(Deserialize)]
struct UpstreamProperties {
    acquired: String,
    cloud_cover: f64,
    pixel_resolution: serde_json::Number,
    wrs_path: u32,
    wrs_row: u32,
}

impl From<UpstreamProperties> for SceneProperties {
    fn from(raw: UpstreamProperties) -> Self {
        Self {
            acquired_on: raw.acquired,
            cloud_cover: raw.cloud_cover,
            resolution: raw.pixel_resolution,
            wrs_path: pad_grid_reference(raw.wrs_path),
            wrs_row: pad_grid_reference(raw.wrs_row),
        }
    }
}

/// Formats a path or row number as at least three digits.
fn pad_grid_reference(value: u32) -> String {
    format!("{:03}", value)
}

/// Scenes matching a search, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCollection {
    pub features: Vec<Scene>,
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type", default = "feature_collection", skip_deserializing)]
    pub kind: String,
}

impl SceneCollection {
    /// Number of scenes in the collection.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the search matched no scenes.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upstream_feature(id: &str, path: u32, row: u32) -> serde_json::Value {
        json!({
            "_links": { "_self": "https://api.planet.com/..." },
            "_permissions": ["assets.visual:download"],
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[11.5, 45.0], [13.1, 45.0], [13.1, 46.6], [11.5, 45.0]]]
            },
            "id": id,
            "properties": {
                "acquired": "2024-03-10T09:58:12.345Z",
                "anomalous_pixels": 0,
                "cloud_cover": 0.12,
                "pixel_resolution": 30,
                "wrs_path": path,
                "wrs_row": row,
                "sun_elevation": 42.1
            },
            "type": "Feature"
        })
    }

    #[test]
    fn test_scene_decodes_known_fields() {
        let scene: Scene = serde_json::from_value(upstream_feature("abc", 192, 28)).unwrap();

        assert_eq!(scene.id, "abc");
        assert_eq!(scene.kind, "Feature");
        assert_eq!(scene.geometry.kind, "Polygon");
        assert_eq!(scene.properties.acquired_on, "2024-03-10T09:58:12.345Z");
        assert_eq!(scene.properties.cloud_cover, 0.12);
        assert_eq!(scene.properties.resolution, serde_json::Number::from(30));
    }

    #[test]
    fn test_path_row_zero_padding() {
        let scene: Scene = serde_json::from_value(upstream_feature("abc", 7, 123)).unwrap();

        assert_eq!(scene.properties.wrs_path, "007");
        assert_eq!(scene.properties.wrs_row, "123");
    }

    #[test]
    fn test_padding_keeps_wide_values() {
        assert_eq!(pad_grid_reference(0), "000");
        assert_eq!(pad_grid_reference(42), "042");
        assert_eq!(pad_grid_reference(1234), "1234");
    }

    #[test]
    fn test_geometry_coordinates_pass_through() {
        let raw = upstream_feature("abc", 1, 1);
        let scene: Scene = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(scene.geometry.coordinates, raw["geometry"]["coordinates"]);
    }

    #[test]
    fn test_scene_serializes_caller_shape() {
        let scene: Scene = serde_json::from_value(upstream_feature("abc", 7, 45)).unwrap();
        let json = serde_json::to_value(&scene).unwrap();

        assert_eq!(json["type"], "Feature");
        assert_eq!(json["properties"]["acquired_on"], "2024-03-10T09:58:12.345Z");
        assert_eq!(json["properties"]["resolution"], json!(30));
        assert_eq!(json["properties"]["wrs_path"], "007");
        assert_eq!(json["properties"]["wrs_row"], "045");
        assert!(json.get("_links").is_none());
        assert!(json["properties"].get("sun_elevation").is_none());
    }

    #[test]
    fn test_fractional_resolution_passes_through() {
        let mut raw = upstream_feature("abc", 1, 1);
        raw["properties"]["pixel_resolution"] = json!(3.7);
        let scene: Scene = serde_json::from_value(raw).unwrap();

        let json = serde_json::to_value(&scene).unwrap();
        assert_eq!(json["properties"]["resolution"], json!(3.7));
        assert!(json["properties"]["resolution"].is_f64());
    }

    #[test]
    fn test_integer_resolution_stays_integer() {
        let scene: Scene = serde_json::from_value(upstream_feature("abc", 1, 1)).unwrap();

        let json = serde_json::to_value(&scene).unwrap();
        assert!(json["properties"]["resolution"].is_u64());
        assert_eq!(json["properties"]["resolution"].to_string(), "30");
    }

    #[test]
    fn test_caller_shape_does_not_decode() {
        let scene: Scene = serde_json::from_value(upstream_feature("abc", 7, 45)).unwrap();
        let json = serde_json::to_value(&scene).unwrap();

        assert!(serde_json::from_value::<Scene>(json).is_err());
    }

    #[test]
    fn test_scene_missing_id_is_rejected() {
        let mut raw = upstream_feature("abc", 1, 1);
        raw.as_object_mut().unwrap().remove("id");

        assert!(serde_json::from_value::<Scene>(raw).is_err());
    }

    #[test]
    fn test_scene_missing_property_is_rejected() {
        let mut raw = upstream_feature("abc", 1, 1);
        raw["properties"].as_object_mut().unwrap().remove("wrs_row");

        assert!(serde_json::from_value::<Scene>(raw).is_err());
    }

    #[test]
    fn test_collection_preserves_order() {
        let raw = json!({
            "type": "FeatureCollection",
            "_links": { "_next": "https://api.planet.com/..." },
            "features": [
                upstream_feature("second", 1, 1),
                upstream_feature("first", 2, 2),
            ]
        });
        let collection: SceneCollection = serde_json::from_value(raw).unwrap();

        let ids: Vec<&str> = collection.features.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
        assert_eq!(collection.kind, "FeatureCollection");
    }

    #[test]
    fn test_collection_features_must_be_list() {
        let raw = json!({ "type": "FeatureCollection", "features": {} });
        assert!(serde_json::from_value::<SceneCollection>(raw).is_err());
    }

    #[test]
    fn test_empty_collection_serializes_type() {
        let collection: SceneCollection = serde_json::from_value(json!({ "features": [] })).unwrap();
        assert!(collection.is_empty());

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json, json!({ "features": [], "type": "FeatureCollection" }));
    }
}
