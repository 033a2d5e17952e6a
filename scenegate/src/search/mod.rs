//! Quick-search filter documents.
//!
//! Builds the provider's filter document for a point search: an `AndFilter`
//! combining an acquisition-date lower bound with a polygon containment test.
//!
//! ```text
//! {
//!   "item_types": ["Landsat8L1G"],
//!   "filter": {
//!     "type": "AndFilter",
//!     "config": [
//!       { "type": "DateRangeFilter", "field_name": "acquired", "config": { "gte": "..." } },
//!       { "type": "GeometryFilter", "field_name": "geometry", "config": { "type": "Polygon", "coordinates": [...] } }
//!     ]
//!   }
//! }
//! ```

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use crate::geometry::{buffer_point, Point, SearchPolygon, SEARCH_BUFFER_DEGREES};

/// Item type searched when none is configured.
pub const DEFAULT_ITEM_TYPE: &str = "Landsat8L1G";

/// Field holding a scene's acquisition timestamp.
const ACQUIRED_FIELD: &str = "acquired";

/// Field holding a scene's footprint.
const GEOMETRY_FIELD: &str = "geometry";

/// Complete request body for the quick-search endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCriteria {
    pub item_types: Vec<String>,
    pub filter: AndFilter,
}

impl SearchCriteria {
    /// Builds criteria for scenes acquired in the last `days_ago` days whose
    /// footprint intersects the buffered `point`.
    ///
    /// `days_ago` is not validated; zero or negative values move the lower
    /// bound to now or into the future.
    pub fn new(item_type: &str, point: Point, days_ago: i32) -> Self {
        Self::at(item_type, point, days_ago, Utc::now())
    }

    /// Same as [`SearchCriteria::new`], with the construction instant supplied.
    pub fn at(item_type: &str, point: Point, days_ago: i32, now: DateTime<Utc>) -> Self {
        Self {
            item_types: vec![item_type.to_string()],
            filter: AndFilter {
                config: vec![
                    Filter::DateRange(DateRangeFilter::since(ACQUIRED_FIELD, days_ago, now)),
                    Filter::Geometry(GeometryFilter::around(GEOMETRY_FIELD, point)),
                ],
            },
        }
    }
}

/// Conjunction of filters.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "AndFilter")]
pub struct AndFilter {
    pub config: Vec<Filter>,
}

/// A single condition inside an [`AndFilter`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Filter {
    #[serde(rename = "DateRangeFilter")]
    DateRange(DateRangeFilter),
    #[serde(rename = "GeometryFilter")]
    Geometry(GeometryFilter),
}

/// Lower bound on a timestamp field.
#[derive(Debug, Clone, Serialize)]
pub struct DateRangeFilter {
    pub field_name: String,
    pub config: DateRange,
}

impl DateRangeFilter {
    /// Matches values at or after `now - days_ago` days.
    ///
    /// Offsets beyond the representable date range clamp to the earliest or
    /// latest representable instant.
    pub fn since(field_name: &str, days_ago: i32, now: DateTime<Utc>) -> Self {
        let gte = TimeDelta::try_days(i64::from(days_ago))
            .and_then(|offset| now.checked_sub_signed(offset))
            .unwrap_or(if days_ago > 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            });

        Self {
            field_name: field_name.to_string(),
            config: DateRange { gte },
        }
    }
}

/// Inclusive lower bound of a [`DateRangeFilter`].
#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    #[serde(serialize_with = "serialize_instant")]
    pub gte: DateTime<Utc>,
}

fn serialize_instant<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Spatial containment condition.
#[derive(Debug, Clone, Serialize)]
pub struct GeometryFilter {
    pub field_name: String,
    pub config: PolygonGeometry,
}

impl GeometryFilter {
    /// Matches footprints intersecting a 1° buffer around `point`.
    pub fn around(field_name: &str, point: Point) -> Self {
        Self {
            field_name: field_name.to_string(),
            config: PolygonGeometry {
                coordinates: buffer_point(point, SEARCH_BUFFER_DEGREES),
            },
        }
    }
}

/// GeoJSON polygon geometry.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "Polygon")]
pub struct PolygonGeometry {
    pub coordinates: SearchPolygon,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn criteria_json(days_ago: i32) -> serde_json::Value {
        let point = Point::new(12.34, 45.56);
        let criteria = SearchCriteria::at(DEFAULT_ITEM_TYPE, point, days_ago, fixed_now());
        serde_json::to_value(&criteria).unwrap()
    }

    #[test]
    fn test_item_types() {
        let json = criteria_json(14);
        assert_eq!(json["item_types"], serde_json::json!(["Landsat8L1G"]));
    }

    #[test]
    fn test_and_filter_has_two_conditions() {
        let json = criteria_json(14);
        assert_eq!(json["filter"]["type"], "AndFilter");

        let config = json["filter"]["config"].as_array().unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config[0]["type"], "DateRangeFilter");
        assert_eq!(config[1]["type"], "GeometryFilter");
    }

    #[test]
    fn test_date_range_filter_shape() {
        let json = criteria_json(14);
        let date = &json["filter"]["config"][0];

        assert_eq!(date["field_name"], "acquired");
        assert_eq!(date["config"]["gte"], "2024-03-01T12:00:00.000Z");
    }

    #[test]
    fn test_geometry_filter_shape() {
        let json = criteria_json(14);
        let geometry = &json["filter"]["config"][1];

        assert_eq!(geometry["field_name"], "geometry");
        assert_eq!(geometry["config"]["type"], "Polygon");

        let rings = geometry["config"]["coordinates"].as_array().unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].as_array().unwrap().len(), 33);
    }

    #[test]
    fn test_zero_days_is_now() {
        let filter = DateRangeFilter::since("acquired", 0, fixed_now());
        assert_eq!(filter.config.gte, fixed_now());
    }

    #[test]
    fn test_negative_days_is_in_future() {
        let filter = DateRangeFilter::since("acquired", -3, fixed_now());
        assert!(filter.config.gte > fixed_now());
    }

    #[test]
    fn test_out_of_range_days_clamp() {
        let past = DateRangeFilter::since("acquired", i32::MAX, fixed_now());
        assert_eq!(past.config.gte, DateTime::<Utc>::MIN_UTC);

        let future = DateRangeFilter::since("acquired", i32::MIN, fixed_now());
        assert_eq!(future.config.gte, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_new_uses_wall_clock() {
        let before = Utc::now();
        let criteria = SearchCriteria::new(DEFAULT_ITEM_TYPE, Point::new(0.0, 0.0), 1);
        match &criteria.filter.config[0] {
            Filter::DateRange(f) => assert!(f.config.gte < before),
            other => panic!("Expected date range filter, got {:?}", other),
        }
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_recency_bound_is_not_after_construction(days_ago in 0i32..36_500) {
                let now = Utc::now();
                let filter = DateRangeFilter::since("acquired", days_ago, now);
                if days_ago == 0 {
                    prop_assert_eq!(filter.config.gte, now);
                } else {
                    prop_assert!(filter.config.gte < now);
                }
            }

            #[test]
            fn test_recency_bound_is_exact(days_ago in -1000i32..36_500) {
                let now = fixed_now();
                let filter = DateRangeFilter::since("acquired", days_ago, now);
                prop_assert_eq!((now - filter.config.gte).num_days(), i64::from(days_ago));
            }
        }
    }
}
