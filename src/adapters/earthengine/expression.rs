//! Expression graph builders
//!
//! The REST API takes computations as a serialized expression graph. Each
//! builder returns a value node; [`expression`] wraps a root node into the
//! `{"result": "0", "values": {...}}` envelope.

use crate::domain::{Bounds, DateInterval};
use serde_json::{json, Map, Value};

/// Wrap a root value node into an expression envelope
pub fn expression(root: Value) -> Value {
    json!({ "result": "0", "values": { "0": root } })
}

/// A constant value node
pub fn constant(value: impl Into<Value>) -> Value {
    json!({ "constantValue": value.into() })
}

/// A function invocation node
pub fn invoke(function: &str, arguments: Vec<(&str, Value)>) -> Value {
    let arguments: Map<String, Value> = arguments
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    json!({
        "functionInvocationValue": {
            "functionName": function,
            "arguments": arguments,
        }
    })
}

/// Axis-aligned rectangle geometry in EPSG:4326
pub fn rectangle(bounds: &Bounds) -> Value {
    invoke(
        "GeometryConstructors.Rectangle",
        vec![
            (
                "coordinates",
                constant(json!([bounds.west, bounds.south, bounds.east, bounds.north])),
            ),
            ("geodesic", constant(false)),
        ],
    )
}

/// The first feature of `asset` whose `property` equals `index`
pub fn feature_by_index(asset: &str, property: &str, index: i64) -> Value {
    let table = invoke("Collection.loadTable", vec![("tableId", constant(asset))]);
    let filter = invoke(
        "Filter.equals",
        vec![("leftField", constant(property)), ("rightValue", constant(index))],
    );
    let filtered = invoke(
        "Collection.filter",
        vec![("collection", table), ("filter", filter)],
    );
    invoke(
        "Collection.limit",
        vec![("collection", filtered), ("limit", constant(1))],
    )
}

/// Median composite of `collection_id` over `[start, end)`
pub fn median_composite(collection_id: &str, interval: &DateInterval) -> Value {
    let collection = invoke("ImageCollection.load", vec![("id", constant(collection_id))]);
    let range = invoke(
        "DateRange",
        vec![
            ("start", constant(interval.start().to_string())),
            ("end", constant(interval.end().to_string())),
        ],
    );
    let filter = invoke(
        "Filter.dateRangeContains",
        vec![
            ("leftValue", range),
            ("rightField", constant("system:time_start")),
        ],
    );
    let filtered = invoke(
        "Collection.filter",
        vec![("collection", collection), ("filter", filter)],
    );
    invoke("reduce.median", vec![("collection", filtered)])
}

/// `image` clipped to `bounds` and resampled to `scale` meters
pub fn clip_and_scale(image: Value, bounds: &Bounds, scale_meters: u32) -> Value {
    let clipped = invoke(
        "Image.clip",
        vec![("input", image), ("geometry", rectangle(bounds))],
    );
    invoke(
        "Image.clipToBoundsAndScale",
        vec![
            ("input", clipped),
            ("geometry", rectangle(bounds)),
            ("scale", constant(scale_meters)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn function_name(node: &Value) -> &str {
        node["functionInvocationValue"]["functionName"]
            .as_str()
            .unwrap()
    }

    fn argument<'a>(node: &'a Value, name: &str) -> &'a Value {
        &node["functionInvocationValue"]["arguments"][name]
    }

    #[test]
    fn test_expression_envelope() {
        let expr = expression(constant(5));
        assert_eq!(expr["result"], "0");
        assert_eq!(expr["values"]["0"]["constantValue"], 5);
    }

    #[test]
    fn test_feature_by_index_graph() {
        let node = feature_by_index("projects/p/assets/parcels", "Index", 1823);

        assert_eq!(function_name(&node), "Collection.limit");
        assert_eq!(argument(&node, "limit")["constantValue"], 1);

        let filtered = argument(&node, "collection");
        assert_eq!(function_name(filtered), "Collection.filter");

        let filter = argument(filtered, "filter");
        assert_eq!(function_name(filter), "Filter.equals");
        assert_eq!(argument(filter, "leftField")["constantValue"], "Index");
        assert_eq!(argument(filter, "rightValue")["constantValue"], 1823);

        let table = argument(filtered, "collection");
        assert_eq!(argument(table, "tableId")["constantValue"], "projects/p/assets/parcels");
    }

    #[test]
    fn test_median_composite_uses_half_open_range() {
        let interval = DateInterval::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap();
        let node = median_composite("COPERNICUS/S2_SR_HARMONIZED", &interval);

        assert_eq!(function_name(&node), "reduce.median");
        let filtered = argument(&node, "collection");
        let range = argument(argument(filtered, "filter"), "leftValue");
        assert_eq!(argument(range, "start")["constantValue"], "2024-01-01");
        assert_eq!(argument(range, "end")["constantValue"], "2024-02-01");
    }

    #[test]
    fn test_clip_and_scale() {
        let bounds = Bounds::new(-54.3, -3.2, -54.1, -3.0);
        let node = clip_and_scale(constant("image"), &bounds, 5);

        assert_eq!(function_name(&node), "Image.clipToBoundsAndScale");
        assert_eq!(argument(&node, "scale")["constantValue"], 5);
        let rect = argument(&node, "geometry");
        assert_eq!(
            argument(rect, "coordinates")["constantValue"],
            json!([-54.3, -3.2, -54.1, -3.0])
        );
        assert_eq!(function_name(argument(&node, "input")), "Image.clip");
    }
}
