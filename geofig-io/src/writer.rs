use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use geofig_core::figure::Figure;

/// 将图形还原为输入格式的 JSON 值，每条无向边在名称较小的端点下写出一次。
pub fn to_json_value(figure: &Figure) -> Value {
    let points: Vec<Value> = figure
        .points()
        .all()
        .map(|point| json!({ "name": point.name(), "x": point.x(), "y": point.y() }))
        .collect();

    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let edges: Vec<_> = figure.segments().all_edges().collect();
    for segment in &edges {
        adjacency
            .entry(segment.first().name())
            .or_default()
            .push(segment.second().name());
    }
    let segments: Vec<Value> = adjacency
        .into_iter()
        .map(|(from, to)| {
            let mut entry = Map::new();
            entry.insert(from.to_string(), json!(to));
            Value::Object(entry)
        })
        .collect();

    json!({
        "Figure": {
            "Description": figure.description(),
            "Points": points,
            "Segments": segments,
        }
    })
}
