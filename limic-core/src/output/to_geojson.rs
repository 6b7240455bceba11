use geo::{LineString, Point, line_string};
use geojson::{Feature, FeatureCollection, Geometry, GeometryValue};
use hashbrown::HashMap;

use super::{ExtractedGraph, GraphEdge, GraphNode};
use crate::{AIR_EDGE_TYPE, Error, NodeId};

impl ExtractedGraph {
    /// Converts the graph to a `GeoJSON` `FeatureCollection`.
    ///
    /// Nodes become points, edges become two-point line strings.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let by_id: HashMap<NodeId, &GraphNode> =
            self.nodes.iter().map(|node| (node.id, node)).collect();

        let mut features = Vec::with_capacity(self.nodes.len() + self.edges.len());
        features.extend(self.nodes.iter().map(node_feature));
        for edge in &self.edges {
            let (Some(source), Some(target)) = (by_id.get(&edge.source), by_id.get(&edge.target))
            else {
                return Err(Error::GeoJsonError(format!(
                    "Edge ({}, {}) references an unknown node",
                    edge.source, edge.target
                )));
            };
            features.push(edge_feature(edge, source, target));
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn node_feature(node: &GraphNode) -> Feature {
    let geometry = Geometry::new(GeometryValue::from(&Point::new(node.lon, node.lat)));

    let mut feature = Feature::from(geometry);
    feature.set_property("feature_type", "node");
    feature.set_property("id", node.id);
    feature.set_property("synthetic", node.id < 0);
    feature
}

fn edge_feature(edge: &GraphEdge, source: &GraphNode, target: &GraphNode) -> Feature {
    let line: LineString<f64> = line_string![
        (x: source.lon, y: source.lat),
        (x: target.lon, y: target.lat),
    ];
    let geometry = Geometry::new(GeometryValue::from(&line));

    let mut feature = Feature::from(geometry);
    feature.set_property("feature_type", "edge");
    feature.set_property("source", edge.source);
    feature.set_property("target", edge.target);
    feature.set_property("weight", edge.weight);
    feature.set_property("type", edge.edge_type);
    feature.set_property("air", edge.edge_type == AIR_EDGE_TYPE);
    feature
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ExtractedGraph {
        ExtractedGraph {
            nodes: vec![
                GraphNode {
                    id: 1,
                    lat: 52.0,
                    lon: 5.0,
                },
                GraphNode {
                    id: -1,
                    lat: 52.01,
                    lon: 5.01,
                },
            ],
            edges: vec![GraphEdge {
                source: 1,
                target: -1,
                weight: 1320.5,
                edge_type: 2,
            }],
        }
    }

    #[test]
    fn test_feature_collection() {
        let collection = sample().to_geojson().unwrap();
        assert_eq!(collection.features.len(), 3);

        let crossing = &collection.features[1];
        assert_eq!(crossing.property("synthetic"), Some(&json!(true)));

        let edge = &collection.features[2];
        assert_eq!(edge.property("type"), Some(&json!(2)));
        assert_eq!(edge.property("air"), Some(&json!(false)));
        assert_eq!(edge.property("weight"), Some(&json!(1320.5)));

        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(
            value["features"][2]["geometry"]["coordinates"],
            json!([[5.0, 52.0], [5.01, 52.01]])
        );
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
        assert_eq!(value["features"][0]["type"], "Feature");
    }

    #[test]
    fn test_dangling_edge() {
        let mut graph = sample();
        graph.edges[0].target = 99;

        assert!(matches!(graph.to_geojson(), Err(Error::GeoJsonError(_))));
    }

    #[test]
    fn test_geojson_string() {
        let text = sample().to_geojson_string().unwrap();
        assert!(text.contains("\"FeatureCollection\""));
    }
}
