//! Raw infrastructure tables and their indexed form

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::tower::Tower;
use crate::{EdgeType, Error, NodeId};

pub type LineId = usize;
pub type PolygonId = usize;

/// One contiguous piece of infrastructure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLine {
    /// Ordered node ids, consecutive ids are connected
    pub nodes: Vec<NodeId>,
    /// Infrastructure category of the line, if known
    pub kind: Option<EdgeType>,
}

impl From<Vec<NodeId>> for RawLine {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self { nodes, kind: None }
    }
}

/// Input tables as delivered by a data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTopology {
    /// Infrastructure to follow
    pub lines: Vec<RawLine>,
    /// Boundaries of restricted structures to avoid
    pub polygons: Vec<Vec<NodeId>>,
    /// `[lat, lon]` of every referenced node
    pub coordinates: HashMap<NodeId, [f64; 2]>,
    /// Explicit node to category table, takes precedence over line kinds
    pub types: Option<HashMap<NodeId, EdgeType>>,
}

impl RawTopology {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_node(mut self, id: NodeId, lat: f64, lon: f64) -> Self {
        self.coordinates.insert(id, [lat, lon]);
        self
    }

    #[must_use]
    pub fn with_line(mut self, nodes: Vec<NodeId>) -> Self {
        self.lines.push(RawLine::from(nodes));
        self
    }

    #[must_use]
    pub fn with_typed_line(mut self, nodes: Vec<NodeId>, kind: EdgeType) -> Self {
        self.lines.push(RawLine {
            nodes,
            kind: Some(kind),
        });
        self
    }

    #[must_use]
    pub fn with_polygon(mut self, nodes: Vec<NodeId>) -> Self {
        self.polygons.push(nodes);
        self
    }
}

/// Indexed, validated infrastructure tables.
///
/// Immutable once built and shared read-only by every extraction stage.
#[derive(Debug, Clone)]
pub struct Topology {
    lines: Vec<Vec<NodeId>>,
    polygons: Vec<Vec<NodeId>>,
    /// Line nodes in order of first appearance
    towers: Vec<Tower>,
    /// Polygon boundary nodes in order of first appearance
    boundary: Vec<Tower>,
    nodes: HashMap<NodeId, Tower>,
    node_lines: HashMap<NodeId, Vec<LineId>>,
    node_polygons: HashMap<NodeId, Vec<PolygonId>>,
    types: Option<HashMap<NodeId, EdgeType>>,
}

impl Topology {
    /// Validates the raw tables and builds the lookup indices.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced node has no coordinates or if
    /// coordinates are out of range, or if a node id is negative.
    pub fn from_raw(raw: RawTopology) -> Result<Self, Error> {
        let RawTopology {
            lines: raw_lines,
            polygons,
            coordinates,
            types,
        } = raw;

        let mut nodes: HashMap<NodeId, Tower> = HashMap::new();
        let mut resolve = |id: NodeId| -> Result<Tower, Error> {
            if let Some(tower) = nodes.get(&id) {
                return Ok(*tower);
            }
            if id < 0 {
                return Err(Error::InvalidData(format!(
                    "Negative node id {id} is reserved for synthetic nodes"
                )));
            }
            let [lat, lon] = *coordinates.get(&id).ok_or(Error::MissingCoordinates(id))?;
            if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
                return Err(Error::InvalidData(format!(
                    "Node {id} has invalid coordinates ({lat}, {lon})"
                )));
            }
            let tower = Tower::new(id, lat, lon);
            nodes.insert(id, tower);
            Ok(tower)
        };

        let mut towers = Vec::new();
        let mut seen = HashSet::new();
        for line in &raw_lines {
            for &id in &line.nodes {
                let tower = resolve(id)?;
                if seen.insert(id) {
                    towers.push(tower);
                }
            }
        }

        let mut boundary = Vec::new();
        seen.clear();
        for polygon in &polygons {
            for &id in polygon {
                let tower = resolve(id)?;
                if seen.insert(id) {
                    boundary.push(tower);
                }
            }
        }

        let mut node_lines: HashMap<NodeId, Vec<LineId>> = HashMap::new();
        for (line_id, line) in raw_lines.iter().enumerate() {
            for &id in line.nodes.iter().unique() {
                node_lines.entry(id).or_default().push(line_id);
            }
        }

        let mut node_polygons: HashMap<NodeId, Vec<PolygonId>> = HashMap::new();
        for (polygon_id, polygon) in polygons.iter().enumerate() {
            for &id in polygon.iter().unique() {
                node_polygons.entry(id).or_default().push(polygon_id);
            }
        }

        let types = types.or_else(|| derive_line_types(&raw_lines));
        let lines = raw_lines.into_iter().map(|line| line.nodes).collect();

        let topology = Self {
            lines,
            polygons,
            towers,
            boundary,
            nodes,
            node_lines,
            node_polygons,
            types,
        };

        for polygon_id in topology.degenerate_polygons() {
            warn!(
                "Restricted polygon {polygon_id} has fewer than 3 nodes and will be ignored: {:?}",
                topology.polygons[polygon_id]
            );
        }
        debug!(
            "Indexed {} lines with {} towers and {} polygons with {} boundary nodes",
            topology.lines.len(),
            topology.towers.len(),
            topology.polygons.len(),
            topology.boundary.len()
        );

        Ok(topology)
    }

    pub fn lines(&self) -> &[Vec<NodeId>] {
        &self.lines
    }

    pub fn line(&self, line_id: LineId) -> &[NodeId] {
        &self.lines[line_id]
    }

    pub fn polygons(&self) -> &[Vec<NodeId>] {
        &self.polygons
    }

    pub fn polygon(&self, polygon_id: PolygonId) -> &[NodeId] {
        &self.polygons[polygon_id]
    }

    /// Nodes of the infrastructure lines
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    /// Nodes of restricted polygon boundaries
    pub fn boundary_nodes(&self) -> &[Tower] {
        &self.boundary
    }

    /// Any real node referenced by a line or polygon
    pub fn node(&self, id: NodeId) -> Option<&Tower> {
        self.nodes.get(&id)
    }

    pub fn lines_of(&self, id: NodeId) -> &[LineId] {
        self.node_lines.get(&id).map_or(&[], Vec::as_slice)
    }

    pub fn polygons_of(&self, id: NodeId) -> &[PolygonId] {
        self.node_polygons.get(&id).map_or(&[], Vec::as_slice)
    }

    pub fn types(&self) -> Option<&HashMap<NodeId, EdgeType>> {
        self.types.as_ref()
    }

    /// Polygons with fewer than 3 nodes
    pub fn degenerate_polygons(&self) -> Vec<PolygonId> {
        self.polygons
            .iter()
            .enumerate()
            .filter(|(_, polygon)| polygon.len() < 3)
            .map(|(polygon_id, _)| polygon_id)
            .collect()
    }
}

/// Node categories from typed lines, later lines overwrite earlier ones.
fn derive_line_types(lines: &[RawLine]) -> Option<HashMap<NodeId, EdgeType>> {
    if lines.iter().all(|line| line.kind.is_none()) {
        return None;
    }

    let mut types = HashMap::new();
    for line in lines {
        if let Some(kind) = line.kind {
            for &id in &line.nodes {
                types.insert(id, kind);
            }
        }
    }
    Some(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawTopology {
        RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.0, 5.01)
            .with_node(3, 52.0, 5.02)
            .with_node(10, 52.1, 5.0)
            .with_node(11, 52.1, 5.01)
            .with_line(vec![1, 2, 3])
            .with_line(vec![3, 2])
            .with_polygon(vec![10, 11])
    }

    #[test]
    fn test_indices() {
        let topology = Topology::from_raw(sample()).unwrap();

        let tower_ids: Vec<_> = topology.towers().iter().map(|t| t.id).collect();
        assert_eq!(tower_ids, vec![1, 2, 3]);
        let boundary_ids: Vec<_> = topology.boundary_nodes().iter().map(|t| t.id).collect();
        assert_eq!(boundary_ids, vec![10, 11]);

        assert_eq!(topology.lines_of(2), &[0, 1]);
        assert_eq!(topology.lines_of(1), &[0]);
        assert!(topology.lines_of(10).is_empty());
        assert_eq!(topology.polygons_of(11), &[0]);
        assert_eq!(topology.degenerate_polygons(), vec![0]);
        assert!(topology.types().is_none());
    }

    #[test]
    fn test_missing_coordinates() {
        let raw = sample().with_line(vec![3, 42]);

        let err = Topology::from_raw(raw).unwrap_err();
        assert!(matches!(err, Error::MissingCoordinates(42)));
    }

    #[test]
    fn test_negative_ids_rejected() {
        let raw = sample().with_node(-5, 52.0, 5.0).with_line(vec![1, -5]);

        assert!(matches!(
            Topology::from_raw(raw),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_invalid_latitude_rejected() {
        let raw = sample().with_node(4, 95.0, 5.0).with_line(vec![3, 4]);

        assert!(matches!(
            Topology::from_raw(raw),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_line_types() {
        let raw = RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.0, 5.01)
            .with_node(3, 52.0, 5.02)
            .with_typed_line(vec![1, 2], 1)
            .with_typed_line(vec![2, 3], 2);

        let topology = Topology::from_raw(raw).unwrap();
        let types = topology.types().unwrap();
        assert_eq!(types[&1], 1);
        assert_eq!(types[&2], 2);
        assert_eq!(types[&3], 2);
    }

    #[test]
    fn test_explicit_types_take_precedence() {
        let mut raw = RawTopology::new()
            .with_node(1, 52.0, 5.0)
            .with_node(2, 52.0, 5.01)
            .with_typed_line(vec![1, 2], 1);
        raw.types = Some(HashMap::from([(1, 7), (2, 7)]));

        let topology = Topology::from_raw(raw).unwrap();
        assert_eq!(topology.types().unwrap()[&1], 7);
    }

    #[test]
    fn test_json_input() {
        let json = r#"{
            "lines": [{"nodes": [1, 2]}],
            "polygons": [[3, 4, 5]],
            "coordinates": {
                "1": [52.0, 5.0], "2": [52.0, 5.01],
                "3": [52.1, 5.0], "4": [52.1, 5.01], "5": [52.11, 5.0]
            }
        }"#;

        let raw: RawTopology = serde_json::from_str(json).unwrap();
        let topology = Topology::from_raw(raw).unwrap();
        assert_eq!(topology.towers().len(), 2);
        assert_eq!(topology.boundary_nodes().len(), 3);
        assert!(topology.degenerate_polygons().is_empty());
    }
}
