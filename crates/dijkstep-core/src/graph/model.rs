use std::collections::HashMap;

use crate::error::{DijkstepError, Result};
use crate::graph::types::{Edge, EdgeId, HalfEdge, Vertex, VertexIndex};

/// Weighted graph with a fixed shape once handed to the engine.
///
/// Vertices keep their insertion order, which is also the tie-break order the
/// engine uses when two frontier vertices share a distance.
#[derive(Debug, Clone)]
pub struct Graph {
    directed: bool,
    vertices: Vec<Vertex>,
    index: HashMap<String, VertexIndex>,
    edges: Vec<Edge>,
    /// Sum of all weights; bounds every shortest path
    total_weight: f64,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty graph whose `add_edge` adds directed edges
    pub fn new() -> Self {
        Self {
            directed: true,
            vertices: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            total_weight: 0.0,
        }
    }

    /// Create an empty graph whose `add_edge` adds edges traversable both ways
    pub fn undirected() -> Self {
        Self {
            directed: false,
            ..Self::new()
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Add a vertex, failing if the id is already taken
    pub fn add_vertex(&mut self, id: impl Into<String>) -> Result<VertexIndex> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(DijkstepError::duplicate_vertex(id));
        }

        let position = self.vertices.len();
        self.index.insert(id.clone(), position);
        self.vertices.push(Vertex {
            id,
            adjacency: Vec::new(),
        });
        Ok(position)
    }

    /// Add an edge using the graph's default direction
    pub fn add_edge(&mut self, from: &str, to: &str, weight: f64) -> Result<EdgeId> {
        self.insert_edge(from, to, weight, self.directed)
    }

    /// Add an edge traversable only from `from` to `to`
    pub fn add_directed_edge(&mut self, from: &str, to: &str, weight: f64) -> Result<EdgeId> {
        self.insert_edge(from, to, weight, true)
    }

    /// Add an edge traversable in both directions under a single id
    pub fn add_undirected_edge(&mut self, from: &str, to: &str, weight: f64) -> Result<EdgeId> {
        self.insert_edge(from, to, weight, false)
    }

    fn insert_edge(&mut self, from: &str, to: &str, weight: f64, directed: bool) -> Result<EdgeId> {
        // Validate everything before touching adjacency lists
        let source = self.require(from)?;
        let target = self.require(to)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(DijkstepError::InvalidWeight {
                from: from.to_string(),
                to: to.to_string(),
                weight,
            });
        }
        let total_weight = self.total_weight + weight;
        if !total_weight.is_finite() {
            return Err(DijkstepError::WeightOverflow {
                from: from.to_string(),
                to: to.to_string(),
                weight,
            });
        }

        let id = EdgeId::new(self.edges.len());
        self.total_weight = total_weight;
        self.edges.push(Edge {
            id,
            source,
            target,
            weight,
            directed,
        });
        self.vertices[source].adjacency.push(id);
        if !directed && source != target {
            self.vertices[target].adjacency.push(id);
        }

        tracing::trace!(edge = %id, from, to, weight, directed, "add_edge");
        Ok(id)
    }

    /// Resolve a vertex id to its index, failing with `UnknownVertex`
    pub fn require(&self, id: &str) -> Result<VertexIndex> {
        self.vertex_index(id)
            .ok_or_else(|| DijkstepError::unknown_vertex(id))
    }

    pub fn vertex_index(&self, id: &str) -> Option<VertexIndex> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn vertex(&self, index: VertexIndex) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    /// Id of the vertex at `index`.
    ///
    /// Panics if `index` did not come from this graph.
    pub fn vertex_id(&self, index: VertexIndex) -> &str {
        &self.vertices[index].id
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(|v| v.id.as_str())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of the named vertex, in insertion order
    pub fn edges_of(&self, id: &str) -> Result<Vec<HalfEdge>> {
        let index = self.require(id)?;
        Ok(self.out_edges(index).collect())
    }

    pub(crate) fn out_edges(&self, index: VertexIndex) -> impl Iterator<Item = HalfEdge> + '_ {
        self.vertices[index].adjacency.iter().map(move |&id| {
            let edge = &self.edges[id.index()];
            HalfEdge {
                id,
                target: edge.far_end(index),
                weight: edge.weight,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        let mut graph = Graph::undirected();
        for id in ["A", "B", "C"] {
            graph.add_vertex(id).unwrap();
        }
        graph.add_edge("A", "B", 1.0).unwrap();
        graph.add_edge("B", "C", 2.0).unwrap();
        graph.add_edge("A", "C", 5.0).unwrap();
        graph
    }

    #[test]
    fn test_add_vertex_rejects_duplicates() {
        let mut graph = Graph::new();
        graph.add_vertex("A").unwrap();
        let err = graph.add_vertex("A").unwrap_err();
        assert!(matches!(err, DijkstepError::DuplicateVertex { ref id } if id == "A"));
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn test_add_edge_unknown_endpoint() {
        let mut graph = Graph::new();
        graph.add_vertex("A").unwrap();
        let err = graph.add_edge("A", "Z", 1.0).unwrap_err();
        assert!(matches!(err, DijkstepError::UnknownVertex { ref id } if id == "Z"));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.vertex(0).unwrap().out_degree(), 0);
    }

    #[test]
    fn test_add_edge_rejects_invalid_weights() {
        let mut graph = Graph::new();
        graph.add_vertex("A").unwrap();
        graph.add_vertex("B").unwrap();
        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let err = graph.add_edge("A", "B", weight).unwrap_err();
            assert!(matches!(err, DijkstepError::InvalidWeight { .. }));
        }
        assert_eq!(graph.edge_count(), 0);
        graph.add_edge("A", "B", 0.0).unwrap();
    }

    #[test]
    fn test_add_edge_rejects_overflowing_total() {
        let mut graph = Graph::new();
        for id in ["A", "B", "C"] {
            graph.add_vertex(id).unwrap();
        }
        graph.add_edge("A", "B", 1e308).unwrap();
        let err = graph.add_edge("B", "C", 1e308).unwrap_err();
        assert!(matches!(err, DijkstepError::WeightOverflow { .. }));
        assert!(err.is_configuration());
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges_of("B").unwrap().is_empty());

        graph.add_edge("B", "C", 1e307).unwrap();
    }

    #[test]
    fn test_undirected_edge_shares_id_both_ways() {
        let graph = triangle();
        let from_a = graph.edges_of("A").unwrap();
        let from_b = graph.edges_of("B").unwrap();
        assert_eq!(from_a.len(), 2);
        assert_eq!(from_b.len(), 2);
        assert_eq!(from_a[0].id, from_b[0].id);
        assert_eq!(graph.vertex_id(from_a[0].target), "B");
        assert_eq!(graph.vertex_id(from_b[0].target), "A");
    }

    #[test]
    fn test_directed_edge_is_one_way() {
        let mut graph = Graph::new();
        graph.add_vertex("A").unwrap();
        graph.add_vertex("B").unwrap();
        graph.add_edge("A", "B", 3.0).unwrap();
        assert_eq!(graph.edges_of("A").unwrap().len(), 1);
        assert!(graph.edges_of("B").unwrap().is_empty());
        assert!(graph.edge(EdgeId::new(0)).unwrap().is_directed());
    }

    #[test]
    fn test_mixed_direction_edges() {
        let mut graph = Graph::new();
        graph.add_vertex("A").unwrap();
        graph.add_vertex("B").unwrap();
        graph.add_undirected_edge("A", "B", 1.0).unwrap();
        graph.add_directed_edge("B", "A", 4.0).unwrap();
        assert_eq!(graph.edges_of("A").unwrap().len(), 1);
        assert_eq!(graph.edges_of("B").unwrap().len(), 2);
    }

    #[test]
    fn test_undirected_self_loop_listed_once() {
        let mut graph = Graph::undirected();
        graph.add_vertex("A").unwrap();
        graph.add_edge("A", "A", 1.0).unwrap();
        assert_eq!(graph.edges_of("A").unwrap().len(), 1);
    }

    #[test]
    fn test_edges_of_unknown_vertex() {
        let graph = triangle();
        assert!(graph.edges_of("Q").is_err());
        assert_eq!(graph.vertex_ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }
}
