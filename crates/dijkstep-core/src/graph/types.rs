use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Position of a vertex in its graph's insertion order
pub type VertexIndex = usize;

/// Tentative or final distance from the run's source.
///
/// Edge weights are validated to be finite and non-negative, and their total
/// must stay finite, so a `Distance` is never NaN and a reached vertex never
/// overflows to infinity. Infinity marks "not reached yet".
#[derive(Debug, Clone, Copy)]
pub struct Distance(f64);

impl Distance {
    pub const ZERO: Distance = Distance(0.0);
    pub const INFINITE: Distance = Distance(f64::INFINITY);

    pub(crate) fn new(value: f64) -> Self {
        Distance(value)
    }

    /// A distance from a non-negative value; `None` for NaN or negatives
    pub fn try_new(value: f64) -> Option<Self> {
        (value >= 0.0).then_some(Distance(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Finite value, or `None` for unreached vertices
    pub fn finite(&self) -> Option<f64> {
        self.is_finite().then_some(self.0)
    }
}

impl Default for Distance {
    fn default() -> Self {
        Self::INFINITE
    }
}

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Distance {}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for Distance {
    type Output = Self;

    fn add(self, weight: f64) -> Self {
        Distance(self.0 + weight)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_finite() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("inf")
        }
    }
}

// JSON has no infinity; unreached vertices serialize as null
impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.finite() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_none(),
        }
    }
}

/// Stable identifier of an edge, used by observers to correlate events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EdgeId(usize);

impl EdgeId {
    pub(crate) fn new(index: usize) -> Self {
        EdgeId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A vertex and its ordered outgoing edge list
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) id: String,
    pub(crate) adjacency: Vec<EdgeId>,
}

impl Vertex {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of edges traversable from this vertex
    pub fn out_degree(&self) -> usize {
        self.adjacency.len()
    }
}

/// A weighted edge. Undirected edges are traversable from both endpoints.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) source: VertexIndex,
    pub(crate) target: VertexIndex,
    pub(crate) weight: f64,
    pub(crate) directed: bool,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> VertexIndex {
        self.source
    }

    pub fn target(&self) -> VertexIndex {
        self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// The endpoint reached when leaving `from` along this edge
    pub(crate) fn far_end(&self, from: VertexIndex) -> VertexIndex {
        if self.source == from {
            self.target
        } else {
            self.source
        }
    }
}

/// An edge as seen from one of its endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    pub id: EdgeId,
    pub target: VertexIndex,
    pub weight: f64,
}
