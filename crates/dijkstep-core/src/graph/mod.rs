//! Graph model for the stepped engine
//!
//! A thin structural holder: vertices, weighted edges and adjacency lookup.
//! Construction calls validate their input before mutating anything.

pub mod model;
pub mod types;

pub use model::Graph;
pub use types::{Distance, Edge, EdgeId, HalfEdge, Vertex, VertexIndex};
