//! Engine configuration and graph files
//!
//! Graphs can be described in TOML and loaded with [`GraphFile::load`]:
//!
//! ```toml
//! directed = false
//! source = "A"
//! tick_ms = 500
//! vertices = ["A", "B", "C"]
//!
//! [[edges]]
//! from = "A"
//! to = "B"
//! weight = 1.0
//! ```

pub mod types;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DijkstepError, Result};
use crate::graph::Graph;

pub use types::{EngineConfig, PlayMode, DEFAULT_TICK_MS};

/// On-disk description of a graph plus the engine settings to play it with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphFile {
    /// Default direction of edges that don't set their own
    #[serde(default)]
    pub directed: bool,

    /// Default source vertex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Period between scheduled steps (default 5000)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Continuous or single-step play
    #[serde(default)]
    pub mode: PlayMode,

    /// Vertex ids, in tie-break order
    #[serde(default)]
    pub vertices: Vec<String>,

    /// Weighted edges between declared vertices
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
}

/// A single edge in a graph file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeEntry {
    pub from: String,
    pub to: String,
    pub weight: f64,
    /// Overrides the file-level `directed` flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directed: Option<bool>,
}

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

impl Default for GraphFile {
    fn default() -> Self {
        Self {
            directed: false,
            source: None,
            tick_ms: DEFAULT_TICK_MS,
            mode: PlayMode::default(),
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl GraphFile {
    /// Load a graph file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a graph file from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save the graph file to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DijkstepError::Other(format!("failed to serialize graph file: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Build the described graph, failing on the first malformed vertex or edge
    pub fn build_graph(&self) -> Result<Graph> {
        let mut graph = if self.directed {
            Graph::new()
        } else {
            Graph::undirected()
        };

        for id in &self.vertices {
            graph.add_vertex(id.as_str())?;
        }

        for edge in &self.edges {
            match edge.directed {
                Some(true) => graph.add_directed_edge(&edge.from, &edge.to, edge.weight)?,
                Some(false) => graph.add_undirected_edge(&edge.from, &edge.to, edge.weight)?,
                None => graph.add_edge(&edge.from, &edge.to, edge.weight)?,
            };
        }

        tracing::debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            directed = self.directed,
            "build_graph"
        );
        Ok(graph)
    }

    /// Build the graph and wrap it in a validated engine configuration
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::new(self.build_graph()?)
            .with_tick_period(Duration::from_millis(self.tick_ms))
            .with_play_mode(self.mode);
        if let Some(source) = &self.source {
            config = config.with_source(source.as_str());
        }
        config.validate()?;
        Ok(config)
    }
}
