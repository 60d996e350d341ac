//! Dijkstep Core Library
//!
//! A Dijkstra shortest-path engine that advances one vertex settlement per
//! step and reports every state change to observers, so a renderer can show
//! the algorithm as it works.
//!
//! ```rust,ignore
//! let mut graph = Graph::undirected();
//! graph.add_vertex("A")?;
//! graph.add_vertex("B")?;
//! graph.add_edge("A", "B", 1.0)?;
//!
//! let engine = Engine::new(EngineConfig::new(graph).with_play_mode(PlayMode::SingleStep))?;
//! let events = engine.subscribe();
//! engine.run("A")?;
//! while !engine.step()?.is_ended() {}
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod logging;

pub use config::{EngineConfig, GraphFile, PlayMode};
pub use engine::{Engine, EngineEvent, Phase, RunEvent, Snapshot, StepOutcome};
pub use error::{DijkstepError, Result};
pub use graph::{Distance, EdgeId, Graph};
