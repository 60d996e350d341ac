use serde::Serialize;
use std::fmt;

use crate::graph::{Distance, EdgeId};

/// Identifies one `run()` of an engine. Later runs get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RunId(pub(crate) u64);

impl RunId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Why a run terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Every vertex was settled
    Exhausted,
    /// The settled vertex was unreachable; the remaining frontier stalls
    Unreachable,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Exhausted => f.write_str("exhausted"),
            EndReason::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// State-change notification for renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A run began; every listed vertex had its presentation state reset
    Started { source: String, reset: Vec<String> },
    /// An outgoing edge to an unvisited vertex was relaxed.
    ///
    /// Sent for every such edge, whether or not the distance improved.
    Relaxed {
        edge: EdgeId,
        target: String,
        distance: Distance,
    },
    /// The next vertex to settle was chosen; its distance is final
    Stepped { current: String, distance: Distance },
    /// The run terminated
    Ended { reason: EndReason },
}

/// An event tagged with the run that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunEvent {
    pub run: RunId,
    #[serde(flatten)]
    pub event: EngineEvent,
}
