use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::engine::events::{EndReason, EngineEvent, RunId};
use crate::graph::{Distance, EdgeId, Graph, VertexIndex};

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No run has started
    #[default]
    Idle,
    /// A run is in progress
    Running,
    /// The run was halted by `stop()` before it terminated
    Stopped,
    /// The run reached its termination check
    Terminated,
}

/// Result of a single settlement round
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// A vertex was settled and `current` moved to the next nearest vertex
    Advanced { current: String, distance: Distance },
    /// The run has terminated
    Ended(EndReason),
}

impl StepOutcome {
    pub fn is_ended(&self) -> bool {
        matches!(self, StepOutcome::Ended(_))
    }
}

/// Per-vertex view inside a [`Snapshot`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexState {
    pub id: String,
    pub distance: Distance,
    pub visited: bool,
    /// Vertex the best known distance was reached from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,
    /// Edge the best known distance was reached through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<EdgeId>,
}

/// Observable state of a run
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub run: RunId,
    pub phase: Phase,
    pub source: String,
    pub current: String,
    pub steps: usize,
    /// All vertices in insertion order
    pub vertices: Vec<VertexState>,
    /// Settled vertices in settlement order
    pub settled: Vec<String>,
    /// Edges relaxed by the latest step
    pub active_edges: Vec<EdgeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
}

impl Snapshot {
    pub fn vertex(&self, id: &str) -> Option<&VertexState> {
        self.vertices.iter().find(|v| v.id == id)
    }

    pub fn distance(&self, id: &str) -> Option<Distance> {
        self.vertex(id).map(|v| v.distance)
    }
}

/// Mutable state of one run over a shared graph
pub(crate) struct RunState {
    graph: Arc<Graph>,
    source: VertexIndex,
    current: VertexIndex,
    distance: Vec<Distance>,
    visited: Vec<bool>,
    predecessor: Vec<Option<(VertexIndex, EdgeId)>>,
    unvisited: BTreeSet<VertexIndex>,
    settled: Vec<VertexIndex>,
    active_edges: Vec<EdgeId>,
    steps: usize,
    ended: Option<EndReason>,
}

impl RunState {
    /// Fresh state: every vertex unreached and unvisited except `source` at zero
    pub(crate) fn new(graph: Arc<Graph>, source: VertexIndex) -> Self {
        let count = graph.vertex_count();
        let mut distance = vec![Distance::INFINITE; count];
        distance[source] = Distance::ZERO;
        let unvisited = (0..count).filter(|&v| v != source).collect();

        Self {
            graph,
            source,
            current: source,
            distance,
            visited: vec![false; count],
            predecessor: vec![None; count],
            unvisited,
            settled: Vec::new(),
            active_edges: Vec::new(),
            steps: 0,
            ended: None,
        }
    }

    pub(crate) fn source_id(&self) -> &str {
        self.graph.vertex_id(self.source)
    }

    /// Ids of every vertex whose state was reset by this run
    pub(crate) fn reset_ids(&self) -> Vec<String> {
        self.graph.vertex_ids().map(str::to_string).collect()
    }

    pub(crate) fn end_reason(&self) -> Option<EndReason> {
        self.ended
    }

    /// Settle `current`, relax its edges, then terminate or pick the next vertex
    pub(crate) fn step(&mut self, mut emit: impl FnMut(EngineEvent)) -> StepOutcome {
        if let Some(reason) = self.ended {
            return StepOutcome::Ended(reason);
        }

        let start = Instant::now();
        let current = self.current;
        self.visited[current] = true;
        self.unvisited.remove(&current);
        self.settled.push(current);
        self.steps += 1;
        self.active_edges.clear();

        let base = self.distance[current];
        for half in self.graph.out_edges(current) {
            let target = half.target;
            if self.visited[target] {
                continue;
            }

            let candidate = base + half.weight;
            if candidate < self.distance[target] {
                self.distance[target] = candidate;
                self.predecessor[target] = Some((current, half.id));
            }
            self.active_edges.push(half.id);

            // One event per unvisited neighbour, improved or not
            emit(EngineEvent::Relaxed {
                edge: half.id,
                target: self.graph.vertex_id(target).to_string(),
                distance: self.distance[target],
            });
        }

        let next = if base.is_finite() {
            self.nearest_unvisited()
        } else {
            None
        };

        let Some(next) = next else {
            let reason = if base.is_finite() {
                EndReason::Exhausted
            } else {
                EndReason::Unreachable
            };
            self.ended = Some(reason);
            emit(EngineEvent::Ended { reason });
            crate::trace_time!(start, "step_ended", vertex = self.graph.vertex_id(current));
            return StepOutcome::Ended(reason);
        };

        self.unvisited.remove(&next);
        self.current = next;
        let current_id = self.graph.vertex_id(next).to_string();
        let distance = self.distance[next];
        emit(EngineEvent::Stepped {
            current: current_id.clone(),
            distance,
        });

        crate::trace_time!(start, "step", vertex = current_id.as_str());
        StepOutcome::Advanced {
            current: current_id,
            distance,
        }
    }

    /// Smallest tentative distance, ties broken by insertion order
    fn nearest_unvisited(&self) -> Option<VertexIndex> {
        self.unvisited
            .iter()
            .copied()
            .min_by_key(|&v| (self.distance[v], v))
    }

    pub(crate) fn snapshot(&self, run: RunId, phase: Phase) -> Snapshot {
        let vertices = self
            .graph
            .vertex_ids()
            .enumerate()
            .map(|(index, id)| {
                let predecessor = self.predecessor[index];
                VertexState {
                    id: id.to_string(),
                    distance: self.distance[index],
                    visited: self.visited[index],
                    predecessor: predecessor.map(|(from, _)| self.graph.vertex_id(from).to_string()),
                    via: predecessor.map(|(_, edge)| edge),
                }
            })
            .collect();

        Snapshot {
            run,
            phase,
            source: self.source_id().to_string(),
            current: self.graph.vertex_id(self.current).to_string(),
            steps: self.steps,
            vertices,
            settled: self
                .settled
                .iter()
                .map(|&v| self.graph.vertex_id(v).to_string())
                .collect(),
            active_edges: self.active_edges.clone(),
            end_reason: self.ended,
        }
    }
}
