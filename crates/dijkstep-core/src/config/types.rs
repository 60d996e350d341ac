//! Configuration type definitions

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bail_invalid;
use crate::error::Result;
use crate::graph::Graph;

/// Default period between scheduled steps in continuous play, in milliseconds
pub const DEFAULT_TICK_MS: u64 = 5000;

/// How the engine advances after the first step of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    /// Schedule further steps on the engine's scheduler
    #[default]
    Continuous,
    /// Wait for explicit `step()` calls
    SingleStep,
}

impl std::str::FromStr for PlayMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continuous" => Ok(PlayMode::Continuous),
            "single-step" | "step" => Ok(PlayMode::SingleStep),
            other => Err(format!(
                "unknown play mode '{}' (expected: continuous, single-step)",
                other
            )),
        }
    }
}

/// Engine configuration, applied to the next `run()`
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Graph the next run traverses
    pub graph: Arc<Graph>,
    /// Source used by `run_default()`
    pub source: Option<String>,
    /// Period between scheduled steps in continuous play
    pub tick_period: Duration,
    /// Continuous or single-step play
    pub play_mode: PlayMode,
}

impl EngineConfig {
    pub fn new(graph: impl Into<Arc<Graph>>) -> Self {
        Self {
            graph: graph.into(),
            source: None,
            tick_period: Duration::from_millis(DEFAULT_TICK_MS),
            play_mode: PlayMode::default(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn with_play_mode(mut self, mode: PlayMode) -> Self {
        self.play_mode = mode;
        self
    }

    /// Check that the configured source exists and the tick period is usable
    pub fn validate(&self) -> Result<()> {
        if self.tick_period.is_zero() {
            bail_invalid!("tick period", "0ms");
        }
        if let Some(source) = &self.source {
            self.graph.require(source)?;
        }
        Ok(())
    }
}
