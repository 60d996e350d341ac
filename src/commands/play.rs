//! `dijkstep play` - continuous play on a timer

use std::path::Path;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use dijkstep_core::bail_usage;
use dijkstep_core::error::{DijkstepError, Result};
use dijkstep_core::{Engine, EngineEvent, GraphFile, Phase, PlayMode};

use crate::commands::dispatch::CommandContext;
use crate::commands::render;

/// How often the event loop checks whether play was interrupted
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn execute(
    ctx: &CommandContext,
    path: &Path,
    source: Option<&str>,
    tick_ms: Option<u64>,
) -> Result<()> {
    let file = GraphFile::load(path)?;
    let mut config = file.engine_config()?.with_play_mode(PlayMode::Continuous);
    if let Some(ms) = tick_ms {
        if ms == 0 {
            bail_usage!("--tick-ms must be greater than zero");
        }
        config = config.with_tick_period(Duration::from_millis(ms));
    }

    let engine = Engine::new(config)?;
    let events = engine.subscribe();

    let interrupt = engine.clone();
    ctrlc::set_handler(move || interrupt.stop())
        .map_err(|e| DijkstepError::Other(format!("failed to install Ctrl-C handler: {}", e)))?;

    let handle = match source {
        Some(source) => engine.run(source)?,
        None => engine.run_default()?,
    };
    tracing::debug!(run = %handle.id(), scheduled = handle.is_scheduled(), "play_started");

    let format = ctx.cli.format;
    loop {
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                if !ctx.cli.quiet {
                    render::print_event(format, &event);
                }
                if matches!(event.event, EngineEvent::Ended { .. }) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if engine.phase() == Phase::Stopped {
                    tracing::info!(run = %handle.id(), "play_interrupted");
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Some(snapshot) = engine.snapshot() {
        render::print_snapshot(format, &snapshot);
    }
    Ok(())
}
