//! `dijkstep walk` - synchronous stepping

use std::path::Path;

use dijkstep_core::error::Result;
use dijkstep_core::{Engine, GraphFile, PlayMode, RunEvent};

use crate::commands::dispatch::CommandContext;
use crate::commands::render;

pub fn execute(ctx: &CommandContext, path: &Path, source: Option<&str>) -> Result<()> {
    let file = GraphFile::load(path)?;
    let config = file.engine_config()?.with_play_mode(PlayMode::SingleStep);
    let engine = Engine::new(config)?;

    let format = ctx.cli.format;
    if !ctx.cli.quiet {
        engine.on(move |event: &RunEvent| render::print_event(format, event));
    }

    let handle = match source {
        Some(source) => engine.run(source)?,
        None => engine.run_default()?,
    };

    let mut steps = 1;
    while !engine.step()?.is_ended() {
        steps += 1;
    }
    tracing::debug!(run = %handle.id(), steps, elapsed = ?ctx.start.elapsed(), "walk_finished");

    if let Some(snapshot) = engine.snapshot() {
        render::print_snapshot(format, &snapshot);
    }
    Ok(())
}
