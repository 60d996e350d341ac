//! `dijkstep check` - validate a graph file

use std::path::Path;

use dijkstep_core::error::Result;
use dijkstep_core::GraphFile;

use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;

pub fn execute(ctx: &CommandContext, path: &Path) -> Result<()> {
    let file = GraphFile::load(path)?;
    let config = file.engine_config()?;
    let graph = &config.graph;

    match ctx.cli.format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "vertices": graph.vertex_count(),
                "edges": graph.edge_count(),
                "directed": graph.is_directed(),
                "source": config.source,
                "tick_ms": config.tick_period.as_millis() as u64,
                "mode": config.play_mode,
            });
            println!("{}", serde_json::to_string(&summary)?);
        }
        OutputFormat::Human => {
            if !ctx.cli.quiet {
                println!(
                    "{}: {} vertices, {} edges ({})",
                    path.display(),
                    graph.vertex_count(),
                    graph.edge_count(),
                    if graph.is_directed() {
                        "directed"
                    } else {
                        "undirected"
                    }
                );
                if let Some(source) = &config.source {
                    println!("source: {}", source);
                }
            }
        }
    }
    Ok(())
}
