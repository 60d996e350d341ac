//! Console rendering of engine events and snapshots

use dijkstep_core::engine::{EngineEvent, RunEvent, Snapshot};

use crate::cli::OutputFormat;

/// Format one event for the terminal
pub fn event_line(format: OutputFormat, event: &RunEvent) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(event).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to serialize event");
            String::new()
        }),
        OutputFormat::Human => match &event.event {
            EngineEvent::Started { source, reset } => {
                format!("start  {} ({} vertices reset)", source, reset.len())
            }
            EngineEvent::Relaxed {
                edge,
                target,
                distance,
            } => format!("  relax {} -> {} = {}", edge, target, distance),
            EngineEvent::Stepped { current, distance } => {
                format!("step   {} at {}", current, distance)
            }
            EngineEvent::Ended { reason } => format!("end    {}", reason),
        },
    }
}

pub fn print_event(format: OutputFormat, event: &RunEvent) {
    println!("{}", event_line(format, event));
}

/// Print the final distance table
pub fn print_snapshot(format: OutputFormat, snapshot: &Snapshot) {
    match format {
        OutputFormat::Json => match serde_json::to_string(snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize snapshot"),
        },
        OutputFormat::Human => {
            println!();
            println!(
                "distances from {} ({} steps, {:?}):",
                snapshot.source, snapshot.steps, snapshot.phase
            );
            for vertex in &snapshot.vertices {
                let via = vertex.predecessor.as_deref().unwrap_or("-");
                println!("  {}\t{}\tvia {}", vertex.id, vertex.distance, via);
            }
        }
    }
}
