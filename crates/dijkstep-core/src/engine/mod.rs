//! Stepped shortest-path engine
//!
//! Runs Dijkstra one settlement at a time and reports every state change to
//! the engine's observers:
//! - `run(source)` resets all per-vertex state, emits `started` and performs
//!   the first step synchronously
//! - `step()` performs exactly one settlement round
//! - `stop()` halts continuous play without discarding state
//!
//! In continuous play further steps are fired by a [`Scheduler`]. Each run
//! carries a generation number; a firing whose generation is no longer the
//! engine's current one does nothing, so a superseded run never emits again.
//!
//! Events are collected while the engine is locked and delivered after the
//! lock is released (see [`observer`]), so observers may call back in.

pub mod events;
pub mod observer;
pub mod scheduler;
pub mod state;

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::config::{EngineConfig, PlayMode};
use crate::error::{DijkstepError, Result};
use crate::graph::Graph;

pub use events::{EndReason, EngineEvent, RunEvent, RunId};
pub use observer::{ChannelObserver, Observer, ObserverId};
pub use scheduler::{
    ManualScheduler, ScheduleHandle, Scheduler, ThreadScheduler, TickControl, TickTask,
};
pub use state::{Phase, Snapshot, StepOutcome, VertexState};

use observer::Dispatcher;
use state::RunState;

/// State guarded by the engine lock
struct EngineInner {
    config: EngineConfig,
    generation: u64,
    phase: Phase,
    run: Option<RunState>,
    schedule: Option<ScheduleHandle>,
    /// Events of the current operation, not yet handed to the dispatcher
    outbox: Vec<RunEvent>,
}

impl EngineInner {
    fn run_id(&self) -> RunId {
        RunId(self.generation)
    }

    fn cancel_schedule(&mut self) {
        if let Some(handle) = self.schedule.take() {
            handle.cancel();
            tracing::debug!(run = %self.run_id(), "schedule_cancelled");
        }
    }

    fn step_once(&mut self) -> Result<StepOutcome> {
        let run = self.run_id();
        let Some(state) = self.run.as_mut() else {
            return Err(DijkstepError::NoActiveRun);
        };

        let outbox = &mut self.outbox;
        let outcome = state.step(|event| outbox.push(RunEvent { run, event }));

        if let StepOutcome::Ended(reason) = &outcome {
            if self.phase != Phase::Terminated {
                tracing::debug!(run = %run, reason = %reason, "run_ended");
            }
            self.phase = Phase::Terminated;
            self.cancel_schedule();
        }

        Ok(outcome)
    }

    fn halt(&mut self) {
        self.cancel_schedule();
        if self.phase == Phase::Running {
            self.phase = Phase::Stopped;
            tracing::debug!(run = %self.run_id(), "run_stopped");
        }
    }
}

/// Engine state plus its observers, shared by handles and scheduled ticks
struct Shared {
    state: Mutex<EngineInner>,
    dispatch: Dispatcher,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        // Steps complete before the guard drops, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the operation's events, unlock, then deliver
    fn publish(&self, mut inner: MutexGuard<'_, EngineInner>) {
        let events = std::mem::take(&mut inner.outbox);
        if !events.is_empty() {
            self.dispatch.enqueue(inner.run_id(), events);
        }
        drop(inner);
        self.dispatch.flush();
    }
}

/// Handle to one `run()`; cancelling it stops that run's continuous play
#[derive(Debug, Clone)]
pub struct RunHandle {
    run: RunId,
    schedule: Option<ScheduleHandle>,
    engine: Weak<Shared>,
}

impl RunHandle {
    pub fn id(&self) -> RunId {
        self.run
    }

    /// Whether further steps were scheduled when the run started
    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_some()
    }

    /// Cancel the run's schedule. Has no effect on a newer run.
    pub fn cancel(&self) {
        if let Some(schedule) = &self.schedule {
            schedule.cancel();
        }
        if let Some(shared) = self.engine.upgrade() {
            let mut inner = shared.lock();
            if inner.run_id() == self.run {
                inner.halt();
            }
        }
    }
}

impl std::fmt::Debug for EngineInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineInner")
            .field("generation", &self.generation)
            .field("phase", &self.phase)
            .finish()
    }
}

/// Stepped Dijkstra engine.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
    scheduler: Arc<dyn Scheduler>,
}

impl Engine {
    /// Create an engine that plays continuously on background threads
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_scheduler(config, Arc::new(ThreadScheduler))
    }

    /// Create an engine driven by the given scheduler
    pub fn with_scheduler(config: EngineConfig, scheduler: Arc<dyn Scheduler>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(EngineInner {
                    config,
                    generation: 0,
                    phase: Phase::Idle,
                    run: None,
                    schedule: None,
                    outbox: Vec::new(),
                }),
                dispatch: Dispatcher::default(),
            }),
            scheduler,
        })
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.shared.lock()
    }

    /// Replace the configuration used by the next `run()`.
    ///
    /// An in-flight run keeps the graph it started with.
    pub fn configure(&self, config: EngineConfig) -> Result<()> {
        config.validate()?;
        self.lock().config = config;
        Ok(())
    }

    pub fn config(&self) -> EngineConfig {
        self.lock().config.clone()
    }

    /// Graph the next run will traverse
    pub fn graph(&self) -> Arc<Graph> {
        Arc::clone(&self.lock().config.graph)
    }

    /// Source of the latest run, or the configured default before any run
    pub fn source(&self) -> Option<String> {
        let inner = self.lock();
        match &inner.run {
            Some(state) => Some(state.source_id().to_string()),
            None => inner.config.source.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Id of the latest run, if any
    pub fn current_run(&self) -> Option<RunId> {
        let inner = self.lock();
        inner.run.as_ref().map(|_| inner.run_id())
    }

    /// Register an observer for all future events
    pub fn on(&self, observer: impl Observer + 'static) -> ObserverId {
        self.shared.dispatch.add(Box::new(observer))
    }

    /// Detach an observer. Returns false if it was already gone.
    ///
    /// Called during a delivery, the observer still sees the event in flight.
    pub fn off(&self, id: ObserverId) -> bool {
        self.shared.dispatch.remove(id)
    }

    /// Number of attached observers
    pub fn observer_count(&self) -> usize {
        self.shared.dispatch.len()
    }

    /// Receive all future events over a channel.
    ///
    /// Dropping the receiver detaches the subscription on the next event.
    pub fn subscribe(&self) -> Receiver<RunEvent> {
        let (tx, rx) = mpsc::channel();
        self.on(ChannelObserver::new(tx));
        rx
    }

    /// Start a run from the configured default source
    pub fn run_default(&self) -> Result<RunHandle> {
        let source = self
            .lock()
            .config
            .source
            .clone()
            .ok_or(DijkstepError::MissingSource)?;
        self.run(&source)
    }

    /// Start a new run from `source`, superseding any run in progress.
    ///
    /// The source is validated before any state changes. The first step is
    /// executed before this returns.
    #[tracing::instrument(skip(self), fields(run))]
    pub fn run(&self, source: &str) -> Result<RunHandle> {
        let mut inner = self.lock();
        let graph = Arc::clone(&inner.config.graph);
        let source_index = graph.require(source)?;

        inner.cancel_schedule();
        inner.generation += 1;
        let run = inner.run_id();
        tracing::Span::current().record("run", tracing::field::display(run));

        let state = RunState::new(graph, source_index);
        let reset = state.reset_ids();
        inner.run = Some(state);
        inner.phase = Phase::Running;
        tracing::debug!(vertices = reset.len(), "run_started");

        inner.outbox.push(RunEvent {
            run,
            event: EngineEvent::Started {
                source: source.to_string(),
                reset,
            },
        });

        let first = inner.step_once()?;

        let schedule = if !first.is_ended() && inner.config.play_mode == PlayMode::Continuous {
            let period = inner.config.tick_period;
            let handle = self
                .scheduler
                .schedule_repeating(period, tick_task(Arc::downgrade(&self.shared), run));
            tracing::debug!(period_ms = period.as_millis() as u64, "run_scheduled");
            inner.schedule = Some(handle.clone());
            Some(handle)
        } else {
            None
        };
        self.shared.publish(inner);

        Ok(RunHandle {
            run,
            schedule,
            engine: Arc::downgrade(&self.shared),
        })
    }

    /// Perform one settlement round of the latest run.
    ///
    /// Fails with `NoActiveRun` before the first `run()`. After termination
    /// it returns `Ended` without emitting anything.
    pub fn step(&self) -> Result<StepOutcome> {
        let mut inner = self.lock();
        let outcome = inner.step_once();
        self.shared.publish(inner);
        outcome
    }

    /// Halt continuous play, keeping the run's state; idempotent
    pub fn stop(&self) {
        self.lock().halt();
    }

    /// Observable state of the latest run
    pub fn snapshot(&self) -> Option<Snapshot> {
        let inner = self.lock();
        let run = inner.run_id();
        inner
            .run
            .as_ref()
            .map(|state| state.snapshot(run, inner.phase))
    }

    /// Why the latest run terminated, if it did
    pub fn end_reason(&self) -> Option<EndReason> {
        self.lock().run.as_ref().and_then(RunState::end_reason)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Engine");
        match self.shared.state.try_lock() {
            Ok(inner) => debug.field("inner", &*inner),
            Err(_) => debug.field("inner", &"<locked>"),
        };
        debug
            .field("observers", &self.shared.dispatch.len())
            .finish_non_exhaustive()
    }
}

/// Scheduled step for `run`; stops firing once the run is superseded or halted
fn tick_task(shared: Weak<Shared>, run: RunId) -> TickTask {
    Box::new(move || {
        let Some(shared) = shared.upgrade() else {
            return TickControl::Stop;
        };
        let mut inner = shared.lock();
        if inner.run_id() != run || inner.phase != Phase::Running {
            tracing::trace!(run = %run, "stale_tick_ignored");
            return TickControl::Stop;
        }

        let control = match inner.step_once() {
            Ok(outcome) if !outcome.is_ended() => TickControl::Continue,
            _ => TickControl::Stop,
        };
        shared.publish(inner);
        control
    })
}
