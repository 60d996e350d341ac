//! Timer facilities for continuous play
//!
//! The engine hands a repeating task to a [`Scheduler`] and keeps the returned
//! [`ScheduleHandle`]. Cancelling the handle guarantees the task is not fired
//! again; the engine additionally checks its run generation on every firing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// Whether a repeating task wants to be fired again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// A task fired once per period until it returns [`TickControl::Stop`]
pub type TickTask = Box<dyn FnMut() -> TickControl + Send + 'static>;

/// Fires repeating tasks at a fixed period
pub trait Scheduler: Send + Sync {
    fn schedule_repeating(&self, period: Duration, task: TickTask) -> ScheduleHandle;
}

#[derive(Debug, Default)]
struct HandleInner {
    cancelled: AtomicBool,
    wake: Mutex<Option<Sender<()>>>,
}

/// Cancellable reference to a scheduled task. Clones share the same schedule.
#[derive(Debug, Clone, Default)]
pub struct ScheduleHandle {
    inner: Arc<HandleInner>,
}

impl ScheduleHandle {
    /// A handle with no wake-up channel
    pub fn new() -> Self {
        Self::default()
    }

    fn with_waker(wake: Sender<()>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                cancelled: AtomicBool::new(false),
                wake: Mutex::new(Some(wake)),
            }),
        }
    }

    /// Cancel the schedule; idempotent
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        // Dropping the sender wakes a sleeping timer thread
        self.inner
            .wake
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs each schedule on its own named thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_repeating(&self, period: Duration, mut task: TickTask) -> ScheduleHandle {
        let (wake_tx, wake_rx) = mpsc::channel::<()>();
        let handle = ScheduleHandle::with_waker(wake_tx);
        let watched = handle.clone();

        let spawned = thread::Builder::new()
            .name("dijkstep-tick".to_string())
            .spawn(move || loop {
                match wake_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                if watched.is_cancelled() || task() == TickControl::Stop {
                    break;
                }
            });

        if let Err(e) = spawned {
            tracing::warn!(error = %e, "failed to spawn tick thread");
            handle.cancel();
        }

        handle
    }
}

struct ManualTask {
    handle: ScheduleHandle,
    period: Duration,
    task: TickTask,
}

/// Scheduler fired explicitly with [`ManualScheduler::tick`].
///
/// Useful for deterministic tests and for hosts that own their event loop.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    tasks: Arc<Mutex<Vec<ManualTask>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ManualTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fire every live schedule once. Returns how many tasks ran.
    pub fn tick(&self) -> usize {
        // Tasks run outside the lock so they may schedule new work
        let due = std::mem::take(&mut *self.lock());
        let mut fired = 0;
        let mut keep = Vec::with_capacity(due.len());

        for mut entry in due {
            if entry.handle.is_cancelled() {
                continue;
            }
            fired += 1;
            if (entry.task)() == TickControl::Continue && !entry.handle.is_cancelled() {
                keep.push(entry);
            }
        }

        self.lock().extend(keep);
        fired
    }

    /// Number of schedules that are still live
    pub fn pending(&self) -> usize {
        self.lock()
            .iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .count()
    }

    /// Periods of the live schedules, in scheduling order
    pub fn periods(&self) -> Vec<Duration> {
        self.lock()
            .iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .map(|entry| entry.period)
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, task: TickTask) -> ScheduleHandle {
        let handle = ScheduleHandle::new();
        self.lock().push(ManualTask {
            handle: handle.clone(),
            period,
            task,
        });
        handle
    }
}
