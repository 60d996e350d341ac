//! Observer registration and event delivery
//!
//! The engine never calls observers while its own lock is held. Each
//! operation buffers its events, hands them to the [`Dispatcher`] in emission
//! order and delivers them after releasing the engine lock, so an observer
//! may call `step()`, `stop()`, `snapshot()` or even `run()` on the engine it
//! observes.
//!
//! One thread delivers at a time. A call made from inside an observer only
//! queues its events; the delivering thread picks them up once the current
//! observer returns. Other threads wait for the delivery in progress to drain
//! before they return, so once `run()` returns no event of an older run is
//! delivered any more.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::engine::events::{RunEvent, RunId};

/// Receives engine events
pub trait Observer: Send {
    fn notify(&mut self, event: &RunEvent);

    /// A closed observer is detached after the event being delivered
    fn is_closed(&self) -> bool {
        false
    }
}

impl<F> Observer for F
where
    F: FnMut(&RunEvent) + Send,
{
    fn notify(&mut self, event: &RunEvent) {
        self(event)
    }
}

/// Forwards events into an mpsc channel; closes once the receiver is dropped
pub struct ChannelObserver {
    sender: Sender<RunEvent>,
    closed: bool,
}

impl ChannelObserver {
    pub fn new(sender: Sender<RunEvent>) -> Self {
        Self {
            sender,
            closed: false,
        }
    }
}

impl Observer for ChannelObserver {
    fn notify(&mut self, event: &RunEvent) {
        if self.sender.send(event.clone()).is_err() {
            self.closed = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Returned by `Engine::on`; pass it to `Engine::off` to detach the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registered observers in registration order
#[derive(Default)]
pub(crate) struct Observers {
    list: Vec<(ObserverId, Box<dyn Observer>)>,
}

impl Observers {
    pub(crate) fn push(&mut self, id: ObserverId, observer: Box<dyn Observer>) {
        self.list.push((id, observer));
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.list.len();
        self.list.retain(|(entry, _)| *entry != id);
        self.list.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    fn ids(&self) -> Vec<ObserverId> {
        self.list.iter().map(|(id, _)| *id).collect()
    }

    fn append(&mut self, other: Observers) {
        self.list.extend(other.list);
    }

    /// Notify every observer, then drop the ones that closed
    pub(crate) fn deliver(&mut self, event: &RunEvent) {
        for (_, observer) in &mut self.list {
            observer.notify(event);
        }

        let before = self.list.len();
        self.list.retain(|(_, observer)| !observer.is_closed());
        let closed = before - self.list.len();
        if closed > 0 {
            tracing::debug!(closed, remaining = self.list.len(), "observers_closed");
        }
    }
}

#[derive(Default)]
struct DispatchState {
    next_id: u64,
    observers: Observers,
    queue: VecDeque<RunEvent>,
    /// Queued events of older runs are discarded
    latest: Option<RunId>,
    deliverer: Option<ThreadId>,
    /// Observers taken out for the delivery in progress
    in_flight: Vec<ObserverId>,
    /// Observers detached while they were in flight
    detached: Vec<ObserverId>,
}

/// Per-engine observer list plus the queue of undelivered events
#[derive(Default)]
pub(crate) struct Dispatcher {
    state: Mutex<DispatchState>,
    idle: Condvar,
}

impl Dispatcher {
    fn lock(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add(&self, observer: Box<dyn Observer>) -> ObserverId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = ObserverId(state.next_id);
        state.observers.push(id, observer);
        id
    }

    pub(crate) fn remove(&self, id: ObserverId) -> bool {
        let mut state = self.lock();
        if state.observers.remove(id) {
            return true;
        }
        if state.in_flight.contains(&id) && !state.detached.contains(&id) {
            state.detached.push(id);
            return true;
        }
        false
    }

    pub(crate) fn len(&self) -> usize {
        let state = self.lock();
        state.observers.len() + state.in_flight.len() - state.detached.len()
    }

    /// Queue events of `run`. Callers hold the engine lock, which keeps the
    /// queue in emission order across threads.
    pub(crate) fn enqueue(&self, run: RunId, events: Vec<RunEvent>) {
        let mut state = self.lock();
        state.latest = Some(run);
        state.queue.extend(events);
    }

    /// Deliver queued events unless this thread is already delivering
    pub(crate) fn flush(&self) {
        let me = thread::current().id();
        let mut state = self.lock();
        loop {
            match state.deliverer {
                Some(owner) if owner == me => return,
                Some(_) => {
                    state = self
                        .idle
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                None => break,
            }
        }
        if state.queue.is_empty() {
            return;
        }

        state.deliverer = Some(me);
        drop(state);
        let _delivering = Delivering(self);

        loop {
            let mut state = self.lock();
            let Some(event) = state.queue.pop_front() else {
                break;
            };
            if state.latest.is_some_and(|latest| event.run < latest) {
                tracing::trace!(run = %event.run, "stale_event_dropped");
                continue;
            }

            let mut observers = std::mem::take(&mut state.observers);
            state.in_flight = observers.ids();
            drop(state);

            observers.deliver(&event);

            let mut state = self.lock();
            for id in std::mem::take(&mut state.detached) {
                observers.remove(id);
            }
            let added = std::mem::replace(&mut state.observers, observers);
            state.observers.append(added);
            state.in_flight.clear();
        }
    }
}

/// Releases the delivery slot, also when an observer panics
struct Delivering<'a>(&'a Dispatcher);

impl Drop for Delivering<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.deliverer = None;
        state.in_flight.clear();
        state.detached.clear();
        drop(state);
        self.0.idle.notify_all();
    }
}
