//! Background computations with "last configuration wins" publishing.
//!
//! Every configuration change starts a new generation through [`Supervisor::advance`], which
//! cancels the previous generation's token. Workers publish into a [`Slot`] only while their
//! generation is still current, so a slow stale job can never overwrite a newer result.

use crate::error::{Error, Result};
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::Shared;
use linkscape_graph::CancelToken;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::thread;

pub type Generation = u64;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Default)]
struct Epoch(Arc<AtomicU64>);

impl Epoch {
    fn current(&self) -> Generation {
        self.0.load(Ordering::SeqCst)
    }
}

/// Generation number plus the token that cancels work started under it.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub generation: Generation,
    pub cancel: CancelToken,
}

/// Latest published value, tagged with the generation that produced it.
#[derive(Debug)]
pub struct Slot<T> {
    inner: Mutex<Option<(Generation, T)>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl<T: Clone> Slot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn publish(&self, generation: Generation, value: T, epoch: &Epoch) -> bool {
        let mut inner = lock(&self.inner);
        if epoch.current() != generation {
            return false;
        }
        if inner.as_ref().is_some_and(|(g, _)| *g > generation) {
            return false;
        }
        *inner = Some((generation, value));
        true
    }

    /// The value published for exactly `generation`.
    pub fn get(&self, generation: Generation) -> Option<T> {
        match &*lock(&self.inner) {
            Some((g, value)) if *g == generation => Some(value.clone()),
            _ => None,
        }
    }

    pub fn latest(&self) -> Option<(Generation, T)> {
        lock(&self.inner).clone()
    }
}

/// Completion signals of the jobs started under one generation.
#[derive(Default)]
struct Outstanding {
    generation: Generation,
    done: Vec<Shared<oneshot::Receiver<()>>>,
}

impl fmt::Debug for Outstanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outstanding")
            .field("generation", &self.generation)
            .field("done", &self.done.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Supervisor {
    epoch: Epoch,
    cancel: Mutex<CancelToken>,
    outstanding: Mutex<Outstanding>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Generation {
        self.epoch.current()
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.epoch.current() == generation
    }

    /// Starts a new generation and cancels everything started under the previous one.
    pub fn advance(&self) -> Ticket {
        let cancel = CancelToken::new();
        let mut active = lock(&self.cancel);
        let generation = self.epoch.0.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = std::mem::replace(&mut *active, cancel.clone());
        previous.cancel();
        *lock(&self.outstanding) = Outstanding {
            generation,
            done: Vec::new(),
        };
        tracing::debug!(generation, "advanced generation");
        Ticket { generation, cancel }
    }

    /// Cancels the current generation without starting a new one.
    pub fn cancel_all(&self) {
        lock(&self.cancel).cancel();
    }

    /// Resolves once every job started under the current generation has reported.
    ///
    /// Any number of callers may wait concurrently; each one sees the same completion signals.
    pub async fn settled(&self) {
        let done = lock(&self.outstanding).done.clone();
        futures::future::join_all(done).await;
    }

    /// Publishes `value` into `slot` if `generation` is still current.
    pub fn publish<T: Clone>(&self, slot: &Slot<T>, generation: Generation, value: T) -> bool {
        slot.publish(generation, value, &self.epoch)
    }

    /// Runs `job` on its own worker thread.
    ///
    /// The handle resolves to the job's value once it has been published, or to
    /// [`Error::Superseded`] when a newer generation started in the meantime.
    pub fn spawn<T, F>(
        &self,
        name: &'static str,
        ticket: &Ticket,
        slot: &Arc<Slot<T>>,
        job: F,
    ) -> Result<JobHandle<T>>
    where
        T: Clone + Send + 'static,
        F: FnOnce(&CancelToken) -> Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel::<()>();
        let epoch = self.epoch.clone();
        let slot = Arc::clone(slot);
        let cancel = ticket.cancel.clone();
        let generation = ticket.generation;

        thread::Builder::new()
            .name(format!("linkscape-{name}"))
            .spawn(move || {
                let outcome = job(&cancel).and_then(|value| {
                    if slot.publish(generation, value.clone(), &epoch) {
                        Ok(value)
                    } else {
                        Err(Error::Superseded)
                    }
                });
                let outcome = match outcome {
                    Err(_) if epoch.current() != generation => Err(Error::Superseded),
                    other => other,
                };
                tracing::debug!(job = name, generation, ok = outcome.is_ok(), "job finished");
                // The caller may have dropped the handle.
                let _ = tx.send(outcome);
                let _ = done_tx.send(());
            })?;

        let mut outstanding = lock(&self.outstanding);
        if outstanding.generation == generation {
            outstanding.done.push(done_rx.shared());
        }
        drop(outstanding);

        Ok(JobHandle {
            name,
            generation,
            rx,
        })
    }
}

/// Future resolving to a background job's result.
#[derive(Debug)]
pub struct JobHandle<T> {
    name: &'static str,
    generation: Generation,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> JobHandle<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Blocks the calling thread until the job reports.
    pub fn wait(self) -> Result<T> {
        futures::executor::block_on(self)
    }
}

impl<T> Future for JobHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx
            .poll_unpin(cx)
            .map(|received| received.unwrap_or(Err(Error::WorkerLost)))
    }
}
