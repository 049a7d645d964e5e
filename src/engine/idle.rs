//! Marshalling work onto the single thread that owns the graph.
//!
//! The engine is single-threaded. Other threads reach it through
//! [`IdleHandle::execute_on_idle`], which queues a thunk for the idle thread
//! and blocks until it has run. The idle thread drains the queue with
//! [`IdleDispatcher::pump`] between its own work, or hands itself over to
//! [`IdleDispatcher::run`]. A call made from the idle thread itself runs
//! inline, since queueing it would deadlock.

use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, JoinHandle, ThreadId},
};

use thiserror::Error;
use tracing::{debug, trace};

type Job = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdleError {
    #[error("the idle thread is no longer accepting work")]
    Disconnected,

    #[error("the queued work panicked on the idle thread")]
    Panicked,

    #[error("failed to start the idle thread: {0}")]
    Spawn(String),
}

/// Owned by the idle thread; runs what other threads queue.
pub struct IdleDispatcher {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
    owner: ThreadId,
}

/// Cloneable, `Send` handle for queueing work on the idle thread.
#[derive(Clone)]
pub struct IdleHandle {
    sender: Sender<Job>,
    owner: ThreadId,
}

impl IdleDispatcher {
    /// The calling thread becomes the idle thread.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            owner: thread::current().id(),
        }
    }

    pub fn handle(&self) -> IdleHandle {
        IdleHandle {
            sender: self.sender.clone(),
            owner: self.owner,
        }
    }

    /// Runs every job queued so far and returns how many ran.
    pub fn pump(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "idle queue drained");
        }
        ran
    }

    /// Runs jobs until every handle has been dropped.
    pub fn run(self) {
        let IdleDispatcher { sender, receiver, .. } = self;
        drop(sender);
        for job in receiver {
            job();
        }
        debug!("idle dispatcher stopped");
    }
}

impl Default for IdleDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleHandle {
    pub fn is_idle_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Runs `thunk` on the idle thread and returns its result, blocking the
    /// caller until it has run.
    pub fn execute_on_idle<T, F>(&self, thunk: F) -> Result<T, IdleError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        if self.is_idle_thread() {
            return Ok(thunk());
        }
        let (reply, result) = mpsc::sync_channel(1);
        let job: Job = Box::new(move || {
            let _ = reply.send(thunk());
        });
        self.sender.send(job).map_err(|_| IdleError::Disconnected)?;
        // A panicking job drops `reply` without sending.
        result.recv().map_err(|_| IdleError::Panicked)
    }
}

/// Starts a dedicated idle thread. `init` runs on it first, so thread-bound
/// state such as an engine can be set up there. The thread exits once every
/// handle is dropped.
pub fn spawn<I>(name: &str, init: I) -> Result<(IdleHandle, JoinHandle<()>), IdleError>
where
    I: FnOnce() + Send + 'static,
{
    let (handoff, handle) = mpsc::channel();
    let thread = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            init();
            let dispatcher = IdleDispatcher::new();
            if handoff.send(dispatcher.handle()).is_ok() {
                dispatcher.run();
            }
        })
        .map_err(|e| IdleError::Spawn(e.to_string()))?;
    let handle = handle.recv().map_err(|_| IdleError::Disconnected)?;
    Ok((handle, thread))
}
