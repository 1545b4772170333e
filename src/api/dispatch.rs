//! Purpose: Caller-designated execution contexts for fetch completions.
//! Exports: `CallbackContext`, `Job`, `Immediate`, `CallbackQueue`, `QueueSender`.
//! Role: One explicit hand-off from the worker that finished a fetch to the caller's thread.
//! Invariants: Each dispatched job runs at most once, on whichever thread drains the context.
//! Invariants: A closed queue drops jobs instead of blocking the worker.
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait CallbackContext: Send + 'static {
    fn dispatch(&self, job: Job);
}

/// Runs completions on the thread that finished the fetch.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

impl CallbackContext for Immediate {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Completions queued for the owning thread, which drains them explicitly.
pub struct CallbackQueue {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
}

#[derive(Clone)]
pub struct QueueSender {
    sender: Sender<Job>,
}

impl CallbackQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> QueueSender {
        QueueSender {
            sender: self.sender.clone(),
        }
    }

    /// Runs every job already queued; returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Waits up to `timeout` for one job and runs it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

impl Default for CallbackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackContext for QueueSender {
    fn dispatch(&self, job: Job) {
        if self.sender.send(job).is_err() {
            tracing::debug!("callback queue closed; completion dropped");
        }
    }
}
