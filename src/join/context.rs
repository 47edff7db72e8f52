//! Execution contexts a join completion can be delivered on.

use tokio::sync::mpsc;

/// A boxed unit of work handed to a context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where a completion callback runs.
pub trait CompletionContext: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs the job on whichever thread dispatched it.
///
/// For a join completion that is the worker of the last task to finish. If
/// that task panicked, its arrival is signalled while the worker unwinds and
/// the job runs inside the unwind, where a second panic aborts the process.
/// Completions that can panic belong on a [`MainQueue`] instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct Inline;

impl CompletionContext for Inline {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Serial job queue drained by the task that owns it.
///
/// The owning task plays the role of a UI main thread: fetches run on the
/// runtime's workers, completions are posted here and executed only when the
/// owner calls [`MainQueue::run_next`].
pub struct MainQueue {
    tx: mpsc::UnboundedSender<Job>,
    rx: mpsc::UnboundedReceiver<Job>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Handle that posts jobs onto this queue.
    pub fn handle(&self) -> MainQueueHandle {
        MainQueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next job and run it.
    pub async fn run_next(&mut self) {
        // The queue holds its own sender, so the channel never closes here.
        if let Some(job) = self.rx.recv().await {
            job();
        }
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending side of a [`MainQueue`].
#[derive(Clone)]
pub struct MainQueueHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl CompletionContext for MainQueueHandle {
    fn dispatch(&self, job: Job) {
        if self.tx.send(job).is_err() {
            tracing::error!("Main queue closed -- completion dropped");
        }
    }
}

#[cfg(test)]
impl MainQueue {
    /// Run every job that is already queued. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}
