//! Parallel fetch join
//!
//! Runs several independent fetches concurrently and fires a single
//! completion once every one of them has terminated, whether it succeeded or
//! failed. Each successful fetch feeds its own result handler as soon as it
//! lands; each failure is reported to the error sink on its own.

pub mod barrier;
pub mod context;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;
use tokio::sync::oneshot;

pub use barrier::JoinBarrier;
pub use context::{CompletionContext, Inline, MainQueue};

/// Identifies which fetch a result or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchSource(&'static str);

impl FetchSource {
    pub const DIALOGS: FetchSource = FetchSource("dialogs");
    pub const USERS: FetchSource = FetchSource("users");
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{1}")]
    FetchFailed(FetchSource, String),
}

impl FetchError {
    /// Human-readable description, suitable for an alert.
    pub fn message(&self) -> &str {
        match self {
            FetchError::FetchFailed(_, message) => message,
        }
    }
}

/// Receives per-task failures. Called once per failing task.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: FetchError);
}

impl<F> ErrorSink for F
where
    F: Fn(FetchError) + Send + Sync,
{
    fn report(&self, error: FetchError) {
        self(error)
    }
}

/// One asynchronous fetch with its success handler attached.
pub struct FetchTask {
    source: FetchSource,
    run: BoxFuture<'static, Result<(), FetchError>>,
}

impl FetchTask {
    /// Wrap a fetch producing `Vec<T>` and the handler that consumes it.
    ///
    /// The handler only runs on success. Errors are flattened into
    /// [`FetchError::FetchFailed`] with the full context chain as message.
    pub fn new<T, Fut, H>(source: FetchSource, fetch: Fut, on_success: H) -> Self
    where
        T: Send + 'static,
        Fut: Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
        H: FnOnce(Vec<T>) + Send + 'static,
    {
        let run = async move {
            match fetch.await {
                Ok(items) => {
                    tracing::debug!("{} fetch returned {} items", source, items.len());
                    on_success(items);
                    Ok(())
                }
                Err(e) => Err(FetchError::FetchFailed(source, format!("{:#}", e))),
            }
        };

        Self {
            source,
            run: run.boxed(),
        }
    }

    pub fn source(&self) -> FetchSource {
        self.source
    }
}

/// Coordinates a fixed set of fetch tasks behind one completion.
pub struct ParallelFetchJoin {
    tasks: Vec<FetchTask>,
    error_sink: Arc<dyn ErrorSink>,
}

impl ParallelFetchJoin {
    pub fn new(error_sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            tasks: Vec::new(),
            error_sink,
        }
    }

    /// Enqueue a task. Order of enqueueing does not imply completion order.
    pub fn push(mut self, task: FetchTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Launch every task on the current tokio runtime and return immediately.
    ///
    /// `on_complete` is dispatched onto `context` exactly once, after every
    /// task's handler or error report has run. Must be called from within a
    /// runtime.
    pub fn run<C, F>(self, context: C, on_complete: F) -> Arc<JoinBarrier>
    where
        C: CompletionContext + 'static,
        F: FnOnce() + Send + 'static,
    {
        let count = self.tasks.len();
        tracing::debug!("Starting join over {} fetches", count);

        // All arrivals exist before any task starts, so an early finisher can
        // never take the count to zero while siblings are still unlaunched.
        let (barrier, arrivals) = JoinBarrier::new(count, Arc::new(context), on_complete);

        for (task, arrival) in self.tasks.into_iter().zip(arrivals) {
            let sink = Arc::clone(&self.error_sink);
            tokio::spawn(async move {
                let source = task.source();
                if let Err(e) = task.run.await {
                    tracing::warn!("{} fetch failed: {}", source, e);
                    sink.report(e);
                }
                arrival.arrive();
            });
        }

        barrier
    }

    /// Launch every task and wait until all of them have terminated.
    ///
    /// The completion runs [`Inline`] on whichever worker arrives last and
    /// only signals the waiting caller.
    pub async fn run_to_completion(self) {
        let (tx, rx) = oneshot::channel();
        self.run(Inline, move || {
            let _ = tx.send(());
        });
        // The sender is consumed by the completion, which always fires.
        let _ = rx.await;
    }
}

#[cfg(test)]
impl FetchSource {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

#[cfg(test)]
impl FetchError {
    pub fn source_name(&self) -> FetchSource {
        match self {
            FetchError::FetchFailed(source, _) => *source,
        }
    }
}

#[cfg(test)]
impl ParallelFetchJoin {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
