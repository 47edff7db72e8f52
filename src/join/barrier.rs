//! Countdown barrier with a single-fire completion gate.
//!
//! The barrier is created with the number of participants up front and hands
//! out one [`Arrival`] per participant. Each arrival decrements the count
//! exactly once, either explicitly or when dropped (so a task that panics
//! still counts as terminated). Whichever arrival takes the count from 1 to 0
//! dispatches the completion onto its [`CompletionContext`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::context::{CompletionContext, Job};

/// Completion callback bound to the context it must run on.
struct Completion {
    context: Arc<dyn CompletionContext>,
    job: Job,
}

impl Completion {
    fn fire(self) {
        self.context.dispatch(self.job);
    }
}

/// Atomic countdown shared by all participants of one join.
pub struct JoinBarrier {
    outstanding: AtomicUsize,
    completion: Mutex<Option<Completion>>,
}

impl JoinBarrier {
    /// Create a barrier for `count` participants.
    ///
    /// Returns the shared barrier and exactly `count` arrival tokens. With
    /// zero participants the completion is dispatched before this returns.
    pub fn new(
        count: usize,
        context: Arc<dyn CompletionContext>,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> (Arc<Self>, Vec<Arrival>) {
        let completion = Completion {
            context,
            job: Box::new(on_complete),
        };

        if count == 0 {
            tracing::debug!("Join barrier has no participants, completing immediately");
            completion.fire();
            let barrier = Arc::new(Self {
                outstanding: AtomicUsize::new(0),
                completion: Mutex::new(None),
            });
            return (barrier, Vec::new());
        }

        let barrier = Arc::new(Self {
            outstanding: AtomicUsize::new(count),
            completion: Mutex::new(Some(completion)),
        });
        let arrivals = (0..count)
            .map(|_| Arrival {
                barrier: Arc::clone(&barrier),
            })
            .collect();

        (barrier, arrivals)
    }

    /// Number of participants that have not arrived yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Whether the completion has been handed to its context.
    pub fn is_complete(&self) -> bool {
        self.outstanding() == 0
    }

    fn arrive(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "join barrier decremented past zero");
        if previous != 1 {
            return;
        }

        // Only the arrival that observed the last decrement gets here.
        let completion = self
            .completion
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(completion) = completion {
            completion.fire();
        }
    }
}

/// Owned right to decrement a [`JoinBarrier`] once.
#[must_use = "dropping an Arrival immediately counts the participant as terminated"]
pub struct Arrival {
    barrier: Arc<JoinBarrier>,
}

impl Arrival {
    /// Signal that this participant has terminated.
    pub fn arrive(self) {
        drop(self);
    }
}

// Runs during unwind when the holder panics; see `Inline`.
impl Drop for Arrival {
    fn drop(&mut self) {
        self.barrier.arrive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::context::{Inline, MainQueue};
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        (fired, move || {
            f.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_zero_participants_fire_immediately() {
        let (fired, on_complete) = counter();
        let (barrier, arrivals) = JoinBarrier::new(0, Arc::new(Inline), on_complete);

        assert!(arrivals.is_empty());
        assert!(barrier.is_complete());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fires_only_after_last_arrival() {
        let (fired, on_complete) = counter();
        let (barrier, mut arrivals) = JoinBarrier::new(3, Arc::new(Inline), on_complete);
        assert_eq!(barrier.outstanding(), 3);

        arrivals.pop().unwrap().arrive();
        arrivals.pop().unwrap().arrive();
        assert_eq!(barrier.outstanding(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        arrivals.pop().unwrap().arrive();
        assert!(barrier.is_complete());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_arrival_counts() {
        let (fired, on_complete) = counter();
        let (_barrier, arrivals) = JoinBarrier::new(2, Arc::new(Inline), on_complete);

        drop(arrivals);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_arrivals_fire_exactly_once() {
        for _ in 0..50 {
            let (fired, on_complete) = counter();
            let (barrier, arrivals) = JoinBarrier::new(16, Arc::new(Inline), on_complete);

            let handles: Vec<_> = arrivals
                .into_iter()
                .map(|arrival| std::thread::spawn(move || arrival.arrive()))
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert!(barrier.is_complete());
            assert_eq!(fired.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_arrival_survives_panicking_thread() {
        let (fired, on_complete) = counter();
        let (_barrier, mut arrivals) = JoinBarrier::new(2, Arc::new(Inline), on_complete);

        let doomed = arrivals.pop().unwrap();
        let result = std::thread::spawn(move || {
            let _held = doomed;
            panic!("fetch blew up");
        })
        .join();
        assert!(result.is_err());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        arrivals.pop().unwrap().arrive();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_main_queue_completion_deferred_past_panicking_arrival() {
        let mut queue = MainQueue::new();
        let (fired, on_complete) = counter();
        let (barrier, arrivals) = JoinBarrier::new(1, Arc::new(queue.handle()), on_complete);

        let result = std::thread::spawn(move || {
            let _held = arrivals;
            panic!("fetch blew up");
        })
        .join();
        assert!(result.is_err());
        assert!(barrier.is_complete());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
