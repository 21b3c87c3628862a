//! Trailing-edge debounce for input handlers.
//!
//! [`Debounced`] collapses a burst of calls into one trailing call carrying the
//! last arguments. [`AsyncDebounced`] additionally hands every caller that
//! arrives while a call is pending the same shared future, so at most one
//! debounced call is outstanding at a time.
//!
//! Both schedule on the Tokio timer and must be used inside a runtime.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt as _;
use futures::channel::oneshot;
use futures::future::{BoxFuture, Shared};
use tokio::task::JoinHandle;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A function wrapper where each call restarts a `wait` countdown and only
/// the last call of a burst reaches the function.
pub struct Debounced<A> {
    wait: Duration,
    func: Arc<dyn Fn(A) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Wraps `func` so that calls closer together than `wait` collapse into one.
pub fn debounce<A, F>(func: F, wait: Duration) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        wait,
        func: Arc::new(func),
        pending: Mutex::new(None),
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Schedules `func(args)` after the quiet period, replacing any call
    /// that has not fired yet.
    pub fn call(&self, args: A) {
        let mut pending = lock(&self.pending);
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let func = Arc::clone(&self.func);
        let wait = self.wait;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            func(args);
        }));
    }

    /// Whether a call is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Drops the scheduled call, if any.
    pub fn cancel(&self) {
        if let Some(handle) = lock(&self.pending).take() {
            handle.abort();
        }
    }
}

impl<A> Drop for Debounced<A> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.pending).take() {
            handle.abort();
        }
    }
}

/// Failure of an [`AsyncDebounced`] call, shared by every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebounceError<E> {
    #[error(transparent)]
    Failed(E),
    #[error("debounced call was aborted")]
    Aborted,
}

/// The future every caller of one pending [`AsyncDebounced`] call shares.
pub type SharedCall<T, E> = Shared<BoxFuture<'static, Result<T, DebounceError<E>>>>;

type AsyncFn<A, T, E> = dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync;

/// Async debounce with at most one pending call.
///
/// While a call is pending (waiting out the quiet period or running), further
/// callers receive the pending call's future instead of scheduling their own;
/// their arguments are dropped. Once it settles the next call starts fresh.
/// Cloning yields another handle to the same debouncer.
pub struct AsyncDebounced<A, T, E> {
    wait: Duration,
    func: Arc<AsyncFn<A, T, E>>,
    pending: Arc<Mutex<Option<SharedCall<T, E>>>>,
}

impl<A, T, E> Clone for AsyncDebounced<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            wait: self.wait,
            func: Arc::clone(&self.func),
            pending: Arc::clone(&self.pending),
        }
    }
}

/// Wraps an async `func` so concurrent callers share one pending call.
pub fn debounce_async<A, T, E, F, Fut>(func: F, wait: Duration) -> AsyncDebounced<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    AsyncDebounced {
        wait,
        func: Arc::new(move |args| func(args).boxed()),
        pending: Arc::new(Mutex::new(None)),
    }
}

/// Empties the pending slot when the call settles, panics, or is dropped
/// unrun.
struct ClearOnDrop<T, E>(Arc<Mutex<Option<SharedCall<T, E>>>>);

impl<T, E> Drop for ClearOnDrop<T, E> {
    fn drop(&mut self) {
        lock(&self.0).take();
    }
}

impl<A, T, E> AsyncDebounced<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Returns the pending call if there is one, otherwise schedules
    /// `func(args)` after the quiet period.
    pub fn call(&self, args: A) -> SharedCall<T, E> {
        let (sender, receiver) = oneshot::channel();
        let shared = {
            let mut pending = lock(&self.pending);
            if let Some(shared) = pending.as_ref() {
                log::trace!(target: "hannou_business::debounce", "joining pending call");
                return shared.clone();
            }

            let shared = async move {
                receiver
                    .await
                    .unwrap_or_else(|_canceled| Err(DebounceError::Aborted))
            }
            .boxed()
            .shared();
            *pending = Some(shared.clone());
            shared
        };

        // The slot is unlocked here: a task dropped by a stopping runtime
        // clears it from this thread.
        let func = Arc::clone(&self.func);
        let wait = self.wait;
        let guard = ClearOnDrop(Arc::clone(&self.pending));
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            let result = func(args).await.map_err(DebounceError::Failed);
            // Free the slot before waking waiters so a follow-up call starts fresh.
            drop(guard);
            if sender.send(result).is_err() {
                log::trace!(target: "hannou_business::debounce", "every waiter left");
            }
        });

        shared
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }
}
