//! Thread-safe handle around a [`CircuitBreaker`].
//!
//! One mutex guards the whole breaker so counters, state and `started_at`
//! change as a unit. The lock is released while the guarded operation runs.
//! Listeners are invoked with the lock held and must not call back into the
//! same handle.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    breaker::circuit_breaker::CircuitBreaker,
    models::{
        circuit_breaker::{BreakerSnapshot, BreakerState},
        error::CallError,
        event::{BreakerEvent, ListenerId},
    },
};

#[derive(Debug, Clone)]
pub struct SharedBreaker {
    inner: Arc<Mutex<CircuitBreaker>>,
}

impl SharedBreaker {
    pub fn new(breaker: CircuitBreaker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(breaker)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CircuitBreaker> {
        // A panicking listener leaves the counters usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the breaker.
    pub fn with<R>(&self, f: impl FnOnce(&mut CircuitBreaker) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_closed()
    }

    pub fn record_pass(&self) {
        self.lock().record_pass();
    }

    pub fn record_fail(&self) {
        self.lock().record_fail();
    }

    pub fn trip(&self) {
        self.lock().trip();
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        self.lock().snapshot()
    }

    pub fn on<F>(&self, event: BreakerEvent, listener: F) -> ListenerId
    where
        F: FnMut() + Send + 'static,
    {
        self.lock().on(event, listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.lock().remove_listener(id)
    }

    pub fn call<F, T, E>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.lock().admit()?;

        let outcome = operation();
        self.lock().record(&outcome);
        outcome.map_err(CallError::Operation)
    }

    pub async fn call_async<F, Fut, T, E>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.lock().admit()?;

        let outcome = operation().await;
        self.lock().record(&outcome);
        outcome.map_err(CallError::Operation)
    }

    /// Wraps `callback` so that the result handed to it is recorded first.
    pub fn monitor<C>(&self, callback: C) -> Completion<C> {
        Completion {
            breaker: self.clone(),
            callback,
        }
    }

    /// Completion-style call-through. `operation` receives a [`Completion`]
    /// and resolves it whenever its work finishes. When the breaker is open,
    /// `callback` gets [`CallError::Open`] right away and `operation` is
    /// dropped without running.
    pub fn call_with_callback<O, C, T, E>(&self, operation: O, callback: C)
    where
        O: FnOnce(Completion<C>),
        C: FnOnce(Result<T, CallError<E>>),
    {
        let admitted = self.lock().admit();

        match admitted {
            Ok(()) => operation(self.monitor(callback)),
            Err(open) => callback(Err(open.into())),
        }
    }
}

impl From<CircuitBreaker> for SharedBreaker {
    fn from(breaker: CircuitBreaker) -> Self {
        Self::new(breaker)
    }
}

/// One-shot completion signal for an attempted call.
#[derive(Debug)]
pub struct Completion<C> {
    breaker: SharedBreaker,
    callback: C,
}

impl<C> Completion<C> {
    pub fn complete<T, E>(self, outcome: Result<T, E>)
    where
        C: FnOnce(Result<T, CallError<E>>),
    {
        self.breaker.lock().record(&outcome);
        (self.callback)(outcome.map_err(CallError::Operation));
    }
}
