use std::future::Future;

use crate::{breaker::circuit_breaker::CircuitBreaker, models::error::CallError};

/// A breaker bundled with the operation it protects.
#[derive(Debug)]
pub struct Guarded<F> {
    breaker: CircuitBreaker,
    operation: F,
}

impl<F> Guarded<F> {
    pub fn new(breaker: CircuitBreaker, operation: F) -> Self {
        Self { breaker, operation }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn breaker_mut(&mut self) -> &mut CircuitBreaker {
        &mut self.breaker
    }

    pub fn into_parts(self) -> (CircuitBreaker, F) {
        (self.breaker, self.operation)
    }

    pub fn call<A, T, E>(&mut self, args: A) -> Result<T, CallError<E>>
    where
        F: FnMut(A) -> Result<T, E>,
    {
        let operation = &mut self.operation;
        self.breaker.call(|| operation(args))
    }

    pub async fn call_async<A, Fut, T, E>(&mut self, args: A) -> Result<T, CallError<E>>
    where
        F: FnMut(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let operation = &mut self.operation;
        self.breaker.call_async(|| operation(args)).await
    }
}
