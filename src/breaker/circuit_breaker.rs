//! Open/closed circuit breaker driven by a failure count and a failure rate.
//!
//! The breaker has no background clock. The reset timeout is checked every
//! time an outcome is recorded or the state is queried, so a stored `Open`
//! state is only accurate as of the last observation.

use std::{future::Future, time::Duration};

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    breaker::{guarded::Guarded, listeners::Listeners},
    models::{
        circuit_breaker::{BreakerConfig, BreakerSnapshot, BreakerState},
        error::{BreakerOpen, CallError, ConfigError},
        event::{BreakerEvent, ListenerId},
    },
};

const DEFAULT_NAME: &str = "default";

#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    state: BreakerState,
    passed: u64,
    failed: u64,
    started_at: Instant,
    listeners: Listeners,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> CircuitBreakerBuilder {
        CircuitBreakerBuilder::default()
    }

    fn assemble(name: String, config: BreakerConfig, listeners: Listeners) -> Self {
        let mut breaker = Self {
            name,
            config,
            state: BreakerState::Closed,
            passed: 0,
            failed: 0,
            started_at: Instant::now(),
            listeners,
        };
        breaker.reset();
        breaker
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Stored state as of the last observation. Does not re-evaluate.
    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn passed(&self) -> u64 {
        self.passed
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// `failed / (passed + failed)`, or `None` before anything was recorded.
    pub fn failure_rate(&self) -> Option<f64> {
        let total = self.passed.saturating_add(self.failed);
        if total == 0 {
            return None;
        }
        Some(self.failed as f64 / total as f64)
    }

    pub fn trip(&mut self) {
        self.state = BreakerState::Open;
        self.started_at = Instant::now();
        warn!(
            breaker = %self.name,
            passed = self.passed,
            failed = self.failed,
            "Circuit breaker opened"
        );
        self.listeners.emit(BreakerEvent::Opened);
    }

    pub fn reset(&mut self) {
        self.passed = 0;
        self.failed = 0;
        self.state = BreakerState::Closed;
        self.started_at = Instant::now();
        info!(breaker = %self.name, "Circuit breaker closed");
        self.listeners.emit(BreakerEvent::Closed);
    }

    pub fn record_pass(&mut self) {
        self.passed = self.passed.saturating_add(1);
        debug!(
            breaker = %self.name,
            passed = self.passed,
            failed = self.failed,
            "Circuit breaker pass recorded"
        );
        self.update();
    }

    pub fn record_fail(&mut self) {
        self.failed = self.failed.saturating_add(1);
        debug!(
            breaker = %self.name,
            passed = self.passed,
            failed = self.failed,
            "Circuit breaker failure recorded"
        );
        self.update();
    }

    /// Records `Ok` as a pass and `Err` as a failure.
    pub fn record<T, E>(&mut self, outcome: &Result<T, E>) {
        match outcome {
            Ok(_) => self.record_pass(),
            Err(_) => self.record_fail(),
        }
    }

    pub fn is_open(&mut self) -> bool {
        self.update();
        self.state == BreakerState::Open
    }

    pub fn is_closed(&mut self) -> bool {
        self.update();
        self.state == BreakerState::Closed
    }

    pub fn snapshot(&mut self) -> BreakerSnapshot {
        self.update();

        let open_for_ms = match self.state {
            BreakerState::Open => Some(millis(self.started_at.elapsed())),
            BreakerState::Closed => None,
        };

        BreakerSnapshot {
            name: self.name.clone(),
            state: self.state,
            passed: self.passed,
            failed: self.failed,
            failure_rate: self.failure_rate(),
            failure_count_threshold: self.config.failure_count_threshold,
            failure_rate_threshold: self.config.failure_rate_threshold,
            reset_timeout_ms: self.config.reset_timeout.map(millis),
            open_for_ms,
            observed_at: Utc::now(),
        }
    }

    pub fn on<F>(&mut self, event: BreakerEvent, listener: F) -> ListenerId
    where
        F: FnMut() + Send + 'static,
    {
        self.listeners.add(event, listener)
    }

    pub fn on_open<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut() + Send + 'static,
    {
        self.on(BreakerEvent::Opened, listener)
    }

    pub fn on_close<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut() + Send + 'static,
    {
        self.on(BreakerEvent::Closed, listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Runs `operation` if the breaker is closed and records its outcome.
    pub fn call<F, T, E>(&mut self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.admit()?;

        let outcome = operation();
        self.record(&outcome);
        outcome.map_err(CallError::Operation)
    }

    pub async fn call_async<F, Fut, T, E>(&mut self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.admit()?;

        let outcome = operation().await;
        self.record(&outcome);
        outcome.map_err(CallError::Operation)
    }

    pub(crate) fn admit(&mut self) -> Result<(), BreakerOpen> {
        if self.is_closed() {
            return Ok(());
        }

        warn!(breaker = %self.name, "Circuit breaker is open, rejecting call");
        Err(BreakerOpen)
    }

    fn update(&mut self) {
        let should_be_closed = self.detect();

        match (should_be_closed, self.state) {
            (true, BreakerState::Open) => self.reset(),
            (false, BreakerState::Closed) => self.trip(),
            _ => {}
        }

        // Checked after the counters and in either state: an expired breaker
        // is always closed with zeroed counters.
        if let Some(timeout) = self.config.reset_timeout {
            if self.started_at.elapsed() > timeout {
                info!(
                    breaker = %self.name,
                    timeout_ms = millis(timeout),
                    "Circuit breaker reset timeout elapsed"
                );
                self.reset();
            }
        }
    }

    /// Whether the counters allow the breaker to be closed. With both
    /// thresholds configured, it trips only when both are exceeded.
    fn detect(&self) -> bool {
        let count_exceeded = self
            .config
            .failure_count_threshold
            .is_some_and(|threshold| self.failed > threshold);

        let rate_exceeded = self.config.failure_rate_threshold.is_some_and(|threshold| {
            self.failed > 0 && self.failure_rate().is_some_and(|rate| rate > threshold)
        });

        match (
            self.config.failure_count_threshold,
            self.config.failure_rate_threshold,
        ) {
            (Some(_), Some(_)) => !(count_exceeded && rate_exceeded),
            (Some(_), None) => !count_exceeded,
            (None, Some(_)) => !rate_exceeded,
            (None, None) => true,
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::assemble(
            DEFAULT_NAME.to_string(),
            BreakerConfig::default(),
            Listeners::default(),
        )
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Default)]
pub struct CircuitBreakerBuilder {
    name: Option<String>,
    config: BreakerConfig,
    listeners: Listeners,
}

impl CircuitBreakerBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config(mut self, config: BreakerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn failure_count_threshold(mut self, threshold: u64) -> Self {
        self.config.failure_count_threshold = Some(threshold);
        self
    }

    pub fn failure_rate_threshold(mut self, threshold: f64) -> Self {
        self.config.failure_rate_threshold = Some(threshold);
        self
    }

    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.config.reset_timeout = Some(timeout);
        self
    }

    /// Listeners registered here also see the construction-time `Closed`.
    pub fn on<F>(mut self, event: BreakerEvent, listener: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.listeners.add(event, listener);
        self
    }

    pub fn on_open<F>(self, listener: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on(BreakerEvent::Opened, listener)
    }

    pub fn on_close<F>(self, listener: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on(BreakerEvent::Closed, listener)
    }

    pub fn build(self) -> Result<CircuitBreaker, ConfigError> {
        self.config.validate()?;

        Ok(CircuitBreaker::assemble(
            self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            self.config,
            self.listeners,
        ))
    }

    pub fn build_guarded<F>(self, operation: F) -> Result<Guarded<F>, ConfigError> {
        Ok(Guarded::new(self.build()?, operation))
    }
}
