pub mod config;
pub mod utils;

pub mod breaker {
    pub mod circuit_breaker;
    pub mod guarded;
    pub mod listeners;
    pub mod shared;
}

pub mod models {
    pub mod circuit_breaker;
    pub mod error;
    pub mod event;
}

pub use breaker::{
    circuit_breaker::{CircuitBreaker, CircuitBreakerBuilder},
    guarded::Guarded,
    shared::{Completion, SharedBreaker},
};
pub use models::{
    circuit_breaker::{BreakerConfig, BreakerSnapshot, BreakerState},
    error::{BreakerOpen, CallError, ConfigError},
    event::{BreakerEvent, ListenerId},
};
