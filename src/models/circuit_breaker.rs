use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakerState {
    Closed,
    Open,
}

impl BreakerState {
    pub fn as_str(&self) -> &str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
        }
    }
}

impl Display for BreakerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Thresholds that drive the breaker. Every field is optional; an unset
/// threshold takes no part in deciding whether to trip.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BreakerConfig {
    pub failure_count_threshold: Option<u64>,
    pub failure_rate_threshold: Option<f64>,
    pub reset_timeout: Option<Duration>,
}

impl BreakerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rate) = self.failure_rate_threshold {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::InvalidFailureRate(rate));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: BreakerState,
    pub passed: u64,
    pub failed: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_rate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_count_threshold: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_rate_threshold: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_timeout_ms: Option<u64>,

    /// Milliseconds since the last trip, present only while open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_for_ms: Option<u64>,

    pub observed_at: DateTime<Utc>,
}
