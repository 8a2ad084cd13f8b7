use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::circuit_breaker::BreakerConfig;

const ENV_PREFIX: &str = "BREAKER_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Breaker settings read from `BREAKER_*` environment variables.
#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_name")]
    pub name: String,

    pub failure_count: Option<u64>,
    pub failure_rate: Option<f64>,
    pub reset_timeout_ms: Option<u64>,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_name() -> String {
    "default".to_string()
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;

        config.breaker_config().validate()?;

        Ok(config)
    }

    pub fn breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            failure_count_threshold: self.failure_count,
            failure_rate_threshold: self.failure_rate,
            reset_timeout: self.reset_timeout_ms.map(Duration::from_millis),
        }
    }
}
