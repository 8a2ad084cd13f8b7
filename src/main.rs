use anyhow::{Error, Result};
use circuit_breaker::{CircuitBreaker, config::Config, utils::init_tracing};
use tracing::info;

fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_tracing(config.log_format)?;

    let mut breaker = CircuitBreaker::builder()
        .name(config.name.clone())
        .config(config.breaker_config())
        .build()?;

    info!(breaker = %breaker.name(), "Configuration validated");

    println!("{}", serde_json::to_string_pretty(&breaker.snapshot())?);

    Ok(())
}
