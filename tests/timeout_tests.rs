use anyhow::Result;
use circuit_breaker::{BreakerState, CircuitBreaker};
use tokio::time::{Duration, advance};

use crate::{count_of, event_counter};

fn timed_breaker(count: u64, timeout_ms: u64) -> Result<CircuitBreaker> {
    Ok(CircuitBreaker::builder()
        .failure_count_threshold(count)
        .reset_timeout(Duration::from_millis(timeout_ms))
        .build()?)
}

/// Test: An open breaker closes on the first observation after the timeout
#[tokio::test(start_paused = true)]
async fn test_reset_timeout_closes_open_breaker() -> Result<()> {
    let mut breaker = timed_breaker(0, 1)?;
    breaker.record_fail();
    assert!(breaker.is_open());

    advance(Duration::from_millis(2)).await;

    assert!(!breaker.is_open());
    assert_eq!(breaker.state(), BreakerState::Closed);
    assert_eq!(breaker.failed(), 0);

    Ok(())
}

/// Test: is_closed() observes the timeout the same way
#[tokio::test(start_paused = true)]
async fn test_reset_timeout_observed_by_is_closed() -> Result<()> {
    let mut breaker = timed_breaker(0, 1)?;
    breaker.record_fail();
    assert!(!breaker.is_closed());

    advance(Duration::from_millis(3)).await;

    assert!(breaker.is_closed());

    Ok(())
}

/// Test: Reaching the timeout exactly is not enough, it must be exceeded
#[tokio::test(start_paused = true)]
async fn test_reset_timeout_is_strict() -> Result<()> {
    let mut breaker = timed_breaker(0, 100)?;
    breaker.record_fail();

    advance(Duration::from_millis(100)).await;
    assert!(breaker.is_open());

    advance(Duration::from_millis(1)).await;
    assert!(breaker.is_closed());

    Ok(())
}

/// Test: Without an observation the stored state stays open past the deadline
#[tokio::test(start_paused = true)]
async fn test_reset_timeout_is_lazy() -> Result<()> {
    let mut breaker = timed_breaker(0, 10)?;
    breaker.record_fail();

    advance(Duration::from_secs(60)).await;

    assert_eq!(breaker.state(), BreakerState::Open);
    assert_eq!(breaker.failed(), 1);

    assert!(breaker.is_closed());
    assert_eq!(breaker.state(), BreakerState::Closed);

    Ok(())
}

/// Test: The timeout overrides counters that still exceed the thresholds
#[tokio::test(start_paused = true)]
async fn test_reset_timeout_overrides_counters() -> Result<()> {
    let mut breaker = timed_breaker(0, 10)?;
    breaker.record_fail();

    advance(Duration::from_millis(11)).await;

    // the failure is counted, then the expired breaker resets anyway
    breaker.record_fail();
    assert_eq!(breaker.state(), BreakerState::Closed);
    assert_eq!(breaker.failed(), 0);

    Ok(())
}

/// Test: Auto-recovery fires exactly one closed event
#[tokio::test(start_paused = true)]
async fn test_reset_timeout_notifies_once() -> Result<()> {
    let (closed, listener) = event_counter();
    let mut breaker = CircuitBreaker::builder()
        .failure_count_threshold(0)
        .reset_timeout(Duration::from_millis(5))
        .on_close(listener)
        .build()?;
    assert_eq!(count_of(&closed), 1);

    breaker.record_fail();
    advance(Duration::from_millis(6)).await;

    assert!(breaker.is_closed());
    assert!(breaker.is_closed());
    assert_eq!(count_of(&closed), 2);

    Ok(())
}

/// Test: The timeout also clears the counters of a closed breaker
#[tokio::test(start_paused = true)]
async fn test_reset_timeout_clears_closed_breaker() -> Result<()> {
    let mut breaker = timed_breaker(5, 10)?;
    breaker.record_fail();
    breaker.record_fail();
    breaker.record_pass();

    advance(Duration::from_millis(11)).await;

    assert!(breaker.is_closed());
    assert_eq!(breaker.passed(), 0);
    assert_eq!(breaker.failed(), 0);

    Ok(())
}

/// Test: A recovered breaker trips again and gets a fresh deadline
#[tokio::test(start_paused = true)]
async fn test_trips_again_after_timeout() -> Result<()> {
    let mut breaker = timed_breaker(0, 10)?;
    breaker.record_fail();

    advance(Duration::from_millis(11)).await;
    assert!(breaker.is_closed());

    breaker.record_fail();
    assert!(breaker.is_open());

    advance(Duration::from_millis(5)).await;
    assert!(breaker.is_open());

    advance(Duration::from_millis(6)).await;
    assert!(breaker.is_closed());

    Ok(())
}
