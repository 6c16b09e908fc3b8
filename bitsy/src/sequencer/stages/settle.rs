//! Stage 1: settle.
//!
//! Unconditional delay giving udev time to create device nodes after boot.
//! This is a fixed sleep, not a readiness poll.

use std::time::Duration;

pub async fn run(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    tracing::debug!(delay_secs = delay.as_secs(), "Waiting for hardware to settle");
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_settle_sleeps_full_delay() {
        let start = tokio::time::Instant::now();
        run(Duration::from_secs(10)).await;
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_returns_immediately() {
        let start = tokio::time::Instant::now();
        run(Duration::ZERO).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
