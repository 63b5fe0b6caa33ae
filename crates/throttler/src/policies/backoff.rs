// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Backoff(base, cap, quadratic?)`: a linear or quadratic backoff pacer
//! that wraps back to its first delay once the cap is reached.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use context::RequestContext;

use crate::{support::sleep_cancelable, Error, Throttler};

/// Maintains an attempt counter `k` starting at 0. On acquire, sleeps for
/// `delay(k)`, then advances `k`; once `delay(k)` has itself reached `cap`
/// (so the plateau is actually served at least once), `k` wraps back to 0
/// instead of advancing further. `release` never resets `k`.
///
/// `delay(k) = min(base * (k+1)^2, cap)` when `quadratic`, else
/// `min(base * (k+1), cap)`.
#[derive(Debug)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    quadratic: bool,
    attempt: AtomicU64,
}

impl Backoff {
    /// Creates a new `Backoff`.
    pub fn new(base: Duration, cap: Duration, quadratic: bool) -> Self {
        Self {
            base,
            cap,
            quadratic,
            attempt: AtomicU64::new(0),
        }
    }

    fn factor(&self, k: u64) -> u32 {
        let step = k.saturating_add(1);
        if self.quadratic {
            u32::try_from(step.saturating_mul(step)).unwrap_or(u32::MAX)
        } else {
            u32::try_from(step).unwrap_or(u32::MAX)
        }
    }

    /// The uncapped delay for attempt `k`; `None` means it overflowed (and
    /// therefore certainly exceeds `cap`).
    fn raw_delay(&self, k: u64) -> Option<Duration> {
        self.base.checked_mul(self.factor(k))
    }

    fn delay_for(&self, k: u64) -> Duration {
        self.raw_delay(k).unwrap_or(self.cap).min(self.cap)
    }
}

#[async_trait]
impl Throttler for Backoff {
    async fn acquire(&self, ctx: &RequestContext) -> Result<(), Error> {
        let k = self.attempt.load(Ordering::Acquire);
        let delay = self.delay_for(k);
        tracing::trace!(attempt = k, ?delay, "backing off");
        sleep_cancelable(delay, ctx).await?;

        // Wrap only once this attempt's own delay has reached (or
        // overflowed past) the cap, so the capped value is actually served
        // at least once instead of being skipped over on the way there.
        let reached_cap = self.raw_delay(k).map_or(true, |d| d >= self.cap);
        let next = if reached_cap { 0 } else { k + 1 };
        self.attempt.store(next, Ordering::Release);

        Ok(())
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn quadratic_sequence_reaches_the_cap_before_wrapping() {
        // delay(0..=3) = 1, 4, 9, 16 (all under the 20ms cap). delay(4) =
        // min(25, 20) = 20: the raw value (25) has reached the cap, so this
        // call actually serves the capped 20ms plateau instead of wrapping
        // before ever using it; only the call after that wraps back to k=0.
        let backoff = Backoff::new(Duration::from_millis(1), Duration::from_millis(20), true);
        let ctx = RequestContext::new();

        let expected = [1u64, 4, 9, 16, 20, 1, 4];
        for expected_ms in expected {
            let start = tokio::time::Instant::now();
            backoff.acquire(&ctx).await.expect("backoff never rejects");
            let elapsed = start.elapsed();
            assert_eq!(elapsed, Duration::from_millis(expected_ms));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn linear_sequence_reaches_the_cap_before_wrapping() {
        // delay(0)=5, delay(1)=10, delay(2)=min(15,15)=15: the raw value
        // lands exactly on the 15ms cap, so it is served once before
        // raw_delay(3)=20 pushes past the cap and the next call wraps to 0.
        let backoff = Backoff::new(Duration::from_millis(5), Duration::from_millis(15), false);
        let ctx = RequestContext::new();

        let expected = [5u64, 10, 15, 5, 10, 15];
        for expected_ms in expected {
            let start = tokio::time::Instant::now();
            backoff.acquire(&ctx).await.expect("backoff never rejects");
            assert_eq!(start.elapsed(), Duration::from_millis(expected_ms));
        }
    }

    #[tokio::test]
    async fn release_does_not_reset_the_counter() {
        let backoff = Backoff::new(Duration::from_millis(0), Duration::from_millis(100), false);
        let ctx = RequestContext::new();

        backoff.acquire(&ctx).await.expect("backoff never rejects");
        backoff.release(&ctx).await.expect("release is a no-op");
        assert_eq!(backoff.attempt.load(Ordering::Acquire), 1);
    }
}
