// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Buffered(N)`: a permit pool with blocking semantics and no rejection
//! path — acquire only ever delays.

use async_trait::async_trait;
use context::RequestContext;
use tokio::sync::Semaphore;

use crate::{support::acquire_permit_cancelable, ConfigError, Error, Throttler};

/// Holds `n` permits. Acquire waits until one is free, then takes it;
/// release returns one, tolerating spurious over-release (the semaphore
/// simply grows back to a size it has already seen).
///
/// Permits are granted in whatever order `tokio::sync::Semaphore` wakes
/// waiters, which is FIFO — sufficient per §5's "fair order" requirement,
/// though global FIFO is not guaranteed beyond what the semaphore itself
/// promises.
pub struct Buffered {
    semaphore: Semaphore,
}

impl Buffered {
    /// Creates a new `Buffered(n)`. `n` must be `>= 1`.
    pub fn new(n: usize) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::ZeroCount(0));
        }
        tracing::debug!(permits = n, "buffered throttler constructed");
        Ok(Self {
            semaphore: Semaphore::new(n),
        })
    }
}

#[async_trait]
impl Throttler for Buffered {
    async fn acquire(&self, ctx: &RequestContext) -> Result<(), Error> {
        if self.semaphore.available_permits() == 0 {
            tracing::trace!("buffered pool exhausted, waiting for a permit");
        }
        let permit = acquire_permit_cancelable(&self.semaphore, ctx).await?;
        permit.forget();
        Ok(())
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        // Over-release is tolerated: adding permits beyond the original
        // count just grows the pool's capacity, which never happens here
        // because acquire only ever forgets permits it actually took.
        self.semaphore.add_permits(1);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use tokio_util::sync::CancellationToken;

    use super::*;

    #[tokio::test(start_paused = true, flavor = "multi_thread")]
    async fn three_callers_through_one_permit_queue_in_turn() {
        let buffered = Arc::new(Buffered::new(1).expect("1 is a valid count"));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let buffered = Arc::clone(&buffered);
            handles.push(tokio::spawn(async move {
                let ctx = RequestContext::new();
                let start = tokio::time::Instant::now();
                buffered.acquire(&ctx).await.expect("buffered never rejects");
                let waited = start.elapsed();
                tokio::time::sleep(Duration::from_millis(1)).await;
                buffered.release(&ctx).await.expect("release is infallible");
                waited
            }));
        }

        tokio::time::advance(Duration::from_millis(10)).await;

        let mut waits = Vec::new();
        for handle in handles {
            waits.push(handle.await.expect("task should not panic"));
        }
        waits.sort();

        assert_eq!(waits[0], Duration::ZERO);
        assert_eq!(waits[1], Duration::from_millis(1));
        assert_eq!(waits[2], Duration::from_millis(2));
    }

    #[tokio::test]
    async fn over_release_does_not_panic() {
        let buffered = Buffered::new(1).expect("1 is a valid count");
        let ctx = RequestContext::new();
        buffered.release(&ctx).await.expect("over-release is tolerated");
        buffered.release(&ctx).await.expect("over-release is tolerated");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_returns_promptly_while_waiting() {
        let buffered = Arc::new(Buffered::new(1).expect("1 is a valid count"));
        let held = RequestContext::new();
        buffered.acquire(&held).await.expect("first caller never waits");

        let token = CancellationToken::new();
        let waiting_ctx = RequestContext::new().with_cancellation(token.clone());
        token.cancel();

        let err = buffered.acquire(&waiting_ctx).await.expect_err("canceled wait should fail");
        assert_eq!(err.to_string(), "request was canceled while waiting on a throttler");
    }
}
