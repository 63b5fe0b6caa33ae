// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Wait(d)`: a pacing primitive that sleeps for a fixed duration on every
//! acquire.

use std::time::Duration;

use async_trait::async_trait;
use context::RequestContext;

use crate::{support::sleep_cancelable, Error, Throttler};

/// Sleeps for `d` on every acquire, then succeeds. Honors the request
/// context's cancellation token while sleeping.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    duration: Duration,
}

impl Wait {
    /// Creates a new `Wait(duration)`.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Throttler for Wait {
    async fn acquire(&self, ctx: &RequestContext) -> Result<(), Error> {
        tracing::trace!(duration = ?self.duration, "pacing");
        sleep_cancelable(self.duration, ctx).await
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use tokio_util::sync::CancellationToken;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn acquire_sleeps_for_the_configured_duration() {
        let wait = Wait::new(Duration::from_millis(10));
        let ctx = RequestContext::new();

        let start = tokio::time::Instant::now();
        let handle = tokio::spawn(async move { wait.acquire(&ctx).await });
        tokio::time::advance(Duration::from_millis(10)).await;
        handle.await.expect("task should not panic").expect("wait never fails");
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_returns_promptly() {
        let wait = Wait::new(Duration::from_secs(60));
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_cancellation(token.clone());

        token.cancel();
        let err = wait.acquire(&ctx).await.expect_err("canceled wait should fail");
        assert_eq!(err.to_string(), "request was canceled while waiting on a throttler");
    }
}
