// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Latency(limit, retention)`: a single latched high-water-mark latency
//! gate that reopens `retention` after it first breaches `limit`.

use async_trait::async_trait;
use context::RequestContext;
use parking_lot::Mutex;
use tokio::time::{Duration, Instant};

use crate::{Error, Throttler};

struct State {
    observed: Duration,
    breached_at: Option<Instant>,
}

/// Tracks the largest per-call latency seen so far (`timestamp` to now, or
/// 0 if the caller supplied no timestamp). Once that high-water mark
/// reaches `limit`, every further acquire rejects with
/// [`Error::LatencyThreshold`] until `retention` has elapsed since the
/// breach, at which point the mark resets to 0 and the gate reopens.
/// Release is always `Ok`.
pub struct Latency {
    limit: Duration,
    retention: Duration,
    state: Mutex<State>,
}

impl Latency {
    /// Creates a new `Latency(limit, retention)`.
    pub fn new(limit: Duration, retention: Duration) -> Self {
        Self {
            limit,
            retention,
            state: Mutex::new(State { observed: Duration::ZERO, breached_at: None }),
        }
    }

    fn reset_if_retention_elapsed(state: &mut State, now: Instant, retention: Duration) {
        if let Some(breached) = state.breached_at {
            if now.saturating_duration_since(breached) >= retention {
                state.observed = Duration::ZERO;
                state.breached_at = None;
            }
        }
    }
}

#[async_trait]
impl Throttler for Latency {
    async fn acquire(&self, ctx: &RequestContext) -> Result<(), Error> {
        let now = Instant::now();
        let mut state = self.state.lock();
        Self::reset_if_retention_elapsed(&mut state, now, self.retention);

        if state.observed >= self.limit {
            tracing::trace!(observed = ?state.observed, limit = ?self.limit, "latency threshold exceeded");
            return Err(Error::LatencyThreshold);
        }

        let observed_now = now.saturating_duration_since(ctx.timestamp());
        state.observed = state.observed.max(observed_now);
        if state.observed >= self.limit && state.breached_at.is_none() {
            state.breached_at = Some(now);
        }
        Ok(())
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}
