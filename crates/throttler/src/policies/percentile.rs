// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Percentile(limit, percentile, retention)`: gates on a quantile of
//! recent per-call latencies rather than a single high-water mark.

use std::collections::VecDeque;

use async_trait::async_trait;
use context::RequestContext;
use parking_lot::Mutex;
use tokio::time::{Duration, Instant};

use crate::{Error, Throttler};

/// Caps how many recent latencies are retained; old enough that the
/// configured quantile is a meaningful statistic without growing the
/// sample unboundedly.
const SAMPLE_CAPACITY: usize = 256;

struct State {
    sample: VecDeque<Duration>,
    breached_at: Option<Instant>,
}

/// Maintains a bounded sample of recent per-call latencies (`timestamp` to
/// now, as [`crate::policies::latency::Latency`] computes it). On acquire,
/// if the `percentile`-quantile of the sample collected *before* this call
/// is already `>= limit`, rejects with [`Error::LatencyThreshold`] without
/// adding this call's latency to the sample; otherwise succeeds and
/// appends it. `percentile >= 1` selects the maximum, `<= 0` the minimum.
/// The sample (and breach latch) is cleared `retention` after the
/// threshold was first crossed, reopening the gate. Release is always
/// `Ok`.
pub struct Percentile {
    limit: Duration,
    percentile: f64,
    retention: Duration,
    state: Mutex<State>,
}

impl Percentile {
    /// Creates a new `Percentile(limit, percentile, retention)`.
    pub fn new(limit: Duration, percentile: f64, retention: Duration) -> Self {
        Self {
            limit,
            percentile,
            retention,
            state: Mutex::new(State { sample: VecDeque::new(), breached_at: None }),
        }
    }

    fn quantile(&self, sample: &VecDeque<Duration>) -> Duration {
        if sample.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<Duration> = sample.iter().copied().collect();
        sorted.sort_unstable();
        if self.percentile >= 1.0 {
            return *sorted.last().expect("sample is non-empty");
        }
        if self.percentile <= 0.0 {
            return sorted[0];
        }
        let last_index = sorted.len() - 1;
        let rank = (self.percentile * last_index as f64).round() as usize;
        sorted[rank.min(last_index)]
    }
}

#[async_trait]
impl Throttler for Percentile {
    async fn acquire(&self, ctx: &RequestContext) -> Result<(), Error> {
        let now = Instant::now();
        let mut state = self.state.lock();

        if let Some(breached) = state.breached_at {
            if now.saturating_duration_since(breached) >= self.retention {
                state.sample.clear();
                state.breached_at = None;
            }
        }

        if self.quantile(&state.sample) >= self.limit {
            tracing::trace!(percentile = self.percentile, limit = ?self.limit, "latency percentile exceeded");
            return Err(Error::LatencyThreshold);
        }

        let observed = now.saturating_duration_since(ctx.timestamp());
        if state.sample.len() == SAMPLE_CAPACITY {
            let _ = state.sample.pop_front();
        }
        state.sample.push_back(observed);

        if self.quantile(&state.sample) >= self.limit && state.breached_at.is_none() {
            state.breached_at = Some(now);
        }
        Ok(())
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}
