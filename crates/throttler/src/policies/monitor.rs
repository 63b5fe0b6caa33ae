// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Monitor(provider, threshold)`: rejects when any observed resource
//! metric meets or exceeds its configured threshold.

use async_trait::async_trait;
use context::RequestContext;
use probe::{Stats, StatsProvider};

use crate::{Error, Throttler};

/// Queries `provider` on every acquire and rejects with
/// [`Error::StatsThreshold`] when any of `mem_alloc`, `mem_system`,
/// `cpu_pause`, or `cpu_usage` is at or above the matching field of
/// `threshold`. A zero field in `threshold` means "no limit on this
/// field". A provider error is wrapped as [`Error::StatsUnavailable`].
/// Release is always `Ok`.
pub struct Monitor<P> {
    provider: P,
    threshold: Stats,
}

impl<P: StatsProvider> Monitor<P> {
    /// Creates a new `Monitor` that consults `provider` against `threshold`.
    pub fn new(provider: P, threshold: Stats) -> Self {
        Self { provider, threshold }
    }

    fn breaches(&self, stats: &Stats) -> bool {
        let t = &self.threshold;
        (t.mem_alloc != 0 && stats.mem_alloc >= t.mem_alloc)
            || (t.mem_system != 0 && stats.mem_system >= t.mem_system)
            || (t.cpu_pause != 0 && stats.cpu_pause >= t.cpu_pause)
            || (t.cpu_usage != 0.0 && stats.cpu_usage >= t.cpu_usage)
    }
}

#[async_trait]
impl<P: StatsProvider + Send + Sync> Throttler for Monitor<P> {
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        let stats = self.provider.stats().map_err(Error::StatsUnavailable)?;
        if self.breaches(&stats) {
            tracing::trace!(?stats, threshold = ?self.threshold, "stats threshold exceeded");
            Err(Error::StatsThreshold)
        } else {
            Ok(())
        }
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use probe::StaticStatsProvider;

    use super::*;

    fn threshold() -> Stats {
        Stats {
            mem_alloc: 1000,
            mem_system: 2000,
            cpu_pause: 500,
            cpu_usage: 0.3,
        }
    }

    #[tokio::test]
    async fn breaching_stats_reject_every_call() {
        let current = Stats {
            mem_alloc: 500,
            mem_system: 5000,
            cpu_pause: 500,
            cpu_usage: 0.1,
        };
        let monitor = Monitor::new(StaticStatsProvider(current), threshold());
        let ctx = RequestContext::new();

        for _ in 0..3 {
            assert!(matches!(monitor.acquire(&ctx).await, Err(Error::StatsThreshold)));
        }
    }

    #[tokio::test]
    async fn stats_within_bounds_always_succeed() {
        let current = Stats {
            mem_alloc: 100,
            mem_system: 1000,
            cpu_pause: 100,
            cpu_usage: 0.1,
        };
        let monitor = Monitor::new(StaticStatsProvider(current), threshold());
        let ctx = RequestContext::new();

        for _ in 0..3 {
            assert!(monitor.acquire(&ctx).await.is_ok());
        }
    }

    #[tokio::test]
    async fn zero_threshold_fields_mean_no_limit() {
        let current = Stats {
            mem_alloc: u64::MAX,
            ..Default::default()
        };
        let monitor = Monitor::new(StaticStatsProvider(current), Stats::default());
        let ctx = RequestContext::new();
        assert!(monitor.acquire(&ctx).await.is_ok());
    }

    struct FailingStatsProvider;

    impl StatsProvider for FailingStatsProvider {
        fn stats(&self) -> Result<Stats, probe::ProbeError> {
            Err("stats source unavailable".into())
        }
    }

    #[tokio::test]
    async fn provider_errors_are_wrapped_not_swallowed() {
        let monitor = Monitor::new(FailingStatsProvider, threshold());
        let ctx = RequestContext::new();
        let err = monitor.acquire(&ctx).await.expect_err("provider errors reject");
        assert!(err.to_string().starts_with("throttler hasn't found any stats:"));
    }
}
