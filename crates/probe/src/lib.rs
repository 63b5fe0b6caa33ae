// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

#![deny(
    trivial_numeric_casts,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    unused_results
)]
#![warn(rust_2021_compatibility, unreachable_pub)]

//! Read-only probes consulted by resource-aware throttlers: a
//! [`StatsProvider`] for system memory/CPU pressure and a [`MetricProvider`]
//! for an arbitrary user-defined boolean predicate. Neither probe is
//! implemented here beyond a trivial static stand-in for tests and demos —
//! the real system-memory/CPU/predicate sources are external collaborators.

/// The error type returned by a probe when it cannot produce a reading.
/// Boxed rather than a concrete type because the probe's own failure causes
/// (a `/proc` read, a user closure panic, ...) are the provider's concern,
/// not the throttler's.
pub type ProbeError = Box<dyn std::error::Error + Send + Sync>;

/// A snapshot of system resource pressure, or a threshold expressed in the
/// same shape. A zero field means "no limit on this field" when used as a
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    /// Bytes currently allocated by the process.
    pub mem_alloc: u64,
    /// Bytes of system memory in use.
    pub mem_system: u64,
    /// Nanoseconds spent in the last GC/scheduler pause.
    pub cpu_pause: u64,
    /// Fraction of CPU in use, in `[0, 1]`.
    pub cpu_usage: f64,
}

/// A boolean reading from a user-defined predicate, with an optional error.
pub type Metric = bool;

/// Supplies [`Stats`] snapshots to a `Monitor` throttler.
pub trait StatsProvider: Send + Sync {
    /// Returns the current stats snapshot, or an error if unavailable.
    fn stats(&self) -> Result<Stats, ProbeError>;
}

/// Supplies a boolean [`Metric`] reading to a `Metric` throttler.
pub trait MetricProvider: Send + Sync {
    /// Returns the current metric reading, or an error if unavailable.
    fn metric(&self) -> Result<Metric, ProbeError>;
}

/// A [`StatsProvider`] that always returns the same fixed snapshot. Useful
/// for tests and for demonstrating `Monitor` without wiring up a real
/// system-stats source.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticStatsProvider(pub Stats);

impl StatsProvider for StaticStatsProvider {
    fn stats(&self) -> Result<Stats, ProbeError> {
        Ok(self.0)
    }
}

/// A [`MetricProvider`] that always returns the same fixed boolean. Useful
/// for tests and for demonstrating `Metric` without wiring up a real
/// predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMetricProvider(pub bool);

impl MetricProvider for StaticMetricProvider {
    fn metric(&self) -> Result<Metric, ProbeError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn static_stats_provider_returns_fixed_snapshot() {
        let stats = Stats {
            mem_alloc: 100,
            mem_system: 1000,
            cpu_pause: 10,
            cpu_usage: 0.2,
        };
        let provider = StaticStatsProvider(stats);
        assert_eq!(provider.stats().expect("static provider never errors"), stats);
    }

    #[test]
    fn static_metric_provider_returns_fixed_value() {
        let provider = StaticMetricProvider(true);
        assert!(provider.metric().expect("static provider never errors"));
    }

    #[test]
    fn zero_stats_is_default() {
        assert_eq!(Stats::default(), Stats { mem_alloc: 0, mem_system: 0, cpu_pause: 0, cpu_usage: 0.0 });
    }
}
