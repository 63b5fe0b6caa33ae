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

//! A library of composable throttlers — admission-control primitives that
//! decide, at a call site, whether a unit of work may proceed now, must
//! wait, must be rejected, or must be steered by priority.
//!
//! Every policy implements the [`Throttler`] trait: a matched pair of
//! `acquire`/`release` operations. Policies are leaf components; combining
//! several into an all-of/any-of/sequence gate is a concern for code built
//! on top of this crate, not for the crate itself.

use async_trait::async_trait;
use context::RequestContext;
use probe::ProbeError;

mod support;

pub mod policies;

pub use policies::{
    after::After, backoff::Backoff, before::Before, buffered::Buffered, chance::Chance, each::Each, echo::Echo,
    latency::Latency, metric::Metric, monitor::Monitor, panic_policy::Panic, percentile::Percentile,
    priority::Priority, running::Running, timed::Timed, wait::Wait,
};

/// The capability every throttler policy implements: a matched pair of
/// operations around the caller's unit of work.
#[async_trait]
pub trait Throttler: Send + Sync {
    /// Consults and mutates policy state for the incoming request. May
    /// block the caller for a bounded duration if the policy's semantics
    /// involve waiting (`Wait`, `Backoff`, `Buffered`, `Priority` only).
    async fn acquire(&self, ctx: &RequestContext) -> Result<(), Error>;

    /// Notifies the policy that the caller has finished its unit of work.
    /// A no-op returning `Ok` for policies with no outstanding-work state.
    async fn release(&self, ctx: &RequestContext) -> Result<(), Error>;
}

/// The stable, observable failure kinds a throttler can report.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The policy is configured to echo a caller-supplied error.
    #[error("{0}")]
    Echoed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request was canceled (or its deadline exceeded) while a
    /// suspending policy was waiting. Takes precedence over any
    /// policy-specific rejection.
    #[error("request was canceled while waiting on a throttler")]
    Cancelled,

    /// The `Panic` policy's sentinel rejection.
    #[error("throttler has reached panic")]
    Panic,

    /// `Each(N)` fired: this was the Nth, 2Nth, ... call.
    #[error("throttler has reached periodic threshold")]
    PeriodicThreshold,

    /// `Before(N)` fired: this call was among the first N.
    #[error("throttler has not reached threshold yet")]
    BelowThreshold,

    /// `After(N)` fired: this call came after the first N.
    #[error("throttler has exceed threshold")]
    AboveThreshold,

    /// `Running(N)` fired: the in-flight count is already at N.
    #[error("throttler has exceed running threshold")]
    RunningThreshold,

    /// `Chance(p)` fired: the draw landed below `p`.
    #[error("throttler has reached chance threshold")]
    Chance,

    /// A `StatsProvider` failed to produce a reading.
    #[error("throttler hasn't found any stats: {0}")]
    StatsUnavailable(#[source] ProbeError),

    /// `Monitor` fired: a resource threshold was exceeded.
    #[error("throttler has exceed stats threshold")]
    StatsThreshold,

    /// A `MetricProvider` failed to produce a reading.
    #[error("throttler hasn't found any metric: {0}")]
    MetricUnavailable(#[source] ProbeError),

    /// `Metric` fired: the predicate read true.
    #[error("throttler has reached metric threshold")]
    MetricThreshold,

    /// `Latency` or `Percentile` fired: observed latency is at or above
    /// the configured limit.
    #[error("throttler has exceed latency threshold")]
    LatencyThreshold,

    /// `Timed(N, window, quantum)` fired: the window's budget is exhausted.
    #[error("throttler has exceed timed threshold")]
    TimedThreshold,
}

/// Errors raised by a policy's constructor when its parameters violate a
/// construction-time constraint (see each policy's documentation).
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A count threshold (`Running`/`Buffered`/`Priority`/`Timed`/`Each`/
    /// `Before`/`After`) must be at least 1.
    #[error("count threshold must be >= 1, got {0}")]
    ZeroCount(u64),
}
