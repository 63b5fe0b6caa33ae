// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Metric(provider)`: rejects when a user-defined boolean predicate
//! reads true.

use async_trait::async_trait;
use context::RequestContext;
use probe::MetricProvider;

use crate::{Error, Throttler};

/// Queries `provider` on every acquire. A `true` reading rejects with
/// [`Error::MetricThreshold`]; `false` succeeds; a provider error is
/// wrapped as [`Error::MetricUnavailable`]. Release is always `Ok`.
pub struct Metric<P> {
    provider: P,
}

impl<P: MetricProvider> Metric<P> {
    /// Creates a new `Metric` that consults `provider` on every acquire.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: MetricProvider + Send + Sync> Throttler for Metric<P> {
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        let reading = self.provider.metric().map_err(Error::MetricUnavailable)?;
        if reading {
            tracing::trace!("metric threshold reached");
            Err(Error::MetricThreshold)
        } else {
            Ok(())
        }
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}
