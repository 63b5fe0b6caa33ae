// Copyright The throttle Authors
// SPDX-License-Identifier: Apache-2.0

//! `Each(N)`: rejects every Nth call.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use context::RequestContext;

use crate::{ConfigError, Error, Throttler};

/// Rejects the Nth, 2Nth, ... call with [`Error::PeriodicThreshold`]; all
/// other calls succeed. The counter advances on every call, including
/// rejected ones.
#[derive(Debug)]
pub struct Each {
    n: u64,
    count: AtomicU64,
}

impl Each {
    /// Creates a new `Each(n)`. `n` must be `>= 1`.
    pub fn new(n: u64) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::ZeroCount(n));
        }
        Ok(Self { n, count: AtomicU64::new(0) })
    }
}

#[async_trait]
impl Throttler for Each {
    async fn acquire(&self, _ctx: &RequestContext) -> Result<(), Error> {
        let count = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        if count % self.n == 0 {
            tracing::trace!(count, n = self.n, "periodic threshold reached");
            Err(Error::PeriodicThreshold)
        } else {
            Ok(())
        }
    }

    async fn release(&self, _ctx: &RequestContext) -> Result<(), Error> {
        Ok(())
    }
}
